use crate::motion::{EffectStyle, PlanCtx};
use crate::palette::ColorPalette;
use crate::pool::GlyphPool;
use crate::runner::{EffectRun, RunId, RunStatus, TickCtx};
use crate::selector::EffectSelector;
use crate::surface::PresentationSurface;
use crate::tuning::EngineTuning;
use fastrand::Rng;
use tracing::info;

/// Owns every shared service and the set of in-flight runs.
///
/// All methods must be called from the single tick context; runs may overlap freely.
pub struct SplashEngine {
    pool: GlyphPool,
    palette: ColorPalette,
    selector: EffectSelector,
    tuning: EngineTuning,
    rng: Rng,
    runs: Vec<EffectRun>,
    next_run: u64,
    finished: u64,
    aborted: u64,
}

impl SplashEngine {
    pub fn new(tuning: EngineTuning, rng: Rng) -> Self {
        Self::with_services(tuning, rng, ColorPalette::default(), EffectSelector::default())
    }

    pub fn with_services(
        tuning: EngineTuning,
        rng: Rng,
        palette: ColorPalette,
        selector: EffectSelector,
    ) -> Self {
        Self {
            pool: GlyphPool::new(),
            palette,
            selector,
            tuning,
            rng,
            runs: Vec::new(),
            next_run: 0,
            finished: 0,
            aborted: 0,
        }
    }

    /// Pick the next style and start it on `text`.
    pub fn trigger(
        &mut self,
        text: &str,
        now: f64,
        surface: &mut dyn PresentationSurface,
    ) -> Option<RunId> {
        let style = self.selector.next_effect(&mut self.rng);
        self.trigger_style(style, text, now, surface)
    }

    /// Start `style` on `text`, bypassing the selector.
    pub fn trigger_style(
        &mut self,
        style: EffectStyle,
        text: &str,
        now: f64,
        surface: &mut dyn PresentationSurface,
    ) -> Option<RunId> {
        self.next_run += 1;
        let id = RunId(self.next_run);
        info!(run = %id, style = %style, chars = text.chars().count(), "displaying effect");

        let mut plan = PlanCtx {
            rng: &mut self.rng,
            palette: &self.palette,
            tuning: &self.tuning,
        };
        let run = EffectRun::start(id, style, text, now, surface, &mut plan)?;
        self.runs.push(run);
        Some(id)
    }

    /// Advance every run to `now` and drop the ones that completed. Returns the live run count.
    pub fn tick(&mut self, now: f64, surface: &mut dyn PresentationSurface) -> usize {
        let mut cx = TickCtx {
            surface,
            pool: &mut self.pool,
            palette: &self.palette,
        };
        let mut finished = 0u64;
        let mut aborted = 0u64;
        self.runs.retain_mut(|run| match run.tick(now, &mut cx) {
            RunStatus::Running => true,
            RunStatus::Finished => {
                finished += 1;
                false
            }
            RunStatus::Aborted => {
                aborted += 1;
                false
            }
        });
        self.finished += finished;
        self.aborted += aborted;
        self.runs.len()
    }

    pub fn runs(&self) -> &[EffectRun] {
        &self.runs
    }

    pub fn is_idle(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn pool(&self) -> &GlyphPool {
        &self.pool
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    pub fn selector(&self) -> &EffectSelector {
        &self.selector
    }

    pub fn tuning(&self) -> &EngineTuning {
        &self.tuning
    }

    pub fn finished_runs(&self) -> u64 {
        self.finished
    }

    pub fn aborted_runs(&self) -> u64 {
        self.aborted
    }

    /// Entities currently attached across all runs.
    pub fn active_entities(&self) -> usize {
        self.runs.iter().map(EffectRun::active_count).sum()
    }
}
