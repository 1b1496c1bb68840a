use crate::config::{Config, SurfaceMode};
use crate::engine::SplashEngine;
use crate::geometry::Rect;
use crate::ingress::{trigger_queue, HttpIngress, TriggerReceiver};
use crate::motion::EffectStyle;
use crate::surface::{HeadlessSurface, PresentationSurface};
use crate::terminal::{TerminalGuard, TerminalSurface};
use crate::tuning::{tuning_storage_path, EngineTuning};
use anyhow::{anyhow, Context};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Install the global subscriber. With the terminal surface on stdout, logs stay off unless a
/// file or `RUST_LOG` says otherwise.
pub fn init_logging(cfg: &Config) -> anyhow::Result<()> {
    let default_level = if cfg.surface == SurfaceMode::Terminal && cfg.log_file.is_none() {
        "off"
    } else {
        "code_splash=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    match &cfg.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let tuning_path = cfg.tuning.clone().or_else(tuning_storage_path);
    let tuning = EngineTuning::load(tuning_path.as_deref())
        .with_context(|| format!("load tuning (path={tuning_path:?})"))?;

    let forced = match cfg.style.as_deref() {
        Some(label) => Some(
            EffectStyle::from_label(label).ok_or_else(|| anyhow!("unknown style '{label}'"))?,
        ),
        None => None,
    };

    let rng = match cfg.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let mut engine = SplashEngine::new(tuning.clone(), rng);

    let (sender, mut receiver) = trigger_queue(tuning.trigger_queue_capacity);
    let _ingress = if cfg.no_listen {
        None
    } else {
        Some(HttpIngress::start(&cfg.bind, cfg.port, sender.clone()).context("start http ingress")?)
    };
    if let Some(text) = &cfg.text {
        sender.send(text.clone());
    }

    match cfg.surface {
        SurfaceMode::Terminal => {
            let _term = TerminalGuard::new()?;
            let mut surface = TerminalSurface::stdout(cfg.max_opacity, cfg.sync_updates)?;
            run_loop(&cfg, &mut engine, &mut receiver, forced, &mut surface, poll_terminal)
        }
        SurfaceMode::Headless => {
            let mut surface = HeadlessSurface::new(Rect::new(0.0, 0.0, cfg.width, cfg.height));
            run_loop(&cfg, &mut engine, &mut receiver, forced, &mut surface, |_| Ok(true))
        }
    }
}

/// Drain terminal input. Returns `false` when the user asked to quit.
fn poll_terminal<W: std::io::Write>(surface: &mut TerminalSurface<W>) -> anyhow::Result<bool> {
    while event::poll(Duration::from_millis(0))? {
        match event::read()? {
            Event::Key(k) if k.kind != KeyEventKind::Release => match k.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
                KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(false);
                }
                _ => {}
            },
            Event::Resize(c, r) => surface.resize(c, r),
            _ => {}
        }
    }
    Ok(true)
}

/// The single tick context: every engine and surface mutation happens here.
fn run_loop<S, F>(
    cfg: &Config,
    engine: &mut SplashEngine,
    receiver: &mut TriggerReceiver,
    forced: Option<EffectStyle>,
    surface: &mut S,
    mut poll: F,
) -> anyhow::Result<()>
where
    S: PresentationSurface,
    F: FnMut(&mut S) -> anyhow::Result<bool>,
{
    let interval = Duration::from_secs_f32(cfg.frame_interval_secs());
    let start = Instant::now();
    let mut next_frame = start;
    let mut fps = FpsCounter::new();
    let mut fired = false;
    info!(surface = surface.name(), fps = cfg.fps, "scheduler started");

    loop {
        if !poll(surface)? {
            info!("quit requested");
            return Ok(());
        }

        let now = start.elapsed().as_secs_f64();
        for text in receiver.drain() {
            let id = match forced {
                Some(style) => engine.trigger_style(style, &text, now, surface),
                None => engine.trigger(&text, now, surface),
            };
            fired |= id.is_some();
        }

        engine.tick(now, surface);
        surface.present(engine.pool()).context("present frame")?;

        if fps.tick() && !engine.is_idle() {
            debug!(
                fps = fps.fps(),
                runs = engine.runs().len(),
                entities = engine.active_entities(),
                pool = engine.pool().capacity(),
                "frame stats"
            );
        }

        if cfg.once && fired && engine.is_idle() {
            info!(
                finished = engine.finished_runs(),
                aborted = engine.aborted_runs(),
                "all effects done"
            );
            return Ok(());
        }

        next_frame += interval;
        let after = Instant::now();
        if next_frame > after {
            std::thread::sleep(next_frame - after);
        } else {
            // Running behind; do not try to catch up with a burst of frames.
            next_frame = after;
        }
    }
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    /// Count a frame; returns `true` when a new estimate is available.
    fn tick(&mut self) -> bool {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 5.0 {
            self.fps = (self.frames as f32) / dt;
            self.frames = 0;
            self.last = now;
            return true;
        }
        false
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
