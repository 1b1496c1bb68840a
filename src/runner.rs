//! One execution of one style over one payload.

use crate::geometry::Rect;
use crate::motion::{EffectStyle, Motion, MotionEnv, PlanCtx, SpawnSpec};
use crate::palette::ColorPalette;
use crate::pool::{EntityId, GlyphPool};
use crate::surface::{ContainerId, PresentationSurface, SurfaceError};
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(pub u64);

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    /// Every entity died and the container was unregistered.
    Finished,
    /// The surface went away; everything already spawned was released.
    Aborted,
}

struct ActiveEntity {
    id: EntityId,
    spawned_at: f32,
    motion: Motion,
}

/// Services a run borrows for the length of one `tick`.
pub struct TickCtx<'a> {
    pub surface: &'a mut dyn PresentationSurface,
    pub pool: &'a mut GlyphPool,
    pub palette: &'a ColorPalette,
}

pub struct EffectRun {
    id: RunId,
    style: EffectStyle,
    container: ContainerId,
    bounds: Rect,
    started_at: f64,
    max_duration: f32,
    schedule: VecDeque<SpawnSpec>,
    active: Vec<ActiveEntity>,
    scheduled: usize,
    spawned: usize,
    status: RunStatus,
}

impl EffectRun {
    /// Lay out `text` for `style` and register a container. `None` when the surface is gone.
    pub fn start(
        id: RunId,
        style: EffectStyle,
        text: &str,
        now: f64,
        surface: &mut dyn PresentationSurface,
        plan: &mut PlanCtx<'_>,
    ) -> Option<Self> {
        let Some(bounds) = surface.bounds() else {
            warn!(run = %id, style = %style, "surface unavailable; effect skipped");
            return None;
        };
        let container = match surface.register_container() {
            Ok(c) => c,
            Err(err) => {
                warn!(run = %id, style = %style, error = %err, "container registration failed");
                return None;
            }
        };

        let mut spawns = style.plan(text, bounds, plan);
        spawns.sort_by(|a, b| a.at.total_cmp(&b.at));
        let scheduled = spawns.len();
        debug!(run = %id, style = %style, %container, scheduled, "run started");

        Some(Self {
            id,
            style,
            container,
            bounds,
            started_at: now,
            max_duration: plan.tuning.max_run_secs,
            schedule: spawns.into(),
            active: Vec::new(),
            scheduled,
            spawned: 0,
            status: RunStatus::Running,
        })
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn style(&self) -> EffectStyle {
        self.style
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn is_done(&self) -> bool {
        self.status != RunStatus::Running
    }

    pub fn scheduled(&self) -> usize {
        self.scheduled
    }

    pub fn spawned(&self) -> usize {
        self.spawned
    }

    pub fn pending(&self) -> usize {
        self.schedule.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn active_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.active.iter().map(|a| a.id)
    }

    /// Advance to engine time `now` (seconds, same clock as `start`).
    ///
    /// Engine time stays `f64`; only the elapsed time since `start` is narrowed to `f32`.
    pub fn tick(&mut self, now: f64, cx: &mut TickCtx<'_>) -> RunStatus {
        if self.status != RunStatus::Running {
            return self.status;
        }
        if cx.surface.bounds().is_none() {
            return self.abort(cx, SurfaceError::Unavailable);
        }
        let elapsed = (now - self.started_at).max(0.0) as f32;

        if let Err(err) = self.spawn_due(elapsed, cx) {
            return self.abort(cx, err);
        }
        if let Err(err) = self.advance_all(elapsed, cx) {
            return self.abort(cx, err);
        }

        if elapsed > self.max_duration && (!self.active.is_empty() || !self.schedule.is_empty()) {
            warn!(
                run = %self.id,
                style = %self.style,
                elapsed,
                active = self.active.len(),
                "run exceeded its maximum duration; forcing completion"
            );
            self.schedule.clear();
            if let Err(err) = self.release_all(cx) {
                return self.abort(cx, err);
            }
        }

        trace!(run = %self.id, active = self.active.len(), pending = self.schedule.len(), "tick");
        if self.active.is_empty() && self.schedule.is_empty() {
            if let Err(err) = cx.surface.unregister_container(self.container) {
                return self.abort(cx, err);
            }
            debug!(run = %self.id, style = %self.style, spawned = self.spawned, elapsed, "run finished");
            self.status = RunStatus::Finished;
        }
        self.status
    }

    fn spawn_due(&mut self, elapsed: f32, cx: &mut TickCtx<'_>) -> Result<(), SurfaceError> {
        while self.schedule.front().is_some_and(|s| s.at <= elapsed) {
            let Some(spawn) = self.schedule.pop_front() else {
                break;
            };
            let id = cx.pool.acquire(&spawn.content, spawn.font, spawn.color, spawn.opacity);
            if let Some(entity) = cx.pool.get_mut(id) {
                entity.origin = spawn.placement.resolve(entity.size, &self.bounds);
            }
            if let Err(err) = cx.surface.add_entity(self.container, id) {
                cx.pool.release(id);
                return Err(err);
            }
            self.spawned += 1;
            self.active.push(ActiveEntity {
                id,
                spawned_at: spawn.at,
                motion: Motion::new(spawn.motion),
            });
        }
        Ok(())
    }

    fn advance_all(&mut self, elapsed: f32, cx: &mut TickCtx<'_>) -> Result<(), SurfaceError> {
        let env = MotionEnv {
            bounds: self.bounds,
            palette: cx.palette,
        };
        let container = self.container;
        let mut failure = None;
        let surface = &mut *cx.surface;
        let pool = &mut *cx.pool;

        self.active.retain_mut(|slot| {
            let alive = match pool.get_mut(slot.id) {
                Some(entity) => {
                    let pose = slot.motion.advance(elapsed - slot.spawned_at, &entity.frame(), &env);
                    if pose.alive {
                        entity.transform = pose.transform;
                        entity.opacity = pose.opacity.clamp(0.0, 1.0);
                        if let Some(color) = pose.color {
                            entity.color = color;
                        }
                    }
                    pose.alive
                }
                None => false,
            };
            if alive {
                return true;
            }
            if let Err(err) = surface.remove_entity(container, slot.id) {
                failure.get_or_insert(err);
            }
            pool.release(slot.id);
            false
        });

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn release_all(&mut self, cx: &mut TickCtx<'_>) -> Result<(), SurfaceError> {
        let mut failure = None;
        for slot in self.active.drain(..) {
            if let Err(err) = cx.surface.remove_entity(self.container, slot.id) {
                failure.get_or_insert(err);
            }
            cx.pool.release(slot.id);
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn abort(&mut self, cx: &mut TickCtx<'_>, err: SurfaceError) -> RunStatus {
        warn!(run = %self.id, style = %self.style, error = %err, "aborting run");
        self.schedule.clear();
        // Best effort: the surface may already be gone.
        let _ = self.release_all(cx);
        let _ = cx.surface.unregister_container(self.container);
        self.status = RunStatus::Aborted;
        self.status
    }
}
