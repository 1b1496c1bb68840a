//! Per-style kinematics.
//!
//! Each style is a closed set of parameters captured at plan time plus an `advance` that maps
//! elapsed-since-spawn to a [`Pose`]. None of the models keep integration state, so the pose at
//! any instant depends only on the elapsed time.

mod accelerate;
mod orbit;
mod popout;
mod scatter;
mod scroll;

pub use accelerate::AccelerateMotion;
pub use orbit::OrbitMotion;
pub use popout::PopOutMotion;
pub use scatter::ScatterMotion;
pub use scroll::ScrollMotion;

use crate::entity::Font;
use crate::geometry::{Point, Rect, Size, Transform};
use crate::palette::{ColorPalette, Rgb};
use crate::tuning::EngineTuning;
use fastrand::Rng;

/// Opacity ramp applied to freshly spawned glyphs.
pub(crate) const FADE_IN_SECS: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectStyle {
    Scatter,
    PopOut,
    Orbit,
    Scroll,
    Accelerate,
}

impl EffectStyle {
    pub const fn all() -> [Self; 5] {
        [
            Self::Scatter,
            Self::PopOut,
            Self::Orbit,
            Self::Scroll,
            Self::Accelerate,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Scatter => "Scatter",
            Self::PopOut => "PopOut",
            Self::Orbit => "Orbit",
            Self::Scroll => "Scroll",
            Self::Accelerate => "Accelerate",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Scatter => 0,
            Self::PopOut => 1,
            Self::Orbit => 2,
            Self::Scroll => 3,
            Self::Accelerate => 4,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label.trim()))
    }

    /// Build the full spawn schedule for `text` on a surface of `bounds`.
    pub fn plan(self, text: &str, bounds: Rect, cx: &mut PlanCtx<'_>) -> Vec<SpawnSpec> {
        match self {
            Self::Scatter => scatter::plan(text, bounds, cx),
            Self::PopOut => popout::plan(text, bounds, cx),
            Self::Orbit => orbit::plan(text, bounds, cx),
            Self::Scroll => scroll::plan(text, bounds, cx),
            Self::Accelerate => accelerate::plan(text, bounds, cx),
        }
    }
}

impl std::fmt::Display for EffectStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Services a style needs while laying out a run.
pub struct PlanCtx<'a> {
    pub rng: &'a mut Rng,
    pub palette: &'a ColorPalette,
    pub tuning: &'a EngineTuning,
}

/// Read-only inputs to `advance`.
pub struct MotionEnv<'a> {
    pub bounds: Rect,
    pub palette: &'a ColorPalette,
}

/// Where an entity rests once its size is known.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    TopLeft(Point),
    Center(Point),
    /// Left edge at `x`, parked fully outside the bottom (`below`) or top edge.
    OffEdge { x: f32, below: bool },
}

impl Placement {
    pub fn resolve(&self, size: Size, bounds: &Rect) -> Point {
        match *self {
            Self::TopLeft(p) => p,
            Self::Center(p) => Point::new(p.x - size.width * 0.5, p.y - size.height * 0.5),
            Self::OffEdge { x, below: true } => Point::new(x, bounds.max_y()),
            Self::OffEdge { x, below: false } => Point::new(x, bounds.min_y() - size.height),
        }
    }
}

/// One scheduled entity: what it shows, when it appears, how it moves.
#[derive(Clone, Debug)]
pub struct SpawnSpec {
    /// Seconds after run start.
    pub at: f32,
    pub content: String,
    pub font: Font,
    pub color: Rgb,
    pub opacity: f32,
    pub placement: Placement,
    pub motion: MotionModel,
}

/// Visual state reported by a model for one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub transform: Transform,
    pub opacity: f32,
    /// Colour override; `None` keeps the spawn colour.
    pub color: Option<Rgb>,
    pub alive: bool,
}

impl Pose {
    pub fn dead() -> Self {
        Self {
            transform: Transform::IDENTITY,
            opacity: 0.0,
            color: None,
            alive: false,
        }
    }

    pub fn visible(transform: Transform, opacity: f32) -> Self {
        Self {
            transform,
            opacity,
            color: None,
            alive: true,
        }
    }

    fn is_finite(&self) -> bool {
        let t = &self.transform;
        t.tx.is_finite()
            && t.ty.is_finite()
            && t.rotation.is_finite()
            && t.sx.is_finite()
            && t.sy.is_finite()
            && self.opacity.is_finite()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MotionModel {
    Scatter(ScatterMotion),
    PopOut(PopOutMotion),
    Orbit(OrbitMotion),
    Scroll(ScrollMotion),
    Accelerate(AccelerateMotion),
}

impl MotionModel {
    pub fn style(&self) -> EffectStyle {
        match self {
            Self::Scatter(_) => EffectStyle::Scatter,
            Self::PopOut(_) => EffectStyle::PopOut,
            Self::Orbit(_) => EffectStyle::Orbit,
            Self::Scroll(_) => EffectStyle::Scroll,
            Self::Accelerate(_) => EffectStyle::Accelerate,
        }
    }

    /// Pose at `t` seconds after spawn for an entity resting at `frame`.
    ///
    /// Degenerate bounds, negative or non-finite time, and non-finite output all read as death.
    pub fn advance(&self, t: f32, frame: &Rect, env: &MotionEnv<'_>) -> Pose {
        if env.bounds.is_degenerate() || !t.is_finite() || t < 0.0 {
            return Pose::dead();
        }
        let pose = match self {
            Self::Scatter(m) => m.advance(t, frame, env),
            Self::PopOut(m) => m.advance(t, frame, env),
            Self::Orbit(m) => m.advance(t),
            Self::Scroll(m) => m.advance(t, frame, env),
            Self::Accelerate(m) => m.advance(t, frame, env),
        };
        if pose.alive && !pose.is_finite() {
            return Pose::dead();
        }
        pose
    }
}

/// A model plus a latch: once it has reported death it keeps reporting death.
#[derive(Clone, Debug)]
pub struct Motion {
    model: MotionModel,
    finished: bool,
}

impl Motion {
    pub fn new(model: MotionModel) -> Self {
        Self {
            model,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn advance(&mut self, t: f32, frame: &Rect, env: &MotionEnv<'_>) -> Pose {
        if self.finished {
            return Pose::dead();
        }
        let pose = self.model.advance(t, frame, env);
        if !pose.alive {
            self.finished = true;
        }
        pose
    }
}

pub(crate) fn uniform(rng: &mut Rng, lo: f32, hi: f32) -> f32 {
    lo + (hi - lo) * rng.f32()
}

/// Perspective factor for depth `z` seen from `z0`; zero once the entity reaches the eye.
pub(crate) fn perspective(z0: f32, z: f32) -> f32 {
    if z0 > z { z0 / (z0 - z) } else { 0.0 }
}

pub(crate) fn fade_in(t: f32) -> f32 {
    (t / FADE_IN_SECS).min(1.0)
}

/// `i / (n - 1)` without dividing by zero for single-element runs.
pub(crate) fn spread(i: usize, n: usize) -> f32 {
    if n <= 1 { 0.0 } else { i as f32 / (n - 1) as f32 }
}
