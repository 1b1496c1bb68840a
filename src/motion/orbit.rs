use super::{spread, uniform, MotionModel, PlanCtx, Placement, Pose, SpawnSpec};
use crate::entity::Font;
use crate::geometry::{Point, Rect, Transform};
use crate::text_sampler::bounded_prefix;
use std::f32::consts::PI;

pub const ORBIT_DURATION_SECS: f32 = 0.8;

/// Half-turn swing around a shared anchor, growing in and shrinking out.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitMotion {
    pub duration: f32,
    /// Horizontal amplitude; the sign picks the sweep direction.
    pub ax: f32,
    pub ay: f32,
    pub spin: f32,
    pub peak_scale: f32,
}

impl OrbitMotion {
    /// Normalised progress `r = t / duration`.
    pub fn progress(&self, t: f32) -> f32 {
        t / self.duration
    }

    pub(super) fn advance(&self, t: f32) -> Pose {
        if self.duration <= 0.0 {
            return Pose::dead();
        }
        let r = self.progress(t);
        if r > 1.0 {
            return Pose::dead();
        }
        let swell = (PI * r).sin().max(0.0);
        let transform = Transform::translation(
            self.ax * ((PI * r).cos() - 1.0),
            -self.ay * (PI * r).sin(),
        )
        .with_rotation(self.spin * (r - 0.5))
        .with_uniform_scale(self.peak_scale * swell);
        Pose::visible(transform, swell)
    }
}

pub(super) fn plan(text: &str, bounds: Rect, cx: &mut PlanCtx<'_>) -> Vec<SpawnSpec> {
    let glyphs: Vec<char> = bounded_prefix(text, cx.tuning.orbit_char_limit)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if glyphs.is_empty() {
        return Vec::new();
    }

    let w = bounds.width().max(0.0);
    let h = bounds.height().max(0.0);
    let font = Font::monospace(h / 16.0);
    let anchor = Point::new(
        bounds.min_x() + w * uniform(cx.rng, 0.2, 0.8),
        bounds.min_y() + h * uniform(cx.rng, 0.2, 0.8),
    );
    let direction = if cx.rng.bool() { 1.0 } else { -1.0 };
    let pair = cx.palette.random_pair(cx.rng);
    let jitter = 0.05 * h;

    glyphs
        .iter()
        .enumerate()
        .map(|(i, ch)| {
            let motion = OrbitMotion {
                duration: ORBIT_DURATION_SECS,
                ax: direction * uniform(cx.rng, 0.15, 0.3) * w,
                ay: uniform(cx.rng, 0.15, 0.3) * h,
                spin: uniform(cx.rng, -1.0, 1.0) * PI,
                peak_scale: uniform(cx.rng, 1.5, 2.5),
            };
            let at = Point::new(
                anchor.x + uniform(cx.rng, -jitter, jitter),
                anchor.y + uniform(cx.rng, -jitter, jitter),
            );
            SpawnSpec {
                at: i as f32 * cx.tuning.orbit_stagger_secs,
                content: ch.to_string(),
                font,
                color: cx.palette.gradient(spread(i, glyphs.len()), pair),
                opacity: 0.0,
                placement: Placement::Center(at),
                motion: MotionModel::Orbit(motion),
            }
        })
        .collect()
}
