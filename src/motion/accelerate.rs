use super::{spread, uniform, MotionEnv, MotionModel, PlanCtx, Placement, Pose, SpawnSpec};
use crate::entity::Font;
use crate::geometry::{Point, Rect, Transform};
use crate::text_sampler::random_lines;

/// Lines slide in from the right, brake, then shoot off to the left.
///
/// Velocity is never allowed above zero: the braking phase can stall a line but not reverse it.
#[derive(Clone, Debug, PartialEq)]
pub struct AccelerateMotion {
    /// Initial velocity, negative (leftward).
    pub v0: f32,
    /// Braking acceleration, positive.
    pub a1: f32,
    /// Launch acceleration after `switch_at`, negative.
    pub a2: f32,
    pub switch_at: f32,
}

impl AccelerateMotion {
    fn braking(&self, t: f32) -> (f32, f32) {
        if self.a1 <= 0.0 {
            let v = (self.v0 + self.a1 * t).min(0.0);
            return (self.v0 * t + 0.5 * self.a1 * t * t, v);
        }
        let stall = (-self.v0 / self.a1).max(0.0);
        let tt = t.min(stall);
        let x = self.v0 * tt + 0.5 * self.a1 * tt * tt;
        let v = if t < stall { self.v0 + self.a1 * t } else { 0.0 };
        (x, v.min(0.0))
    }

    /// Horizontal displacement and velocity at `t`.
    pub fn horizontal(&self, t: f32) -> (f32, f32) {
        if t <= self.switch_at {
            return self.braking(t);
        }
        let (xs, vs) = self.braking(self.switch_at);
        let tau = t - self.switch_at;
        let v = (vs + self.a2 * tau).min(0.0);
        let x = if self.a2 <= 0.0 {
            xs + vs * tau + 0.5 * self.a2 * tau * tau
        } else {
            // A positive launch would reverse; hold at the stall point instead.
            let stall = (-vs / self.a2).max(0.0).min(tau);
            xs + vs * stall + 0.5 * self.a2 * stall * stall
        };
        (x, v)
    }

    pub(super) fn advance(&self, t: f32, frame: &Rect, env: &MotionEnv<'_>) -> Pose {
        let (x, _) = self.horizontal(t);
        if frame.max_x() + x < env.bounds.min_x() {
            return Pose::dead();
        }
        Pose::visible(Transform::translation(x, 0.0), 1.0)
    }
}

pub(super) fn plan(text: &str, bounds: Rect, cx: &mut PlanCtx<'_>) -> Vec<SpawnSpec> {
    let lines = random_lines(text, cx.tuning.accelerate_lines, cx.rng);
    if lines.is_empty() {
        return Vec::new();
    }

    let w = bounds.width().max(0.0);
    let h = bounds.height().max(0.0);
    let font = Font::monospace(h / 10.0);
    let slots = cx.tuning.accelerate_lines.max(1);
    let lowest = (bounds.max_y() - slots as f32 * font.size).max(bounds.min_y());
    let base_y = uniform(cx.rng, bounds.min_y(), lowest);
    let pair = cx.palette.random_pair(cx.rng);

    let mut order: Vec<usize> = (0..lines.len()).collect();
    cx.rng.shuffle(&mut order);

    order
        .into_iter()
        .enumerate()
        .map(|(k, idx)| {
            let jitter = |rng: &mut fastrand::Rng| uniform(rng, 0.8, 1.2);
            let motion = AccelerateMotion {
                v0: -1.15 * w * jitter(cx.rng),
                a1: 2.0 * w * jitter(cx.rng),
                a2: -12.5 * w * jitter(cx.rng),
                switch_at: 0.5 * jitter(cx.rng),
            };
            SpawnSpec {
                at: k as f32 * cx.tuning.accelerate_stagger_secs,
                content: lines[idx].clone(),
                font,
                color: cx.palette.gradient(spread(idx, slots), pair),
                opacity: 1.0,
                placement: Placement::TopLeft(Point::new(
                    bounds.max_x() + 1.0,
                    base_y + idx as f32 * font.size,
                )),
                motion: MotionModel::Accelerate(motion),
            }
        })
        .collect()
}
