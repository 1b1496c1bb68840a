use super::{uniform, MotionEnv, MotionModel, PlanCtx, Placement, Pose, SpawnSpec};
use crate::entity::Font;
use crate::geometry::{Rect, Transform};
use crate::palette::GradientPair;
use crate::text_sampler::{random_line_window, Indent};

/// Share of runs that travel upward.
const UPWARD_BIAS: f32 = 0.8;

/// One block of code sweeping across the surface at constant speed, recoloured as it goes.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollMotion {
    pub upward: bool,
    /// Lower bound on speed, in points per second.
    pub min_speed: f32,
    pub pair: GradientPair,
}

impl ScrollMotion {
    /// Signed vertical velocity; fast enough to cross the surface within 1.5 s.
    pub fn velocity(&self, frame: &Rect, bounds: &Rect) -> f32 {
        let speed = self.min_speed.max((frame.height() + bounds.height()) / 1.5);
        if self.upward { -speed } else { speed }
    }

    pub(super) fn advance(&self, t: f32, frame: &Rect, env: &MotionEnv<'_>) -> Pose {
        let bounds = &env.bounds;
        let vy = self.velocity(frame, bounds);
        let y = vy * t;
        let moved = frame.translated(0.0, y);
        let alive = if self.upward {
            moved.max_y() > bounds.min_y()
        } else {
            moved.min_y() < bounds.max_y()
        };
        if !alive {
            return Pose::dead();
        }

        let travel = bounds.height() + frame.height();
        let ratio = if travel > 0.0 { y.abs() / travel } else { 1.0 };
        let mut pose = Pose::visible(Transform::translation(0.0, y), 1.0);
        pose.color = Some(env.palette.gradient(ratio, self.pair));
        pose
    }
}

pub(super) fn plan(text: &str, bounds: Rect, cx: &mut PlanCtx<'_>) -> Vec<SpawnSpec> {
    let block = random_line_window(text, cx.tuning.scroll_lines, Indent::Relative, cx.rng);
    if block.trim().is_empty() {
        return Vec::new();
    }

    let h = bounds.height().max(0.0);
    let font = Font::monospace(h / 40.0 * 3.0);
    let upward = cx.rng.f32() < UPWARD_BIAS;
    let x = bounds.min_x() + bounds.width().max(0.0) * uniform(cx.rng, 0.05, 0.5);
    let color = cx.palette.random_color(cx.rng);
    let pair = cx.palette.random_pair(cx.rng);

    vec![SpawnSpec {
        at: 0.0,
        content: block,
        font,
        color,
        opacity: 1.0,
        placement: Placement::OffEdge { x, below: upward },
        motion: MotionModel::Scroll(ScrollMotion {
            upward,
            min_speed: 2.3 * h,
            pair,
        }),
    }]
}
