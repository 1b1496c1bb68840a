use super::{
    fade_in, perspective, uniform, MotionEnv, MotionModel, PlanCtx, Placement, Pose, SpawnSpec,
};
use crate::entity::Font;
use crate::geometry::{Point, Rect, Transform};
use crate::text_sampler::bounded_prefix;

const Z0: f32 = 100.0;

/// Glyphs burst out of a block of text: linear x, ballistic y, and a depth axis
/// rushing toward the viewer.
#[derive(Clone, Debug, PartialEq)]
pub struct ScatterMotion {
    pub vx: f32,
    pub vy: f32,
    pub vz: f32,
    pub spin: f32,
    pub gravity: f32,
    pub z0: f32,
}

impl ScatterMotion {
    pub(super) fn advance(&self, t: f32, frame: &Rect, env: &MotionEnv<'_>) -> Pose {
        let x = self.vx * t;
        let y = self.vy * t + 0.5 * self.gravity * t * t;
        let z = self.vz * t;
        let scale = perspective(self.z0, z);

        let alive = scale > 0.0 && frame.translated(x, y).intersects(&env.bounds);
        if !alive {
            return Pose::dead();
        }

        let depth_fade = ((self.z0 - z) / self.z0).clamp(0.0, 1.0);
        let transform = Transform::translation(x, y)
            .with_rotation(self.spin * t)
            .with_uniform_scale(scale);
        Pose::visible(transform, fade_in(t) * depth_fade)
    }
}

pub(super) fn plan(text: &str, bounds: Rect, cx: &mut PlanCtx<'_>) -> Vec<SpawnSpec> {
    let w = bounds.width().max(0.0);
    let h = bounds.height().max(0.0);
    let base = h / 40.0;
    let unit = h / 1080.0;
    let font = Font::monospace(base * 3.0);

    let center_x = bounds.mid_x() + uniform(cx.rng, -0.4, 0.4) * w;
    let center_y = bounds.mid_y() + uniform(cx.rng, -0.2, 0.2) * h;
    let left = center_x - 0.14 * h;
    let right = center_x + 0.14 * h;
    let top = center_y - 0.2 * h;
    let bottom = center_y + 0.2 * h;
    let pair = cx.palette.random_pair(cx.rng);

    let mut out = Vec::new();
    let mut cur_x = left;
    let mut cur_y = top;
    for ch in bounded_prefix(text, cx.tuning.scatter_char_limit).chars() {
        if !ch.is_whitespace() {
            let motion = ScatterMotion {
                vx: 10.0 * (cur_x - center_x) + uniform(cx.rng, -10.0, 10.0) * unit,
                vy: 10.0 * (cur_y - center_y) + uniform(cx.rng, -10.0, 10.0) * unit,
                vz: uniform(cx.rng, 80.0, 100.0),
                spin: uniform(cx.rng, -10.0, 10.0),
                gravity: 500.0 * 9.8 * unit,
                z0: Z0,
            };
            out.push(SpawnSpec {
                at: 0.0,
                content: ch.to_string(),
                font,
                color: cx.palette.gradient((cur_y - top) / (bottom - top), pair),
                opacity: 0.0,
                placement: Placement::TopLeft(Point::new(cur_x, cur_y)),
                motion: MotionModel::Scatter(motion),
            });
        }
        cur_x += base * 0.5;
        if cur_x >= right || ch == '\n' {
            cur_x = left;
            cur_y += base;
        }
        if cur_y >= bottom {
            break;
        }
    }
    out
}
