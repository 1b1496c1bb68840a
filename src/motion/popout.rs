use super::{
    fade_in, perspective, uniform, MotionEnv, MotionModel, PlanCtx, Placement, Pose, SpawnSpec,
};
use crate::entity::Font;
use crate::geometry::{Point, Rect, Transform};
use crate::text_sampler::{compact, random_substring};

const Z0: f32 = 100.0;
const RESTITUTION: f32 = 0.5;

/// A row of glyphs hops up, falls, bounces once off the bottom edge and drops out.
#[derive(Clone, Debug, PartialEq)]
pub struct PopOutMotion {
    pub vx: f32,
    pub vy0: f32,
    pub gravity: f32,
    pub vz: f32,
    pub z0: f32,
    pub restitution: f32,
}

impl PopOutMotion {
    pub fn new(vx: f32, vy0: f32, gravity: f32, vz: f32) -> Self {
        Self {
            vx,
            vy0,
            gravity,
            vz,
            z0: Z0,
            restitution: RESTITUTION,
        }
    }

    /// Seconds until the bottom edge first crosses the floor on the way down, if it ever does.
    pub fn bounce_time(&self, frame: &Rect, bounds: &Rect) -> Option<f32> {
        if self.gravity <= 0.0 {
            return None;
        }
        let drop = bounds.max_y() - frame.max_y();
        let disc = self.vy0 * self.vy0 + 2.0 * self.gravity * drop;
        if disc < 0.0 {
            return None;
        }
        let t = (-self.vy0 + disc.sqrt()) / self.gravity;
        (t >= 0.0).then_some(t)
    }

    /// Vertical displacement and velocity at `t`.
    pub fn vertical(&self, t: f32, frame: &Rect, bounds: &Rect) -> (f32, f32) {
        match self.bounce_time(frame, bounds) {
            Some(tb) if t > tb => {
                let drop = bounds.max_y() - frame.max_y();
                let rebound = -self.restitution * (self.vy0 + self.gravity * tb);
                let tau = t - tb;
                (
                    drop + rebound * tau + 0.5 * self.gravity * tau * tau,
                    rebound + self.gravity * tau,
                )
            }
            _ => (
                self.vy0 * t + 0.5 * self.gravity * t * t,
                self.vy0 + self.gravity * t,
            ),
        }
    }

    pub(super) fn advance(&self, t: f32, frame: &Rect, env: &MotionEnv<'_>) -> Pose {
        let bounds = &env.bounds;
        let x = self.vx * t;
        let (y, vy) = self.vertical(t, frame, bounds);
        let z = self.vz * t;
        let scale = perspective(self.z0, z);

        let moved = frame.translated(x, y);
        let in_columns = moved.min_x() < bounds.max_x() && moved.max_x() > bounds.min_x();
        let fell_out = vy > 0.0 && moved.min_y() >= bounds.max_y();
        if scale <= 0.0 || !in_columns || fell_out {
            return Pose::dead();
        }

        let depth_fade = ((self.z0 - z) / self.z0).clamp(0.0, 1.0);
        let transform = Transform::translation(x, y).with_uniform_scale(scale);
        Pose::visible(transform, fade_in(t) * depth_fade)
    }
}

pub(super) fn plan(text: &str, bounds: Rect, cx: &mut PlanCtx<'_>) -> Vec<SpawnSpec> {
    let compacted = compact(text);
    let row: Vec<char> = random_substring(compacted.trim(), cx.tuning.popout_char_limit, cx.rng)
        .chars()
        .collect();
    if row.is_empty() {
        return Vec::new();
    }

    let w = bounds.width().max(0.0);
    let h = bounds.height().max(0.0);
    // Shrink the font for long rows so the whole row starts on screen.
    let fit = w / (row.len() as f32 * 0.6 * 1.1);
    let font = Font::monospace((h / 18.0).min(fit));
    let advance = font.advance();
    let row_width = row.len() as f32 * advance;
    let start_x = bounds.mid_x() - row_width * 0.5;
    let y = bounds.mid_y() - font.line_height() * 0.5;
    let pair = cx.palette.random_pair(cx.rng);

    let mut out = Vec::new();
    let mut visible = 0usize;
    for (i, ch) in row.iter().enumerate() {
        if ch.is_whitespace() {
            continue;
        }
        let x = start_x + i as f32 * advance;
        let offset = x + advance * 0.5 - bounds.mid_x();
        let motion = PopOutMotion::new(
            1.5 * offset,
            -uniform(cx.rng, 0.9, 1.3) * h,
            2.2 * h,
            uniform(cx.rng, 10.0, 25.0),
        );
        out.push(SpawnSpec {
            at: visible as f32 * cx.tuning.popout_stagger_secs,
            content: ch.to_string(),
            font,
            color: cx.palette.gradient((x - start_x) / row_width, pair),
            opacity: 0.0,
            placement: Placement::TopLeft(Point::new(x, y)),
            motion: MotionModel::PopOut(motion),
        });
        visible += 1;
    }
    out
}
