use crate::motion::EffectStyle;
use fastrand::Rng;

/// Longest allowed streak of one style.
const MAX_STREAK: u32 = 2;

/// Picks the next style uniformly at random, but never three of the same in a row.
#[derive(Debug, Clone)]
pub struct EffectSelector {
    styles: Vec<EffectStyle>,
    last: Option<usize>,
    consecutive: u32,
}

impl Default for EffectSelector {
    fn default() -> Self {
        Self {
            styles: EffectStyle::all().to_vec(),
            last: None,
            consecutive: 0,
        }
    }
}

impl EffectSelector {
    /// `None` for an empty style list.
    pub fn with_styles(styles: Vec<EffectStyle>) -> Option<Self> {
        if styles.is_empty() {
            return None;
        }
        Some(Self {
            styles,
            last: None,
            consecutive: 0,
        })
    }

    pub fn styles(&self) -> &[EffectStyle] {
        &self.styles
    }

    pub fn last(&self) -> Option<EffectStyle> {
        self.last.map(|i| self.styles[i])
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn next_effect(&mut self, rng: &mut Rng) -> EffectStyle {
        let n = self.styles.len();
        let mut idx = rng.usize(..n);
        if Some(idx) == self.last {
            if self.consecutive >= MAX_STREAK && n > 1 {
                // Uniform over the other n - 1 styles.
                let skip = rng.usize(..n - 1);
                idx = if skip >= idx { skip + 1 } else { skip };
                self.consecutive = 1;
            } else {
                self.consecutive += 1;
            }
        } else {
            self.consecutive = 1;
        }
        self.last = Some(idx);
        self.styles[idx]
    }
}
