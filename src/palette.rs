use fastrand::Rng;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    pub fn to_u8(self) -> (u8, u8, u8) {
        fn ch(v: f32) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        (ch(self.r), ch(self.g), ch(self.b))
    }

    /// Blend toward black by `opacity`, used where the target cannot composite alpha.
    pub fn dimmed(self, opacity: f32) -> Self {
        let a = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 0.0 };
        Self::new(self.r * a, self.g * a, self.b * a)
    }
}

/// Two distinct palette indices that colour a whole run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GradientPair {
    pub start: usize,
    pub end: usize,
}

pub const MIN_COLORS: usize = 8;

const DEFAULT_COLORS: [Rgb; 10] = [
    Rgb::from_u8(242, 101, 127),
    Rgb::from_u8(239, 101, 242),
    Rgb::from_u8(12, 4, 242),
    Rgb::from_u8(4, 216, 138),
    Rgb::from_u8(242, 226, 4),
    Rgb::from_u8(216, 58, 87),
    Rgb::from_u8(242, 140, 159),
    Rgb::from_u8(4, 104, 165),
    Rgb::from_u8(3, 119, 165),
    Rgb::from_u8(216, 119, 97),
];

#[derive(Clone, Debug)]
pub struct ColorPalette {
    colors: Vec<Rgb>,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS.to_vec(),
        }
    }
}

impl ColorPalette {
    /// Custom palettes hold at least `MIN_COLORS` entries, like the default one.
    pub fn with_colors(colors: Vec<Rgb>) -> Option<Self> {
        if colors.len() < MIN_COLORS {
            return None;
        }
        Some(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color(&self, index: usize) -> Option<Rgb> {
        self.colors.get(index).copied()
    }

    pub fn random_pair(&self, rng: &mut Rng) -> GradientPair {
        let n = self.colors.len();
        let start = rng.usize(..n);
        let mut end = rng.usize(..n);
        while end == start {
            end = rng.usize(..n);
        }
        GradientPair { start, end }
    }

    pub fn random_color(&self, rng: &mut Rng) -> Rgb {
        self.colors[rng.usize(..self.colors.len())]
    }

    /// Linear blend between the pair's endpoints; `ratio` is clamped to `[0, 1]` and NaN maps to 0.
    pub fn gradient(&self, ratio: f32, pair: GradientPair) -> Rgb {
        let a = self.colors[pair.start % self.colors.len()];
        let b = self.colors[pair.end % self.colors.len()];
        let t = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
        if t == 0.0 {
            return a;
        }
        if t == 1.0 {
            return b;
        }
        Rgb::new(
            a.r + (b.r - a.r) * t,
            a.g + (b.g - a.g) * t,
            a.b + (b.b - a.b) * t,
        )
    }
}
