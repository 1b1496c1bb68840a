//! Plain value types shared by the motion models and the surfaces.
//!
//! Coordinates are surface points with the origin at the top-left corner and
//! `y` growing downward.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn min_x(&self) -> f32 {
        self.origin.x
    }

    pub fn min_y(&self) -> f32 {
        self.origin.y
    }

    pub fn max_x(&self) -> f32 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f32 {
        self.origin.y + self.size.height
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn mid_x(&self) -> f32 {
        self.origin.x + self.size.width * 0.5
    }

    pub fn mid_y(&self) -> f32 {
        self.origin.y + self.size.height * 0.5
    }

    /// A rect that cannot host any motion: zero or negative extent, or NaN/inf anywhere.
    pub fn is_degenerate(&self) -> bool {
        !(self.origin.x.is_finite()
            && self.origin.y.is_finite()
            && self.size.width.is_finite()
            && self.size.height.is_finite())
            || self.size.width <= 0.0
            || self.size.height <= 0.0
    }

    /// Strict overlap test; touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min_x() < other.max_x()
            && self.max_x() > other.min_x()
            && self.min_y() < other.max_y()
            && self.max_y() > other.min_y()
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.origin.x + dx, self.origin.y + dy, self.size.width, self.size.height)
    }
}

/// Affine pose applied on top of an entity's resting frame.
///
/// Translation is in surface points; rotation (radians) and scale pivot around the frame centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub tx: f32,
    pub ty: f32,
    pub rotation: f32,
    pub sx: f32,
    pub sy: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        tx: 0.0,
        ty: 0.0,
        rotation: 0.0,
        sx: 1.0,
        sy: 1.0,
    };

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self {
            tx,
            ty,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.sx = scale;
        self.sy = scale;
        self
    }

    /// Axis-aligned footprint of `frame` after this transform (rotation is ignored).
    pub fn apply_to(&self, frame: &Rect) -> Rect {
        let w = frame.width() * self.sx.abs();
        let h = frame.height() * self.sy.abs();
        let cx = frame.mid_x() + self.tx;
        let cy = frame.mid_y() + self.ty;
        Rect::new(cx - w * 0.5, cy - h * 0.5, w, h)
    }
}
