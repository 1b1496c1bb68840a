use crate::geometry::{Point, Rect, Size, Transform};
use crate::palette::Rgb;

/// Monospace font description. Glyph metrics are derived from the point size alone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Font {
    pub size: f32,
}

impl Font {
    const ADVANCE: f32 = 0.6;
    const LINE_HEIGHT: f32 = 1.2;

    pub const fn monospace(size: f32) -> Self {
        Self { size }
    }

    pub fn advance(&self) -> f32 {
        self.size.max(0.0) * Self::ADVANCE
    }

    pub fn line_height(&self) -> f32 {
        self.size.max(0.0) * Self::LINE_HEIGHT
    }

    /// Bounding box of `content` laid out line by line, no wrapping.
    pub fn measure(&self, content: &str) -> Size {
        let mut lines = 0usize;
        let mut widest = 0usize;
        for line in content.split('\n') {
            lines += 1;
            widest = widest.max(line.chars().count());
        }
        Size::new(widest as f32 * self.advance(), lines as f32 * self.line_height())
    }
}

/// One animated unit of text, either a glyph or a block of lines.
#[derive(Clone, Debug, PartialEq)]
pub struct TextEntity {
    pub content: String,
    pub font: Font,
    pub color: Rgb,
    pub opacity: f32,
    /// Resting position of the top-left corner; motion is expressed through `transform`.
    pub origin: Point,
    pub size: Size,
    pub transform: Transform,
    pub alive: bool,
}

impl TextEntity {
    pub fn new(content: &str, font: Font, color: Rgb, opacity: f32) -> Self {
        let mut entity = Self {
            content: String::new(),
            font,
            color,
            opacity: 0.0,
            origin: Point::default(),
            size: Size::default(),
            transform: Transform::IDENTITY,
            alive: false,
        };
        entity.configure(content, font, color, opacity);
        entity
    }

    /// Overwrite every visible field in place; the content buffer is reused.
    pub fn configure(&mut self, content: &str, font: Font, color: Rgb, opacity: f32) {
        self.content.clear();
        self.content.push_str(content);
        self.font = font;
        self.color = color;
        self.opacity = opacity.clamp(0.0, 1.0);
        self.origin = Point::default();
        self.transform = Transform::IDENTITY;
        self.size = font.measure(content);
        self.alive = true;
    }

    pub fn frame(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }

    pub fn visible_frame(&self) -> Rect {
        self.transform.apply_to(&self.frame())
    }
}
