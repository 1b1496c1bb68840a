use code_splash::entity::Font;
use code_splash::geometry::Point;
use code_splash::palette::Rgb;
use code_splash::pool::{EntityId, GlyphPool};
use code_splash::surface::{PresentationSurface, SurfaceError};
use code_splash::terminal::{TerminalSurface, CELL_HEIGHT_PT, CELL_WIDTH_PT};
use std::io::{self, Write};

fn place(pool: &mut GlyphPool, text: &str, col: u16, row: u16, opacity: f32) -> EntityId {
    let font = Font::monospace(CELL_WIDTH_PT / 0.6);
    let id = pool.acquire(text, font, Rgb::new(1.0, 0.5, 0.0), opacity);
    if let Some(e) = pool.get_mut(id) {
        e.origin = Point::new(col as f32 * CELL_WIDTH_PT, row as f32 * CELL_HEIGHT_PT);
    }
    id
}

#[test]
fn bounds_follow_the_cell_grid() {
    let mut surface = TerminalSurface::new(Vec::new(), 80, 24, 1.0, false);
    let bounds = surface.bounds().expect("live surface");
    assert_eq!(bounds.width(), 80.0 * CELL_WIDTH_PT);
    assert_eq!(bounds.height(), 24.0 * CELL_HEIGHT_PT);

    surface.resize(100, 30);
    assert_eq!(surface.size(), (100, 30));
    assert_eq!(surface.bounds().map(|b| b.width()), Some(100.0 * CELL_WIDTH_PT));
}

#[test]
fn attached_glyphs_are_drawn_and_detached_ones_are_not() {
    let mut pool = GlyphPool::new();
    let mut surface = TerminalSurface::new(Vec::new(), 40, 10, 1.0, false);
    let container = surface.register_container().expect("register");

    let shown = place(&mut pool, "Q", 3, 2, 1.0);
    place(&mut pool, "Z", 5, 5, 1.0);
    surface.add_entity(container, shown).expect("add");
    surface.present(&pool).expect("present");

    let out = String::from_utf8_lossy(&surface.into_inner()).into_owned();
    assert!(out.contains('Q'), "glyph missing from output");
    assert!(!out.contains('Z'), "detached glyph was drawn");
}

#[test]
fn faint_glyphs_are_skipped() {
    let mut pool = GlyphPool::new();
    let mut surface = TerminalSurface::new(Vec::new(), 20, 5, 1.0, false);
    let container = surface.register_container().expect("register");
    let id = place(&mut pool, "W", 1, 1, 0.0);
    surface.add_entity(container, id).expect("add");
    surface.present(&pool).expect("present");
    assert!(!String::from_utf8_lossy(&surface.into_inner()).contains('W'));
}

#[test]
fn unknown_containers_are_rejected() {
    let mut surface = TerminalSurface::new(Vec::new(), 20, 5, 1.0, false);
    let container = surface.register_container().expect("register");
    surface.unregister_container(container).expect("unregister");
    assert_eq!(
        surface.unregister_container(container),
        Err(SurfaceError::UnknownContainer(container))
    );
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }
}

#[test]
fn write_failure_tears_the_surface_down() {
    let pool = GlyphPool::new();
    let mut surface = TerminalSurface::new(BrokenPipe, 10, 2, 1.0, true);
    assert!(matches!(surface.present(&pool), Err(SurfaceError::Io(_))));
    assert!(surface.bounds().is_none());
    assert_eq!(surface.register_container(), Err(SurfaceError::Unavailable));
}
