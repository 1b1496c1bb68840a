use crate::geometry::Rect;
use crate::palette::Rgb;
use crate::pool::{EntityId, GlyphPool};
use crate::surface::{ContainerId, ContainerSet, PresentationSurface, SurfaceError};
use anyhow::Context;
use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
    ExecutableCommand,
};
use std::io::{stdout, Stdout, Write};

/// Logical points covered by one terminal cell.
pub const CELL_WIDTH_PT: f32 = 10.0;
pub const CELL_HEIGHT_PT: f32 = 20.0;

/// Glyphs dimmer than this are not drawn at all.
const MIN_VISIBLE_OPACITY: f32 = 0.02;

pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn new() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        // Create the guard immediately so Drop will disable raw mode if
        // any subsequent setup step fails.
        let guard = Self { _private: () };

        let mut out = stdout();
        out.execute(terminal::EnterAlternateScreen)
            .context("enter alternate screen")?;
        out.execute(terminal::Clear(ClearType::All))
            .context("clear screen")?;
        out.execute(cursor::Hide).context("hide cursor")?;

        Ok(guard)
    }

    pub fn stdout() -> Stdout {
        stdout()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let mut out = stdout();
        let _ = out.execute(ResetColor);
        let _ = out.flush();
        let _ = out.execute(cursor::Show);
        let _ = out.execute(terminal::LeaveAlternateScreen);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Cell {
    ch: char,
    color: Rgb,
}

/// Rasterises entities onto a character grid, one glyph per cell.
///
/// Rotation is not representable in a cell grid and is ignored; scale spreads glyphs apart.
pub struct TerminalSurface<W: Write> {
    out: W,
    cols: u16,
    rows: u16,
    max_opacity: f32,
    containers: ContainerSet,
    cells: Vec<Option<Cell>>,
    torn_down: bool,
    sync_updates: bool,
}

impl TerminalSurface<Stdout> {
    pub fn stdout(max_opacity: f32, sync_updates: bool) -> anyhow::Result<Self> {
        let (cols, rows) = terminal::size().context("get terminal size")?;
        Ok(Self::new(TerminalGuard::stdout(), cols, rows, max_opacity, sync_updates))
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, cols: u16, rows: u16, max_opacity: f32, sync_updates: bool) -> Self {
        Self {
            out,
            cols,
            rows,
            max_opacity: max_opacity.clamp(0.0, 1.0),
            containers: ContainerSet::default(),
            cells: vec![None; cols as usize * rows as usize],
            torn_down: false,
            sync_updates,
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.cells = vec![None; cols as usize * rows as usize];
    }

    pub fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn ensure_live(&self) -> Result<(), SurfaceError> {
        if self.torn_down {
            Err(SurfaceError::Unavailable)
        } else {
            Ok(())
        }
    }

    fn rasterise(&mut self, pool: &GlyphPool) {
        self.cells.iter_mut().for_each(|c| *c = None);
        let cols = self.cols as i64;
        let rows = self.rows as i64;
        let ids: Vec<EntityId> = self.containers.iter_entities().collect();
        for id in ids {
            let Some(entity) = pool.get(id) else {
                continue;
            };
            let alpha = entity.opacity * self.max_opacity;
            if alpha < MIN_VISIBLE_OPACITY {
                continue;
            }
            let color = entity.color.dimmed(alpha);
            let frame = entity.visible_frame();
            let advance = entity.font.advance() * entity.transform.sx.abs();
            let line_height = entity.font.line_height() * entity.transform.sy.abs();

            for (li, line) in entity.content.split('\n').enumerate() {
                let row = ((frame.min_y() + li as f32 * line_height) / CELL_HEIGHT_PT).floor();
                if !row.is_finite() || row < 0.0 || row as i64 >= rows {
                    continue;
                }
                for (ci, ch) in line.chars().enumerate() {
                    if ch.is_whitespace() {
                        continue;
                    }
                    let col = ((frame.min_x() + ci as f32 * advance) / CELL_WIDTH_PT).floor();
                    if !col.is_finite() || col < 0.0 || col as i64 >= cols {
                        continue;
                    }
                    let idx = row as usize * self.cols as usize + col as usize;
                    self.cells[idx] = Some(Cell { ch, color });
                }
            }
        }
    }

    fn flush_cells(&mut self) -> std::io::Result<()> {
        if self.sync_updates {
            queue!(self.out, terminal::BeginSynchronizedUpdate)?;
        }
        let mut current: Option<Rgb> = None;
        for row in 0..self.rows {
            queue!(self.out, cursor::MoveTo(0, row))?;
            let start = row as usize * self.cols as usize;
            for cell in &self.cells[start..start + self.cols as usize] {
                match cell {
                    Some(Cell { ch, color }) => {
                        if current != Some(*color) {
                            let (r, g, b) = color.to_u8();
                            queue!(self.out, SetForegroundColor(Color::Rgb { r, g, b }))?;
                            current = Some(*color);
                        }
                        queue!(self.out, Print(*ch))?;
                    }
                    None => queue!(self.out, Print(' '))?,
                }
            }
        }
        queue!(self.out, ResetColor)?;
        if self.sync_updates {
            queue!(self.out, terminal::EndSynchronizedUpdate)?;
        }
        self.out.flush()
    }
}

impl<W: Write> PresentationSurface for TerminalSurface<W> {
    fn name(&self) -> &'static str {
        "terminal"
    }

    fn bounds(&self) -> Option<Rect> {
        if self.torn_down {
            return None;
        }
        Some(Rect::new(
            0.0,
            0.0,
            self.cols as f32 * CELL_WIDTH_PT,
            self.rows as f32 * CELL_HEIGHT_PT,
        ))
    }

    fn register_container(&mut self) -> Result<ContainerId, SurfaceError> {
        self.ensure_live()?;
        Ok(self.containers.register())
    }

    fn unregister_container(&mut self, container: ContainerId) -> Result<(), SurfaceError> {
        self.ensure_live()?;
        self.containers.unregister(container)
    }

    fn add_entity(&mut self, container: ContainerId, entity: EntityId) -> Result<(), SurfaceError> {
        self.ensure_live()?;
        self.containers.add(container, entity)
    }

    fn remove_entity(
        &mut self,
        container: ContainerId,
        entity: EntityId,
    ) -> Result<(), SurfaceError> {
        self.ensure_live()?;
        self.containers.remove(container, entity)
    }

    fn present(&mut self, pool: &GlyphPool) -> Result<(), SurfaceError> {
        self.ensure_live()?;
        self.rasterise(pool);
        if let Err(err) = self.flush_cells() {
            self.torn_down = true;
            self.containers.clear();
            return Err(SurfaceError::Io(err.to_string()));
        }
        Ok(())
    }
}
