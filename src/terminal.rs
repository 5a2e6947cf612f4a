// terminal.rs - crossterm surface that rasterises NDC drawing onto terminal cells

use std::io::{self, Write};

use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, EndSynchronizedUpdate, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};

use crate::render::{Colour, Rect, Surface};

const BACKGROUND: Color = Color::Rgb { r: 0, g: 0, b: 0 };

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BACKGROUND };

fn to_color(c: Colour) -> Color {
    let (r, g, b) = c.to_rgb8();
    Color::Rgb { r, g, b }
}

/// Off-screen frame of `cols × rows` terminal cells covering [-1, 1]².
pub struct TerminalSurface {
    cols:  u16,
    rows:  u16,
    cells: Vec<Cell>,
}

impl TerminalSurface {
    pub fn with_size(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![BLANK; cols as usize * rows as usize],
        }
    }

    /// Frame sized to the current terminal.
    pub fn from_terminal() -> io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        Ok(Self::with_size(cols, rows))
    }

    pub fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        if (cols, rows) != (self.cols, self.rows) {
            *self = Self::with_size(cols, rows);
        }
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = BLANK);
    }

    /// Centre of terminal cell `(col, row)` in NDC, y pointing up.
    fn cell_centre(&self, col: u16, row: u16) -> (f64, f64) {
        let x = (col as f64 + 0.5) / self.cols as f64 * 2.0 - 1.0;
        let y = 1.0 - (row as f64 + 0.5) / self.rows as f64 * 2.0;
        (x, y)
    }

    fn to_cell(&self, x: f64, y: f64) -> Option<(u16, u16)> {
        let col = ((x + 1.0) / 2.0 * self.cols as f64).floor();
        let row = ((1.0 - y) / 2.0 * self.rows as f64).floor();
        if col < 0.0 || row < 0.0 || col >= self.cols as f64 || row >= self.rows as f64 {
            return None;
        }
        Some((col as u16, row as u16))
    }

    fn cell_mut(&mut self, col: u16, row: u16) -> &mut Cell {
        let idx = row as usize * self.cols as usize + col as usize;
        &mut self.cells[idx]
    }

    /// Character and background at `(col, row)`, for inspection.
    pub fn cell(&self, col: u16, row: u16) -> Option<(char, Color)> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        let c = self.cells[row as usize * self.cols as usize + col as usize];
        Some((c.ch, c.bg))
    }

    /// Write the frame to `out` in one synchronized update.
    pub fn present(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, BeginSynchronizedUpdate)?;
        for row in 0..self.rows {
            queue!(out, cursor::MoveTo(0, row))?;
            let start = row as usize * self.cols as usize;
            for c in &self.cells[start..start + self.cols as usize] {
                queue!(out, SetBackgroundColor(c.bg), SetForegroundColor(c.fg), Print(c.ch))?;
            }
        }
        queue!(out, ResetColor, EndSynchronizedUpdate)?;
        out.flush()
    }
}

impl Surface for TerminalSurface {
    fn fill_rect(&mut self, rect: Rect, colour: Colour) {
        let Some((c0, r1)) = self.to_cell(rect.x0.max(-1.0), rect.y0.max(-1.0 + 1e-9)) else {
            return;
        };
        let Some((c1, r0)) = self.to_cell(rect.x1.min(1.0 - 1e-9), rect.y1.min(1.0)) else {
            return;
        };
        let bg = to_color(colour);
        for row in r0..=r1 {
            for col in c0..=c1 {
                let (x, y) = self.cell_centre(col, row);
                if x >= rect.x0 && x < rect.x1 && y >= rect.y0 && y < rect.y1 {
                    let cell = self.cell_mut(col, row);
                    cell.bg = bg;
                    cell.ch = ' ';
                }
            }
        }
    }

    fn display_text(&mut self, text: &str, x: f64, y: f64, colour: Colour) {
        let Some((col, row)) = self.to_cell(x, y) else {
            return;
        };
        let fg = to_color(colour);
        for (i, ch) in text.chars().enumerate() {
            let c = col as usize + i;
            if c >= self.cols as usize {
                break;
            }
            let cell = self.cell_mut(c as u16, row);
            cell.ch = ch;
            cell.fg = fg;
        }
    }
}

/// Raw mode plus alternate screen for as long as it lives.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, cursor::Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), ResetColor, cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
