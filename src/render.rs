// render.rs - Drawing the lattice onto a driver-owned surface

use crate::lattice::{Spin, SPIN_DOWN};
use crate::metropolis::Ising;

/// RGBA colour with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Colour {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// 8-bit RGB, alpha dropped.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b))
    }
}

pub mod colours {
    use super::Colour;

    pub const BLUE:  Colour = Colour::new(0.1, 0.3, 0.9, 1.0);
    pub const RED:   Colour = Colour::new(1.0, 0.2, 0.1, 0.2);
    pub const GREEN: Colour = Colour::new(0.3, 0.6, 0.3, 1.0);
}

/// Axis-aligned rectangle in normalised device coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// Whatever the driver draws on. The session never owns one.
pub trait Surface {
    fn fill_rect(&mut self, rect: Rect, colour: Colour);
    fn display_text(&mut self, text: &str, x: f64, y: f64, colour: Colour);
}

/// Where the status line sits.
pub const STATUS_POS: (f64, f64) = (-0.9, 0.94);

pub fn spin_colour(s: Spin) -> Colour {
    if s == SPIN_DOWN {
        colours::GREEN
    } else {
        colours::BLUE
    }
}

/// Square for cell `(x, y)` of an `n`-wide grid: centred on
/// `(x - n/2, y - n/2)`, half-size 0.5, scaled by `2 / (1.1 n)`.
pub fn cell_rect(x: usize, y: usize, n: usize) -> Rect {
    let draw_scale = 2.0 / (n as f64 * 1.1);
    let half_size = 0.5;
    let half_grid = (n / 2) as f64;
    let cx = x as f64 - half_grid;
    let cy = y as f64 - half_grid;
    Rect {
        x0: draw_scale * (cx - half_size),
        y0: draw_scale * (cy - half_size),
        x1: draw_scale * (cx + half_size),
        y1: draw_scale * (cy + half_size),
    }
}

pub fn status_line(ising: &Ising) -> String {
    format!("beta {} size {}", ising.beta(), ising.size())
}

/// Draw every cell and the status line.
pub fn draw_squares(ising: &Ising, surface: &mut impl Surface) {
    let n = ising.size();
    for (pos, s) in ising.lattice().iter() {
        surface.fill_rect(cell_rect(pos.x, pos.y, n), spin_colour(s));
    }
    let (x, y) = STATUS_POS;
    surface.display_text(&status_line(ising), x, y, colours::RED);
}
