// lattice.rs - N×N spin grid with periodic boundary conditions

use crate::error::{IsingError, Result};

/// A single Ising spin, always -1 or +1.
pub type Spin = i8;

pub const SPIN_DOWN: Spin = -1;
pub const SPIN_UP: Spin = 1;

/// A lattice site. Both components lie in `[0, N)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    #[inline(always)]
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// One step on the square lattice. The discriminants are the direction
/// indices 0..4 used by `neighbour_of`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    PlusX = 0,
    MinusX = 1,
    PlusY = 2,
    MinusY = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::PlusX,
        Direction::MinusX,
        Direction::PlusY,
        Direction::MinusY,
    ];

    /// Direction for index 0..4, `None` otherwise.
    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }
}

/// Square grid of spins stored row-major in one buffer (`x * N + y`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lattice {
    n: usize,
    spins: Vec<Spin>,
}

impl Lattice {
    /// Build an N×N lattice with every spin down.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(IsingError::invalid("grid size must be at least 1"));
        }
        let cells = n
            .checked_mul(n)
            .ok_or_else(|| IsingError::invalid(format!("grid size {n} overflows")))?;
        Ok(Self {
            n,
            spins: vec![SPIN_DOWN; cells],
        })
    }

    /// Side length N.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.n
    }

    /// Number of spins, N².
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.spins.len()
    }

    /// Always false; a lattice holds at least one spin.
    pub fn is_empty(&self) -> bool {
        self.spins.is_empty()
    }

    #[inline(always)]
    fn index(&self, pos: Pos) -> usize {
        debug_assert!(pos.x < self.n && pos.y < self.n, "{pos:?} outside {}x{}", self.n, self.n);
        pos.x * self.n + pos.y
    }

    #[inline(always)]
    pub fn get(&self, pos: Pos) -> Spin {
        self.spins[self.index(pos)]
    }

    /// Overwrite a spin. `value` must be ±1.
    #[inline(always)]
    pub fn set(&mut self, pos: Pos, value: Spin) {
        debug_assert!(value == SPIN_UP || value == SPIN_DOWN, "spin {value} is not ±1");
        let idx = self.index(pos);
        self.spins[idx] = value;
    }

    #[inline(always)]
    pub fn flip(&mut self, pos: Pos) {
        let idx = self.index(pos);
        self.spins[idx] = -self.spins[idx];
    }

    /// Neighbour one cell away in `dir`, wrapping around the torus.
    #[inline(always)]
    pub fn neighbour_of(&self, pos: Pos, dir: Direction) -> Pos {
        let n = self.n;
        match dir {
            Direction::PlusX => Pos::new((pos.x + 1) % n, pos.y),
            Direction::MinusX => Pos::new((pos.x + n - 1) % n, pos.y),
            Direction::PlusY => Pos::new(pos.x, (pos.y + 1) % n),
            Direction::MinusY => Pos::new(pos.x, (pos.y + n - 1) % n),
        }
    }

    /// The four von Neumann neighbours in `Direction::ALL` order.
    pub fn neighbours(&self, pos: Pos) -> [Pos; 4] {
        Direction::ALL.map(|dir| self.neighbour_of(pos, dir))
    }

    pub fn fill(&mut self, value: Spin) {
        debug_assert!(value == SPIN_UP || value == SPIN_DOWN, "spin {value} is not ±1");
        self.spins.iter_mut().for_each(|s| *s = value);
    }

    /// All spins down.
    pub fn reset(&mut self) {
        self.fill(SPIN_DOWN);
    }

    /// Σ s over the whole lattice.
    pub fn spin_sum(&self) -> i64 {
        self.spins.iter().map(|&s| s as i64).sum()
    }

    /// Iterate over `(site, spin)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Pos, Spin)> + '_ {
        let n = self.n;
        self.spins
            .iter()
            .enumerate()
            .map(move |(i, &s)| (Pos::new(i / n, i % n), s))
    }
}
