//! 2D Ising model on a periodic square lattice, evolved with single-spin-flip
//! Metropolis sweeps and reported one observation per sweep.

pub mod error;
pub mod config;
pub mod lattice;
pub mod rng;
pub mod metropolis;
pub mod sink;
pub mod session;
pub mod render;
pub mod terminal;

pub use config::{Config, RunSpeed};
pub use error::IsingError;
pub use lattice::{Direction, Lattice, Pos, Spin};
pub use metropolis::Ising;
pub use rng::{RandomSource, RngSource};
pub use session::{Session, Tick};
pub use sink::{CsvSink, MemorySink, ObservableSink, Observation};
