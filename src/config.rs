// config.rs - Run-time configuration (single source of truth)

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{IsingError, Result};
use crate::metropolis::validate_beta;

/// How the driver paces ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunSpeed {
    /// One tick per frame, with a pause between frames.
    #[default]
    Slow,
    /// As many ticks as the frame budget allows.
    Fast,
}

impl RunSpeed {
    pub fn toggled(self) -> Self {
        match self {
            RunSpeed::Slow => RunSpeed::Fast,
            RunSpeed::Fast => RunSpeed::Slow,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub grid_size:   usize,
    pub beta:        f64,
    pub seed:        u64,
    pub end_sweeps:  usize,
    pub end_runs:    usize,
    pub run_speed:   RunSpeed,
    pub output_dir:  PathBuf,
    pub frame_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_size:   40,
            beta:        1.0 / 4.0,            // T = 4
            seed:        0,
            end_sweeps:  10,
            end_runs:    1,
            run_speed:   RunSpeed::Slow,
            output_dir:  PathBuf::from("data"),
            frame_delay: Duration::from_millis(50),
        }
    }
}

impl Config {
    /// Reject settings that would give an empty lattice or a run that
    /// never does anything.
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(IsingError::invalid("grid size must be at least 1"));
        }
        validate_beta(self.beta)?;
        if self.end_sweeps == 0 {
            return Err(IsingError::invalid("end_sweeps must be at least 1"));
        }
        if self.end_runs == 0 {
            return Err(IsingError::invalid("end_runs must be at least 1"));
        }
        Ok(())
    }

    /// Total sweeps over all runs.
    pub fn total_sweeps(&self) -> usize {
        self.end_sweeps.saturating_mul(self.end_runs)
    }
}
