// metropolis.rs - Single-spin-flip Metropolis dynamics on the Ising lattice

use crate::error::{IsingError, Result};
use crate::lattice::{Direction, Lattice, Pos};
use crate::rng::RandomSource;

/// Returned by `attempt_flip`, mostly for tests and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipInfo {
    pub pos: Pos,
    /// Energy change in units of k_B T that the flip would cause.
    pub delta_e: f64,
    pub accepted: bool,
}

/// Counts for one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepInfo {
    pub attempts: usize,
    pub accepted: usize,
}

impl SweepInfo {
    pub fn acceptance_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.accepted as f64 / self.attempts as f64
        }
    }
}

/// Check that β is usable in the acceptance test.
pub fn validate_beta(beta: f64) -> Result<()> {
    if !beta.is_finite() || beta < 0.0 {
        return Err(IsingError::invalid(format!(
            "inverse temperature must be finite and non-negative, got {beta}"
        )));
    }
    Ok(())
}

/// β for a temperature `t` (k_B = J = 1).
pub fn beta_from_temperature(t: f64) -> Result<f64> {
    if !t.is_finite() || t <= 0.0 {
        return Err(IsingError::invalid(format!(
            "temperature must be finite and positive, got {t}"
        )));
    }
    Ok(1.0 / t)
}

/// Ising model with unit ferromagnetic coupling at inverse temperature β.
#[derive(Debug, Clone)]
pub struct Ising {
    lattice: Lattice,
    beta: f64,
    last_m: Option<f64>,
}

impl Ising {
    /// All spins down on an N×N torus.
    pub fn new(n: usize, beta: f64) -> Result<Self> {
        validate_beta(beta)?;
        Ok(Self {
            lattice: Lattice::new(n)?,
            beta,
            last_m: None,
        })
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.lattice.size()
    }

    #[inline(always)]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn lattice_mut(&mut self) -> &mut Lattice {
        &mut self.lattice
    }

    pub fn set_beta(&mut self, beta: f64) -> Result<()> {
        validate_beta(beta)?;
        self.beta = beta;
        Ok(())
    }

    pub fn temperature(&self) -> f64 {
        1.0 / self.beta
    }

    pub fn set_temperature(&mut self, t: f64) -> Result<()> {
        self.beta = beta_from_temperature(t)?;
        Ok(())
    }

    /// Spins back to -1 and β to `beta`.
    pub fn reset(&mut self, beta: f64) -> Result<()> {
        self.set_beta(beta)?;
        self.lattice.reset();
        self.last_m = None;
        Ok(())
    }

    /// β Σ s_nbr over the four neighbours of `pos`.
    ///
    /// This is the local field already divided by k_B T, so it goes straight
    /// into the acceptance test.
    pub fn local_field(&self, pos: Pos) -> f64 {
        let sum: i32 = Direction::ALL
            .iter()
            .map(|&dir| self.lattice.get(self.lattice.neighbour_of(pos, dir)) as i32)
            .sum();
        self.beta * sum as f64
    }

    /// Pick a random site and apply the Metropolis rule to it.
    pub fn attempt_flip(&mut self, rng: &mut impl RandomSource) -> FlipInfo {
        let n = self.lattice.size();
        let x = rng.random_int(n);
        let y = rng.random_int(n);
        let pos = Pos::new(x, y);

        let delta_e = 2.0 * self.local_field(pos) * self.lattice.get(pos) as f64;
        // Strict `<`: zero-cost moves are always accepted since u ∈ [0, 1).
        let accepted = if delta_e < 0.0 {
            true
        } else {
            rng.random01() < (-delta_e).exp()
        };
        if accepted {
            self.lattice.flip(pos);
        }
        FlipInfo { pos, delta_e, accepted }
    }

    /// N² independent flip attempts. Sites are drawn with replacement.
    pub fn sweep(&mut self, rng: &mut impl RandomSource) -> SweepInfo {
        let attempts = self.lattice.len();
        let mut accepted = 0;
        for _ in 0..attempts {
            if self.attempt_flip(rng).accepted {
                accepted += 1;
            }
        }
        SweepInfo { attempts, accepted }
    }

    /// Mean spin, in [-1, 1]. The value is cached for display.
    pub fn magnetisation(&mut self) -> f64 {
        let m = self.lattice.spin_sum() as f64 / self.lattice.len() as f64;
        self.last_m = Some(m);
        m
    }

    /// Last value returned by `magnetisation`, if any since the last reset.
    pub fn last_magnetisation(&self) -> Option<f64> {
        self.last_m
    }

    /// -Σ s_i s_j / N² with each bond counted once.
    pub fn energy_per_spin(&self) -> f64 {
        let bonds: i64 = self
            .lattice
            .iter()
            .map(|(pos, s)| {
                let right = self.lattice.get(self.lattice.neighbour_of(pos, Direction::PlusX));
                let up = self.lattice.get(self.lattice.neighbour_of(pos, Direction::PlusY));
                (s as i64) * (right as i64 + up as i64)
            })
            .sum();
        -(bonds as f64) / self.lattice.len() as f64
    }
}
