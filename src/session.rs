// session.rs - Run/sweep bookkeeping driven one tick at a time

use tracing::{debug, info, warn};

use crate::config::{Config, RunSpeed};
use crate::error::Result;
use crate::metropolis::{Ising, SweepInfo};
use crate::rng::RandomSource;
use crate::sink::{ObservableSink, Observation};

/// Counters advanced by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    /// Sweeps completed in the current run.
    pub num_sweeps: usize,
    /// Completed runs.
    pub num_runs:   usize,
    /// Seed of the current run.
    pub seed:       u64,
    pub active:     bool,
}

impl RunState {
    fn new(seed: u64) -> Self {
        Self { num_sweeps: 0, num_runs: 0, seed, active: true }
    }
}

/// Where the state machine currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// A run is about to start (no sweep done yet).
    Idle,
    Sweeping,
    /// The current run has done all its sweeps.
    RunBoundary,
    /// Paused by the driver or finished.
    Paused,
}

/// What one call to `advance` did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// The session is paused; nothing happened.
    Inactive,
    /// One observation was emitted and one sweep performed.
    Swept { observation: Observation, sweep: SweepInfo },
    /// The next run will start on the following tick with this seed.
    NextRun { seed: u64 },
    /// All runs are done; the session is now paused for good.
    Finished,
}

/// One simulation: lattice, counters, random source and observable sink.
pub struct Session<S, R> {
    ising:      Ising,
    state:      RunState,
    sink:       S,
    rng:        R,
    beta:       f64,
    seed:       u64,
    end_sweeps: usize,
    end_runs:   usize,
    run_speed:  RunSpeed,
    finished:   bool,
}

impl<S: ObservableSink, R: RandomSource> Session<S, R> {
    pub fn new(cfg: &Config, sink: S, rng: R) -> Result<Self> {
        cfg.validate()?;
        info!(
            grid_size = cfg.grid_size,
            beta = cfg.beta,
            seed = cfg.seed,
            end_sweeps = cfg.end_sweeps,
            end_runs = cfg.end_runs,
            "creating system"
        );
        Ok(Self {
            ising:      Ising::new(cfg.grid_size, cfg.beta)?,
            state:      RunState::new(cfg.seed),
            sink,
            rng,
            beta:       cfg.beta,
            seed:       cfg.seed,
            end_sweeps: cfg.end_sweeps,
            end_runs:   cfg.end_runs,
            run_speed:  cfg.run_speed,
            finished:   false,
        })
    }

    pub fn ising(&self) -> &Ising {
        &self.ising
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn end_sweeps(&self) -> usize {
        self.end_sweeps
    }

    pub fn end_runs(&self) -> usize {
        self.end_runs
    }

    pub fn phase(&self) -> Phase {
        if !self.state.active || self.finished {
            Phase::Paused
        } else if self.state.num_sweeps == 0 {
            Phase::Idle
        } else if self.state.num_sweeps < self.end_sweeps {
            Phase::Sweeping
        } else {
            Phase::RunBoundary
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn pause(&mut self) {
        self.state.active = false;
    }

    /// Resume after `pause`. A finished session stays paused.
    pub fn resume(&mut self) {
        if self.finished {
            debug!("all runs done, not resuming");
            return;
        }
        self.state.active = true;
    }

    pub fn toggle_pause(&mut self) {
        if self.state.active {
            self.pause();
        } else {
            self.resume();
        }
    }

    pub fn run_speed(&self) -> RunSpeed {
        self.run_speed
    }

    pub fn toggle_run_speed(&mut self) -> RunSpeed {
        self.run_speed = self.run_speed.toggled();
        self.run_speed
    }

    /// Change the temperature of the running system. `reset` restores the
    /// configured β.
    pub fn set_temperature(&mut self, t: f64) -> Result<()> {
        self.ising.set_temperature(t)?;
        info!(temperature = t, beta = self.ising.beta(), "temperature changed");
        Ok(())
    }

    /// Spins to -1, β and seed to their configured values, counters to zero.
    pub fn reset(&mut self) -> Result<()> {
        self.ising.reset(self.beta)?;
        self.state = RunState::new(self.seed);
        self.finished = false;
        info!(seed = self.seed, "system reset");
        Ok(())
    }

    /// Driver hook, called once per frame.
    pub fn update(&mut self) -> Tick {
        self.advance()
    }

    /// One step of the run/sweep state machine.
    pub fn advance(&mut self) -> Tick {
        if !self.state.active || self.finished {
            return Tick::Inactive;
        }

        if self.state.num_sweeps == 0 && self.state.num_runs < self.end_runs {
            self.start_run();
        }

        if self.state.num_sweeps < self.end_sweeps {
            // Record the lattice as it is before this sweep.
            let observation = Observation {
                sweep: self.state.num_sweeps,
                magnetisation: self.ising.magnetisation(),
                seed: self.state.seed,
            };
            if let Err(e) = self.sink.append_row(&observation) {
                warn!(error = %e, sweep = observation.sweep, "dropping observation");
            }

            let sweep = self.ising.sweep(&mut self.rng);
            self.state.num_sweeps += 1;
            debug!(
                sweep = observation.sweep,
                magnetisation = observation.magnetisation,
                accepted = sweep.accepted,
                "sweep done"
            );

            if self.state.num_sweeps == self.end_sweeps {
                self.state.num_runs += 1;
                info!(
                    run = self.state.num_runs,
                    seed = self.state.seed,
                    magnetisation = self.ising.magnetisation(),
                    energy = self.ising.energy_per_spin(),
                    "run complete"
                );
            }
            Tick::Swept { observation, sweep }
        } else if self.state.num_runs < self.end_runs {
            self.state.seed = self.state.seed.wrapping_add(1);
            self.state.num_sweeps = 0;
            Tick::NextRun { seed: self.state.seed }
        } else {
            self.finished = true;
            self.state.active = false;
            info!(runs = self.state.num_runs, "all runs done, pausing");
            Tick::Finished
        }
    }

    fn start_run(&mut self) {
        let seed = self.state.seed;
        self.rng.reseed(seed);
        if let Err(e) = self.sink.write_header(seed) {
            warn!(error = %e, seed, "could not start observable series");
        }
        info!(file = %self.sink.destination(seed), "initial file name");
    }
}
