//! Run/sweep state machine: ticks, records, run boundaries and pausing.

use ising::config::{Config, RunSpeed};
use ising::error::{IsingError, Result};
use ising::rng::RngSource;
use ising::session::{Phase, Session, Tick};
use ising::sink::{MemorySink, ObservableSink, Observation};

use rand_pcg::Pcg64;

type TestSession = Session<MemorySink, RngSource<Pcg64>>;

fn session(cfg: &Config) -> TestSession {
    Session::new(cfg, MemorySink::new(), RngSource::seeded(cfg.seed)).unwrap()
}

fn small(end_sweeps: usize, end_runs: usize, seed: u64) -> Config {
    Config {
        grid_size: 8,
        beta: 0.3,
        seed,
        end_sweeps,
        end_runs,
        ..Config::default()
    }
}

#[test]
fn test_ten_sweeps_then_pause() {
    let cfg = small(10, 1, 5);
    let mut s = session(&cfg);
    assert_eq!(s.phase(), Phase::Idle);

    for k in 0..10 {
        match s.advance() {
            Tick::Swept { observation, sweep } => {
                assert_eq!(observation.sweep, k);
                assert_eq!(observation.seed, 5);
                assert_eq!(sweep.attempts, 64);
            }
            other => panic!("tick {k}: expected a sweep, got {other:?}"),
        }
        assert_eq!(s.run_state().num_sweeps, k + 1);
    }
    assert_eq!(s.phase(), Phase::RunBoundary);
    assert_eq!(s.run_state().num_runs, 1);
    assert_eq!(s.sink().rows.len(), 10);

    assert_eq!(s.advance(), Tick::Finished);
    assert!(s.is_finished());
    assert!(!s.is_active());
    assert_eq!(s.phase(), Phase::Paused);

    // Nothing more happens once finished.
    let lattice = s.ising().lattice().clone();
    for _ in 0..5 {
        assert_eq!(s.advance(), Tick::Inactive);
    }
    assert_eq!(s.sink().rows.len(), 10);
    assert_eq!(s.sink().headers, vec![5]);
    assert_eq!(s.ising().lattice(), &lattice);
    assert_eq!(s.run_state().num_sweeps, 10);
}

#[test]
fn test_records_are_taken_before_each_sweep() {
    let cfg = small(6, 1, 1);
    let mut s = session(&cfg);
    let n2 = (cfg.grid_size * cfg.grid_size) as f64;

    let mut after_previous = None;
    for _ in 0..6 {
        let Tick::Swept { observation, .. } = s.advance() else {
            panic!("expected a sweep");
        };
        match after_previous {
            None => assert_eq!(observation.magnetisation, -1.0),
            Some(m) => assert_eq!(observation.magnetisation, m),
        }
        after_previous = Some(s.ising().lattice().spin_sum() as f64 / n2);
    }
}

#[test]
fn test_two_runs_increment_the_seed() {
    let cfg = small(4, 2, 20);
    let mut s = session(&cfg);

    let ticks: Vec<Tick> = (0..11).map(|_| s.advance()).collect();
    assert!(ticks[..4].iter().all(|t| matches!(t, Tick::Swept { .. })));
    assert_eq!(ticks[4], Tick::NextRun { seed: 21 });
    assert!(ticks[5..9].iter().all(|t| matches!(t, Tick::Swept { .. })));
    assert_eq!(ticks[9], Tick::Finished);
    assert_eq!(ticks[10], Tick::Inactive);

    let sink = s.sink();
    assert_eq!(sink.headers, vec![20, 21]);
    assert_eq!(sink.series(20).count(), 4);
    assert_eq!(sink.series(21).count(), 4);
    let sweeps: Vec<usize> = sink.series(21).map(|o| o.sweep).collect();
    assert_eq!(sweeps, vec![0, 1, 2, 3]);
    assert_eq!(s.run_state().num_runs, 2);
}

#[test]
fn test_counters_stay_within_limits() {
    let cfg = small(3, 3, 0);
    let mut s = session(&cfg);
    for _ in 0..50 {
        s.advance();
        let st = s.run_state();
        assert!(st.num_sweeps <= cfg.end_sweeps);
        assert!(st.num_runs <= cfg.end_runs);
    }
    assert!(s.is_finished());
    assert_eq!(s.sink().rows.len(), 9);
}

#[test]
fn test_same_seed_reproduces_the_series() {
    let cfg = small(8, 2, 77);
    let mut a = session(&cfg);
    let mut b = session(&cfg);
    while !a.is_finished() {
        a.advance();
    }
    while !b.is_finished() {
        b.advance();
    }
    assert_eq!(a.sink().rows, b.sink().rows);
}

#[test]
fn test_pause_and_resume() {
    let cfg = small(5, 1, 2);
    let mut s = session(&cfg);
    s.advance();
    s.pause();
    assert_eq!(s.phase(), Phase::Paused);
    assert_eq!(s.advance(), Tick::Inactive);
    assert_eq!(s.run_state().num_sweeps, 1);

    s.toggle_pause();
    assert!(s.is_active());
    assert_eq!(s.phase(), Phase::Sweeping);
    assert!(matches!(s.update(), Tick::Swept { .. }));
    assert_eq!(s.run_state().num_sweeps, 2);
}

#[test]
fn test_finished_session_does_not_resume() {
    let cfg = small(1, 1, 0);
    let mut s = session(&cfg);
    s.advance();
    assert_eq!(s.advance(), Tick::Finished);
    s.resume();
    assert!(!s.is_active());
    assert_eq!(s.advance(), Tick::Inactive);
}

#[test]
fn test_reset_restores_lattice_counters_and_temperature() {
    let cfg = small(3, 1, 9);
    let mut s = session(&cfg);
    s.set_temperature(1.0).unwrap();
    while !s.is_finished() {
        s.advance();
    }
    s.reset().unwrap();

    let st = s.run_state();
    assert_eq!((st.num_sweeps, st.num_runs, st.seed), (0, 0, 9));
    assert!(s.is_active());
    assert!(!s.is_finished());
    assert_eq!(s.ising().beta(), 0.3);
    assert_eq!(s.ising().lattice().spin_sum(), -64);

    // A fresh run starts over and rewrites the header.
    assert!(matches!(s.advance(), Tick::Swept { .. }));
    assert_eq!(s.sink().headers, vec![9, 9]);
    assert_eq!(s.sink().series(9).count(), 1);
}

#[test]
fn test_run_speed_toggles_and_survives_reset() {
    let cfg = small(2, 1, 0);
    let mut s = session(&cfg);
    assert_eq!(s.run_speed(), RunSpeed::Slow);

    assert_eq!(s.toggle_run_speed(), RunSpeed::Fast);
    assert_eq!(s.run_speed(), RunSpeed::Fast);

    s.advance();
    s.reset().unwrap();
    assert_eq!(s.run_speed(), RunSpeed::Fast);

    assert_eq!(s.toggle_run_speed(), RunSpeed::Slow);
    assert_eq!(s.run_speed(), RunSpeed::Slow);
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let bad = [
        Config { grid_size: 0, ..small(1, 1, 0) },
        Config { beta: f64::NAN, ..small(1, 1, 0) },
        small(0, 1, 0),
        small(1, 0, 0),
    ];
    for cfg in &bad {
        let res = Session::new(cfg, MemorySink::new(), RngSource::<Pcg64>::seeded(0));
        assert!(matches!(res, Err(IsingError::ConfigurationInvalid(_))));
    }
}

#[test]
fn test_bad_temperature_leaves_session_untouched() {
    let cfg = small(2, 1, 0);
    let mut s = session(&cfg);
    assert!(s.set_temperature(-2.0).is_err());
    assert_eq!(s.ising().beta(), 0.3);
}

/// A sink that refuses everything.
struct Broken {
    attempts: usize,
}

impl ObservableSink for Broken {
    fn write_header(&mut self, _seed: u64) -> Result<()> {
        self.attempts += 1;
        Err(IsingError::SinkUnavailable {
            path: "nowhere.csv".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        })
    }
    fn append_row(&mut self, _obs: &Observation) -> Result<()> {
        self.attempts += 1;
        Err(IsingError::SinkUnavailable {
            path: "nowhere.csv".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        })
    }
    fn destination(&self, seed: u64) -> String {
        format!("nowhere{seed}.csv")
    }
}

#[test]
fn test_unavailable_sink_does_not_stop_the_run() {
    let cfg = small(4, 1, 0);
    let mut s = Session::new(&cfg, Broken { attempts: 0 }, RngSource::<Pcg64>::seeded(0)).unwrap();
    let swept = (0..4).filter(|_| matches!(s.advance(), Tick::Swept { .. })).count();
    assert_eq!(swept, 4);
    assert_eq!(s.advance(), Tick::Finished);
    assert_eq!(s.sink().attempts, 1 + 4);
}

#[test]
fn test_borrowed_sink_outlives_the_session() {
    let cfg = small(3, 1, 4);
    let mut sink = MemorySink::new();
    {
        let mut s = Session::new(&cfg, &mut sink, RngSource::<Pcg64>::seeded(cfg.seed)).unwrap();
        while !s.is_finished() {
            s.advance();
        }
    }
    assert_eq!(sink.headers, vec![4]);
    assert_eq!(sink.series(4).count(), 3);
}
