//! Ising model driver: live terminal view, or a headless batch run that only
//! writes the magnetisation series.
//
//  Compile & run:  `cargo run --release -- --grid-size 64 --end-sweeps 500`

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ising::config::{Config, RunSpeed};
use ising::metropolis::beta_from_temperature;
use ising::render::{colours, draw_squares, Surface};
use ising::rng::DefaultSource;
use ising::session::{Session, Tick};
use ising::sink::CsvSink;
use ising::terminal::{TerminalGuard, TerminalSurface};

/// Ticks per frame when running fast.
const FAST_TICKS_PER_FRAME: usize = 20;
/// Temperature step for the `+` / `-` keys.
const TEMPERATURE_STEP: f64 = 0.1;

#[derive(Parser, Debug)]
#[command(name = "ising", about = "2D Ising model, Metropolis dynamics")]
struct Cli {
    /// Lattice side length N
    #[arg(long, default_value = "40")]
    grid_size: usize,

    /// Inverse temperature β
    #[arg(long, conflicts_with = "temperature")]
    beta: Option<f64>,

    /// Temperature T = 1/β
    #[arg(long)]
    temperature: Option<f64>,

    /// Seed of the first run; later runs use seed+1, seed+2, ...
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Sweeps per run
    #[arg(long, default_value = "10")]
    end_sweeps: usize,

    /// Number of runs
    #[arg(long, default_value = "1")]
    end_runs: usize,

    /// Start in fast mode
    #[arg(long)]
    fast: bool,

    /// Delay between frames in slow mode, in milliseconds
    #[arg(long, default_value = "50")]
    frame_ms: u64,

    /// Directory for the CSV series
    #[arg(long, default_value = "data")]
    output_dir: PathBuf,

    /// No terminal view; run all sweeps and exit
    #[arg(long)]
    headless: bool,

    /// Log per-sweep detail
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn to_config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        let defaults = Config::default();
        let beta = match (self.beta, self.temperature) {
            (Some(b), _) => b,
            (None, Some(t)) => beta_from_temperature(t)?,
            (None, None) => defaults.beta,
        };
        let cfg = Config {
            grid_size:   self.grid_size,
            beta,
            seed:        self.seed,
            end_sweeps:  self.end_sweeps,
            end_runs:    self.end_runs,
            run_speed:   if self.fast { RunSpeed::Fast } else { RunSpeed::Slow },
            output_dir:  self.output_dir.clone(),
            frame_delay: Duration::from_millis(self.frame_ms),
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

fn init_tracing(cli: &Cli) {
    // The live view owns the screen, so only warnings get through by default.
    let level = match (cli.verbose, cli.headless) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

type IsingSession = Session<CsvSink, DefaultSource>;

fn run_headless(session: &mut IsingSession, cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let bar = ProgressBar::new(cfg.total_sweeps() as u64);
    bar.set_style(ProgressStyle::with_template(
        " {bar:40.cyan/blue} {pos}/{len} sweeps [{elapsed_precise}] {msg}",
    )?);

    loop {
        match session.advance() {
            Tick::Swept { observation, .. } => {
                bar.set_message(format!("seed {} m={:.4}", observation.seed, observation.magnetisation));
                bar.inc(1);
            }
            Tick::NextRun { seed } => info!(seed, "starting next run"),
            Tick::Finished | Tick::Inactive => break,
        }
    }
    bar.finish();

    let state = session.run_state();
    println!(
        "Simulation complete → {} run(s) of {} sweeps, series in {}",
        state.num_runs,
        session.end_sweeps(),
        cfg.output_dir.display()
    );
    Ok(())
}

fn hud_line(session: &IsingSession) -> String {
    let state = session.run_state();
    let status = if session.is_finished() {
        "done"
    } else if session.is_active() {
        "running"
    } else {
        "paused"
    };
    let speed = match session.run_speed() {
        RunSpeed::Slow => "slow",
        RunSpeed::Fast => "fast",
    };
    format!(
        "sweep {}/{} run {}/{} seed {} {} {}  [q]uit [space] pause [r]eset [s]peed [+/-] T",
        state.num_sweeps,
        session.end_sweeps(),
        state.num_runs,
        session.end_runs(),
        state.seed,
        status,
        speed,
    )
}

fn nudge_temperature(session: &mut IsingSession, delta: f64) {
    let t = session.ising().temperature() + delta;
    if let Err(e) = session.set_temperature(t) {
        warn!(error = %e, "temperature unchanged");
    }
}

fn run_interactive(session: &mut IsingSession, cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let _guard = TerminalGuard::enter()?;
    let mut surface = TerminalSurface::from_terminal()?;
    let mut stdout = io::stdout();

    loop {
        let ticks = match session.run_speed() {
            RunSpeed::Slow => 1,
            RunSpeed::Fast => FAST_TICKS_PER_FRAME,
        };
        for _ in 0..ticks {
            session.update();
        }

        surface.clear();
        draw_squares(session.ising(), &mut surface);
        surface.display_text(&hud_line(session), -0.9, -0.96, colours::RED);
        surface.present(&mut stdout)?;

        let wait = match session.run_speed() {
            RunSpeed::Slow => cfg.frame_delay,
            RunSpeed::Fast => Duration::ZERO,
        };
        if !event::poll(wait)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Char(' ') => session.toggle_pause(),
                KeyCode::Char('r') => session.reset()?,
                KeyCode::Char('s') => {
                    session.toggle_run_speed();
                }
                KeyCode::Char('+') | KeyCode::Char('=') => nudge_temperature(session, TEMPERATURE_STEP),
                KeyCode::Char('-') => nudge_temperature(session, -TEMPERATURE_STEP),
                _ => {}
            },
            Event::Resize(cols, rows) => surface.resize(cols, rows),
            _ => {}
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let cfg = cli.to_config()?;
    info!("configuration:\n{cfg:#?}");

    fs::create_dir_all(&cfg.output_dir)?;
    let sink = CsvSink::new(&cfg.output_dir);
    let rng = DefaultSource::seeded(cfg.seed);
    let mut session = Session::new(&cfg, sink, rng)?;

    if cli.headless {
        run_headless(&mut session, &cfg)
    } else {
        run_interactive(&mut session, &cfg)
    }
}
