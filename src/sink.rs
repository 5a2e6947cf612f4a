// sink.rs - Destinations for the per-sweep observable records

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use csv::WriterBuilder;

use crate::error::{IsingError, Result};

/// Column labels of the magnetisation series.
pub const IND_VAR: &str = "sweeps";
pub const DEP_VAR: &str = "magnetisation";
pub const SEED_COLUMN: &str = "seed";

/// One row of the magnetisation series, taken before the sweep it is
/// labelled with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub sweep: usize,
    pub magnetisation: f64,
    pub seed: u64,
}

impl Observation {
    fn to_record(self) -> [String; 3] {
        [
            self.sweep.to_string(),
            self.magnetisation.to_string(),
            self.seed.to_string(),
        ]
    }
}

/// Where the session reports its observables.
pub trait ObservableSink {
    /// Start a fresh series for `seed`, discarding any earlier one.
    fn write_header(&mut self, seed: u64) -> Result<()>;

    /// Append one record to the series of `obs.seed`.
    fn append_row(&mut self, obs: &Observation) -> Result<()>;

    /// Human-readable name of the series for `seed`, used in log lines.
    fn destination(&self, seed: u64) -> String;
}

/// `file_<dep_var><seed>.csv`. `ind_var` only labels the first column.
pub fn file_name(_ind_var: &str, dep_var: &str, seed: u64) -> String {
    format!("file_{dep_var}{seed}.csv")
}

/// Writes one CSV file per seed under `dir`.
///
/// The header truncates the file; every row reopens it in append mode and
/// closes it again straight after.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Full path of the series for `seed`.
    pub fn path_for(&self, seed: u64) -> PathBuf {
        self.dir.join(file_name(IND_VAR, DEP_VAR, seed))
    }

    fn open(path: &Path, append: bool) -> Result<File> {
        let mut opts = OpenOptions::new();
        if append {
            opts.append(true);
        } else {
            opts.write(true).truncate(true);
        }
        opts.create(true)
            .open(path)
            .map_err(|source| IsingError::SinkUnavailable {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl Default for CsvSink {
    fn default() -> Self {
        Self::new("data")
    }
}

impl ObservableSink for CsvSink {
    fn write_header(&mut self, seed: u64) -> Result<()> {
        let file = Self::open(&self.path_for(seed), false)?;
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);
        wtr.write_record([IND_VAR, DEP_VAR, SEED_COLUMN])?;
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    fn append_row(&mut self, obs: &Observation) -> Result<()> {
        let file = Self::open(&self.path_for(obs.seed), true)?;
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);
        wtr.write_record(obs.to_record())?;
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    fn destination(&self, seed: u64) -> String {
        self.path_for(seed).display().to_string()
    }
}

/// Keeps every series in memory. Used for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Seeds for which a header was written, in order.
    pub headers: Vec<u64>,
    pub rows: Vec<Observation>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows belonging to `seed`.
    pub fn series(&self, seed: u64) -> impl Iterator<Item = &Observation> + '_ {
        self.rows.iter().filter(move |o| o.seed == seed)
    }
}

impl ObservableSink for MemorySink {
    fn write_header(&mut self, seed: u64) -> Result<()> {
        self.rows.retain(|o| o.seed != seed);
        self.headers.push(seed);
        Ok(())
    }

    fn append_row(&mut self, obs: &Observation) -> Result<()> {
        self.rows.push(*obs);
        Ok(())
    }

    fn destination(&self, seed: u64) -> String {
        format!("memory:{}", file_name(IND_VAR, DEP_VAR, seed))
    }
}

impl<T: ObservableSink + ?Sized> ObservableSink for &mut T {
    fn write_header(&mut self, seed: u64) -> Result<()> {
        (**self).write_header(seed)
    }
    fn append_row(&mut self, obs: &Observation) -> Result<()> {
        (**self).append_row(obs)
    }
    fn destination(&self, seed: u64) -> String {
        (**self).destination(seed)
    }
}
