// error.rs - Error type shared by the lattice, engine, session and sinks

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the simulator.
///
/// Only `ConfigurationInvalid` is ever fatal. Sink errors are reported by
/// the session and the offending record is dropped.
#[derive(Debug, Error)]
pub enum IsingError {
    /// Grid size, temperature or run limits that would give a degenerate run.
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),

    /// The observable sink could not be opened for writing.
    #[error("unable to open {} for writing: {source}", path.display())]
    SinkUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The CSV writer failed after the destination was opened.
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
}

impl IsingError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        IsingError::ConfigurationInvalid(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, IsingError>;
