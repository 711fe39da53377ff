//! Error types shared by the solver core and its hosts.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::solver::ResultRecord;

/// A parameter set rejected at the boundary, before any run starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("Invalid value for [{field}]: {value}")]
    ZeroOrNonFinite { field: &'static str, value: f64 },

    #[error("[{field}] must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error(
        "Too small an uncertainty range for this delta t value: \
         maxResultRange {max_result_range} < 4 * delta ({delta})"
    )]
    ToleranceTooTight { delta: f64, max_result_range: f64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not parse '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Invalid(#[from] ParamError),
}

/// Outcomes of a run that did not produce a converged result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("did not converge after {iterations} iterations")]
    DidNotConverge {
        iterations: u64,
        last: ResultRecord,
    },

    #[error("non-finite value at iteration {iteration}: v0 = {velocity_guess}, time = {time_of_flight}")]
    NonFinite {
        iteration: u64,
        velocity_guess: f64,
        time_of_flight: f64,
    },
}

impl SolveError {
    pub fn iterations(&self) -> u64 {
        match self {
            Self::DidNotConverge { iterations, .. } => *iterations,
            Self::NonFinite { iteration, .. } => *iteration,
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Failed to spawn solver worker: {0}")]
    Spawn(#[source] io::Error),

    #[error("Solver worker is no longer running")]
    Disconnected,

    #[error("Solver worker panicked")]
    Panicked,

    #[error(transparent)]
    Invalid(#[from] ParamError),
}

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("Nothing to plot: no trial traces recorded")]
    Empty,

    #[error("Drawing failed: {0}")]
    Draw(String),
}
