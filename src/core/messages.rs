//! Records exchanged between a host and the solver worker.
//!
//! On the wire every message is a JSON object tagged by `kind`:
//!
//! ```json
//! {"kind":"start","parameters":{"delta":0.01,"targetTime":2.0,...}}
//! {"kind":"update","velocityGuess":10.0,"sample":{"elapsedTime":0.5,"position":3.7}}
//! {"kind":"done","timeOfFlight":2.0,"uncertainty":0.008,"velocityGuess":10.3,"finalLeap":-0.008}
//! ```

use serde::{Deserialize, Serialize};

use crate::core::error::SolveError;
use crate::core::integrator::ProgressSample;
use crate::core::params::SimulationParameters;
use crate::core::solver::ResultRecord;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplePoint {
    pub elapsed_time: f64,
    pub position: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Message {
    /// Inbound: begin one solver run.
    Start { parameters: SimulationParameters },

    /// Outbound: one progress sample of the trial in flight.
    #[serde(rename_all = "camelCase")]
    Update {
        velocity_guess: f64,
        sample: SamplePoint,
    },

    /// Outbound: the run converged. Always the last message of a run.
    Done(ResultRecord),

    /// Outbound: the run was abandoned. Takes the place of `Done`.
    Failed { reason: String, iterations: u64 },
}

impl Message {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed { .. })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

impl From<ProgressSample> for Message {
    fn from(sample: ProgressSample) -> Self {
        Self::Update {
            velocity_guess: sample.velocity_guess,
            sample: SamplePoint {
                elapsed_time: sample.elapsed_time,
                position: sample.position,
            },
        }
    }
}

impl From<ResultRecord> for Message {
    fn from(result: ResultRecord) -> Self {
        Self::Done(result)
    }
}

impl From<&SolveError> for Message {
    fn from(err: &SolveError) -> Self {
        Self::Failed {
            reason: err.to_string(),
            iterations: err.iterations(),
        }
    }
}
