use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{ConfigError, ParamError};
use crate::core::integrator::TrialSettings;

/// Above this step size the tolerance must cover at least four steps.
pub const COARSE_DELTA_S: f64 = 0.1;
pub const COARSE_DELTA_TOLERANCE_STEPS: f64 = 4.0;

/// Inputs for one solver run. Immutable once a run starts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    /// Integration time step (s).
    pub delta: f64,
    /// Flight time the search aims for (s).
    pub target_time: f64,
    /// Integration steps between progress samples.
    pub steps_per_tick: u32,
    /// First launch velocity tried (m/s).
    pub initial_v_init: f64,
    /// Convergence tolerance on successive velocity guesses (m/s).
    pub max_result_range: f64,
    /// First signed adjustment applied to the guess (m/s).
    pub initial_leap: f64,
    /// Leap multiplier applied whenever the offset changes sign.
    pub leap_reduction_factor: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            delta: 0.01,
            target_time: 2.0,
            steps_per_tick: 50,
            initial_v_init: 10.0,
            max_result_range: 0.01,
            initial_leap: 2.0,
            leap_reduction_factor: 0.5,
        }
    }
}

impl SimulationParameters {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let params: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        params.validate()?;
        Ok(params)
    }

    /// Boundary check run before a start command is ever sent.
    pub fn validate(&self) -> Result<(), ParamError> {
        let fields = [
            ("delta", self.delta),
            ("targetTime", self.target_time),
            ("stepsPerTick", f64::from(self.steps_per_tick)),
            ("initialVInit", self.initial_v_init),
            ("maxResultRange", self.max_result_range),
            ("initialLeap", self.initial_leap),
            ("leapReductionFactor", self.leap_reduction_factor),
        ];
        for (field, value) in fields {
            if value == 0.0 || !value.is_finite() {
                return Err(ParamError::ZeroOrNonFinite { field, value });
            }
        }

        for (field, value) in [
            ("delta", self.delta),
            ("targetTime", self.target_time),
            ("maxResultRange", self.max_result_range),
        ] {
            if value < 0.0 {
                return Err(ParamError::NotPositive { field, value });
            }
        }

        if self.delta > COARSE_DELTA_S
            && self.max_result_range < self.delta * COARSE_DELTA_TOLERANCE_STEPS
        {
            return Err(ParamError::ToleranceTooTight {
                delta: self.delta,
                max_result_range: self.max_result_range,
            });
        }

        Ok(())
    }

    pub fn trial_settings(&self) -> TrialSettings {
        TrialSettings {
            delta: self.delta,
            steps_per_tick: self.steps_per_tick,
        }
    }
}
