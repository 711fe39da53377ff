//! Leap-based search for the launch velocity whose flight time hits a target.
//!
//! Each iteration runs one trial, then nudges the velocity guess by the
//! current leap. Whenever the flight-time offset changes sign the leap is
//! scaled by `-leap_reduction_factor`, so the guess closes in on the target
//! from alternating sides. The search stops once two successive guesses are
//! within `max_result_range` of each other.

use serde::{Deserialize, Serialize};

use crate::core::error::SolveError;
use crate::core::integrator::{ProgressSample, run_trial};
use crate::core::params::SimulationParameters;

/// Ceiling used by [`solve`]. Reaching it yields [`SolveError::DidNotConverge`].
pub const DEFAULT_MAX_ITERATIONS: u64 = 100_000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrialState {
    pub velocity_guess: f64,
    pub leap: f64,
}

/// Terminal record of a run.
///
/// `velocity_guess` is the guess *after* the final leap, i.e. the next
/// untried velocity, not the one that produced `time_of_flight`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub time_of_flight: f64,
    pub uncertainty: f64,
    pub velocity_guess: f64,
    pub final_leap: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Iteration {
    pub index: u64,
    pub velocity_tried: f64,
    pub time_of_flight: f64,
    pub offset: f64,
    pub leap_before: f64,
    pub leap_after: f64,
    pub reversed: bool,
    pub uncertainty: f64,
}

/// Three-valued sign; zero stays zero.
fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

pub struct Solver {
    params: SimulationParameters,
    trial: TrialState,
    last_offset: Option<f64>,
    last_velocity_guess: f64,
    time_of_flight: f64,
    uncertainty: f64,
    iterations: u64,
}

impl Solver {
    pub fn new(params: SimulationParameters) -> Self {
        Self {
            params,
            trial: TrialState {
                velocity_guess: params.initial_v_init,
                leap: params.initial_leap,
            },
            last_offset: None,
            last_velocity_guess: 0.0,
            time_of_flight: 0.0,
            uncertainty: f64::INFINITY,
            iterations: 0,
        }
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn trial(&self) -> TrialState {
        self.trial
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn is_converged(&self) -> bool {
        self.iterations > 0 && self.uncertainty <= self.params.max_result_range
    }

    /// Snapshot of the run so far, in the shape reported at the end.
    pub fn result(&self) -> ResultRecord {
        ResultRecord {
            time_of_flight: self.time_of_flight,
            uncertainty: self.uncertainty,
            velocity_guess: self.trial.velocity_guess,
            final_leap: self.trial.leap,
        }
    }

    /// Runs one trial at the current guess and applies the leap rule.
    pub fn step<F>(&mut self, emit: F) -> Result<Iteration, SolveError>
    where
        F: FnMut(ProgressSample),
    {
        let velocity_tried = self.trial.velocity_guess;
        let outcome = run_trial(velocity_tried, self.params.trial_settings(), emit);
        self.iterations += 1;

        let time_of_flight = outcome.time_of_flight;
        if !time_of_flight.is_finite() || !velocity_tried.is_finite() {
            return Err(SolveError::NonFinite {
                iteration: self.iterations,
                velocity_guess: velocity_tried,
                time_of_flight,
            });
        }

        let offset = time_of_flight - self.params.target_time;
        let leap_before = self.trial.leap;

        let reversed = self
            .last_offset
            .is_some_and(|last| sign(last) != sign(offset));
        if reversed {
            self.trial.leap *= -self.params.leap_reduction_factor;
        }
        if sign(self.trial.leap) != -sign(offset) {
            self.trial.leap = -self.trial.leap;
        }

        self.uncertainty = (self.last_velocity_guess - velocity_tried).abs();
        self.last_offset = Some(offset);
        self.last_velocity_guess = velocity_tried;
        self.time_of_flight = time_of_flight;

        self.trial.velocity_guess += self.trial.leap;

        Ok(Iteration {
            index: self.iterations,
            velocity_tried,
            time_of_flight,
            offset,
            leap_before,
            leap_after: self.trial.leap,
            reversed,
            uncertainty: self.uncertainty,
        })
    }

    /// Steps until converged, or until `max_iterations` trials have run.
    pub fn run<F>(&mut self, max_iterations: u64, mut emit: F) -> Result<ResultRecord, SolveError>
    where
        F: FnMut(ProgressSample),
    {
        loop {
            self.step(&mut emit)?;
            if self.is_converged() {
                return Ok(self.result());
            }
            if self.iterations >= max_iterations {
                return Err(SolveError::DidNotConverge {
                    iterations: self.iterations,
                    last: self.result(),
                });
            }
        }
    }
}

pub fn solve<F>(params: &SimulationParameters, emit: F) -> Result<ResultRecord, SolveError>
where
    F: FnMut(ProgressSample),
{
    solve_with_limit(params, DEFAULT_MAX_ITERATIONS, emit)
}

pub fn solve_with_limit<F>(
    params: &SimulationParameters,
    max_iterations: u64,
    emit: F,
) -> Result<ResultRecord, SolveError>
where
    F: FnMut(ProgressSample),
{
    Solver::new(*params).run(max_iterations, emit)
}
