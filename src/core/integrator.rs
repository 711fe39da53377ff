pub const GRAVITY_MPS2: f64 = 10.0;
pub const DRAG_PER_S: f64 = 0.1; // linear drag: a = -g - k*v

/// Constant physics of a vertical launch with speed-proportional drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightModel {
    pub gravity_mps2: f64,
    pub drag_per_s: f64,
}

impl FlightModel {
    pub const STANDARD: Self = Self {
        gravity_mps2: GRAVITY_MPS2,
        drag_per_s: DRAG_PER_S,
    };

    pub const fn drag_free() -> Self {
        Self {
            gravity_mps2: GRAVITY_MPS2,
            drag_per_s: 0.0,
        }
    }

    pub fn acceleration(&self, velocity_mps: f64) -> f64 {
        -self.gravity_mps2 - (self.drag_per_s * velocity_mps)
    }
}

impl Default for FlightModel {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrialSettings {
    pub delta: f64,
    pub steps_per_tick: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IntegrationState {
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub elapsed_time: f64,
    pub step_count: u64,
}

impl IntegrationState {
    pub fn launch(initial_velocity: f64) -> Self {
        Self {
            velocity: initial_velocity,
            ..Self::default()
        }
    }

    /// One explicit Euler step: acceleration, then velocity, then position.
    pub fn step(&mut self, model: FlightModel, delta: f64) {
        self.acceleration = model.acceleration(self.velocity);
        self.velocity += delta * self.acceleration;
        self.position += delta * self.velocity;
        self.elapsed_time += delta;
        self.step_count += 1;
    }

    pub fn is_airborne(&self) -> bool {
        self.position > 0.0
    }

    fn sample(&self, velocity_guess: f64) -> ProgressSample {
        ProgressSample {
            velocity_guess,
            elapsed_time: self.elapsed_time,
            position: self.position,
        }
    }
}

/// Snapshot of a trial in flight, tagged with the launch velocity it belongs to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressSample {
    pub velocity_guess: f64,
    pub elapsed_time: f64,
    pub position: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrialOutcome {
    pub time_of_flight: f64,
    pub step_count: u64,
    pub samples_emitted: u64,
    pub final_state: IntegrationState,
}

pub fn run_trial<F>(initial_velocity: f64, settings: TrialSettings, emit: F) -> TrialOutcome
where
    F: FnMut(ProgressSample),
{
    run_trial_with(FlightModel::STANDARD, initial_velocity, settings, emit)
}

/// Steps from `x = 0` until the projectile is back at or below the reference
/// height. The first step always runs, so a non-positive launch velocity ends
/// after exactly one step.
pub fn run_trial_with<F>(
    model: FlightModel,
    initial_velocity: f64,
    settings: TrialSettings,
    mut emit: F,
) -> TrialOutcome
where
    F: FnMut(ProgressSample),
{
    let cadence = u64::from(settings.steps_per_tick.max(1));
    let mut state = IntegrationState::launch(initial_velocity);
    let mut samples_emitted = 0;

    loop {
        state.step(model, settings.delta);
        if state.step_count % cadence == 0 {
            emit(state.sample(initial_velocity));
            samples_emitted += 1;
        }
        if !state.is_airborne() {
            break;
        }
    }

    // Terminal state, unless the last periodic sample already was it.
    if state.step_count % cadence != 0 {
        emit(state.sample(initial_velocity));
        samples_emitted += 1;
    }

    TrialOutcome {
        time_of_flight: state.elapsed_time,
        step_count: state.step_count,
        samples_emitted,
        final_state: state,
    }
}

#[cfg(test)]
mod tests {
    use super::{FlightModel, ProgressSample, TrialSettings, run_trial, run_trial_with};

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "actual={actual}, expected={expected}, tolerance={tolerance}"
        );
    }

    fn settings(delta: f64, steps_per_tick: u32) -> TrialSettings {
        TrialSettings {
            delta,
            steps_per_tick,
        }
    }

    fn collect(initial_velocity: f64, settings: TrialSettings) -> (f64, u64, Vec<ProgressSample>) {
        let mut samples = Vec::new();
        let outcome = run_trial(initial_velocity, settings, |s| samples.push(s));
        (outcome.time_of_flight, outcome.step_count, samples)
    }

    #[test]
    fn first_step_applies_gravity_and_drag() {
        let (time, steps, samples) = collect(10.0, settings(0.01, 1));
        assert!(steps > 1);
        assert!(time > 0.0);

        let first = samples[0];
        // a = -10 - 0.1 * 10 = -11, v = 9.89, x = 0.0989
        assert_close(first.elapsed_time, 0.01, 1e-12);
        assert_close(first.position, 0.0989, 1e-12);
        assert_eq!(first.velocity_guess, 10.0);
    }

    #[test]
    fn trial_is_deterministic() {
        let a = collect(17.25, settings(0.003, 7));
        let b = collect(17.25, settings(0.003, 7));
        assert_eq!(a.0.to_bits(), b.0.to_bits());
        assert_eq!(a.1, b.1);
        assert_eq!(a.2, b.2);
    }

    #[test]
    fn sample_count_follows_cadence() {
        for steps_per_tick in [1, 2, 3, 7, 50, 199, 200, 201, 10_000] {
            let mut count = 0u64;
            let outcome = run_trial(10.0, settings(0.01, steps_per_tick), |_| count += 1);
            let cadence = u64::from(steps_per_tick);
            let expected = outcome.step_count / cadence
                + u64::from(outcome.step_count % cadence != 0);
            assert_eq!(count, expected, "steps_per_tick={steps_per_tick}");
            assert_eq!(outcome.samples_emitted, expected);
            assert!(count >= 1);
        }
    }

    #[test]
    fn last_sample_is_the_landing_state() {
        for steps_per_tick in [1, 3, 50, 10_000] {
            let (time, _, samples) = collect(12.0, settings(0.01, steps_per_tick));
            let last = samples.last().expect("at least one sample");
            assert!(last.position <= 0.0);
            assert_eq!(last.elapsed_time, time);
            assert!(samples[..samples.len() - 1].iter().all(|s| s.position > 0.0));
        }
    }

    #[test]
    fn drag_free_flight_matches_closed_form() {
        let delta = 0.001;
        for v0 in [5.0, 10.0, 23.0] {
            let outcome = run_trial_with(FlightModel::drag_free(), v0, settings(delta, 100), |_| {});
            let expected = 2.0 * v0 / FlightModel::drag_free().gravity_mps2;
            assert_close(outcome.time_of_flight, expected, delta + 1e-9);
        }
    }

    #[test]
    fn drag_shortens_the_flight() {
        let with_drag = run_trial(20.0, settings(0.01, 10), |_| {});
        let without = run_trial_with(FlightModel::drag_free(), 20.0, settings(0.01, 10), |_| {});
        assert!(with_drag.time_of_flight < without.time_of_flight);
    }

    #[test]
    fn non_positive_launch_lands_after_one_step() {
        for v0 in [0.0, -4.0] {
            let (time, steps, samples) = collect(v0, settings(0.01, 50));
            assert_eq!(steps, 1);
            assert_close(time, 0.01, 1e-15);
            assert_eq!(samples.len(), 1);
            assert!(samples[0].position <= 0.0);
        }
    }

    #[test]
    fn nan_launch_terminates() {
        let (time, steps, samples) = collect(f64::NAN, settings(0.01, 50));
        assert_eq!(steps, 1);
        assert_close(time, 0.01, 1e-15);
        assert!(samples[0].position.is_nan());
    }
}
