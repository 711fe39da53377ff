//! Host-side view of a solver run: trial traces plus a timestamped transcript.

use std::io::{self, Write};

use chrono::Local;

use crate::core::messages::{Message, SamplePoint};
use crate::core::params::SimulationParameters;
use crate::core::solver::ResultRecord;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f %:z";

/// `(elapsed_time, position)` points of one trial, in arrival order.
#[derive(Clone, Debug, PartialEq)]
pub struct TrialTrace {
    pub velocity_guess: f64,
    pub points: Vec<(f64, f64)>,
}

impl TrialTrace {
    fn new(velocity_guess: f64) -> Self {
        Self {
            velocity_guess,
            points: vec![(0.0, 0.0)],
        }
    }

    pub fn time_of_flight(&self) -> f64 {
        self.points.last().map_or(0.0, |&(t, _)| t)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Started,
    Sample,
    TrialCompleted { trial: usize },
    Finished(ResultRecord),
    Failed { reason: String },
}

pub struct SimulationSession<W: Write> {
    out: W,
    log_trials: bool,
    target_time: Option<f64>,
    trial_count: usize,
    traces: Vec<TrialTrace>,
    current: Option<TrialTrace>,
    result: Option<ResultRecord>,
}

impl<W: Write> SimulationSession<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            log_trials: true,
            target_time: None,
            trial_count: 0,
            traces: Vec::new(),
            current: None,
            result: None,
        }
    }

    pub fn with_trial_log(mut self, enabled: bool) -> Self {
        self.log_trials = enabled;
        self
    }

    pub fn start(&mut self, params: &SimulationParameters) -> io::Result<()> {
        self.reset();
        self.target_time = Some(params.target_time);
        writeln!(self.out, "[Started simulation at {}]", timestamp())
    }

    pub fn reset(&mut self) {
        self.target_time = None;
        self.trial_count = 0;
        self.traces.clear();
        self.current = None;
        self.result = None;
    }

    pub fn process(&mut self, message: &Message) -> io::Result<SessionEvent> {
        match message {
            Message::Start { parameters } => {
                self.start(parameters)?;
                Ok(SessionEvent::Started)
            }
            Message::Update {
                velocity_guess,
                sample,
            } => self.record_sample(*velocity_guess, *sample),
            Message::Done(result) => {
                self.complete(result)?;
                Ok(SessionEvent::Finished(*result))
            }
            Message::Failed { reason, iterations } => {
                self.close_current();
                writeln!(
                    self.out,
                    "[Simulation abandoned at {} after {iterations} trials]",
                    timestamp()
                )?;
                writeln!(self.out, "Reason: {reason}")?;
                Ok(SessionEvent::Failed {
                    reason: reason.clone(),
                })
            }
        }
    }

    fn record_sample(&mut self, velocity_guess: f64, sample: SamplePoint) -> io::Result<SessionEvent> {
        let trace = self
            .current
            .get_or_insert_with(|| TrialTrace::new(velocity_guess));
        trace.points.push((sample.elapsed_time, sample.position));

        if sample.position > 0.0 {
            return Ok(SessionEvent::Sample);
        }

        self.close_current();
        self.trial_count += 1;
        if self.log_trials {
            writeln!(
                self.out,
                "Trial #{}: v0 = {velocity_guess} m/s, time = {} s.",
                self.trial_count, sample.elapsed_time
            )?;
        }
        Ok(SessionEvent::TrialCompleted {
            trial: self.trial_count,
        })
    }

    fn close_current(&mut self) {
        if let Some(trace) = self.current.take() {
            self.traces.push(trace);
        }
    }

    fn complete(&mut self, result: &ResultRecord) -> io::Result<()> {
        self.close_current();
        self.result = Some(*result);
        writeln!(self.out, "[Simulation completed at {}]", timestamp())?;
        writeln!(self.out, "Result: -------------------------------")?;
        writeln!(
            self.out,
            "Initial Velocity = {}±{} m/s",
            result.velocity_guess, result.uncertainty
        )?;
        writeln!(self.out, "Time of Flight: {} s", result.time_of_flight)?;
        writeln!(self.out, "Final Step Leap: |{}| m/s", result.final_leap.abs())?;
        writeln!(self.out, "Trials: {}", self.trial_count)
    }

    pub fn trial_count(&self) -> usize {
        self.trial_count
    }

    pub fn traces(&self) -> &[TrialTrace] {
        &self.traces
    }

    pub fn current_trace(&self) -> Option<&TrialTrace> {
        self.current.as_ref()
    }

    pub fn result(&self) -> Option<&ResultRecord> {
        self.result.as_ref()
    }

    pub fn target_time(&self) -> Option<f64> {
        self.target_time
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::{SessionEvent, SimulationSession};
    use crate::core::integrator::ProgressSample;
    use crate::core::messages::Message;
    use crate::core::params::SimulationParameters;
    use crate::core::solver::{ResultRecord, solve};

    fn update(velocity_guess: f64, elapsed_time: f64, position: f64) -> Message {
        Message::from(ProgressSample {
            velocity_guess,
            elapsed_time,
            position,
        })
    }

    fn transcript(session: SimulationSession<Vec<u8>>) -> String {
        String::from_utf8(session.into_inner()).expect("utf-8 transcript")
    }

    #[test]
    fn counts_trials_on_landing_samples() {
        let mut session = SimulationSession::new(Vec::new());
        session
            .start(&SimulationParameters::default())
            .expect("write start");

        assert_eq!(
            session.process(&update(10.0, 0.5, 3.0)).expect("write"),
            SessionEvent::Sample
        );
        assert_eq!(
            session.process(&update(10.0, 1.93, -0.01)).expect("write"),
            SessionEvent::TrialCompleted { trial: 1 }
        );
        session.process(&update(12.0, 0.5, 4.0)).expect("write");
        assert!(session.current_trace().is_some());
        session.process(&update(12.0, 2.3, -0.02)).expect("write");

        assert_eq!(session.trial_count(), 2);
        assert_eq!(session.traces().len(), 2);
        assert_eq!(session.traces()[1].velocity_guess, 12.0);
        assert_eq!(session.traces()[1].points, vec![(0.0, 0.0), (0.5, 4.0), (2.3, -0.02)]);
        assert_eq!(session.traces()[0].time_of_flight(), 1.93);

        let text = transcript(session);
        assert!(text.starts_with("[Started simulation at "));
        assert!(text.contains("Trial #1: v0 = 10 m/s, time = 1.93 s."));
        assert!(text.contains("Trial #2: v0 = 12 m/s, time = 2.3 s."));
    }

    #[test]
    fn writes_result_block() {
        let mut session = SimulationSession::new(Vec::new()).with_trial_log(false);
        session.process(&update(10.0, 1.9, -0.1)).expect("write");
        let result = ResultRecord {
            time_of_flight: 2.0,
            uncertainty: 0.0078125,
            velocity_guess: 10.25,
            final_leap: -0.0078125,
        };
        let event = session.process(&Message::Done(result)).expect("write");
        assert_eq!(event, SessionEvent::Finished(result));
        assert_eq!(session.result(), Some(&result));

        let text = transcript(session);
        assert!(!text.contains("Trial #1"));
        assert!(text.contains("[Simulation completed at "));
        assert!(text.contains("Initial Velocity = 10.25±0.0078125 m/s"));
        assert!(text.contains("Time of Flight: 2 s"));
        assert!(text.contains("Final Step Leap: |0.0078125| m/s"));
        assert!(text.contains("Trials: 1"));
    }

    #[test]
    fn failure_is_logged() {
        let mut session = SimulationSession::new(Vec::new());
        let event = session
            .process(&Message::Failed {
                reason: "did not converge after 9 iterations".to_string(),
                iterations: 9,
            })
            .expect("write");
        assert!(matches!(event, SessionEvent::Failed { .. }));
        let text = transcript(session);
        assert!(text.contains("after 9 trials"));
        assert!(text.contains("Reason: did not converge"));
    }

    #[test]
    fn replays_a_full_run() {
        let params = SimulationParameters::default();
        let mut messages = Vec::new();
        let result = solve(&params, |s| messages.push(Message::from(s))).expect("converges");
        messages.push(Message::Done(result));

        let mut session = SimulationSession::new(Vec::new()).with_trial_log(false);
        session.start(&params).expect("write");
        for message in &messages {
            session.process(message).expect("write");
        }

        assert_eq!(session.target_time(), Some(params.target_time));
        assert_eq!(session.trial_count(), session.traces().len());
        let last = session.traces().last().expect("traces recorded");
        assert_eq!(last.time_of_flight(), result.time_of_flight);
    }
}
