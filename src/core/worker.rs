//! Runs the solver on a dedicated thread, reachable only through messages.
//!
//! The host sends `Start` through [`Worker::start`] and reads `Update`
//! messages followed by exactly one `Done` or `Failed` per run. Both channels
//! are ordered and unbounded, so the solver never waits on the host.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::core::error::WorkerError;
use crate::core::messages::Message;
use crate::core::params::SimulationParameters;
use crate::core::solver::{DEFAULT_MAX_ITERATIONS, solve_with_limit};

const THREAD_NAME: &str = "leap-solver";

pub struct Worker {
    inbox: Sender<Message>,
    outbox: Receiver<Message>,
    thread: JoinHandle<()>,
}

impl Worker {
    pub fn spawn() -> Result<Self, WorkerError> {
        Self::spawn_with_limit(DEFAULT_MAX_ITERATIONS)
    }

    pub fn spawn_with_limit(max_iterations: u64) -> Result<Self, WorkerError> {
        let (inbox, commands) = mpsc::channel();
        let (events, outbox) = mpsc::channel();
        let thread = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || serve(commands, events, max_iterations))
            .map_err(WorkerError::Spawn)?;

        Ok(Self {
            inbox,
            outbox,
            thread,
        })
    }

    /// Validates and queues one run. Invalid parameters never reach the worker.
    pub fn start(&self, parameters: SimulationParameters) -> Result<(), WorkerError> {
        parameters.validate()?;
        self.inbox
            .send(Message::Start { parameters })
            .map_err(|_| WorkerError::Disconnected)
    }

    pub fn recv(&self) -> Result<Message, WorkerError> {
        self.outbox.recv().map_err(|_| WorkerError::Disconnected)
    }

    /// Everything the worker has sent so far, without blocking.
    pub fn drain(&self) -> Result<Vec<Message>, WorkerError> {
        let mut messages = Vec::new();
        loop {
            match self.outbox.try_recv() {
                Ok(message) => messages.push(message),
                Err(TryRecvError::Empty) => return Ok(messages),
                Err(TryRecvError::Disconnected) if !messages.is_empty() => return Ok(messages),
                Err(TryRecvError::Disconnected) => return Err(WorkerError::Disconnected),
            }
        }
    }

    /// Blocks until the current run ends, handing each message to `on_message`.
    /// Returns the terminal message.
    pub fn wait_for_result<F>(&self, mut on_message: F) -> Result<Message, WorkerError>
    where
        F: FnMut(&Message),
    {
        loop {
            let message = self.recv()?;
            on_message(&message);
            if message.is_terminal() {
                return Ok(message);
            }
        }
    }

    /// Closes the inbox and waits for the queued runs to finish.
    pub fn shutdown(self) -> Result<(), WorkerError> {
        let Self { inbox, thread, .. } = self;
        drop(inbox);
        thread.join().map_err(|_| WorkerError::Panicked)
    }
}

fn serve(commands: Receiver<Message>, events: Sender<Message>, max_iterations: u64) {
    for command in commands {
        let Message::Start { parameters } = command else {
            continue;
        };

        // A vanished host cannot cancel a run; the samples are simply dropped.
        let outcome = solve_with_limit(&parameters, max_iterations, |sample| {
            let _ = events.send(Message::from(sample));
        });

        let terminal = match outcome {
            Ok(result) => Message::from(result),
            Err(err) => Message::from(&err),
        };
        if events.send(terminal).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Worker;
    use crate::core::error::WorkerError;
    use crate::core::messages::Message;
    use crate::core::params::SimulationParameters;
    use crate::core::solver::solve;

    fn collect_run(worker: &Worker) -> Vec<Message> {
        let mut messages = Vec::new();
        worker
            .wait_for_result(|m| messages.push(m.clone()))
            .expect("worker should answer");
        messages
    }

    #[test]
    fn updates_arrive_before_the_single_done() {
        let params = SimulationParameters::default();
        let mut expected_samples = 0usize;
        let expected = solve(&params, |_| expected_samples += 1).expect("run should converge");

        let worker = Worker::spawn().expect("spawn worker");
        worker.start(params).expect("start run");
        let messages = collect_run(&worker);

        let (last, updates) = messages.split_last().expect("at least one message");
        assert_eq!(last, &Message::Done(expected));
        assert_eq!(updates.len(), expected_samples);
        assert!(updates.iter().all(|m| matches!(m, Message::Update { .. })));

        worker.shutdown().expect("clean shutdown");
    }

    #[test]
    fn queued_runs_complete_in_order() {
        let first = SimulationParameters::default();
        let second = SimulationParameters {
            target_time: 3.0,
            ..SimulationParameters::default()
        };

        let worker = Worker::spawn().expect("spawn worker");
        worker.start(first).expect("start first");
        worker.start(second).expect("start second");

        let a = collect_run(&worker);
        let b = collect_run(&worker);
        let time_of = |messages: &[Message]| match messages.last() {
            Some(Message::Done(result)) => result.time_of_flight,
            other => panic!("unexpected terminal: {other:?}"),
        };
        assert!(time_of(&a) < 2.1);
        assert!(time_of(&b) > 2.9);

        worker.shutdown().expect("clean shutdown");
    }

    #[test]
    fn invalid_parameters_are_never_sent() {
        let worker = Worker::spawn().expect("spawn worker");
        let params = SimulationParameters {
            max_result_range: 0.0,
            ..SimulationParameters::default()
        };
        let err = worker.start(params).expect_err("zero tolerance is invalid");
        assert!(matches!(err, WorkerError::Invalid(_)));
        assert!(worker.drain().expect("worker alive").is_empty());
        worker.shutdown().expect("clean shutdown");
    }

    #[test]
    fn runaway_run_ends_with_failed() {
        let worker = Worker::spawn_with_limit(50).expect("spawn worker");
        worker
            .start(SimulationParameters {
                leap_reduction_factor: 1.0,
                ..SimulationParameters::default()
            })
            .expect("start run");

        let messages = collect_run(&worker);
        match messages.last() {
            Some(Message::Failed { iterations, .. }) => assert_eq!(*iterations, 50),
            other => panic!("unexpected terminal: {other:?}"),
        }
        assert_eq!(messages.iter().filter(|m| m.is_terminal()).count(), 1);
        worker.shutdown().expect("clean shutdown");
    }
}
