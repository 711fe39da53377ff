use std::io::{self, Stdout};
use std::path::PathBuf;

use clap::Parser;
use macroquad::prelude::*;
use thiserror::Error;

use flight_solver::core::error::{ConfigError, WorkerError};
use flight_solver::core::params::SimulationParameters;
use flight_solver::core::session::{SessionEvent, SimulationSession};
use flight_solver::core::solver::DEFAULT_MAX_ITERATIONS;
use flight_solver::core::window::{AxisWindow, axis_window_for};
use flight_solver::core::worker::Worker;

use crate::constants::{
    BACKGROUND, BOTTOM_MARGIN, INITIAL_WINDOW_HEIGHT, INITIAL_WINDOW_WIDTH, LEFT_MARGIN,
    MSAA_SAMPLES, RIGHT_MARGIN, TOP_MARGIN,
};
use crate::render::{PlotArea, draw_axis_tick_labels, draw_grid, draw_hud, draw_target, draw_traces};

/// Watches the velocity search live, one trajectory per trial.
#[derive(Debug, Parser)]
#[command(name = "leap_viewer", version)]
struct ViewerArgs {
    /// JSON file with simulation parameters (camelCase keys).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Give up after this many trials.
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: u64,
}

#[derive(Debug, Error)]
pub(crate) enum ViewerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error("Could not write transcript: {0}")]
    Io(#[from] io::Error),
}

pub(crate) struct ViewerState {
    pub(crate) params: SimulationParameters,
    pub(crate) session: SimulationSession<Stdout>,
    pub(crate) running: bool,
    pub(crate) status_line: String,
    worker: Worker,
}

impl ViewerState {
    fn new(params: SimulationParameters, worker: Worker) -> Self {
        Self {
            params,
            session: SimulationSession::new(io::stdout()),
            running: false,
            status_line: "Press Space to start, R to reset, Esc to quit".to_string(),
            worker,
        }
    }

    fn start(&mut self) -> Result<(), ViewerError> {
        self.session.start(&self.params)?;
        self.worker.start(self.params)?;
        self.running = true;
        self.status_line = "Searching...".to_string();
        Ok(())
    }

    fn reset(&mut self) {
        self.session.reset();
        self.status_line = "Reset".to_string();
    }

    /// Feeds everything the worker sent since the last frame into the session.
    fn pump(&mut self) -> Result<(), ViewerError> {
        if !self.running {
            return Ok(());
        }
        for message in self.worker.drain()? {
            match self.session.process(&message)? {
                SessionEvent::TrialCompleted { trial } => {
                    self.status_line = format!("Searching... {trial} trials");
                }
                SessionEvent::Finished(_) => {
                    self.running = false;
                    self.status_line = "Converged".to_string();
                }
                SessionEvent::Failed { reason } => {
                    self.running = false;
                    self.status_line = format!("Abandoned: {reason}");
                }
                SessionEvent::Started | SessionEvent::Sample => {}
            }
        }
        Ok(())
    }

    fn world_window(&self) -> AxisWindow {
        let finished = self.session.traces().iter();
        let points = finished
            .chain(self.session.current_trace())
            .flat_map(|trace| trace.points.iter().copied());
        axis_window_for(points, self.params.target_time)
    }
}

pub(crate) fn window_conf() -> Conf {
    Conf {
        window_title: "Flight Solver - Leap Search".to_string(),
        window_width: INITIAL_WINDOW_WIDTH,
        window_height: INITIAL_WINDOW_HEIGHT,
        high_dpi: true,
        sample_count: MSAA_SAMPLES,
        ..Default::default()
    }
}

pub(crate) async fn run() -> Result<(), ViewerError> {
    let args = ViewerArgs::parse();
    let params = match &args.config {
        Some(path) => SimulationParameters::from_json_file(path)?,
        None => SimulationParameters::default(),
    };
    let worker = Worker::spawn_with_limit(args.max_iterations)?;
    let mut state = ViewerState::new(params, worker);

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        if !state.running {
            if is_key_pressed(KeyCode::Space) {
                state.start()?;
            } else if is_key_pressed(KeyCode::R) {
                state.reset();
            }
        }
        state.pump()?;

        let area = PlotArea {
            left: LEFT_MARGIN,
            right: screen_width() - RIGHT_MARGIN,
            top: TOP_MARGIN,
            bottom: screen_height() - BOTTOM_MARGIN,
        };
        let window = state.world_window();

        clear_background(BACKGROUND);
        draw_grid(&area);
        draw_axis_tick_labels(&area, &window);
        draw_target(&area, &window, state.params.target_time);
        draw_traces(&area, &window, &state.session);
        draw_hud(&state);

        next_frame().await;
    }

    // A run in flight cannot be cancelled; leave its thread behind.
    if !state.running {
        state.worker.shutdown()?;
    }
    Ok(())
}
