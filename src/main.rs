use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use thiserror::Error;

use flight_solver::core::error::{ConfigError, PlotError, WorkerError};
use flight_solver::core::messages::Message;
use flight_solver::core::params::SimulationParameters;
use flight_solver::core::plot::render_svg;
use flight_solver::core::session::SimulationSession;
use flight_solver::core::solver::DEFAULT_MAX_ITERATIONS;
use flight_solver::core::worker::Worker;

/// Searches for the launch velocity whose flight time matches a target.
#[derive(Debug, Parser)]
#[command(name = "flight_solver", version)]
struct Cli {
    /// JSON file with simulation parameters (camelCase keys).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Integration time step (s).
    #[arg(long)]
    delta: Option<f64>,

    /// Target time of flight (s).
    #[arg(short = 't', long)]
    target_time: Option<f64>,

    /// Integration steps between progress samples.
    #[arg(long)]
    steps_per_tick: Option<u32>,

    /// First launch velocity tried (m/s).
    #[arg(short = 'v', long, allow_negative_numbers = true)]
    initial_v_init: Option<f64>,

    /// Stop once successive guesses differ by at most this much (m/s).
    #[arg(long)]
    max_result_range: Option<f64>,

    /// First adjustment applied to the guess (m/s).
    #[arg(long, allow_negative_numbers = true)]
    initial_leap: Option<f64>,

    /// Leap multiplier applied on each overshoot.
    #[arg(long)]
    leap_reduction_factor: Option<f64>,

    /// Give up after this many trials.
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: u64,

    /// Write an SVG of every trial trajectory here.
    #[arg(long)]
    plot: Option<PathBuf>,

    /// Stream raw worker messages as JSON lines instead of the transcript.
    #[arg(long, conflicts_with = "quiet")]
    json: bool,

    /// Only print the start and result blocks.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error(transparent)]
    Plot(#[from] PlotError),

    #[error("Could not write output: {0}")]
    Io(#[from] io::Error),

    #[error("Could not encode message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Simulation did not complete: {0}")]
    Abandoned(String),
}

fn resolve_parameters(cli: &Cli) -> Result<SimulationParameters, ConfigError> {
    let mut params = match &cli.config {
        Some(path) => SimulationParameters::from_json_file(path)?,
        None => SimulationParameters::default(),
    };

    if let Some(delta) = cli.delta {
        params.delta = delta;
    }
    if let Some(target_time) = cli.target_time {
        params.target_time = target_time;
    }
    if let Some(steps_per_tick) = cli.steps_per_tick {
        params.steps_per_tick = steps_per_tick;
    }
    if let Some(initial_v_init) = cli.initial_v_init {
        params.initial_v_init = initial_v_init;
    }
    if let Some(max_result_range) = cli.max_result_range {
        params.max_result_range = max_result_range;
    }
    if let Some(initial_leap) = cli.initial_leap {
        params.initial_leap = initial_leap;
    }
    if let Some(leap_reduction_factor) = cli.leap_reduction_factor {
        params.leap_reduction_factor = leap_reduction_factor;
    }

    params.validate()?;
    Ok(params)
}

fn run(cli: Cli) -> Result<(), CliError> {
    let params = resolve_parameters(&cli)?;

    let stdout = io::stdout();
    let transcript: Box<dyn Write> = if cli.json {
        Box::new(io::sink())
    } else {
        Box::new(stdout.lock())
    };
    let mut session = SimulationSession::new(transcript).with_trial_log(!cli.quiet);
    let mut json_out = stdout.lock();

    let worker = Worker::spawn_with_limit(cli.max_iterations)?;
    session.start(&params)?;
    if cli.json {
        let start = Message::Start { parameters: params };
        writeln!(json_out, "{}", start.to_json()?)?;
    }
    worker.start(params)?;

    let terminal = loop {
        let message = worker.recv()?;
        if cli.json {
            writeln!(json_out, "{}", message.to_json()?)?;
        }
        session.process(&message)?;
        if message.is_terminal() {
            break message;
        }
    };
    worker.shutdown()?;

    if let Some(path) = &cli.plot {
        render_svg(path, session.traces(), params.target_time)?;
        eprintln!("Wrote {} trial trajectories to {}", session.traces().len(), path.display());
    }

    match terminal {
        Message::Failed { reason, .. } => Err(CliError::Abandoned(reason)),
        _ => Ok(()),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, resolve_parameters};
    use flight_solver::core::error::{ConfigError, ParamError};
    use flight_solver::core::params::SimulationParameters;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn defaults_without_flags() {
        let cli = parse(&["flight_solver"]);
        assert_eq!(
            resolve_parameters(&cli).expect("defaults are valid"),
            SimulationParameters::default()
        );
    }

    #[test]
    fn flags_override_defaults() {
        let cli = parse(&[
            "flight_solver",
            "-t",
            "7",
            "--initial-v-init",
            "50",
            "--initial-leap",
            "-10",
            "--steps-per-tick",
            "5",
        ]);
        let params = resolve_parameters(&cli).expect("overrides are valid");
        assert_eq!(params.target_time, 7.0);
        assert_eq!(params.initial_v_init, 50.0);
        assert_eq!(params.initial_leap, -10.0);
        assert_eq!(params.steps_per_tick, 5);
        assert_eq!(params.delta, SimulationParameters::default().delta);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let cli = parse(&["flight_solver", "--delta", "0.5", "--max-result-range", "1"]);
        let err = resolve_parameters(&cli).expect_err("tolerance too tight for delta");
        assert!(matches!(
            err,
            ConfigError::Invalid(ParamError::ToleranceTooTight { .. })
        ));
    }

    #[test]
    fn json_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["flight_solver", "--json", "--quiet"]).is_err());
    }
}
