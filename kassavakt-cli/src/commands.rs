use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use kassavakt_config::KassavaktConfig;
use kassavakt_core::{Outcome, RequestError, ResourceVector, SafetyReport, SystemState, Units};
use kassavakt_simulator::{validate_hash, Simulator};
use kassavakt_telemetry::{EventLogger, MetricsRecorder};

use crate::error::CliError;
use crate::prompt::{Prompt, PromptAnswer};
use crate::report::{self, RequestReport, RunReport};

#[derive(Parser, Debug)]
#[command(version, about, subcommand_negates_reqs = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub check: CheckArgs,

    /// Configuration file (defaults to config/kassavakt.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check random states against the algorithm's invariants
    Fuzz(FuzzArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// State file: `n m`, Available, n Max rows, n Allocation rows
    #[arg(required = true)]
    pub input: Option<PathBuf>,

    /// Evaluate one request without prompting, e.g. `1:1,0,2`
    #[arg(long, value_parser = parse_request)]
    pub request: Option<RequestArg>,

    /// Skip the interactive request prompt
    #[arg(long)]
    pub no_prompt: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Print prometheus metrics to stderr before exiting
    #[arg(long)]
    pub metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FuzzArgs {
    /// Seed of the first state (incremented per iteration)
    #[arg(long, default_value_t = 1)]
    pub seed: u64,
    /// Number of states to generate (defaults to the configured value)
    #[arg(long)]
    pub iterations: Option<usize>,
    /// Fail unless the run produces this hash
    #[arg(long)]
    pub validate_hash: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Yaml,
}

/// Request given on the command line as `process:units,units,...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestArg {
    pub process: usize,
    pub request: ResourceVector,
}

fn parse_request(value: &str) -> Result<RequestArg, String> {
    let (process, units) = value
        .split_once(':')
        .ok_or_else(|| format!("expected PROCESS:UNITS,UNITS,..., got '{value}'"))?;
    let process = process
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid process id '{process}': {e}"))?;
    let request = units
        .split(',')
        .map(|u| u.trim().parse::<Units>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid request vector '{units}': {e}"))?;
    Ok(RequestArg {
        process,
        request: request.into(),
    })
}

pub fn run_command(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => KassavaktConfig::load_from_path(path)?,
        None => KassavaktConfig::load()?,
    };
    EventLogger::init(&config.telemetry.log_level);
    let metrics = MetricsRecorder::new().map_err(|e| CliError::Metrics(e.to_string()))?;

    match cli.command {
        Some(Commands::Fuzz(args)) => run_fuzz(args, &config, &mut io::stdout().lock()),
        None => {
            let stdin = io::stdin();
            let mut stdout = io::stdout().lock();
            let result = run_check(&cli.check, &config, &metrics, stdin.lock(), &mut stdout);
            if cli.check.metrics || config.telemetry.metrics {
                let text = metrics
                    .gather_metrics()
                    .map_err(|e| CliError::Metrics(e.to_string()))?;
                io::stderr().write_all(text.as_bytes())?;
            }
            result
        }
    }
}

/// Loads the state, reports its safety and evaluates at most one request.
pub fn run_check<R: BufRead, W: Write>(
    args: &CheckArgs,
    config: &KassavaktConfig,
    metrics: &MetricsRecorder,
    input: R,
    out: &mut W,
) -> Result<(), CliError> {
    let Some(path) = &args.input else {
        return Ok(());
    };
    let mut state = kassavakt_input::load_state(path)?;

    let started = Instant::now();
    let safety = state.check_safety();
    metrics.record_safety_check(safety.safe, started.elapsed().as_secs_f64());
    EventLogger::log_safety(safety.safe, &safety.sequence.to_string());

    if args.format == Format::Yaml {
        return run_check_yaml(args, &mut state, &safety, metrics, out);
    }

    report::write_safety(out, &safety)?;

    let (process, request) = match &args.request {
        Some(arg) => (arg.process, arg.request.clone()),
        None if config.prompt.enabled && !args.no_prompt => {
            let answer = Prompt::new(input, &mut *out).ask(&state)?;
            match answer {
                PromptAnswer::Declined => return Ok(()),
                PromptAnswer::InvalidProcess => {
                    writeln!(out, "Invalid process id.")?;
                    return Ok(());
                }
                PromptAnswer::InvalidRequest => {
                    writeln!(out, "Invalid request vector.")?;
                    return Ok(());
                }
                PromptAnswer::Request { process, request } => (process, request),
            }
        }
        None => return Ok(()),
    };

    let outcome = evaluate(&mut state, process, &request, metrics);
    report::write_outcome(out, process, &outcome)?;
    Ok(())
}

fn run_check_yaml<W: Write>(
    args: &CheckArgs,
    state: &mut SystemState,
    safety: &SafetyReport,
    metrics: &MetricsRecorder,
    out: &mut W,
) -> Result<(), CliError> {
    let evaluated = args
        .request
        .as_ref()
        .map(|arg| (arg, evaluate(state, arg.process, &arg.request, metrics)));

    let request = match &evaluated {
        Some((arg, Ok(outcome))) => Some(RequestReport {
            process: arg.process,
            request: arg.request.as_slice(),
            outcome,
        }),
        Some((_, Err(err))) => {
            warn!(error = %err, "request not evaluated");
            None
        }
        None => None,
    };
    report::write_yaml(out, &RunReport { safety, request })?;
    if let Some((_, Err(err))) = &evaluated {
        writeln!(out, "# {err}")?;
    }
    Ok(())
}

fn evaluate(
    state: &mut SystemState,
    process: usize,
    request: &ResourceVector,
    metrics: &MetricsRecorder,
) -> Result<Outcome, RequestError> {
    let outcome = state.evaluate_request(process, request);
    let label = match &outcome {
        Ok(outcome) => outcome.label(),
        Err(_) => "invalid",
    };
    metrics.record_request(label);
    EventLogger::log_request(process, &request.to_string(), label);
    outcome
}

fn run_fuzz<W: Write>(
    args: FuzzArgs,
    config: &KassavaktConfig,
    out: &mut W,
) -> Result<(), CliError> {
    let iterations = args.iterations.unwrap_or(config.fuzz.iterations);
    info!(seed = args.seed, iterations, "starting fuzz run");

    let summary = Simulator::new(args.seed, config.fuzz.clone())?.run(iterations)?;
    writeln!(out, "Iterations:        {}", summary.iterations)?;
    writeln!(out, "Safe states:       {}", summary.safe_states)?;
    writeln!(out, "Unsafe states:     {}", summary.unsafe_states)?;
    writeln!(out, "Granted:           {}", summary.granted)?;
    writeln!(out, "Exceeds need:      {}", summary.exceeds_need)?;
    writeln!(out, "Exceeds available: {}", summary.exceeds_available)?;
    writeln!(out, "Denied unsafe:     {}", summary.denied_unsafe)?;
    writeln!(out, "State hash:        {}", summary.state_hash)?;

    if let Some(expected) = args.validate_hash.as_deref() {
        validate_hash(&summary, expected)?;
    }
    Ok(())
}
