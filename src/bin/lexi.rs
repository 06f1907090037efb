//! Lexi CLI - Command-line interface for LexiLearn Core
//!
//! Commands:
//! - trace: Score recorded tracing attempts (batch mode)
//! - run: Score tracing attempts streamed on stdin (streaming mode)
//! - assess: Score a full assessment battery
//! - checkpoints: Print the checkpoints sampled for a path
//! - catalog: List the built-in tracing levels
//! - config: Print the effective engine configuration
//! - doctor: Diagnose configuration and progress files

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, Level};

use lexilearn_core::content::TracingCatalog;
use lexilearn_core::geometry::{GeometrySampler, ReferencePath};
use lexilearn_core::pipeline::LexiProcessor;
use lexilearn_core::progress::{journey, DEFAULT_HISTORY_WINDOW};
use lexilearn_core::{DifficultyTier, EngineConfig, EngineError, ScoreEnvelope};
use lexilearn_core::{ENGINE_VERSION, PRODUCER_NAME};

/// Lexi - On-device tracing and assessment scoring for dyslexia-support learning
#[derive(Parser)]
#[command(name = "lexi")]
#[command(author = "LexiLearn")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score tracing attempts and skill assessments", long_about = None)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score recorded tracing attempts (batch mode)
    Trace {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Progress history window in records
        #[arg(long, default_value_t = DEFAULT_HISTORY_WINDOW)]
        history: usize,

        /// Load progress history from file
        #[arg(long)]
        load_progress: Option<PathBuf>,

        /// Save progress history to file after processing
        #[arg(long)]
        save_progress: Option<PathBuf>,
    },

    /// Score tracing attempts streamed on stdin, one JSON request per line
    Run {
        /// Progress history window in records
        #[arg(long, default_value_t = DEFAULT_HISTORY_WINDOW)]
        history: usize,

        /// Load progress history from file
        #[arg(long)]
        load_progress: Option<PathBuf>,

        /// Save progress history to file on exit
        #[arg(long)]
        save_progress: Option<PathBuf>,

        /// Flush output after each record
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Score a full assessment battery
    Assess {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Print the checkpoints sampled for a path
    Checkpoints {
        /// Built-in catalog item (e.g. t3)
        #[arg(long, conflicts_with = "path")]
        item: Option<String>,

        /// Raw path data
        #[arg(long)]
        path: Option<String>,

        /// Support tier
        #[arg(long, default_value = "mild")]
        tier: DifficultyTier,

        /// Canvas side length in pixels
        #[arg(long, default_value = "300")]
        canvas_size: f64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the built-in tracing levels
    Catalog {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective engine configuration as JSON
    Config,

    /// Diagnose configuration and progress files
    Doctor {
        /// Check a progress history file
        #[arg(long)]
        progress: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one request per line)
    Ndjson,
    /// A single request or a JSON array of requests
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one envelope per line)
    Ndjson,
    /// JSON array of envelopes
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), LexiCliError> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Trace {
            input,
            output,
            input_format,
            output_format,
            history,
            load_progress,
            save_progress,
        } => cmd_trace(
            config,
            &input,
            &output,
            input_format,
            output_format,
            history,
            load_progress.as_deref(),
            save_progress.as_deref(),
        ),

        Commands::Run {
            history,
            load_progress,
            save_progress,
            flush,
        } => cmd_run(
            config,
            history,
            load_progress.as_deref(),
            save_progress.as_deref(),
            flush,
        ),

        Commands::Assess { input, output } => cmd_assess(config, &input, &output),

        Commands::Checkpoints {
            item,
            path,
            tier,
            canvas_size,
            json,
        } => cmd_checkpoints(config, item, path, tier, canvas_size, json),

        Commands::Catalog { json } => cmd_catalog(json),

        Commands::Config => {
            println!("{}", config.to_json()?);
            Ok(())
        }

        Commands::Doctor { progress, json } => cmd_doctor(&config, progress.as_deref(), json),
    }
}

fn new_processor(
    config: EngineConfig,
    history: usize,
    load_progress: Option<&Path>,
) -> Result<LexiProcessor, LexiCliError> {
    let mut processor = LexiProcessor::with_config(config).history_window(history);
    if let Some(progress_path) = load_progress {
        let progress_json = fs::read_to_string(progress_path)?;
        processor.load_progress(&progress_json)?;
    }
    Ok(processor)
}

#[allow(clippy::too_many_arguments)]
fn cmd_trace(
    config: EngineConfig,
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    history: usize,
    load_progress: Option<&Path>,
    save_progress: Option<&Path>,
) -> Result<(), LexiCliError> {
    let input_data = read_input(input)?;

    // Split into one JSON document per request
    let requests: Vec<String> = match input_format {
        InputFormat::Ndjson => input_data
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        InputFormat::Json => match serde_json::from_str::<serde_json::Value>(&input_data)? {
            serde_json::Value::Array(items) => items.iter().map(|v| v.to_string()).collect(),
            single => vec![single.to_string()],
        },
    };

    if requests.is_empty() {
        return Err(LexiCliError::NoRequests);
    }

    let mut processor = new_processor(config, history, load_progress)?;

    let mut envelopes: Vec<ScoreEnvelope> = Vec::with_capacity(requests.len());
    for request in &requests {
        let record = processor.process_trace(request)?;
        envelopes.push(serde_json::from_str(&record)?);
    }
    info!(requests = requests.len(), "trace batch scored");

    if let Some(progress_path) = save_progress {
        fs::write(progress_path, processor.save_progress()?)?;
    }

    write_output(output, &format_output(&envelopes, &output_format)?)
}

fn cmd_run(
    config: EngineConfig,
    history: usize,
    load_progress: Option<&Path>,
    save_progress: Option<&Path>,
    flush: bool,
) -> Result<(), LexiCliError> {
    let mut processor = new_processor(config, history, load_progress)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let record = processor.process_trace(trimmed)?;
        let envelope: ScoreEnvelope = serde_json::from_str(&record)?;
        writeln!(stdout, "{}", serde_json::to_string(&envelope)?)?;
        if flush {
            stdout.flush()?;
        }
    }
    stdout.flush()?;

    if let Some(progress_path) = save_progress {
        fs::write(progress_path, processor.save_progress()?)?;
    }

    Ok(())
}

fn cmd_assess(config: EngineConfig, input: &Path, output: &Path) -> Result<(), LexiCliError> {
    let input_data = read_input(input)?;
    let mut processor = LexiProcessor::with_config(config);
    let record = processor.process_assessment(&input_data)?;

    if atty::is(atty::Stream::Stdout) && output.to_string_lossy() == "-" {
        let envelope: ScoreEnvelope = serde_json::from_str(&record)?;
        print_assessment_summary(&envelope);
        return Ok(());
    }

    write_output(output, &(record + "\n"))
}

fn print_assessment_summary(envelope: &ScoreEnvelope) {
    let lexilearn_core::ScoreRecord::Assessment { summary } = &envelope.record else {
        return;
    };

    println!("Assessment Summary");
    println!("==================");
    for (task, score) in lexilearn_core::TaskId::ALL
        .iter()
        .zip(summary.scores.to_array())
    {
        println!("  {:<40} {:>3}", task.to_string(), score.value());
    }
    println!();
    println!("Overall average: {}", summary.overall_average);
    println!("Support tier:    {} ({})", summary.tier, summary.tier.description());
    println!();
    println!("Learning journey:");
    for (tier, status) in journey(summary.tier) {
        println!("  {:<10} {:?}", tier.label(), status);
    }
}

fn cmd_checkpoints(
    config: EngineConfig,
    item: Option<String>,
    path: Option<String>,
    tier: DifficultyTier,
    canvas_size: f64,
    json: bool,
) -> Result<(), LexiCliError> {
    let extent = config.tracing.path_extent;
    let reference = match (path, item) {
        (Some(data), _) => ReferencePath::parse(&data, extent)?,
        (None, Some(id)) => TracingCatalog::builtin()
            .get(&id)?
            .reference_path(tier, extent)?,
        (None, None) => return Err(LexiCliError::MissingPath),
    };

    let sampler = GeometrySampler::new(config.tracing.clone());
    let checkpoints = sampler.sample(&reference, canvas_size);
    debug!(count = checkpoints.len(), "checkpoints sampled");

    if json {
        println!("{}", serde_json::to_string_pretty(&checkpoints)?);
    } else {
        let corridor = tier.tolerance().corridor_radius(config.tracing.corridor_factor);
        println!("Path:        {}", reference.data());
        println!("Tier:        {}", tier);
        println!("Canvas:      {} px (scale {:.3})", canvas_size, checkpoints.scale());
        println!("Corridor:    {:.1} px", corridor * checkpoints.scale());
        println!("Checkpoints: {}", checkpoints.len());
        for (i, checkpoint) in checkpoints.iter().enumerate() {
            println!(
                "  {:>3}  ({:>7.2}, {:>7.2})",
                i, checkpoint.position.x, checkpoint.position.y
            );
        }
    }

    Ok(())
}

fn cmd_catalog(json: bool) -> Result<(), LexiCliError> {
    let catalog = TracingCatalog::builtin();

    if json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    println!("Tracing Levels");
    println!("==============");
    for item in catalog.items() {
        println!("{} - {}", item.id, item.label);
        for tier in DifficultyTier::ALL {
            if let Some(variant) = item.variant(tier) {
                println!("  {:<10} {:<14} {}", tier.label(), variant.label, variant.path_data);
            }
        }
    }

    Ok(())
}

fn cmd_doctor(
    config: &EngineConfig,
    progress: Option<&Path>,
    json: bool,
) -> Result<(), LexiCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("LexiLearn Core version {}", ENGINE_VERSION),
    });

    checks.push(match config.validate() {
        Ok(()) => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "Configuration valid (reveal {} ms, spacing {})",
                config.assessment.memory_reveal_ms, config.tracing.checkpoint_spacing
            ),
        },
        Err(e) => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Error,
            message: e.to_string(),
        },
    });

    // Every built-in path must parse
    let catalog = TracingCatalog::builtin();
    let broken: Vec<String> = catalog
        .items()
        .iter()
        .flat_map(|item| {
            DifficultyTier::ALL.into_iter().filter_map(move |tier| {
                item.reference_path(tier, config.tracing.path_extent)
                    .err()
                    .map(|e| format!("{} ({}): {}", item.id, tier, e))
            })
        })
        .collect();
    checks.push(if broken.is_empty() {
        DoctorCheck {
            name: "catalog".to_string(),
            status: CheckStatus::Ok,
            message: format!("{} built-in levels parse", catalog.len()),
        }
    } else {
        DoctorCheck {
            name: "catalog".to_string(),
            status: CheckStatus::Error,
            message: broken.join("; "),
        }
    });

    if let Some(progress_path) = progress {
        if progress_path.exists() {
            let check = match fs::read_to_string(progress_path) {
                Ok(content) => {
                    let mut processor = LexiProcessor::new();
                    match processor.load_progress(&content) {
                        Ok(()) => DoctorCheck {
                            name: "progress".to_string(),
                            status: CheckStatus::Ok,
                            message: format!(
                                "Progress file valid ({} records, average {})",
                                processor.progress().len(),
                                processor
                                    .progress()
                                    .average_score()
                                    .map(|avg| avg.to_string())
                                    .unwrap_or_else(|| "n/a".to_string())
                            ),
                        },
                        Err(e) => DoctorCheck {
                            name: "progress".to_string(),
                            status: CheckStatus::Error,
                            message: format!("Invalid progress JSON: {}", e),
                        },
                    }
                }
                Err(e) => DoctorCheck {
                    name: "progress".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read progress file: {}", e),
                },
            };
            checks.push(check);
        } else {
            checks.push(DoctorCheck {
                name: "progress".to_string(),
                status: CheckStatus::Warning,
                message: "Progress file does not exist".to_string(),
            });
        }
    }

    let stdin_message = if atty::is(atty::Stream::Stdin) {
        "stdin is a TTY (interactive mode)"
    } else {
        "stdin is a pipe (streaming mode ready)"
    };
    checks.push(DoctorCheck {
        name: "stdin".to_string(),
        status: CheckStatus::Ok,
        message: stdin_message.to_string(),
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Lexi Doctor Report");
        println!("==================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(LexiCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(input: &Path) -> Result<String, LexiCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &Path, data: &str) -> Result<(), LexiCliError> {
    if output.to_string_lossy() == "-" {
        print!("{}", data);
        io::stdout().flush()?;
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn format_output(
    envelopes: &[ScoreEnvelope],
    format: &OutputFormat,
) -> Result<String, LexiCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for envelope in envelopes {
                lines.push(serde_json::to_string(envelope)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(envelopes)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(envelopes)?),
    }
}

// Error types

#[derive(Debug)]
enum LexiCliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    NoRequests,
    MissingPath,
    DoctorFailed,
}

impl From<io::Error> for LexiCliError {
    fn from(e: io::Error) -> Self {
        LexiCliError::Io(e)
    }
}

impl From<EngineError> for LexiCliError {
    fn from(e: EngineError) -> Self {
        LexiCliError::Engine(e)
    }
}

impl From<serde_json::Error> for LexiCliError {
    fn from(e: serde_json::Error) -> Self {
        LexiCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<LexiCliError> for CliError {
    fn from(e: LexiCliError) -> Self {
        match e {
            LexiCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            LexiCliError::Engine(e) => {
                let (code, hint) = match &e {
                    EngineError::PathSyntax { .. } => {
                        ("PATH_ERROR", "Path data must be SVG path commands starting with M")
                    }
                    EngineError::UnknownItem(_) => {
                        ("UNKNOWN_ITEM", "Run 'lexi catalog' for the available levels")
                    }
                    EngineError::ConfigError(_) => {
                        ("CONFIG_ERROR", "Check the configuration and request fields")
                    }
                    _ => ("ENGINE_ERROR", "Check input format"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            LexiCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            LexiCliError::NoRequests => CliError {
                code: "NO_REQUESTS".to_string(),
                message: "No requests found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            LexiCliError::MissingPath => CliError {
                code: "MISSING_PATH".to_string(),
                message: "Neither --item nor --path was given".to_string(),
                hint: Some("Pass --item t1 or --path 'M 0,0 L 100,100'".to_string()),
            },
            LexiCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
