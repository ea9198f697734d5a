//! Vitality CLI - Command-line interface for Synheart Vitality
//!
//! Commands:
//! - compute: Score snapshots into vitality states (batch mode)
//! - run: Score snapshots from stdin as they arrive (streaming mode)
//! - validate: Range-check snapshots
//! - doctor: Diagnose scoring tables and configuration
//! - schema: Print input/output schema information

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use synheart_vitality::classifier::{classify, STATE_BANDS};
use synheart_vitality::encoder::{VitalityEncoder, PAYLOAD_SCHEMA_VERSION};
use synheart_vitality::pillars::factor_table;
use synheart_vitality::schema::{SnapshotAdapter, SNAPSHOT_SCHEMA_VERSION};
use synheart_vitality::types::Pillar;
use synheart_vitality::{
    calculate_vitality_state, HealthSignalSnapshot, VitalityLevel, VitalityProcessor,
    PRODUCER_NAME, VITALITY_VERSION,
};

/// Vitality - On-device vitality scoring for personal health signals
#[derive(Parser)]
#[command(name = "vitality")]
#[command(author = "Synheart AI Inc")]
#[command(version = VITALITY_VERSION)]
#[command(about = "Reduce health-signal snapshots to vitality states", long_about = None)]
struct Cli {
    /// Log filter (overridden by RUST_LOG), e.g. "debug" or "synheart_vitality=trace"
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score snapshots into vitality states (batch mode)
    Compute {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Wrap each state in a payload with producer and coverage metadata
        #[arg(long)]
        envelope: bool,
    },

    /// Score snapshots from stdin as they arrive (streaming mode)
    Run {
        /// Wrap each state in a payload with producer and coverage metadata
        #[arg(long)]
        envelope: bool,

        /// Flush output after each record
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Range-check snapshots
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose scoring tables and configuration
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one snapshot per line)
    Ndjson,
    /// JSON array of snapshots
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (vitality.snapshot.v1)
    Input,
    /// Output schema (vitality.state.v1)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

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

/// Install a stderr subscriber so stdout stays machine-readable
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .try_init();
}

fn run(cli: Cli) -> Result<(), VitalityCliError> {
    match cli.command {
        Commands::Compute {
            input,
            output,
            input_format,
            output_format,
            envelope,
        } => cmd_compute(&input, &output, input_format, output_format, envelope),

        Commands::Run { envelope, flush } => cmd_run(envelope, flush),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor { json } => cmd_doctor(json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_compute(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    envelope: bool,
) -> Result<(), VitalityCliError> {
    let snapshots = read_snapshots(input, &input_format)?;

    if snapshots.is_empty() {
        return Err(VitalityCliError::NoSnapshots);
    }

    tracing::info!(count = snapshots.len(), "scoring snapshots");

    let encoder = VitalityEncoder::new();
    let mut records: Vec<serde_json::Value> = Vec::with_capacity(snapshots.len());

    for snapshot in &snapshots {
        let state = calculate_vitality_state(snapshot);
        let record = if envelope {
            serde_json::to_value(encoder.encode(&state))?
        } else {
            serde_json::to_value(&state)?
        };
        records.push(record);
    }

    let output_data = format_output(&records, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_run(envelope: bool, flush: bool) -> Result<(), VitalityCliError> {
    let processor = VitalityProcessor::new();
    let encoder = VitalityEncoder::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for (line_num, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let snapshot = SnapshotAdapter::parse_line(trimmed).map_err(|e| {
            VitalityCliError::ParseError(format!("Failed to parse line {}: {}", line_num + 1, e))
        })?;

        // Lines are handled in order, so every result is the latest
        let Some(state) = processor.process(&snapshot) else {
            continue;
        };

        let record = if envelope {
            serde_json::to_string(&encoder.encode(&state))?
        } else {
            serde_json::to_string(&state)?
        };

        writeln!(stdout, "{}", record)?;
        if flush {
            stdout.flush()?;
        }
    }

    stdout.flush()?;
    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    json: bool,
) -> Result<(), VitalityCliError> {
    let snapshots = read_snapshots(input, &input_format)?;

    let results = SnapshotAdapter::validate_snapshots(&snapshots);

    let report = ValidationReport {
        total_snapshots: snapshots.len(),
        valid_snapshots: snapshots.len() - results.len(),
        invalid_snapshots: results.len(),
        errors: results
            .iter()
            .flat_map(|r| {
                r.errors.iter().map(move |e| ValidationErrorDetail {
                    index: r.index,
                    error: e.to_string(),
                })
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total snapshots:   {}", report.total_snapshots);
        println!("Valid snapshots:   {}", report.valid_snapshots);
        println!("Invalid snapshots: {}", report.invalid_snapshots);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Snapshot {}: {}", err.index, err.error);
            }
        }
    }

    if report.invalid_snapshots > 0 {
        Err(VitalityCliError::ValidationFailed(report.invalid_snapshots))
    } else {
        Ok(())
    }
}

fn cmd_doctor(json: bool) -> Result<(), VitalityCliError> {
    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: VITALITY_VERSION.to_string(),
        checks: doctor_checks(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Vitality Doctor Report");
        println!("======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    if report.has_errors() {
        Err(VitalityCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn doctor_checks() -> Vec<DoctorCheck> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "vitality_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Vitality version {}", VITALITY_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!(
            "Input schema: {}, output schema: {}",
            SNAPSHOT_SCHEMA_VERSION, PAYLOAD_SCHEMA_VERSION
        ),
    });

    // Pillar weights
    let pillar_total: f64 = Pillar::ALL.iter().map(|p| p.weight()).sum();
    checks.push(weight_check("pillar_weights", pillar_total));

    // Factor weights per pillar
    for pillar in Pillar::ALL {
        let total: f64 = factor_table(pillar).iter().map(|f| f.weight()).sum();
        checks.push(weight_check(&format!("{}_factor_weights", pillar.as_str()), total));
    }

    // Band coverage, including the inclusive upper bound
    let bands_ok = classify(0.0) == VitalityLevel::Recovering
        && STATE_BANDS
            .iter()
            .all(|band| classify(f64::from(band.low)) == band.level)
        && classify(100.0) == VitalityLevel::Primed;
    checks.push(DoctorCheck {
        name: "state_bands".to_string(),
        status: if bands_ok {
            CheckStatus::Ok
        } else {
            CheckStatus::Error
        },
        message: format!("{} bands covering [0, 100]", STATE_BANDS.len()),
    });

    // Empty snapshot contract
    let empty = calculate_vitality_state(&HealthSignalSnapshot::default());
    let empty_ok = empty.score == 50 && empty.overall.name == VitalityLevel::Balanced;
    checks.push(DoctorCheck {
        name: "empty_snapshot".to_string(),
        status: if empty_ok {
            CheckStatus::Ok
        } else {
            CheckStatus::Error
        },
        message: format!(
            "Empty snapshot scores {} ({})",
            empty.score,
            empty.overall.name.as_str()
        ),
    });

    // Check stdin is available (for streaming mode)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    checks
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), VitalityCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {}", SNAPSHOT_SCHEMA_VERSION);
                println!();
                println!("Every field is optional; a missing record means \"no data\".");
                println!();
                println!("- sleep: {{ duration (minutes), quality (0-100) }}");
                println!("- hrv: {{ readiness (0-100) | rmssd (ms) }}");
                println!("- activity: {{ steps, activeMinutes }}");
                println!("- mindfulness: {{ sessions }}");
                println!("- breathing: {{ sessions }}");
                println!("- nutrition: {{ mealsLogged, waterIntake }}");
                println!("- mood: 1-5");
                println!("- social: {{ socialWellnessScore | interactions, uniqueContacts }}");
                println!("- stress: 0-10");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: {}", PAYLOAD_SCHEMA_VERSION);
                println!();
                println!("- overall: {{ name, color, gradient, message, focus }}");
                println!("- score: 0-100 (rounded), overallScore: unrounded");
                println!("- pillars: {{ recovery, resilience, fuel }}");
                println!("  - each: {{ score, weight, factors }}");
                println!("  - factors: {{ name: {{ score, weight, label }} }}");
                println!("- insights: {{ primary, focus, recommendations,");
                println!("              pillarsNeedingAttention }}");
                println!("- timestamp");
                println!();
                println!("With --envelope:");
                println!("  {{ schemaVersion, producer, computedAtUtc, coverage, state }}");
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_snapshots(
    input: &Path,
    input_format: &InputFormat,
) -> Result<Vec<HealthSignalSnapshot>, VitalityCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let snapshots = match input_format {
        InputFormat::Ndjson => SnapshotAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => SnapshotAdapter::parse_array(&input_data)?,
    };
    Ok(snapshots)
}

fn format_output(
    records: &[serde_json::Value],
    format: &OutputFormat,
) -> Result<String, VitalityCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for record in records {
                lines.push(serde_json::to_string(record)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(records)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(records)?),
    }
}

fn weight_check(name: &str, total: f64) -> DoctorCheck {
    let ok = (total - 1.0).abs() < 1e-9;
    DoctorCheck {
        name: name.to_string(),
        status: if ok {
            CheckStatus::Ok
        } else {
            CheckStatus::Error
        },
        message: format!("Weights sum to {:.4}", total),
    }
}

fn get_input_json_schema() -> String {
    let count = serde_json::json!({ "type": "number", "minimum": 0 });
    let practice = serde_json::json!({
        "type": "object",
        "properties": { "sessions": count }
    });

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://synheart.ai/schemas/vitality.snapshot.v1.json",
        "title": SNAPSHOT_SCHEMA_VERSION,
        "description": "Synheart vitality health-signal snapshot",
        "type": "object",
        "properties": {
            "sleep": {
                "type": "object",
                "properties": {
                    "duration": { "type": "number", "description": "minutes" },
                    "quality": { "type": "number", "minimum": 0, "maximum": 100 }
                }
            },
            "hrv": {
                "type": "object",
                "properties": {
                    "readiness": { "type": "number", "minimum": 0, "maximum": 100 },
                    "rmssd": { "type": "number", "minimum": 0 }
                }
            },
            "activity": {
                "type": "object",
                "properties": {
                    "steps": count,
                    "activeMinutes": { "type": "number", "minimum": 0 }
                }
            },
            "mindfulness": practice,
            "breathing": practice,
            "nutrition": {
                "type": "object",
                "properties": {
                    "mealsLogged": count,
                    "waterIntake": { "type": "number", "minimum": 0 }
                }
            },
            "mood": { "type": "number", "minimum": 1, "maximum": 5 },
            "social": {
                "type": "object",
                "properties": {
                    "socialWellnessScore": { "type": "number", "minimum": 0, "maximum": 100 },
                    "interactions": count,
                    "uniqueContacts": count
                }
            },
            "stress": { "type": "number", "minimum": 0, "maximum": 10 }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    let score = serde_json::json!({ "type": "number", "minimum": 0, "maximum": 100 });
    let pillar = serde_json::json!({
        "type": "object",
        "required": ["score", "factors", "weight"],
        "properties": {
            "score": score,
            "weight": { "type": "number" },
            "factors": { "type": "object" }
        }
    });

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://synheart.ai/schemas/vitality.state.v1.json",
        "title": PAYLOAD_SCHEMA_VERSION,
        "description": "Synheart vitality state",
        "type": "object",
        "required": ["overall", "score", "pillars", "insights", "timestamp"],
        "properties": {
            "overall": {
                "type": "object",
                "properties": {
                    "name": { "enum": ["recovering", "balanced", "primed"] },
                    "color": { "type": "string" },
                    "gradient": { "type": "array", "items": { "type": "string" } },
                    "message": { "type": "string" },
                    "focus": { "type": "string" }
                }
            },
            "score": { "type": "integer", "minimum": 0, "maximum": 100 },
            "overallScore": score,
            "pillars": {
                "type": "object",
                "properties": {
                    "recovery": pillar,
                    "resilience": pillar,
                    "fuel": pillar
                }
            },
            "insights": {
                "type": "object",
                "properties": {
                    "primary": { "type": "string" },
                    "focus": { "type": "string" },
                    "recommendations": { "type": "array", "items": { "type": "string" } },
                    "pillarsNeedingAttention": { "type": "array", "items": { "type": "object" } }
                }
            },
            "timestamp": { "type": "string", "format": "date-time" }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum VitalityCliError {
    Io(io::Error),
    Compute(synheart_vitality::ComputeError),
    Json(serde_json::Error),
    NoSnapshots,
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for VitalityCliError {
    fn from(e: io::Error) -> Self {
        VitalityCliError::Io(e)
    }
}

impl From<synheart_vitality::ComputeError> for VitalityCliError {
    fn from(e: synheart_vitality::ComputeError) -> Self {
        VitalityCliError::Compute(e)
    }
}

impl From<serde_json::Error> for VitalityCliError {
    fn from(e: serde_json::Error) -> Self {
        VitalityCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<VitalityCliError> for CliError {
    fn from(e: VitalityCliError) -> Self {
        match e {
            VitalityCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            VitalityCliError::Compute(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Ensure input matches {} schema", SNAPSHOT_SCHEMA_VERSION)),
            },
            VitalityCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            VitalityCliError::NoSnapshots => CliError {
                code: "NO_SNAPSHOTS".to_string(),
                message: "No snapshots found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            VitalityCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} snapshots failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            VitalityCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            VitalityCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct ValidationReport {
    total_snapshots: usize,
    valid_snapshots: usize,
    invalid_snapshots: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(Serialize)]
struct ValidationErrorDetail {
    index: usize,
    error: String,
}

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    fn has_errors(&self) -> bool {
        self.checks
            .iter()
            .any(|c| matches!(c.status, CheckStatus::Error))
    }
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Error,
}
