//! Pulse CLI - Command-line interface for Synheart Pulse
//!
//! Commands:
//! - analyze: Decode a mono WAV recording and report heart rate and anomalies
//! - synth: Write a synthetic pulse recording for smoke testing
//! - config: Print the effective pipeline configuration
//! - doctor: Diagnose configuration and pipeline health

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use synheart_pulse::decoder::{decode_wav_reader, write_wav};
use synheart_pulse::encoder::{Provenance, PulseReport, ReportEncoder};
use synheart_pulse::pipeline::PulseProcessor;
use synheart_pulse::synth::synth_pulse;
use synheart_pulse::{PipelineConfig, PRODUCER_NAME, PULSE_VERSION};

/// Pulse - On-device heart rate extraction from pulse audio
#[derive(Parser)]
#[command(name = "pulse")]
#[command(author = "Synheart AI Inc")]
#[command(version = PULSE_VERSION)]
#[command(about = "Estimate heart rate and rhythm anomalies from pulse recordings", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a mono 16-bit WAV recording
    Analyze {
        /// Input WAV file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format (defaults to text on a terminal, json otherwise)
        #[arg(long)]
        format: Option<OutputFormat>,

        #[command(flatten)]
        tuning: TuningArgs,

        /// Include the filtered signal in JSON output
        #[arg(long)]
        include_signal: bool,
    },

    /// Write a synthetic pulse recording
    Synth {
        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,

        /// Heart rate of the synthetic pulse
        #[arg(long, default_value = "72")]
        bpm: f64,

        /// Recording length in seconds
        #[arg(long, default_value = "10")]
        seconds: f64,

        /// Sampling rate in Hz
        #[arg(long, default_value = "1000")]
        sample_rate: u32,

        /// Relative beat-to-beat interval variation (0 = perfectly regular)
        #[arg(long, default_value = "0.0")]
        jitter: f64,
    },

    /// Print the effective pipeline configuration
    Config {
        #[command(flatten)]
        tuning: TuningArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and pipeline health
    Doctor {
        /// Configuration file to check
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct TuningArgs {
    /// Load pipeline configuration from a JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lower passband edge in Hz
    #[arg(long)]
    low_hz: Option<f64>,

    /// Upper passband edge in Hz
    #[arg(long)]
    high_hz: Option<f64>,

    /// Peak threshold relative to the signal maximum
    #[arg(long)]
    threshold: Option<f64>,

    /// Minimum samples between peaks (0 = 200 ms refractory period)
    #[arg(long)]
    min_distance: Option<usize>,
}

impl TuningArgs {
    fn resolve(&self) -> Result<PipelineConfig, PulseCliError> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(v) = self.low_hz {
            config.low_hz = v;
        }
        if let Some(v) = self.high_hz {
            config.high_hz = v;
        }
        if let Some(v) = self.threshold {
            config.relative_threshold = v;
        }
        if let Some(v) = self.min_distance {
            config.min_distance = v;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Compact JSON report
    Json,
    /// Pretty-printed JSON report
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // Logs go to stderr so stdout stays machine-readable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<(), PulseCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            format,
            tuning,
            include_signal,
        } => cmd_analyze(&input, &output, format, &tuning, include_signal),

        Commands::Synth {
            output,
            bpm,
            seconds,
            sample_rate,
            jitter,
        } => cmd_synth(&output, bpm, seconds, sample_rate, jitter),

        Commands::Config { tuning, json } => cmd_config(&tuning, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    format: Option<OutputFormat>,
    tuning: &TuningArgs,
    include_signal: bool,
) -> Result<(), PulseCliError> {
    let config = tuning.resolve()?;
    let processor = PulseProcessor::with_config(config)?
        .with_encoder(ReportEncoder::new().with_signal(include_signal));

    // Decode failures abort here; an unusable signal still yields a report
    let (signal, result) = if input.to_string_lossy() == "-" {
        let signal = decode_wav_reader(io::stdin().lock()).map_err(PulseCliError::Decode)?;
        let result = processor.analyze(&signal)?;
        (signal, result)
    } else {
        processor.analyze_wav(input).map_err(PulseCliError::Decode)?
    };
    info!(
        input = %input.display(),
        samples = signal.len(),
        bpm = result.rate.bpm,
        "analysis complete"
    );

    let source = input.to_string_lossy();
    let provenance = Provenance::for_signal(&source, &signal, result.padded_len);
    let report = processor.encoder().encode(&result, &provenance);

    let to_stdout = output.to_string_lossy() == "-";
    let format = format.unwrap_or_else(|| {
        if to_stdout && atty::is(atty::Stream::Stdout) {
            OutputFormat::Text
        } else {
            OutputFormat::Json
        }
    });

    let rendered = match format {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => serde_json::to_string(&report)? + "\n",
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&report)? + "\n",
    };

    if to_stdout {
        print!("{}", rendered);
    } else {
        fs::write(output, rendered)?;
    }

    Ok(())
}

fn render_text(report: &PulseReport) -> String {
    let mut out = String::new();
    out.push_str("Pulse Report\n");
    out.push_str("============\n");
    out.push_str(&format!("Source:       {}\n", report.provenance.source));
    out.push_str(&format!(
        "Samples:      {} @ {} Hz (padded to {})\n",
        report.provenance.sample_count, report.provenance.sample_rate_hz, report.provenance.padded_len
    ));
    out.push_str(&format!("Duration:     {:.2} s\n", report.provenance.duration_s));
    out.push_str(&format!("Peaks:        {}\n", report.rate.peak_indices.len()));
    out.push_str(&format!("Average BPM:  {:.1}\n", report.rate.bpm));
    out.push_str(&format!("RR intervals: {}\n", report.rate.interval_count));
    out.push_str(&format!("SDNN:         {:.3} s\n", report.rate.sdnn_s));

    if !report.quality_flags.is_empty() {
        let flags: Vec<String> = report
            .quality_flags
            .iter()
            .map(|f| format!("{f:?}"))
            .collect();
        out.push_str(&format!("Quality:      {}\n", flags.join(", ")));
    }

    out.push_str("\nAlerts:\n");
    for alert in &report.anomalies.alerts {
        out.push_str(&format!("  - {}\n", alert));
    }
    out
}

fn cmd_synth(
    output: &Path,
    bpm: f64,
    seconds: f64,
    sample_rate: u32,
    jitter: f64,
) -> Result<(), PulseCliError> {
    if !(bpm > 0.0) || !(seconds > 0.0) || sample_rate == 0 {
        return Err(PulseCliError::InvalidArgument(
            "bpm, seconds and sample-rate must be positive".to_string(),
        ));
    }

    let signal = synth_pulse(bpm, seconds, sample_rate as f64, jitter);
    write_wav(output, &signal)?;
    debug!(path = %output.display(), samples = signal.len(), "wrote synthetic recording");
    Ok(())
}

fn cmd_config(tuning: &TuningArgs, json: bool) -> Result<(), PulseCliError> {
    let config = tuning.resolve()?;

    if json {
        println!("{}", config.to_json()?);
    } else {
        println!("Pipeline Configuration");
        println!("======================");
        println!("Passband:           {} - {} Hz", config.low_hz, config.high_hz);
        println!("Relative threshold: {}", config.relative_threshold);
        if config.min_distance == 0 {
            println!("Min peak distance:  auto (200 ms)");
        } else {
            println!("Min peak distance:  {} samples", config.min_distance);
        }
    }
    Ok(())
}

fn cmd_doctor(config_path: Option<&Path>, json: bool) -> Result<(), PulseCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    // Check Pulse version
    checks.push(DoctorCheck {
        name: "pulse_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Pulse version {}", PULSE_VERSION),
    });

    // Check configuration file if provided
    let mut config = PipelineConfig::default();
    if let Some(path) = config_path {
        if path.exists() {
            match PipelineConfig::from_file(path) {
                Ok(loaded) => {
                    config = loaded;
                    checks.push(DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Configuration valid ({} - {} Hz, threshold {})",
                            config.low_hz, config.high_hz, config.relative_threshold
                        ),
                    });
                }
                Err(e) => {
                    checks.push(DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid configuration: {}", e),
                    });
                }
            }
        } else {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Configuration file does not exist".to_string(),
            });
        }
    }

    // Run the pipeline on a known 72 BPM recording
    let self_test = match PulseProcessor::with_config(config)
        .and_then(|p| p.analyze(&synth_pulse(72.0, 10.0, 500.0, 0.0)))
    {
        Ok(output) if (output.rate.bpm - 72.0).abs() < 3.0 => DoctorCheck {
            name: "self_test".to_string(),
            status: CheckStatus::Ok,
            message: format!("Synthetic 72 BPM recording measured {:.1} BPM", output.rate.bpm),
        },
        Ok(output) => DoctorCheck {
            name: "self_test".to_string(),
            status: CheckStatus::Warning,
            message: format!(
                "Synthetic 72 BPM recording measured {:.1} BPM with this configuration",
                output.rate.bpm
            ),
        },
        Err(e) => DoctorCheck {
            name: "self_test".to_string(),
            status: CheckStatus::Error,
            message: format!("Pipeline failed: {}", e),
        },
    };
    checks.push(self_test);

    // Check stdout (text reports default to terminals)
    let stdout_check = if atty::is(atty::Stream::Stdout) {
        DoctorCheck {
            name: "stdout".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is a TTY (text reports by default)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdout".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is a pipe (JSON reports by default)".to_string(),
        }
    };
    checks.push(stdout_check);

    // Check stdin (analyze --input - reads a WAV stream from it)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass recordings with --input)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (analyze --input - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: PULSE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Pulse Doctor Report");
        println!("===================");
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

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(PulseCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum PulseCliError {
    Io(io::Error),
    Decode(synheart_pulse::ComputeError),
    Compute(synheart_pulse::ComputeError),
    Json(serde_json::Error),
    InvalidArgument(String),
    DoctorFailed,
}

impl From<io::Error> for PulseCliError {
    fn from(e: io::Error) -> Self {
        PulseCliError::Io(e)
    }
}

impl From<synheart_pulse::ComputeError> for PulseCliError {
    fn from(e: synheart_pulse::ComputeError) -> Self {
        PulseCliError::Compute(e)
    }
}

impl From<serde_json::Error> for PulseCliError {
    fn from(e: serde_json::Error) -> Self {
        PulseCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PulseCliError> for CliError {
    fn from(e: PulseCliError) -> Self {
        match e {
            PulseCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PulseCliError::Decode(e) => CliError {
                code: "DECODE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Input must be a mono 16-bit PCM WAV file".to_string()),
            },
            PulseCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'pulse config' to inspect the effective configuration".to_string()),
            },
            PulseCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            PulseCliError::InvalidArgument(message) => CliError {
                code: "INVALID_ARGUMENT".to_string(),
                message,
                hint: Some("Run 'pulse synth --help' for usage".to_string()),
            },
            PulseCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report above".to_string()),
            },
        }
    }
}

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
