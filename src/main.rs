//! spow - Main Application
//!
//! Command line front end: build, verify and size sequential proof-of-work
//! certificates.

use spow::{
    analysis::{measure_hash_rate, ParameterAnalysis},
    config::ConfigArgs,
    logging::{init_logging, LogFormat, LogLevel},
    utils::{format_duration, format_hash_rate},
    Certificate, Config, Error, HashRate, Proof, Prover, Result, Verdict, Verifier, APP_NAME,
    APP_VERSION, DIGEST_SIZE, TOKEN_SIZE,
};

use clap::{Parser, Subcommand, ValueEnum};
use rand::Rng;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Sequential proof-of-work certificates
#[derive(Debug, Parser)]
#[command(name = APP_NAME, version, about, long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info, env = "SPOW_LOG_LEVEL", global = true)]
    log_level: LogLevel,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, env = "SPOW_LOG_FORMAT", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a certificate
    Prove {
        #[command(flatten)]
        config: ConfigArgs,

        /// How to print the certificate
        #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Escaped)]
        output: OutputFormat,

        /// Also write the raw certificate bytes to this file
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
    },

    /// Check a certificate
    Verify {
        #[command(flatten)]
        config: ConfigArgs,

        /// Certificate as hex or \x-escaped bytes
        #[arg(required_unless_present = "certificate_file")]
        certificate: Option<String>,

        /// Read the raw certificate bytes from a file instead
        #[arg(long, value_name = "FILE", conflicts_with = "certificate")]
        certificate_file: Option<PathBuf>,

        /// Print every replayed step
        #[arg(long)]
        replay: bool,
    },

    /// Estimate cost and failure probability of a configuration
    Analyze {
        #[command(flatten)]
        config: ConfigArgs,

        /// Hash rate to estimate wall time for, e.g. 2.5M
        #[arg(long, value_name = "RATE")]
        hash_rate: Option<HashRate>,

        /// Measure the local hash rate over this many hashes
        #[arg(long, value_name = "SAMPLES", conflicts_with = "hash_rate")]
        measure: Option<u64>,
    },

    /// Print a fresh random initial digest and domain token
    Generate,

    /// Print the resolved configuration
    PrintConfig {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

/// Certificate output encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// `\xAB` escapes
    Escaped,
    /// Plain lowercase hex
    Hex,
    /// JSON report with statistics
    Json,
}

/// Machine-readable construction result
#[derive(Debug, Serialize)]
struct ProofReport<'a> {
    config: &'a Config,
    certificate: String,
    total_hashes: u64,
    final_digest: String,
    elapsed_ms: u64,
    hash_rate: f64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.log_format);

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            error!(category = e.category(), "{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Prove {
            config,
            output,
            save,
        } => {
            let config = config.load().await?;
            run_prove(config, output, save).await
        }
        Command::Verify {
            config,
            certificate,
            certificate_file,
            replay,
        } => {
            let config = config.load().await?;
            let certificate = match (certificate, certificate_file) {
                (_, Some(path)) => Certificate::from_bytes(tokio::fs::read(&path).await?),
                (Some(text), None) => Certificate::parse(&text)?,
                (None, None) => return Err(Error::encoding("no certificate given")),
            };
            Ok(run_verify(&config, &certificate, replay))
        }
        Command::Analyze {
            config,
            hash_rate,
            measure,
        } => {
            let config = config.load().await?;
            run_analyze(&config, hash_rate, measure).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Generate => {
            generate_and_print_parameters();
            Ok(ExitCode::SUCCESS)
        }
        Command::PrintConfig { config } => {
            let config = config.load().await?;
            print_configuration(&config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Run the prover off the async runtime so Ctrl-C can cancel it
async fn run_prove(config: Config, output: OutputFormat, save: Option<PathBuf>) -> Result<ExitCode> {
    info!("Starting {} v{}", APP_NAME, APP_VERSION);
    info!(
        "Configuration: difficulty={}, safety={}, steps={}, algorithm={}",
        config.difficulty(),
        config.safety(),
        config.steps(),
        config.algorithm()
    );

    let cancellation = CancellationToken::new();
    let worker_cancellation = cancellation.clone();
    let worker_config = config.clone();
    let mut task = tokio::task::spawn_blocking(move || {
        Prover::new(&worker_config)
            .with_cancellation(worker_cancellation)
            .prove()
    });

    let result = tokio::select! {
        joined = &mut task => joined?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, stopping construction");
            cancellation.cancel();
            task.await?
        }
    };

    match result {
        Ok(proof) => {
            info!(
                "Construction took {} at {}",
                format_duration(proof.elapsed),
                format_hash_rate(proof.hash_rate())
            );
            if let Some(path) = save {
                tokio::fs::write(&path, proof.certificate.as_bytes()).await?;
                info!("Certificate written to {}", path.display());
            }
            print_proof(&config, &proof, output)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(Error::Exhausted { step, .. }) => {
            println!("Failed in step {}", step);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e),
    }
}

fn print_proof(config: &Config, proof: &Proof, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Escaped => {
            println!("Certificate found after {} hashes:", proof.total_hashes);
            println!("{}", proof.certificate.to_escaped());
        }
        OutputFormat::Hex => {
            println!("Certificate found after {} hashes:", proof.total_hashes);
            println!("{}", proof.certificate.to_hex());
        }
        OutputFormat::Json => {
            let report = ProofReport {
                config,
                certificate: proof.certificate.to_hex(),
                total_hashes: proof.total_hashes,
                final_digest: proof.final_digest.to_hex(),
                elapsed_ms: proof.elapsed.as_millis() as u64,
                hash_rate: proof.hash_rate(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn run_verify(config: &Config, certificate: &Certificate, replay: bool) -> ExitCode {
    let mut verifier = Verifier::new(config);

    if replay {
        if let Ok(steps) = verifier.replay(certificate.as_bytes()) {
            for step in steps {
                println!(
                    "step {:>5}: nonce={} digest={} {}",
                    step.step,
                    step.nonce,
                    step.digest,
                    if step.passed { "ok" } else { "FAIL" }
                );
            }
        }
    }

    let verdict = verifier.verify(certificate.as_bytes());
    println!("{}", verdict);
    match verdict {
        Verdict::Accept => ExitCode::SUCCESS,
        Verdict::Reject(_) => ExitCode::FAILURE,
    }
}

async fn run_analyze(config: &Config, hash_rate: Option<HashRate>, measure: Option<u64>) -> Result<()> {
    let analysis = ParameterAnalysis::of(config);

    println!("Difficulty:        {} bits", analysis.difficulty);
    println!("Safety margin:     {} bits", analysis.safety);
    println!("Steps:             {}", analysis.steps);
    println!("Bits per step:     {}", analysis.nonce_bits);
    println!("Certificate size:  {} bytes", analysis.certificate_len);
    println!("Search space/step: 2^{}", analysis.nonce_bits);
    println!("Expected hashes:   {:.0}", analysis.expected_hashes);
    println!("Failure bound:     2^{:.2}", analysis.failure_bound_log2);
    if analysis.failure_bound_log2 >= 0.0 {
        warn!("Safety margin too small: construction is likely to fail");
    }

    let rate = match (hash_rate, measure) {
        (Some(rate), _) => Some(rate),
        (None, Some(samples)) => {
            let algorithm = config.algorithm();
            let rate =
                tokio::task::spawn_blocking(move || measure_hash_rate(algorithm, samples)).await?;
            Some(rate)
        }
        (None, None) => None,
    };

    if let Some(rate) = rate {
        println!("Hash rate:         {}", rate);
        println!(
            "Expected time:     {}",
            format_duration(analysis.estimated_duration(rate))
        );
    }

    Ok(())
}

/// Generate and print a fresh initial digest and domain token
fn generate_and_print_parameters() {
    let mut rng = rand::rng();
    let mut digest = [0u8; DIGEST_SIZE];
    let mut token = [0u8; TOKEN_SIZE];
    rng.fill(&mut digest);
    rng.fill(&mut token);

    println!("initial_digest: {}", hex::encode(digest));
    println!("token: {}", hex::encode(token));
}

/// Print current configuration
fn print_configuration(config: &Config) -> Result<()> {
    let config_yaml = serde_yaml::to_string(config)?;
    println!("{}", config_yaml);
    Ok(())
}
