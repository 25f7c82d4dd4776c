use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use noderisk::config::{AppConfig, LogFormat};
use noderisk::metrics::Sample;

#[derive(Parser)]
#[command(
    name = "noderisk",
    about = "Predictive health scoring for monitored nodes",
    version,
    long_about = None
)]
struct Cli {
    /// Path to a TOML config file (an unreadable file is an error)
    #[arg(long, global = true, env = "NODERISK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API (sample ingest + per-node predictions)
    Serve {
        /// Bind address (defaults to server.listen_address)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Score a node history read from a JSON file
    Predict {
        /// JSON array of samples, or an object with a "samples" array
        #[arg(long)]
        input: PathBuf,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

/// Accepted layouts of a history file.
#[derive(Deserialize)]
#[serde(untagged)]
enum HistoryFile {
    Bare(Vec<Sample>),
    Wrapped { samples: Vec<Sample> },
}

impl HistoryFile {
    fn into_samples(self) -> Vec<Sample> {
        match self {
            HistoryFile::Bare(s) | HistoryFile::Wrapped { samples: s } => s,
        }
    }
}

fn read_history(path: &Path) -> Result<Vec<Sample>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read history file: {}", path.display()))?;
    let file: HistoryFile = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse history file: {}", path.display()))?;
    Ok(file.into_samples())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    // Logs go to stderr so `predict --json` output stays parseable.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(cli.config.as_deref())?;
    init_tracing(&config);

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.listen_address.clone());
            tracing::info!(%bind, "Starting noderisk daemon");
            noderisk::serve(&config, &bind).await?;
        }
        Commands::Predict { input, json } => {
            let samples = read_history(&input)?;
            tracing::info!(input = %input.display(), samples = samples.len(), "Scoring history");
            let prediction = noderisk::predictor(&config).predict(&samples);

            if json {
                println!("{}", serde_json::to_string_pretty(&prediction)?);
            } else {
                println!("\n=== noderisk Health Prediction ===");
                println!("Status:              {}", prediction.status);
                println!("Failure probability: {}%", prediction.failure_probability);
                println!("Confidence:          {}%", prediction.confidence);
                println!(
                    "Time to failure:     {}",
                    prediction.time_to_failure.as_deref().unwrap_or("-")
                );
                if !prediction.issues.is_empty() {
                    println!();
                    println!("{:<8} | {:<8} | {:<10} | Description", "Metric", "Severity", "Trend");
                    println!("{:-<8}-|-{:-<8}-|-{:-<10}-|-{:-<40}", "", "", "", "");
                    for issue in &prediction.issues {
                        println!(
                            "{:<8} | {:<8} | {:<10} | {}",
                            issue.metric.to_string(),
                            issue.severity.to_string(),
                            issue.trend.to_string(),
                            issue.description
                        );
                    }
                }
                println!("\nRecommendation: {}", prediction.recommendation);
                println!("==================================\n");
            }
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
