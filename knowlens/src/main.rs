use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use clap::{Parser, Subcommand};
use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use knowlens::{ConsoleObserver, ReplayOptions};
use knowlens_core::extraction::{CoordinatorConfig, ExtractionMode, ExtractionOutcome};
use knowlens_core::CacheConfig;

#[derive(Parser)]
#[command(name = "knowlens")]
#[command(about = "Knowledge graph panel state tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded extraction stream (JSON Lines)
    Replay {
        /// Script file, one message per line
        script: PathBuf,

        /// Correlation ID to start with (default: generated)
        #[arg(long)]
        id: Option<String>,

        /// Target the extraction is started for
        #[arg(short, long, default_value = "about:replay")]
        target: String,

        /// Extraction mode (basic, summary, content, actions, full)
        #[arg(short, long)]
        mode: Option<String>,

        /// Give up after this many seconds without a terminal event
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Disable the producer sequence guard
        #[arg(long)]
        no_sequence_guard: bool,
    },

    /// Run a synthetic workload against the layout cache and print stats
    CacheDemo {
        /// Cache capacity (default: KNOWLENS_CACHE_MAX_SIZE or 50)
        #[arg(short, long)]
        size: Option<usize>,

        /// Print stats as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "knowlens=info,knowlens_core=info".into())
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay { script, id, target, mode, timeout_secs, no_sequence_guard } => {
            let mode = match mode {
                Some(name) => Some(
                    name.parse::<ExtractionMode>()
                        .with_context(|| format!("Unknown extraction mode: {}", name))?,
                ),
                None => None,
            };

            let mut config = CoordinatorConfig::from_env()?;
            if no_sequence_guard {
                config.guard_sequence = false;
            }

            let messages = knowlens::load_script(&script)?;
            let options = ReplayOptions {
                target,
                extraction_id: id.map(Into::into),
                mode,
                timeout: timeout_secs.map(Duration::from_secs),
                ..Default::default()
            };

            let outcome = knowlens::replay(messages, options, config, Arc::new(ConsoleObserver)).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);

            if let ExtractionOutcome::Failed(failure) = outcome {
                anyhow::bail!("Extraction {} failed: {}", failure.extraction_id, failure.message);
            }
        }

        Commands::CacheDemo { size, json } => {
            let mut config = CacheConfig::from_env()?;
            if let Some(size) = size {
                config.max_cache_size = size;
            }
            config.validate()?;

            let stats = knowlens::run_cache_demo(config).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{}", stats);
            }
        }
    }

    Ok(())
}
