//! Cloudstream - stream files to and from object storage
//!
//! Reads stdin into an object, or writes an object to stdout:
//!
//! ```text
//! echo 'hi there!' | cloudstream put /mybucket/greeting.txt
//! cloudstream get /mybucket/greeting.txt
//! ```
//!
//! Credentials come from `cloudstream.conf` in the current directory or
//! one of its parents.

use anyhow::Result;
use clap::{Parser, Subcommand};
use cloudstream_client::TransferClient;
use cloudstream_common::Config;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cloudstream")]
#[command(about = "Stream files to and from S3-compatible object storage")]
#[command(version)]
struct Args {
    /// Configuration file (default: cloudstream.conf here or in a parent directory)
    #[arg(short, long, env = "CLOUDSTREAM_CONFIG")]
    config: Option<PathBuf>,

    /// Storage service endpoint, overrides the configuration file
    #[arg(short, long, env = "CLOUDSTREAM_ENDPOINT")]
    endpoint: Option<String>,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write an object to stdout
    Get {
        /// Object path, /bucket/key
        path: String,
    },
    /// Upload stdin to an object
    Put {
        /// Object path, /bucket/key
        path: String,
    },
}

fn load_config(args: &Args) -> Result<Config> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::discover_and_load()?,
    };
    Ok(match &args.endpoint {
        Some(endpoint) => config.with_endpoint(endpoint)?,
        None => config,
    })
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    info!("Endpoint: {}", config.endpoint);
    let client = TransferClient::new(&config)?;

    let mut stdout = tokio::io::stdout();
    let mut stderr = tokio::io::stderr();

    match args.command {
        Commands::Get { path } => {
            let bytes = client.get(&path, &mut stdout, &mut stderr).await?;
            debug!("Downloaded {} bytes from {}", bytes, path);
        }
        Commands::Put { path } => {
            let stdin = tokio::io::stdin();
            let bytes = client.put(&path, stdin, &mut stdout, &mut stderr).await?;
            debug!("Uploaded {} bytes to {}", bytes, path);
        }
    }

    Ok(())
}

/// Drive `task` on `runtime` and turn its outcome into an exit code
///
/// On failure the runtime is shut down without waiting for blocking-pool
/// work. A stdin read is not cancellable, so an idle upload source would
/// otherwise hold the process open until it reaches end of file.
fn complete<F>(runtime: Runtime, task: F) -> ExitCode
where
    F: Future<Output = Result<()>>,
{
    match runtime.block_on(task) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            runtime.shutdown_background();
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging; stdout carries object data, so log to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    complete(runtime, run(args))
}
