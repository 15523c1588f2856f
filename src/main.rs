use anyhow::Result;
use clap::Parser;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubecomments::config::Config;

mod commands;

#[derive(Parser)]
#[command(
    name = "tubecomments",
    version,
    about = "Video comment crawler with adaptive infinite-scroll loading",
    long_about = None
)]
struct Cli {
    /// Input CSV listing the videos to scrape
    input: PathBuf,

    /// TOML configuration file (defaults plus TUBECOMMENTS_* env vars otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long)]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    let format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&format, &config.logging.level, cli.verbose, config.logging.file.as_deref())?;

    tracing::info!("tubecomments starting");

    if let Err(e) = tubecomments::metrics::init_metrics() {
        tracing::warn!("Metrics initialization failed: {e}");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let mut interrupts = 0;
        while tokio::signal::ctrl_c().await.is_ok() {
            interrupts += 1;
            if handle_interrupt(interrupts, &shutdown_tx) {
                std::process::exit(130);
            }
        }
    });

    commands::scrape(config, cli.input, shutdown_rx).await
}

/// First Ctrl-C requests a graceful stop; returns true when the process should exit now
fn handle_interrupt(count: u32, shutdown: &watch::Sender<bool>) -> bool {
    if count == 1 {
        tracing::info!("Interrupted by user, saving progress (press Ctrl-C again to force quit)");
        let _ = shutdown.send(true);
        false
    } else {
        tracing::warn!("Second interrupt, exiting without cleanup");
        true
    }
}

fn setup_tracing(format: &str, level: &str, verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("tubecomments=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new(format!("tubecomments={level},warn"))
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_interrupt_requests_shutdown() {
        let (tx, rx) = watch::channel(false);
        assert!(!handle_interrupt(1, &tx));
        assert!(*rx.borrow());
    }

    #[test]
    fn test_second_interrupt_forces_exit() {
        let (tx, _rx) = watch::channel(false);
        assert!(!handle_interrupt(1, &tx));
        assert!(handle_interrupt(2, &tx));
        assert!(handle_interrupt(3, &tx));
    }
}
