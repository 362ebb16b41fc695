//! `ssort` entry point

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use shuttersort::cli::{self, Cli, Commands};
use shuttersort::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    init_logging(&config)?;

    let engine_command = cli::engine_command(&cli, &config);
    match cli.command {
        None | Some(Commands::Run) => cli::run_wizard(&engine_command).await,
        Some(Commands::Reset) => cli::reset::run(&engine_command).await,
    }
}

/// Log to a file; stdout belongs to the terminal UI.
fn init_logging(config: &Config) -> Result<()> {
    let Some(data_dir) = dirs::data_local_dir() else {
        return Ok(());
    };
    let log_dir = data_dir.join("shuttersort").join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory: {}", log_dir.display()))?;

    let log_path = log_dir.join(format!(
        "ssort-{}.log",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ));
    let file = std::fs::File::create(&log_path)
        .with_context(|| format!("failed to create log file: {}", log_path.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_env("SSORT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
