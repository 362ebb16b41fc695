//! `ssort` command-line interface

pub mod reset;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::engine::EngineClient;
use crate::tui;

#[derive(Parser)]
#[command(
    name = "ssort",
    version,
    about = "Organise photo collections with a five-step wizard"
)]
pub struct Cli {
    /// Engine command override (program plus arguments, whitespace separated)
    #[arg(long, env = "SSORT_ENGINE", global = true)]
    pub engine: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the wizard (the default when no subcommand is given)
    Run,
    /// Clear all engine-held session state and exit
    Reset,
}

/// Engine command line: CLI/env override first, then the config file.
pub fn engine_command(cli: &Cli, config: &Config) -> Vec<String> {
    match &cli.engine {
        Some(raw) => raw.split_whitespace().map(str::to_string).collect(),
        None => config.engine.clone(),
    }
}

pub async fn run_wizard(engine_command: &[String]) -> Result<()> {
    let (client, connection, _child) = EngineClient::spawn(engine_command)?;
    tui::run(client, connection.events).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_splits_on_whitespace() {
        let cli = Cli::parse_from(["ssort", "--engine", "/opt/engine --verbose"]);
        let command = engine_command(&cli, &Config::default());
        assert_eq!(command, vec!["/opt/engine", "--verbose"]);
    }

    #[test]
    fn config_engine_is_the_fallback() {
        let cli = Cli::parse_from(["ssort"]);
        let command = engine_command(&cli, &Config::default());
        assert_eq!(command, vec!["shuttersort-engine"]);
    }

    #[test]
    fn subcommands_parse() {
        let cli = Cli::parse_from(["ssort", "reset"]);
        assert!(matches!(cli.command, Some(Commands::Reset)));
    }
}
