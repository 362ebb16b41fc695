//! Repo task runner. `cargo run -p xtask -- docs` renders the CLI
//! reference as markdown.

use clap::{Parser, Subcommand};

#[derive(Parser)]
struct Xtask {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the `ssort` CLI reference as markdown
    Docs,
}

fn main() {
    match Xtask::parse().command {
        Command::Docs => {
            print!("{}", clap_markdown::help_markdown::<shuttersort::cli::Cli>());
        }
    }
}
