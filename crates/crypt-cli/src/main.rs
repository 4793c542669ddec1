//! Crypt CLI - render, inspect and play the crypt synthesizer.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crypt")]
#[command(author, version, about = "Crypt supersaw synthesizer", long_about = None)]
struct Cli {
    /// Log engine activity at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a held chord to a WAV file
    Render(commands::render::RenderArgs),

    /// List every parameter with its range and default
    Params(commands::params::ParamsArgs),

    /// Play a chord on the default output device
    Play(commands::play::PlayArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Params(args) => commands::params::run(args),
        Commands::Play(args) => commands::play::run(args),
    }
}
