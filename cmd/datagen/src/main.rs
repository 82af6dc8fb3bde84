//! sslforslr-data - inspect and iterate speaker training datasets.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{InfoCommand, IterateCommand, SplitMusanCommand};

/// Dataset tooling for self-supervised speaker representation training.
///
/// Reads a YAML dataset config (manifest, frame length, augmentation) and
/// reports on or drives the batch generators it describes.
#[derive(Parser)]
#[command(name = "sslforslr-data")]
#[command(about = "Speaker dataset pipeline tool")]
#[command(version)]
pub struct Cli {
    /// Output as JSON instead of YAML
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show corpus size, classes, input shape and batch counts
    Info(InfoCommand),
    /// Pull batches through the generators
    Iterate(IterateCommand),
    /// Cut MUSAN recordings into fixed-length segments
    #[command(name = "split-musan")]
    SplitMusan(SplitMusanCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Info(cmd) => cmd.run(&cli),
        Commands::Iterate(cmd) => cmd.run(&cli),
        Commands::SplitMusan(cmd) => cmd.run(&cli),
    }
}
