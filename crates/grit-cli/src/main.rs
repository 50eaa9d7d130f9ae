//! grit CLI - offline antialiased waveshaping from the command line.

mod commands;
mod wav;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grit")]
#[command(author, version, about = "Antiderivative-antialiased waveshaping", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file through a waveshaper
    Process(commands::process::ProcessArgs),

    /// List available curves
    Curves(commands::curves::CurvesArgs),

    /// Check every curve's antiderivatives numerically
    Verify(commands::verify::VerifyArgs),

    /// Generate a sine test signal
    Generate(commands::generate::GenerateArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Curves(args) => commands::curves::run(args),
        Commands::Verify(args) => commands::verify::run(args),
        Commands::Generate(args) => commands::generate::run(args),
    }
}
