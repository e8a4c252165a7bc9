//! plantpipe CLI - `PlantUML` build pipeline.
//!
//! Provides commands for:
//! - `render`: Validate a diagram and download its SVG/PNG renderings
//! - `validate`: Run the text-mode validation only
//! - `encode`: Print the encoded payload of a diagram file
//! - `decode`: Print the diagram source of an encoded payload

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{DecodeArgs, EncodeArgs, RenderArgs, ValidateArgs};
use output::Output;

/// plantpipe - `PlantUML` build pipeline.
#[derive(Parser)]
#[command(name = "plantpipe", version, about)]
struct Cli {
    /// Enable info-level logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a diagram and download its SVG and PNG renderings.
    Render(RenderArgs),
    /// Validate a diagram with the text-mode renderer only.
    Validate(ValidateArgs),
    /// Print the encoded payload of a diagram file.
    Encode(EncodeArgs),
    /// Print the diagram source of an encoded payload.
    Decode(DecodeArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN.
    // Logs go to stderr; stdout carries command results.
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Validate(args) => args.execute(),
        Commands::Encode(args) => args.execute(),
        Commands::Decode(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
