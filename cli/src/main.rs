#![deny(missing_docs)]

//! # Swagplus CLI
//!
//! Command Line Interface around the demo users service.
//!
//! Supported Commands:
//! - `generate`: Renders the Swagger 2.0 document (JSON or YAML).
//! - `routes`: Lists registered routes and whether each is documented.
//! - `invoke`: Dispatches one request and prints status and body.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod demo;
mod error;
mod generate;
mod invoke;
mod routes;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Swagger documents derived from handler declarations")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the Swagger document.
    Generate(generate::GenerateArgs),
    /// List registered routes.
    Routes(routes::RoutesArgs),
    /// Dispatch a single request against the demo service.
    Invoke(invoke::InvokeArgs),
}

/// Logs go to stderr so `generate` output stays clean; `RUST_LOG` overrides the level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> CliResult<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate(args) => generate::execute(args)?,
        Commands::Routes(args) => routes::execute(args)?,
        Commands::Invoke(args) => invoke::execute(args)?,
    }

    Ok(())
}
