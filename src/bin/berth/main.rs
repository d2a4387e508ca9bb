//! berth CLI - resolve the project system of IDE projects

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use berth::util::diagnostic::NoProjectSystemError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        match e.downcast::<NoProjectSystemError>() {
            Ok(err) => eprintln!("{:?}", miette::Report::new(err)),
            Err(e) => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("berth=debug")
    } else {
        EnvFilter::new("berth=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let color = !cli.no_color;
    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(args, color),
        Commands::Providers(args) => commands::providers::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
