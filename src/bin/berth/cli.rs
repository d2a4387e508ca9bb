//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// berth - project system resolution for loaded and deferred projects
#[derive(Parser)]
#[command(name = "berth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the project system for a project descriptor
    Resolve(ResolveArgs),

    /// List providers in the order they are tried
    Providers(ProvidersArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Path to the project descriptor (TOML)
    pub descriptor: PathBuf,

    /// Solution directory (defaults to the descriptor's directory)
    #[arg(long)]
    pub solution_dir: Option<PathBuf>,

    /// Also list the project's package references
    #[arg(long)]
    pub references: bool,
}

#[derive(Args)]
pub struct ProvidersArgs {
    /// Solution directory whose configuration applies
    #[arg(long, default_value = ".")]
    pub solution_dir: PathBuf,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
