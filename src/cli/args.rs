//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::build::BuildArgs;
use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::config::ConfigCommands;
use crate::cli::commands::publish::PublishArgs;
use crate::cli::commands::render::RenderArgs;
use crate::cli::commands::schema::SchemaArgs;
use crate::cli::commands::summary::SummaryArgs;
use crate::cli::commands::validate::ValidateArgs;

#[derive(Parser)]
#[command(name = "authorlist")]
#[command(author, version, about = "Collaboration author list builder")]
#[command(
    long_about = "Builds the author list of a collaboration paper from the people registry, \
the affiliation table and the opt-in submissions, then renders it for MNRAS, A&A, \
collaboration XML or plain CSV."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// Suppress notes and progress output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Configuration file (default: ./authorlist.yaml if present)
    #[arg(long, global = true, env = "AUTHORLIST_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the source tables into the canonical author list (JSON)
    Build(BuildArgs),

    /// Render an author list for a journal or collaboration database
    Render(RenderArgs),

    /// Check an author list against the schema and its cross-references
    Validate(ValidateArgs),

    /// Show author counts by country
    Summary(SummaryArgs),

    /// Copy an artifact into a shared store
    Publish(PublishArgs),

    /// Show the author list schema
    Schema(SchemaArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
