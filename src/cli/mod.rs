//! Command-line surface.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "recipevault",
    version,
    about = "Portable archive import/export for recipe catalogs"
)]
pub struct Cli {
    /// Explicit config file (overrides the global/project lookup)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export recipes into a portable archive or JSON document
    Export(commands::export::ExportArgs),
    /// Import recipes from an archive or JSON payload
    Import(commands::import::ImportArgs),
}
