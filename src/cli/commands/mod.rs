//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

pub mod export;
pub mod import;

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub async fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Export(args) => export::run(ctx, args).await,
        Commands::Import(args) => import::run(ctx, args).await,
    }
}
