//! recipevault export - Pack recipes into a portable archive

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;

use crate::app::AppContext;
use crate::archive::{ArchivePackager, ExportProgress, build_direct_export};
use crate::error::{Result, VaultError};
use crate::model::RecipeRecord;

/// Output document produced by the export.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ExportFormat {
    /// Compressed folder-tree archive with attachments
    #[default]
    Archive,
    /// Single structured JSON document (no attachments)
    Direct,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// JSON file holding the records to export (array of recipes)
    #[arg(long)]
    pub records: PathBuf,

    /// Output file
    #[arg(short, long)]
    pub out: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = ExportFormat::Archive)]
    pub format: ExportFormat,

    /// Wider catalog file; only affects the reported totals, never the index
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

pub async fn run(ctx: &AppContext, args: &ExportArgs) -> Result<()> {
    let records = load_records(&args.records).await?;

    match args.format {
        ExportFormat::Archive => {
            let catalog = match &args.catalog {
                Some(path) => Some(load_records(path).await?),
                None => None,
            };

            let bar = progress_bar();
            let bar_tick = bar.clone();
            let on_progress = move |p: ExportProgress| {
                bar_tick.set_length(p.total as u64);
                bar_tick.set_position(p.current as u64);
                bar_tick.set_message(p.step);
            };

            let packager = ArchivePackager::new(
                ctx.store.as_ref(),
                ctx.assets.as_ref(),
                &ctx.config.folder_overrides,
            );
            let archive = packager
                .pack(&records, catalog.as_deref(), Some(&on_progress))
                .await?;
            bar.finish_and_clear();

            fs::write(&args.out, &archive).await.map_err(|err| {
                VaultError::Config(format!("write {}: {err}", args.out.display()))
            })?;

            println!(
                "{} Exported {} recipes to {}",
                style("✓").green(),
                records.len(),
                args.out.display()
            );
        }
        ExportFormat::Direct => {
            let doc = build_direct_export(&records);
            let mut json = serde_json::to_vec_pretty(&doc)?;
            json.push(b'\n');
            fs::write(&args.out, &json).await.map_err(|err| {
                VaultError::Config(format!("write {}: {err}", args.out.display()))
            })?;

            println!(
                "{} Exported {} recipes to {} (direct JSON)",
                style("✓").green(),
                records.len(),
                args.out.display()
            );
        }
    }

    Ok(())
}

async fn load_records(path: &Path) -> Result<Vec<RecipeRecord>> {
    let raw = fs::read(path)
        .await
        .map_err(|err| VaultError::Config(format!("read {}: {err}", path.display())))?;
    serde_json::from_slice(&raw).map_err(|err| {
        VaultError::ValidationFailed(format!("parse records {}: {err}", path.display()))
    })
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(1);
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
