//! recipevault import - Unpack an archive or JSON payload into records

use std::path::PathBuf;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;

use crate::app::AppContext;
use crate::archive::{ArchiveUnpacker, ExportProgress, ImportOutcome, import_direct_payload};
use crate::error::{Result, VaultError};

/// Zstd frame magic; anything else is treated as a JSON payload.
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Archive or JSON payload to import
    pub input: PathBuf,

    /// Write accepted records to this JSON file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub async fn run(ctx: &AppContext, args: &ImportArgs) -> Result<()> {
    let bytes = fs::read(&args.input)
        .await
        .map_err(|err| VaultError::Config(format!("read {}: {err}", args.input.display())))?;

    let outcome = if bytes.starts_with(&ZSTD_MAGIC) {
        unpack_archive(ctx, &bytes).await?
    } else {
        let payload: serde_json::Value = serde_json::from_slice(&bytes)?;
        import_direct_payload(&payload)?
    };

    let mut json = serde_json::to_vec_pretty(&outcome.records)?;
    json.push(b'\n');
    match &args.out {
        Some(path) => {
            fs::write(path, &json)
                .await
                .map_err(|err| VaultError::Config(format!("write {}: {err}", path.display())))?;
        }
        None => {
            println!("{}", String::from_utf8_lossy(&json));
        }
    }

    if outcome.skipped.is_empty() {
        println!(
            "{} Imported {} recipes",
            style("✓").green(),
            outcome.records.len()
        );
    } else {
        println!(
            "{} Imported {} recipes, skipped {} ({})",
            style("!").yellow(),
            outcome.records.len(),
            outcome.skipped.len(),
            outcome
                .skipped
                .iter()
                .map(|s| s.folder.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Ok(())
}

async fn unpack_archive(ctx: &AppContext, bytes: &[u8]) -> Result<ImportOutcome> {
    let bar = ProgressBar::new(1);
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let bar_tick = bar.clone();
    let on_progress = move |p: ExportProgress| {
        bar_tick.set_length(p.total as u64);
        bar_tick.set_position(p.current as u64);
        bar_tick.set_message(p.step);
    };

    let unpacker = ArchiveUnpacker::new(ctx.store.as_ref());
    let outcome = unpacker.unpack(bytes, Some(&on_progress)).await;
    bar.finish_and_clear();
    outcome
}
