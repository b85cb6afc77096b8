use super::ui;
use crate::core::QuoteCache;
use crate::core::export::write_export;
use crate::core::valuation::valuate;
use crate::store::HoldingStore;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

pub async fn run(output: &Path, store: &dyn HoldingStore, quotes: &QuoteCache) -> Result<()> {
    let holdings = store.load()?;

    let spinner = ui::new_spinner("Fetching quotes...");
    let snapshot = valuate(&holdings, quotes).await;
    spinner.finish_and_clear();

    let file = File::create(output)
        .with_context(|| format!("Failed to create export file: {}", output.display()))?;
    let written = write_export(BufWriter::new(file), &holdings, &snapshot)
        .with_context(|| format!("Failed to write export file: {}", output.display()))?;
    info!("Exported {written} positions to {}", output.display());

    println!("Exported {written} positions to {}", output.display());
    for (label, value) in [
        ("Total Value", snapshot.total_value),
        ("Total Cost", snapshot.total_cost),
        ("Total Gain", snapshot.total_gain),
    ] {
        println!(
            "{} {}",
            ui::style_text(&format!("{label}:"), ui::StyleType::TotalLabel),
            ui::money(value)
        );
    }
    Ok(())
}
