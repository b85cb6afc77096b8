use super::import::read_export;
use super::ui;
use crate::core::QuoteCache;
use crate::core::import::ColumnOverrides;
use crate::core::transactions::{ExportKind, extract_investment_transactions, write_transactions};
use crate::store::{CsvHoldingStore, HoldingStore};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, instrument};

fn header_line(input: &Path) -> Result<String> {
    let file =
        File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let mut line = String::new();
    BufReader::new(file)
        .read_line(&mut line)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    Ok(line)
}

/// Cleans `input` into `output` without touching the tracked holdings.
///
/// Holdings exports become the canonical holdings file; bank exports are
/// reduced to their investment-related transactions.
#[instrument(skip(columns, quotes))]
pub async fn run(
    input: &Path,
    output: &Path,
    kind: ExportKind,
    columns: &ColumnOverrides,
    quotes: &QuoteCache,
) -> Result<()> {
    let kind = kind.resolve(&header_line(input)?);
    debug!("Cleaning {} as a {kind} export", input.display());

    match kind {
        ExportKind::Banking => clean_banking(input, output),
        _ => clean_holdings(input, output, columns, quotes).await,
    }
}

async fn clean_holdings(
    input: &Path,
    output: &Path,
    columns: &ColumnOverrides,
    quotes: &QuoteCache,
) -> Result<()> {
    let batch = read_export(input, columns, quotes).await?;
    CsvHoldingStore::new(output).save(&batch.holdings)?;

    println!(
        "Cleaned {} holdings into {} ({} rows skipped, {} duplicates dropped)",
        ui::style_text(&batch.holdings.len().to_string(), ui::StyleType::TotalValue),
        output.display(),
        batch.skipped.len(),
        batch.duplicates.len()
    );
    for (row, reason) in &batch.skipped {
        let line = format!("  row {row}: {reason}");
        println!("{}", ui::style_text(&line, ui::StyleType::Subtle));
    }
    Ok(())
}

fn clean_banking(input: &Path, output: &Path) -> Result<()> {
    let file =
        File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let batch = extract_investment_transactions(file)
        .with_context(|| format!("Failed to read bank export {}", input.display()))?;

    let out = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    write_transactions(BufWriter::new(out), &batch.transactions)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Saved {} investment transactions into {}",
        ui::style_text(&batch.transactions.len().to_string(), ui::StyleType::TotalValue),
        output.display()
    );
    if !batch.unreadable_rows.is_empty() {
        let rows: Vec<String> = batch.unreadable_rows.iter().map(usize::to_string).collect();
        let line = format!("  unreadable amounts in rows {}", rows.join(", "));
        println!("{}", ui::style_text(&line, ui::StyleType::Subtle));
    }
    Ok(())
}
