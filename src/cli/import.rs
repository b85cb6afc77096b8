use super::ui;
use crate::ImportOptions;
use crate::core::QuoteCache;
use crate::core::columns::Field;
use crate::core::import::{ColumnOverrides, RawExport};
use crate::core::normalize::NormalizedBatch;
use crate::core::reconcile::{MergeStrategy, merge};
use crate::core::valuation::fill_display_names;
use crate::store::HoldingStore;
use anyhow::{Context, Result};
use chrono::Local;
use comfy_table::Cell;
use std::path::Path;
use tracing::{debug, instrument};

/// Reads and normalises a brokerage export, naming holdings from live quotes.
pub(crate) async fn read_export(
    file: &Path,
    columns: &ColumnOverrides,
    quotes: &QuoteCache,
) -> Result<NormalizedBatch> {
    let raw = RawExport::from_path(file, columns)
        .with_context(|| format!("Failed to import {}", file.display()))?;
    for field in Field::ALL {
        if let Some(name) = raw.column_name(field) {
            debug!("Using column {name:?} for {field}");
        }
    }

    let spinner = ui::new_spinner("Normalising holdings...");
    let today = Local::now().date_naive();
    let mut batch = raw.normalize(Some(quotes), today).await;

    let names = quotes.get_quotes(&batch.holdings.symbols()).await;
    fill_display_names(&mut batch.holdings, &names);
    spinner.finish_and_clear();
    Ok(batch)
}

#[derive(Debug)]
struct ImportReport<'a> {
    strategy: MergeStrategy,
    batch: &'a NormalizedBatch,
    total_holdings: usize,
}

impl ImportReport<'_> {
    fn render(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Result"), ui::header_cell("Count")]);
        table.add_row(vec![
            Cell::new("Imported"),
            ui::number_cell(self.batch.holdings.len().to_string()),
        ]);
        table.add_row(vec![
            Cell::new("Skipped"),
            ui::number_cell(self.batch.skipped.len().to_string()),
        ]);
        table.add_row(vec![
            Cell::new("Duplicates dropped"),
            ui::number_cell(self.batch.duplicates.len().to_string()),
        ]);

        let mut output = format!(
            "Import ({})\n\n{}",
            ui::style_text(&self.strategy.to_string(), ui::StyleType::Title),
            table
        );

        if !self.batch.skipped.is_empty() {
            output.push_str("\n\nSkipped rows:");
            for (row, reason) in &self.batch.skipped {
                output.push_str(&format!("\n  row {row}: {reason}"));
            }
        }
        if !self.batch.duplicates.is_empty() {
            output.push_str(&format!(
                "\n\nDuplicate symbols: {}",
                self.batch.duplicates.join(", ")
            ));
        }

        output.push_str(&format!(
            "\n\n{} {}",
            ui::style_text("Holdings tracked:", ui::StyleType::TotalLabel),
            ui::style_text(&self.total_holdings.to_string(), ui::StyleType::TotalValue)
        ));
        output
    }
}

#[instrument(skip_all, fields(file = %options.file.display(), strategy = %options.strategy))]
pub async fn run(
    options: &ImportOptions,
    store: &dyn HoldingStore,
    quotes: &QuoteCache,
) -> Result<()> {
    let batch = read_export(&options.file, &options.columns, quotes).await?;

    let existing = store.load()?;
    let merged = merge(&existing, &batch.holdings, options.strategy);
    if batch.holdings.is_empty() {
        let notice = "No valid holdings found; tracked holdings left unchanged";
        println!("{}", ui::style_text(notice, ui::StyleType::Error));
    } else {
        store.save(&merged)?;
    }

    let report = ImportReport {
        strategy: options.strategy,
        batch: &batch,
        total_holdings: merged.len(),
    };
    println!("{}", report.render());
    Ok(())
}
