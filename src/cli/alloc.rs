use super::ui;
use crate::core::QuoteCache;
use crate::core::allocation::{Allocation, allocation};
use crate::core::valuation::valuate;
use crate::store::HoldingStore;
use anyhow::Result;
use comfy_table::Cell;

impl Allocation {
    pub fn display_as_table(&self, currency: &str) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Symbol"),
            ui::header_cell("Name"),
            ui::header_cell(&format!("Value ({currency})")),
            ui::header_cell("Allocation (%)"),
        ]);

        for slice in &self.slices {
            table.add_row(vec![
                Cell::new(&slice.symbol),
                Cell::new(&slice.display_name),
                ui::number_cell(ui::money(slice.value)),
                ui::number_cell(format!("{:.2}%", slice.weight_pct)),
            ]);
        }

        format!(
            "{}\n\n{}\n\n{} {}\n{} {}",
            ui::style_text("Asset Allocation", ui::StyleType::Title),
            table,
            ui::style_text(&format!("Total Value ({currency}):"), ui::StyleType::TotalLabel),
            ui::style_text(&ui::money(self.total_value), ui::StyleType::TotalValue),
            ui::style_text("Diversification Score:", ui::StyleType::TotalLabel),
            ui::style_text(
                &format!("{}%", self.diversification_score),
                ui::StyleType::TotalValue
            ),
        )
    }
}

pub async fn run(store: &dyn HoldingStore, quotes: &QuoteCache, currency: &str) -> Result<()> {
    let holdings = store.load()?;
    if holdings.is_empty() {
        println!("No holdings tracked yet. Run `wtrack import <FILE>` first.");
        return Ok(());
    }

    let spinner = ui::new_spinner("Fetching quotes...");
    let snapshot = valuate(&holdings, quotes).await;
    spinner.finish_and_clear();

    println!("{}", allocation(&snapshot).display_as_table(currency));
    Ok(())
}
