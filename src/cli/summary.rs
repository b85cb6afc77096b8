use super::ui;
use crate::core::QuoteCache;
use crate::core::valuation::{ValuationSnapshot, valuate};
use crate::store::HoldingStore;
use anyhow::Result;
use comfy_table::Cell;

impl ValuationSnapshot {
    pub fn display_as_table(&self, currency: &str) -> String {
        let mut table = ui::new_styled_table();

        table.set_header(vec![
            ui::header_cell("Symbol"),
            ui::header_cell("Name"),
            ui::header_cell("Shares"),
            ui::header_cell("Avg Cost"),
            ui::header_cell("Price"),
            ui::header_cell(&format!("Value ({currency})")),
            ui::header_cell("Gain"),
            ui::header_cell("Gain (%)"),
            ui::header_cell("Day (%)"),
        ]);

        for position in &self.positions {
            let mut row = vec![
                Cell::new(&position.symbol),
                Cell::new(&position.display_name),
                ui::number_cell(format!("{:.4}", position.shares)),
                ui::number_cell(ui::money(position.average_cost)),
            ];

            // A zero price means no quote could be fetched.
            if position.current_price > 0.0 {
                row.extend([
                    ui::number_cell(ui::money(position.current_price)),
                    ui::number_cell(ui::money(position.position_value)),
                    ui::change_cell(ui::money(position.position_gain), position.position_gain),
                    ui::change_cell(format!("{:.2}%", position.gain_pct), position.gain_pct),
                    ui::change_cell(format!("{:.2}%", position.change_pct), position.change_pct),
                ]);
            } else {
                row.extend((0..5).map(|_| ui::na_cell(true)));
            }
            table.add_row(row);
        }

        let mut output = format!(
            "{}\n\n{}\n",
            ui::style_text("Portfolio", ui::StyleType::Title),
            table
        );

        let gain_style = |gain: f64| {
            if gain >= 0.0 {
                ui::StyleType::TotalValue
            } else {
                ui::StyleType::Error
            }
        };
        let totals = [
            (
                format!("Total Value ({currency})"),
                ui::money(self.total_value),
                ui::StyleType::TotalValue,
            ),
            (
                format!("Total Cost ({currency})"),
                ui::money(self.total_cost),
                ui::StyleType::TotalValue,
            ),
            (
                format!("Total Gain ({currency})"),
                ui::money(self.total_gain),
                gain_style(self.total_gain),
            ),
            (
                "Total Gain (%)".to_string(),
                format!("{:.2}%", self.total_gain_pct),
                gain_style(self.total_gain_pct),
            ),
        ];
        for (label, value, style) in totals {
            output.push_str(&format!(
                "\n{}: {}",
                ui::style_text(&label, ui::StyleType::TotalLabel),
                ui::style_text(&value, style)
            ));
        }

        output
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

    println!("{}", snapshot.display_as_table(currency));
    println!(
        "{}",
        ui::style_text(
            &format!("As of {}", snapshot.computed_at.format("%Y-%m-%d %H:%M:%S UTC")),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::holding::{Holding, HoldingSet};
    use crate::core::quote::Quote;
    use crate::core::valuation::summarize;
    use chrono::{NaiveDate, Utc};
    use std::collections::HashMap;

    #[test]
    fn test_display_marks_missing_quotes() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let holdings = HoldingSet::from(vec![
            Holding::new("AAPL", 10.0, 150.0, date),
            Holding::new("GONE", 5.0, 20.0, date),
        ]);
        let now = Utc::now();
        let mut quotes = HashMap::new();
        let mut apple = Quote::zero("AAPL", now);
        apple.price = 200.0;
        apple.display_name = "Apple Inc.".to_string();
        quotes.insert("AAPL".to_string(), apple);

        let snapshot = summarize(&holdings, &quotes, now);
        let rendered = console::strip_ansi_codes(&snapshot.display_as_table("USD")).to_string();

        assert!(rendered.contains("Apple Inc."));
        assert!(rendered.contains("2,000.00"));
        assert!(rendered.contains("N/A"));
        assert!(rendered.contains("Total Value (USD): 2,000.00"));
        assert!(rendered.contains("Total Cost (USD): 1,600.00"));
        assert!(rendered.contains("Total Gain (USD): 400.00"));
        assert!(rendered.contains("Total Gain (%): 25.00%"));
    }
}
