use super::ui;
use crate::core::QuoteCache;
use crate::core::config::{AppConfig, Goal};
use crate::core::goal::{GoalProgress, GoalStatus, MilestoneState, milestones, project};
use crate::core::valuation::valuate;
use crate::store::HoldingStore;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use comfy_table::{Cell, Color};

fn status_cell(progress: &GoalProgress) -> Cell {
    if progress.is_overdue {
        return Cell::new("overdue").fg(Color::Red);
    }
    let color = match progress.status {
        GoalStatus::Ahead => Color::Green,
        GoalStatus::OnTrack => Color::Yellow,
        GoalStatus::Behind => Color::Red,
    };
    Cell::new(progress.status.to_string()).fg(color)
}

/// Renders one row per goal. Goals without a saved amount use `portfolio_value`.
pub fn goals_table(goals: &[Goal], portfolio_value: f64, today: NaiveDate) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Goal"),
        ui::header_cell("Current"),
        ui::header_cell("Target"),
        ui::header_cell("Progress (%)"),
        ui::header_cell("Time (%)"),
        ui::header_cell("Needed"),
        ui::header_cell("Days Left"),
        ui::header_cell("Per Month"),
        ui::header_cell("Status"),
        ui::header_cell("Achievable"),
    ]);

    for goal in goals {
        let current = goal.current_amount.unwrap_or(portfolio_value);
        let progress = project(
            current,
            goal.target_amount,
            goal.target_date,
            goal.start_date,
            today,
        );

        table.add_row(vec![
            Cell::new(&goal.name),
            ui::number_cell(ui::money(current)),
            ui::number_cell(ui::money(goal.target_amount)),
            ui::number_cell(format!("{:.1}", progress.progress_pct)),
            ui::number_cell(format!("{:.1}", progress.time_progress_pct)),
            ui::number_cell(ui::money(progress.amount_needed.max(0.0))),
            ui::number_cell(progress.days_remaining.to_string()),
            ui::number_cell(ui::money(progress.monthly_rate_needed.max(0.0))),
            status_cell(&progress),
            Cell::new(if progress.is_achievable { "yes" } else { "no" }),
        ]);
    }
    table.to_string()
}

/// Renders the milestone ladder for `value`.
pub fn milestones_table(value: f64, ladder: &[f64]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Milestone"), ui::header_cell("Remaining")]);

    for (milestone, state) in milestones(value, ladder) {
        let remaining = match state {
            MilestoneState::Reached => Cell::new("reached").fg(Color::Green),
            MilestoneState::Remaining(amount) => ui::number_cell(ui::money(amount)),
        };
        table.add_row(vec![ui::number_cell(ui::money(milestone)), remaining]);
    }
    table.to_string()
}

pub async fn run(config: &AppConfig, store: &dyn HoldingStore, quotes: &QuoteCache) -> Result<()> {
    let holdings = store.load()?;

    let spinner = ui::new_spinner("Fetching quotes...");
    let portfolio_value = valuate(&holdings, quotes).await.total_value;
    spinner.finish_and_clear();

    let today = Local::now().date_naive();
    println!(
        "{} {} {}",
        ui::style_text("Portfolio value", ui::StyleType::TotalLabel),
        ui::style_text(&format!("({}):", config.currency), ui::StyleType::TotalLabel),
        ui::style_text(&ui::money(portfolio_value), ui::StyleType::TotalValue)
    );

    if config.goals.is_empty() {
        println!(
            "{}",
            ui::style_text("No goals configured.", ui::StyleType::Subtle)
        );
    } else {
        println!("\n{}\n", ui::style_text("Goals", ui::StyleType::Title));
        println!("{}", goals_table(&config.goals, portfolio_value, today));
    }

    if !config.milestones.is_empty() {
        ui::print_separator();
        println!("\n{}\n", ui::style_text("Milestones", ui::StyleType::Title));
        println!("{}", milestones_table(portfolio_value, &config.milestones));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(name: &str, current: Option<f64>, target_date: NaiveDate) -> Goal {
        Goal {
            name: name.to_string(),
            target_amount: 100_000.0,
            current_amount: current,
            target_date,
            start_date: Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
        }
    }

    #[test]
    fn test_goals_table_falls_back_to_portfolio_value() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let target = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let goals = vec![
            goal("House", Some(80_000.0), target),
            goal("Portfolio", None, target),
        ];

        let rendered =
            console::strip_ansi_codes(&goals_table(&goals, 12_500.0, today)).to_string();

        assert!(rendered.contains("80,000.00"));
        assert!(rendered.contains("12,500.00"));
        assert!(rendered.contains("ahead"));
        assert!(rendered.contains("behind"));
    }

    #[test]
    fn test_goals_table_flags_overdue() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let goals = vec![goal("Late", Some(1_000.0), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())];

        let rendered = console::strip_ansi_codes(&goals_table(&goals, 0.0, today)).to_string();
        assert!(rendered.contains("overdue"));
        assert!(rendered.contains("-30"));
    }

    #[test]
    fn test_milestones_table() {
        let rendered =
            console::strip_ansi_codes(&milestones_table(30_000.0, &[25_000.0, 50_000.0]))
                .to_string();
        assert!(rendered.contains("reached"));
        assert!(rendered.contains("20,000.00"));
    }
}
