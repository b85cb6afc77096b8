//! Linear time-vs-progress analytics for savings goals.
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Daily savings above this are not considered realistic.
pub const MAX_PLAUSIBLE_DAILY_RATE: f64 = 1000.0;

const DEFAULT_LOOKBACK_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Ahead,
    OnTrack,
    Behind,
}

impl Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                GoalStatus::Ahead => "ahead",
                GoalStatus::OnTrack => "on_track",
                GoalStatus::Behind => "behind",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub progress_pct: f64,
    pub time_progress_pct: f64,
    pub amount_needed: f64,
    pub days_remaining: i64,
    pub daily_rate_needed: f64,
    pub monthly_rate_needed: f64,
    pub status: GoalStatus,
    pub is_achievable: bool,
    /// Target date has passed. Reported beside `status`, which does not
    /// account for it.
    pub is_overdue: bool,
}

/// Projects progress towards `target` by `target_date`, evaluated on `today`.
///
/// `start_date` defaults to a year before `today`. Day counts are not clamped:
/// `days_remaining` is negative for overdue goals and `amount_needed` is
/// negative once the target is exceeded.
pub fn project(
    current: f64,
    target: f64,
    target_date: NaiveDate,
    start_date: Option<NaiveDate>,
    today: NaiveDate,
) -> GoalProgress {
    let start_date = start_date.unwrap_or(today - Duration::days(DEFAULT_LOOKBACK_DAYS));

    let total_days = (target_date - start_date).num_days();
    let days_elapsed = (today - start_date).num_days();
    let days_remaining = (target_date - today).num_days();

    let amount_needed = target - current;
    let progress_pct = if target > 0.0 {
        current / target * 100.0
    } else {
        0.0
    };
    let time_progress_pct = if total_days > 0 {
        days_elapsed as f64 / total_days as f64 * 100.0
    } else {
        0.0
    };

    let daily_rate_needed = amount_needed / days_remaining.max(1) as f64;
    let monthly_rate_needed = daily_rate_needed * 30.0;

    let status = if progress_pct >= time_progress_pct {
        GoalStatus::Ahead
    } else if progress_pct >= time_progress_pct * 0.9 {
        GoalStatus::OnTrack
    } else {
        GoalStatus::Behind
    };

    GoalProgress {
        progress_pct,
        time_progress_pct,
        amount_needed,
        days_remaining,
        daily_rate_needed,
        monthly_rate_needed,
        status,
        is_achievable: days_remaining > 0 && daily_rate_needed < MAX_PLAUSIBLE_DAILY_RATE,
        is_overdue: days_remaining < 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MilestoneState {
    Reached,
    Remaining(f64),
}

pub const DEFAULT_MILESTONES: [f64; 7] = [
    10_000.0,
    25_000.0,
    50_000.0,
    100_000.0,
    250_000.0,
    500_000.0,
    1_000_000.0,
];

/// Where `value` stands against each milestone, in the given order.
pub fn milestones(value: f64, ladder: &[f64]) -> Vec<(f64, MilestoneState)> {
    ladder
        .iter()
        .map(|milestone| {
            let state = if value >= *milestone {
                MilestoneState::Reached
            } else {
                MilestoneState::Remaining(milestone - value)
            };
            (*milestone, state)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    #[test]
    fn test_behind_schedule() {
        let target_date = today() + Duration::days(730);
        let progress = project(15_000.0, 100_000.0, target_date, None, today());

        assert_eq!(progress.progress_pct, 15.0);
        assert!((progress.time_progress_pct - 365.0 / 1095.0 * 100.0).abs() < 1e-9);
        assert_eq!(progress.status, GoalStatus::Behind);
        assert_eq!(progress.amount_needed, 85_000.0);
        assert_eq!(progress.days_remaining, 730);
        assert!((progress.daily_rate_needed - 85_000.0 / 730.0).abs() < 1e-9);
        assert!((progress.monthly_rate_needed - progress.daily_rate_needed * 30.0).abs() < 1e-9);
        assert!(progress.is_achievable);
        assert!(!progress.is_overdue);
    }

    #[test]
    fn test_ahead_and_on_track() {
        let start = today() - Duration::days(50);
        let target_date = today() + Duration::days(50);

        let ahead = project(600.0, 1_000.0, target_date, Some(start), today());
        assert_eq!(ahead.status, GoalStatus::Ahead);

        // 46% against 50% elapsed is within the 10% tolerance.
        let on_track = project(460.0, 1_000.0, target_date, Some(start), today());
        assert_eq!(on_track.status, GoalStatus::OnTrack);

        let behind = project(440.0, 1_000.0, target_date, Some(start), today());
        assert_eq!(behind.status, GoalStatus::Behind);
        assert_eq!(behind.status.to_string(), "behind");
    }

    #[test]
    fn test_overdue_goal_uses_one_day_floor() {
        let target_date = today() - Duration::days(10);
        let progress = project(500.0, 1_500.0, target_date, None, today());

        assert_eq!(progress.days_remaining, -10);
        assert_eq!(progress.daily_rate_needed, 1_000.0);
        assert!(!progress.is_achievable);
        assert!(progress.is_overdue);
    }

    #[test]
    fn test_implausible_daily_rate_is_not_achievable() {
        let target_date = today() + Duration::days(10);
        let progress = project(0.0, 20_000.0, target_date, None, today());
        assert_eq!(progress.daily_rate_needed, 2_000.0);
        assert!(!progress.is_achievable);
    }

    #[test]
    fn test_degenerate_inputs() {
        let progress = project(10.0, 0.0, today(), Some(today()), today());
        assert_eq!(progress.progress_pct, 0.0);
        assert_eq!(progress.time_progress_pct, 0.0);
        assert_eq!(progress.status, GoalStatus::Ahead);

        let exceeded = project(1_200.0, 1_000.0, today() + Duration::days(20), None, today());
        assert_eq!(exceeded.amount_needed, -200.0);
        assert_eq!(exceeded.status, GoalStatus::Ahead);
    }

    #[test]
    fn test_milestone_ladder() {
        let ladder = milestones(30_000.0, &[10_000.0, 25_000.0, 50_000.0]);
        assert_eq!(
            ladder,
            vec![
                (10_000.0, MilestoneState::Reached),
                (25_000.0, MilestoneState::Reached),
                (50_000.0, MilestoneState::Remaining(20_000.0)),
            ]
        );
    }
}
