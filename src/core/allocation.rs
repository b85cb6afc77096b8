//! Share of portfolio value held in each position.
use crate::core::valuation::ValuationSnapshot;
use serde::Serialize;

/// Points per position towards the diversification score.
const SCORE_PER_POSITION: usize = 20;
const MAX_SCORE: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationSlice {
    pub symbol: String,
    pub display_name: String,
    pub value: f64,
    /// Percentage of the portfolio total, 0 when the total is not positive.
    pub weight_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    /// Largest position first.
    pub slices: Vec<AllocationSlice>,
    pub total_value: f64,
    pub diversification_score: usize,
}

/// Simple breadth score: 20 points per position, capped at 100.
pub fn diversification_score(positions: usize) -> usize {
    positions.saturating_mul(SCORE_PER_POSITION).min(MAX_SCORE)
}

/// Splits `snapshot` into per-position weights.
pub fn allocation(snapshot: &ValuationSnapshot) -> Allocation {
    let total_value = snapshot.total_value;
    let mut slices: Vec<AllocationSlice> = snapshot
        .positions
        .iter()
        .map(|position| AllocationSlice {
            symbol: position.symbol.clone(),
            display_name: position.display_name.clone(),
            value: position.position_value,
            weight_pct: if total_value > 0.0 {
                position.position_value / total_value * 100.0
            } else {
                0.0
            },
        })
        .collect();
    slices.sort_by(|a, b| b.value.total_cmp(&a.value));

    Allocation {
        diversification_score: diversification_score(slices.len()),
        slices,
        total_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::holding::{Holding, HoldingSet};
    use crate::core::quote::Quote;
    use crate::core::valuation::summarize;
    use chrono::{NaiveDate, Utc};
    use std::collections::HashMap;

    fn holdings(symbols: &[&str]) -> HoldingSet {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        symbols
            .iter()
            .map(|s| Holding::new(s, 1.0, 10.0, date))
            .collect()
    }

    fn priced(prices: &[(&str, f64)]) -> HashMap<String, Quote> {
        let now = Utc::now();
        prices
            .iter()
            .map(|(symbol, price)| {
                let mut quote = Quote::zero(symbol, now);
                quote.price = *price;
                (symbol.to_string(), quote)
            })
            .collect()
    }

    #[test]
    fn test_weights_sum_and_order() {
        let snapshot = summarize(
            &holdings(&["SOFI", "VTI", "AAPL"]),
            &priced(&[("SOFI", 10.0), ("VTI", 60.0), ("AAPL", 30.0)]),
            Utc::now(),
        );

        let alloc = allocation(&snapshot);

        let order: Vec<&str> = alloc.slices.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(order, vec!["VTI", "AAPL", "SOFI"]);
        assert_eq!(alloc.slices[0].weight_pct, 60.0);
        assert_eq!(alloc.slices[2].weight_pct, 10.0);
        assert_eq!(alloc.total_value, 100.0);
        assert_eq!(alloc.diversification_score, 60);
    }

    #[test]
    fn test_zero_total_gives_zero_weights() {
        let snapshot = summarize(&holdings(&["GONE", "LOST"]), &HashMap::new(), Utc::now());

        let alloc = allocation(&snapshot);

        assert_eq!(alloc.slices.len(), 2);
        assert!(alloc.slices.iter().all(|s| s.weight_pct == 0.0 && s.value == 0.0));
        assert_eq!(alloc.diversification_score, 40);
    }

    #[test]
    fn test_diversification_score_caps() {
        assert_eq!(diversification_score(0), 0);
        assert_eq!(diversification_score(5), 100);
        assert_eq!(diversification_score(12), 100);
    }
}
