//! Provides functions for valuing holdings against live quotes.
use crate::core::holding::{Holding, HoldingSet};
use crate::core::quote::Quote;
use crate::core::quote_cache::QuoteCache;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// One holding joined with its current quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionValuation {
    pub symbol: String,
    pub display_name: String,
    pub shares: f64,
    pub average_cost: f64,
    pub current_price: f64,
    pub position_value: f64,
    pub position_cost: f64,
    pub position_gain: f64,
    pub gain_pct: f64,
    pub change_pct: f64,
    pub last_update: DateTime<Utc>,
}

/// Derived portfolio worth. Recomputed on every request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationSnapshot {
    pub total_value: f64,
    pub total_cost: f64,
    pub total_gain: f64,
    pub total_gain_pct: f64,
    pub positions: Vec<PositionValuation>,
    pub computed_at: DateTime<Utc>,
}

impl ValuationSnapshot {
    pub fn empty(computed_at: DateTime<Utc>) -> Self {
        ValuationSnapshot {
            total_value: 0.0,
            total_cost: 0.0,
            total_gain: 0.0,
            total_gain_pct: 0.0,
            positions: Vec::new(),
            computed_at,
        }
    }
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

/// Values a single holding. A missing quote counts as a zero price.
pub fn value_position(
    holding: &Holding,
    quote: Option<&Quote>,
    now: DateTime<Utc>,
) -> PositionValuation {
    let current_price = quote.map_or(0.0, |q| q.price);
    let position_value = holding.shares * current_price;
    let position_cost = holding.shares * holding.average_cost;
    let position_gain = position_value - position_cost;

    let display_name = if !holding.display_name.is_empty() {
        holding.display_name.clone()
    } else {
        quote.map_or_else(|| holding.symbol.clone(), |q| q.display_name.clone())
    };

    PositionValuation {
        symbol: holding.symbol.clone(),
        display_name,
        shares: holding.shares,
        average_cost: holding.average_cost,
        current_price,
        position_value,
        position_cost,
        position_gain,
        gain_pct: percent_of(position_gain, position_cost),
        change_pct: quote.map_or(0.0, |q| q.change_percent),
        last_update: quote.map_or(now, |q| q.timestamp),
    }
}

/// Aggregates positions valued against already fetched quotes.
///
/// Quotes are keyed by uppercased symbol. Positions keep the holdings order.
pub fn summarize(
    holdings: &HoldingSet,
    quotes: &HashMap<String, Quote>,
    now: DateTime<Utc>,
) -> ValuationSnapshot {
    let mut snapshot = ValuationSnapshot::empty(now);

    for holding in holdings {
        let position = value_position(holding, quotes.get(&holding.key()), now);
        snapshot.total_value += position.position_value;
        snapshot.total_cost += position.position_cost;
        snapshot.positions.push(position);
    }

    snapshot.total_gain = snapshot.total_value - snapshot.total_cost;
    snapshot.total_gain_pct = percent_of(snapshot.total_gain, snapshot.total_cost);
    snapshot
}

/// Fetches quotes for every distinct symbol once and values the holdings.
pub async fn valuate(holdings: &HoldingSet, cache: &QuoteCache) -> ValuationSnapshot {
    if holdings.is_empty() {
        return ValuationSnapshot::empty(Utc::now());
    }

    let symbols = holdings.symbols();
    let quotes = cache.get_quotes(&symbols).await;
    let snapshot = summarize(holdings, &quotes, Utc::now());
    debug!(
        "Valued {} positions: value {:.2}, cost {:.2}",
        snapshot.positions.len(),
        snapshot.total_value,
        snapshot.total_cost
    );
    snapshot
}

/// Fills empty display names from quotes that carry a real price.
pub fn fill_display_names(holdings: &mut HoldingSet, quotes: &HashMap<String, Quote>) {
    for holding in holdings.iter_mut() {
        if !holding.display_name.is_empty() {
            continue;
        }
        if let Some(quote) = quotes.get(&holding.key()).filter(|q| q.has_price()) {
            holding.display_name = quote.display_name.clone();
        }
    }
}
