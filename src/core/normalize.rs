//! Row-level normalisation of brokerage export records into holdings.
use crate::core::columns::{ColumnMap, Field};
use crate::core::holding::{Holding, HoldingSet};
use crate::core::quote_cache::QuoteCache;
use crate::core::sanitize::{ParseError, parse_amount};
use chrono::NaiveDate;
use csv::StringRecord;
use thiserror::Error;
use tracing::debug;

const NULL_SYMBOLS: [&str; 3] = ["", "NAN", "NULL"];

/// Average cost used when nothing in the row or the market says otherwise.
pub const PLACEHOLDER_COST: f64 = 1.0;

/// Why a row did not become a holding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("row has no symbol")]
    MissingSymbol,
    #[error("symbol {0:?} is a null marker")]
    NullSymbol(String),
    #[error("row has no shares value")]
    MissingShares,
    #[error("invalid shares: {0}")]
    InvalidShares(ParseError),
    #[error("shares must be positive, got {0}")]
    NonPositiveShares(f64),
}

/// Result of normalising one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Accepted(Holding),
    Skipped(SkipReason),
}

/// Where an accepted row's average cost came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostSource {
    TotalCostBasis,
    PerShareCostBasis,
    MarketValue,
    Price,
    LiveQuote,
    Placeholder,
}

type CostStrategy = fn(&StringRecord, &ColumnMap, f64) -> Option<(f64, CostSource)>;

/// Row-only cost strategies in priority order. The live quote and the
/// placeholder are tried after these by [`RecordNormalizer`].
const COST_STRATEGIES: [CostStrategy; 3] =
    [cost_from_basis, cost_from_market_value, cost_from_price];

fn cell<'r>(row: &'r StringRecord, columns: &ColumnMap, field: Field) -> Option<&'r str> {
    columns.get(field).and_then(|index| row.get(index))
}

fn usable_amount(row: &StringRecord, columns: &ColumnMap, field: Field) -> Option<f64> {
    cell(row, columns, field)
        .and_then(|raw| parse_amount(raw).ok())
        .filter(|v| *v >= 0.0)
}

/// Cost basis column. Values above ten times the share count are read as a
/// total for the position, anything else as a per-share cost.
pub fn cost_from_basis(
    row: &StringRecord,
    columns: &ColumnMap,
    shares: f64,
) -> Option<(f64, CostSource)> {
    let cost = usable_amount(row, columns, Field::CostBasis)?;
    if cost > shares * 10.0 {
        Some((cost / shares, CostSource::TotalCostBasis))
    } else {
        Some((cost, CostSource::PerShareCostBasis))
    }
}

/// Market value spread across the shares. An approximation, not a true basis.
pub fn cost_from_market_value(
    row: &StringRecord,
    columns: &ColumnMap,
    shares: f64,
) -> Option<(f64, CostSource)> {
    usable_amount(row, columns, Field::MarketValue).map(|v| (v / shares, CostSource::MarketValue))
}

pub fn cost_from_price(
    row: &StringRecord,
    columns: &ColumnMap,
    _shares: f64,
) -> Option<(f64, CostSource)> {
    usable_amount(row, columns, Field::Price).map(|p| (p, CostSource::Price))
}

/// Uppercases, removes whitespace and drops any `/` suffix.
pub fn clean_symbol(raw: &str) -> Result<String, SkipReason> {
    let upper = raw.trim().to_uppercase();
    if NULL_SYMBOLS.contains(&upper.as_str()) {
        return Err(if upper.is_empty() {
            SkipReason::MissingSymbol
        } else {
            SkipReason::NullSymbol(upper)
        });
    }

    let compact: String = upper.chars().filter(|c| !c.is_whitespace()).collect();
    let symbol = compact.split('/').next().unwrap_or_default().to_string();
    if symbol.is_empty() {
        return Err(SkipReason::MissingSymbol);
    }
    Ok(symbol)
}

fn parse_shares(raw: Option<&str>) -> Result<f64, SkipReason> {
    let raw = raw.ok_or(SkipReason::MissingShares)?;
    let shares = parse_amount(raw).map_err(SkipReason::InvalidShares)?;
    if shares <= 0.0 {
        return Err(SkipReason::NonPositiveShares(shares));
    }
    Ok(shares)
}

/// Outcome of normalising a whole file.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub holdings: HoldingSet,
    /// 1-based data row number (header excluded) and reason.
    pub skipped: Vec<(usize, SkipReason)>,
    /// Symbols dropped because an earlier row already produced them.
    pub duplicates: Vec<String>,
}

/// Turns detected rows into holdings dated `today`.
pub struct RecordNormalizer<'a> {
    columns: &'a ColumnMap,
    quotes: Option<&'a QuoteCache>,
    today: NaiveDate,
}

impl<'a> RecordNormalizer<'a> {
    pub fn new(columns: &'a ColumnMap, today: NaiveDate) -> Self {
        Self {
            columns,
            quotes: None,
            today,
        }
    }

    /// Enables the live-quote cost fallback.
    pub fn with_quotes(mut self, quotes: &'a QuoteCache) -> Self {
        self.quotes = Some(quotes);
        self
    }

    pub async fn normalize_row(&self, row: &StringRecord) -> RowOutcome {
        let symbol = match cell(row, self.columns, Field::Symbol)
            .ok_or(SkipReason::MissingSymbol)
            .and_then(clean_symbol)
        {
            Ok(symbol) => symbol,
            Err(reason) => return RowOutcome::Skipped(reason),
        };

        let shares = match parse_shares(cell(row, self.columns, Field::Shares)) {
            Ok(shares) => shares,
            Err(reason) => return RowOutcome::Skipped(reason),
        };

        let (average_cost, source) = self.average_cost(row, &symbol, shares).await;
        debug!("{} cost {:.4} from {:?}", symbol, average_cost, source);

        RowOutcome::Accepted(Holding::new(&symbol, shares, average_cost, self.today))
    }

    async fn average_cost(
        &self,
        row: &StringRecord,
        symbol: &str,
        shares: f64,
    ) -> (f64, CostSource) {
        if let Some(found) = COST_STRATEGIES
            .iter()
            .find_map(|strategy| strategy(row, self.columns, shares))
        {
            return found;
        }

        if let Some(cache) = self.quotes {
            let quote = cache.get_quote(symbol).await;
            if quote.has_price() {
                return (quote.price, CostSource::LiveQuote);
            }
        }

        (PLACEHOLDER_COST, CostSource::Placeholder)
    }

    /// Normalises every row, keeping the first holding per symbol.
    pub async fn normalize_all<'r, I>(&self, rows: I) -> NormalizedBatch
    where
        I: IntoIterator<Item = &'r StringRecord>,
    {
        let mut batch = NormalizedBatch::default();

        for (index, row) in rows.into_iter().enumerate() {
            let row_number = index + 1;
            match self.normalize_row(row).await {
                RowOutcome::Accepted(holding) => {
                    if batch.holdings.contains_symbol(&holding.symbol) {
                        debug!("Row {}: duplicate symbol {} dropped", row_number, holding.symbol);
                        batch.duplicates.push(holding.symbol);
                    } else {
                        batch.holdings.push(holding);
                    }
                }
                RowOutcome::Skipped(reason) => {
                    debug!("Row {} skipped: {}", row_number, reason);
                    batch.skipped.push((row_number, reason));
                }
            }
        }

        batch
    }
}
