//! Header keyword detection for arbitrary brokerage exports

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Canonical fields a brokerage export can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Symbol,
    Shares,
    CostBasis,
    MarketValue,
    Price,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Symbol,
        Field::Shares,
        Field::CostBasis,
        Field::MarketValue,
        Field::Price,
    ];

    /// Candidate header keywords, most preferred first.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Field::Symbol => &["symbol", "ticker", "stock", "instrument"],
            Field::Shares => &["shares", "quantity", "qty", "units"],
            Field::CostBasis => &[
                "cost_basis",
                "cost basis",
                "total_cost",
                "avg_cost",
                "average_cost",
                "average cost",
                "cost",
            ],
            Field::MarketValue => &[
                "market_value",
                "market value",
                "current_value",
                "current value",
                "value",
            ],
            Field::Price => &["price", "current_price", "last_price"],
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Field::Symbol | Field::Shares)
    }

    fn slot(&self) -> usize {
        match self {
            Field::Symbol => 0,
            Field::Shares => 1,
            Field::CostBasis => 2,
            Field::MarketValue => 3,
            Field::Price => 4,
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Field::Symbol => "symbol",
                Field::Shares => "shares",
                Field::CostBasis => "cost basis",
                Field::MarketValue => "market value",
                Field::Price => "price",
            }
        )
    }
}

/// Index of the first header whose lowercased text contains any of `keywords`.
///
/// Headers are scanned in file order and the first match wins, so a
/// later header matching a more preferred keyword does not displace it.
pub fn detect_column<S: AsRef<str>>(headers: &[S], keywords: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let header = header.as_ref().to_lowercase();
        keywords
            .iter()
            .any(|keyword| header.contains(&keyword.to_lowercase()))
    })
}

/// Resolved column positions, built once per file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    slots: [Option<usize>; 5],
}

impl ColumnMap {
    /// Runs keyword detection for every field.
    pub fn detect<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut map = ColumnMap::default();
        for field in Field::ALL {
            map.set(field, detect_column(headers, field.keywords()));
        }
        map
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        self.slots[field.slot()]
    }

    pub fn set(&mut self, field: Field, index: Option<usize>) {
        self.slots[field.slot()] = index;
    }

    /// Points `field` at the header named `name` (exact match, ignoring case).
    /// Returns false when no such header exists; the mapping is left unchanged.
    pub fn assign<S: AsRef<str>>(&mut self, field: Field, headers: &[S], name: &str) -> bool {
        match headers
            .iter()
            .position(|h| h.as_ref().trim().eq_ignore_ascii_case(name.trim()))
        {
            Some(index) => {
                self.set(field, Some(index));
                true
            }
            None => false,
        }
    }

    /// First required field without a column.
    pub fn missing_required(&self) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|field| field.is_required() && self.get(*field).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_column_is_case_insensitive_substring() {
        let headers = ["Account", "Ticker Symbol", "Qty Held"];
        assert_eq!(detect_column(&headers, Field::Symbol.keywords()), Some(1));
        assert_eq!(detect_column(&headers, Field::Shares.keywords()), Some(2));
        assert_eq!(detect_column(&headers, Field::Price.keywords()), None);
    }

    #[test]
    fn test_detect_column_first_header_wins() {
        // "Stock Name" matches a weaker keyword but comes first.
        let headers = ["Stock Name", "Symbol"];
        assert_eq!(detect_column(&headers, Field::Symbol.keywords()), Some(0));
    }

    #[test]
    fn test_detect_column_uppercase_keywords() {
        let headers = ["a", "b"];
        assert_eq!(detect_column(&headers, &["B"]), Some(1));
    }

    #[test]
    fn test_column_map_detects_typical_export() {
        let headers = [
            "Symbol",
            "Description",
            "Quantity",
            "Last Price",
            "Current Value",
            "Cost Basis Total",
        ];
        let map = ColumnMap::detect(&headers);
        assert_eq!(map.get(Field::Symbol), Some(0));
        assert_eq!(map.get(Field::Shares), Some(2));
        assert_eq!(map.get(Field::Price), Some(3));
        assert_eq!(map.get(Field::MarketValue), Some(4));
        assert_eq!(map.get(Field::CostBasis), Some(5));
        assert_eq!(map.missing_required(), None);
    }

    #[test]
    fn test_missing_required_reports_symbol_first() {
        let map = ColumnMap::detect(&["Price", "Value"]);
        assert_eq!(map.missing_required(), Some(Field::Symbol));

        let map = ColumnMap::detect(&["Ticker", "Price"]);
        assert_eq!(map.missing_required(), Some(Field::Shares));
    }

    #[test]
    fn test_assign_overrides_detection() {
        let headers = ["Ticker", "Units", "Held"];
        let mut map = ColumnMap::detect(&headers);
        assert!(map.assign(Field::Shares, &headers, "held"));
        assert_eq!(map.get(Field::Shares), Some(2));
        assert!(!map.assign(Field::Price, &headers, "Missing"));
        assert_eq!(map.get(Field::Price), None);
    }
}
