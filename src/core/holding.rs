//! Canonical holdings representation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One tracked position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    #[serde(rename = "name", default)]
    pub display_name: String,
    pub shares: f64,
    #[serde(rename = "avg_cost")]
    pub average_cost: f64,
    #[serde(rename = "date_added")]
    pub date_added: NaiveDate,
}

impl Holding {
    pub fn new(symbol: &str, shares: f64, average_cost: f64, date_added: NaiveDate) -> Self {
        Holding {
            symbol: symbol.to_string(),
            display_name: String::new(),
            shares,
            average_cost,
            date_added,
        }
    }

    /// Case-insensitive symbol key used for all comparisons.
    pub fn key(&self) -> String {
        self.symbol.trim().to_uppercase()
    }

    pub fn same_symbol(&self, symbol: &str) -> bool {
        self.symbol.trim().eq_ignore_ascii_case(symbol.trim())
    }
}

/// Ordered sequence of holdings, logically keyed by uppercased symbol.
///
/// Insertion order is kept for display. Duplicate symbols are not rejected
/// here; the normaliser guarantees uniqueness of a freshly imported batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HoldingSet(Vec<Holding>);

impl HoldingSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, holding: Holding) {
        self.0.push(holding);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Holding> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Holding> {
        self.0.iter_mut()
    }

    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.0.iter().any(|h| h.same_symbol(symbol))
    }

    /// First holding matching `symbol`, case-insensitively.
    pub fn find_mut(&mut self, symbol: &str) -> Option<&mut Holding> {
        self.0.iter_mut().find(|h| h.same_symbol(symbol))
    }

    pub fn get(&self, symbol: &str) -> Option<&Holding> {
        self.0.iter().find(|h| h.same_symbol(symbol))
    }

    /// Unique uppercased symbols in first-seen order.
    pub fn symbols(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for holding in &self.0 {
            let key = holding.key();
            if !seen.contains(&key) {
                seen.push(key);
            }
        }
        seen
    }
}

impl From<Vec<Holding>> for HoldingSet {
    fn from(holdings: Vec<Holding>) -> Self {
        Self(holdings)
    }
}

impl FromIterator<Holding> for HoldingSet {
    fn from_iter<I: IntoIterator<Item = Holding>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for HoldingSet {
    type Item = Holding;
    type IntoIter = std::vec::IntoIter<Holding>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a HoldingSet {
    type Item = &'a Holding;
    type IntoIter = std::slice::Iter<'a, Holding>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    #[test]
    fn test_symbol_lookup_is_case_insensitive() {
        let set: HoldingSet = vec![Holding::new("VTI", 1.0, 200.0, date())].into();
        assert!(set.contains_symbol("vti"));
        assert_eq!(set.get("Vti").map(|h| h.shares), Some(1.0));
        assert!(!set.contains_symbol("VOO"));
    }

    #[test]
    fn test_hand_edited_symbol_keys_match_trimmed() {
        let set: HoldingSet = vec![Holding::new(" vti ", 1.0, 200.0, date())].into();
        assert_eq!(set.symbols(), vec!["VTI".to_string()]);
        assert!(set.contains_symbol("VTI"));
        assert!(set.get(" Vti").is_some());
    }

    #[test]
    fn test_symbols_are_unique_and_ordered() {
        let set: HoldingSet = vec![
            Holding::new("b", 1.0, 1.0, date()),
            Holding::new("A", 1.0, 1.0, date()),
            Holding::new("B", 2.0, 1.0, date()),
        ]
        .into();
        assert_eq!(set.symbols(), vec!["B".to_string(), "A".to_string()]);
    }
}
