//! Merging an imported batch into the stored holdings.
use crate::core::holding::HoldingSet;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Discard what is stored and keep the import.
    ReplaceAll,
    /// Only append symbols that are not tracked yet.
    AddNewOnly,
    /// Overwrite tracked symbols with imported figures and append the rest.
    UpdateExistingAndAddNew,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown merge strategy: {0}")]
pub struct UnknownStrategy(pub String);

impl Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                MergeStrategy::ReplaceAll => "replace-all",
                MergeStrategy::AddNewOnly => "add-new-only",
                MergeStrategy::UpdateExistingAndAddNew => "update-existing-and-add-new",
            }
        )
    }
}

impl FromStr for MergeStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "replace-all" | "replace" => Ok(MergeStrategy::ReplaceAll),
            "add-new-only" | "add-new" => Ok(MergeStrategy::AddNewOnly),
            "update-existing-and-add-new" | "update" => Ok(MergeStrategy::UpdateExistingAndAddNew),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

/// Combines `incoming` with `existing` under `strategy`.
///
/// An empty `incoming` batch leaves `existing` untouched for every strategy.
/// Symbols compare case-insensitively. Duplicates already present in
/// `existing` are kept as they are; updates land on the first of them only.
pub fn merge(existing: &HoldingSet, incoming: &HoldingSet, strategy: MergeStrategy) -> HoldingSet {
    if incoming.is_empty() {
        return existing.clone();
    }

    let result = match strategy {
        MergeStrategy::ReplaceAll => incoming.clone(),
        MergeStrategy::AddNewOnly => {
            let mut result = existing.clone();
            for holding in incoming {
                if !existing.contains_symbol(&holding.symbol) {
                    result.push(holding.clone());
                }
            }
            result
        }
        MergeStrategy::UpdateExistingAndAddNew => {
            let mut result = existing.clone();
            for holding in incoming {
                match result.find_mut(&holding.symbol) {
                    Some(tracked) => {
                        tracked.shares = holding.shares;
                        tracked.average_cost = holding.average_cost;
                        tracked.date_added = holding.date_added;
                    }
                    None => result.push(holding.clone()),
                }
            }
            result
        }
    };

    debug!(
        "Merged {} stored with {} imported using {}: {} holdings",
        existing.len(),
        incoming.len(),
        strategy,
        result.len()
    );
    result
}
