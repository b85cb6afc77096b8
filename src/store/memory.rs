use crate::core::holding::HoldingSet;
use crate::store::HoldingStore;
use anyhow::{Result, anyhow};
use std::sync::RwLock;
use tracing::debug;

/// In-memory holdings store
#[derive(Default)]
pub struct MemoryHoldingStore {
    inner: RwLock<HoldingSet>,
}

impl MemoryHoldingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_holdings(holdings: HoldingSet) -> Self {
        Self {
            inner: RwLock::new(holdings),
        }
    }
}

impl HoldingStore for MemoryHoldingStore {
    fn load(&self) -> Result<HoldingSet> {
        let holdings = self
            .inner
            .read()
            .map_err(|_| anyhow!("Holding store lock poisoned"))?;
        Ok(holdings.clone())
    }

    fn save(&self, holdings: &HoldingSet) -> Result<()> {
        let mut stored = self
            .inner
            .write()
            .map_err(|_| anyhow!("Holding store lock poisoned"))?;
        debug!("Storing {} holdings in memory", holdings.len());
        *stored = holdings.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::holding::Holding;
    use chrono::NaiveDate;

    #[test]
    fn test_save_replaces_everything() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let store = MemoryHoldingStore::with_holdings(
            vec![Holding::new("OLD", 1.0, 1.0, date)].into(),
        );

        let replacement: HoldingSet = vec![Holding::new("NEW", 2.0, 3.0, date)].into();
        store.save(&replacement).unwrap();

        assert_eq!(store.load().unwrap(), replacement);
    }

    #[test]
    fn test_empty_by_default() {
        assert!(MemoryHoldingStore::new().load().unwrap().is_empty());
    }
}
