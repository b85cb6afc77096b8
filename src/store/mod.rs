pub mod disk;
pub mod memory;

use crate::core::holding::HoldingSet;
use anyhow::Result;

pub use disk::CsvHoldingStore;
pub use memory::MemoryHoldingStore;

/// Persistence for the tracked holdings.
///
/// Every save replaces the whole set; there are no partial updates.
pub trait HoldingStore: Send + Sync {
    /// Stored holdings, or an empty set when nothing was saved yet.
    fn load(&self) -> Result<HoldingSet>;

    fn save(&self, holdings: &HoldingSet) -> Result<()>;
}
