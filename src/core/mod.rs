//! Core business logic: import, reconciliation, quotes and analytics

pub mod allocation;
pub mod columns;
pub mod config;
pub mod export;
pub mod goal;
pub mod holding;
pub mod import;
pub mod log;
pub mod normalize;
pub mod quote;
pub mod quote_cache;
pub mod reconcile;
pub mod sanitize;
pub mod transactions;
pub mod valuation;

// Re-export main types for cleaner imports
pub use holding::{Holding, HoldingSet};
pub use quote::{ProviderQuote, Quote, QuoteProvider};
pub use quote_cache::QuoteCache;
pub use reconcile::MergeStrategy;
