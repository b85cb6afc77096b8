//! Quote abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw figures reported by an upstream quote source for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderQuote {
    pub price: f64,
    pub change_percent: Option<f64>,
    pub volume: u64,
    pub previous_close: Option<f64>,
    pub display_name: Option<String>,
}

/// Point-in-time market data for a symbol. Cached, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub timestamp: DateTime<Utc>,
    pub display_name: String,
}

impl Quote {
    /// Builds a quote from provider figures, deriving the change against the
    /// previous close when the provider does not report a percentage.
    pub fn from_provider(symbol: &str, raw: ProviderQuote, timestamp: DateTime<Utc>) -> Self {
        let previous_close = raw.previous_close.unwrap_or(raw.price);
        let change = raw.price - previous_close;
        let change_percent = raw.change_percent.unwrap_or(if previous_close > 0.0 {
            change / previous_close * 100.0
        } else {
            0.0
        });

        Quote {
            symbol: symbol.to_string(),
            price: raw.price.max(0.0),
            change,
            change_percent,
            volume: raw.volume,
            timestamp,
            display_name: raw
                .display_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| symbol.to_string()),
        }
    }

    /// Stand-in used when the provider fails for a symbol.
    pub fn zero(symbol: &str, timestamp: DateTime<Utc>) -> Self {
        Quote {
            symbol: symbol.to_string(),
            price: 0.0,
            change: 0.0,
            change_percent: 0.0,
            volume: 0,
            timestamp,
            display_name: symbol.to_string(),
        }
    }

    pub fn has_price(&self) -> bool {
        self.price > 0.0
    }
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote>;
}
