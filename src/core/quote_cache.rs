use crate::core::quote::{Quote, QuoteProvider};
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

struct CacheEntry {
    quote: Quote,
    fetched_at: Instant,
}

/// Time-bounded quote cache in front of a [`QuoteProvider`].
///
/// Entries are replaced whole on refresh and simply expire; there is no
/// eviction. The lock is not held while the provider is called, so two callers
/// missing on the same symbol at once may both go upstream.
#[derive(Clone)]
pub struct QuoteCache {
    provider: Arc<dyn QuoteProvider>,
    ttl: Duration,
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl QuoteCache {
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        Self::with_ttl(provider, DEFAULT_TTL)
    }

    pub fn with_ttl(provider: Arc<dyn QuoteProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns a quote for every requested symbol.
    ///
    /// Symbols are uppercased for lookup. A provider failure for one symbol
    /// yields a zero-valued quote for it and never affects the others.
    #[instrument(name = "QuoteLookup", skip_all, fields(count = symbols.len()))]
    pub async fn get_quotes<S: AsRef<str>>(&self, symbols: &[S]) -> HashMap<String, Quote> {
        let mut quotes = HashMap::new();
        let mut misses = Vec::new();

        {
            let entries = self.entries.lock().await;
            for symbol in symbols {
                let key = symbol.as_ref().trim().to_uppercase();
                if quotes.contains_key(&key) || misses.contains(&key) {
                    continue;
                }
                match entries.get(&key) {
                    Some(entry) if entry.fetched_at.elapsed() < self.ttl => {
                        debug!("Quote cache HIT for {}", key);
                        quotes.insert(key, entry.quote.clone());
                    }
                    Some(_) => {
                        debug!("Quote cache entry expired for {}", key);
                        misses.push(key);
                    }
                    None => {
                        debug!("Quote cache MISS for {}", key);
                        misses.push(key);
                    }
                }
            }
        }

        if misses.is_empty() {
            return quotes;
        }

        let fetches = misses.into_iter().map(|symbol| async move {
            let quote = match self.provider.fetch_quote(&symbol).await {
                Ok(raw) => Quote::from_provider(&symbol, raw, Utc::now()),
                Err(e) => {
                    warn!("Quote fetch failed for {}: {}", symbol, e);
                    Quote::zero(&symbol, Utc::now())
                }
            };
            (symbol, quote)
        });
        let fetched = join_all(fetches).await;

        let mut entries = self.entries.lock().await;
        for (symbol, quote) in fetched {
            entries.insert(
                symbol.clone(),
                CacheEntry {
                    quote: quote.clone(),
                    fetched_at: Instant::now(),
                },
            );
            quotes.insert(symbol, quote);
        }
        quotes
    }

    /// Single-symbol convenience over [`QuoteCache::get_quotes`].
    pub async fn get_quote(&self, symbol: &str) -> Quote {
        let key = symbol.trim().to_uppercase();
        let mut quotes = self.get_quotes(&[key.as_str()]).await;
        quotes
            .remove(&key)
            .unwrap_or_else(|| Quote::zero(&key, Utc::now()))
    }
}
