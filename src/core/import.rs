//! Reading brokerage CSV exports into a normalised batch.
use crate::core::columns::{ColumnMap, Field};
use crate::core::normalize::{NormalizedBatch, RecordNormalizer};
use crate::core::quote_cache::QuoteCache;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not detect a {0} column")]
    MissingColumn(Field),
    #[error("no column named {name:?} for {field}")]
    UnknownColumn { field: Field, name: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Explicit header names that take precedence over keyword detection.
#[derive(Debug, Clone, Default)]
pub struct ColumnOverrides {
    pub symbol: Option<String>,
    pub shares: Option<String>,
    pub cost_basis: Option<String>,
    pub market_value: Option<String>,
    pub price: Option<String>,
}

impl ColumnOverrides {
    fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        [
            (Field::Symbol, &self.symbol),
            (Field::Shares, &self.shares),
            (Field::CostBasis, &self.cost_basis),
            (Field::MarketValue, &self.market_value),
            (Field::Price, &self.price),
        ]
        .into_iter()
        .filter_map(|(field, name)| name.as_deref().map(|n| (field, n)))
    }
}

/// A parsed export: headers, resolved columns and raw rows.
#[derive(Debug, Clone)]
pub struct RawExport {
    pub headers: Vec<String>,
    pub columns: ColumnMap,
    pub rows: Vec<StringRecord>,
}

impl RawExport {
    /// Parses the whole input and resolves columns before any row is touched.
    ///
    /// Fails when the CSV itself is unreadable or when no symbol or shares
    /// column can be resolved.
    pub fn from_reader<R: Read>(
        reader: R,
        overrides: &ColumnOverrides,
    ) -> Result<Self, ImportError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut columns = ColumnMap::detect(&headers);
        for (field, name) in overrides.iter() {
            if !columns.assign(field, &headers, name) {
                return Err(ImportError::UnknownColumn {
                    field,
                    name: name.to_string(),
                });
            }
        }
        debug!("Detected columns {:?} from headers {:?}", columns, headers);

        if let Some(field) = columns.missing_required() {
            return Err(ImportError::MissingColumn(field));
        }

        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
        Ok(RawExport {
            headers,
            columns,
            rows,
        })
    }

    pub fn from_path(path: &Path, overrides: &ColumnOverrides) -> Result<Self, ImportError> {
        let file = std::fs::File::open(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, overrides)
    }

    /// Header name mapped to `field`, if any.
    pub fn column_name(&self, field: Field) -> Option<&str> {
        self.columns
            .get(field)
            .and_then(|i| self.headers.get(i))
            .map(String::as_str)
    }

    pub async fn normalize(
        &self,
        quotes: Option<&QuoteCache>,
        today: NaiveDate,
    ) -> NormalizedBatch {
        let mut normalizer = RecordNormalizer::new(&self.columns, today);
        if let Some(cache) = quotes {
            normalizer = normalizer.with_quotes(cache);
        }
        let batch = normalizer.normalize_all(&self.rows).await;
        info!(
            "Normalised {} rows: {} holdings, {} skipped, {} duplicates",
            self.rows.len(),
            batch.holdings.len(),
            batch.skipped.len(),
            batch.duplicates.len()
        );
        batch
    }
}
