//! Pulls investment-related entries out of a bank transaction export.
use crate::core::import::ImportError;
use crate::core::sanitize::parse_amount;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::fmt::Display;
use std::io::{Read, Write};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

const INVESTMENT_KEYWORDS: [&str; 5] = ["invest", "buy", "sell", "dividend", "transfer to invest"];
const HOLDINGS_HINTS: [&str; 3] = ["symbol", "shares", "portfolio"];
const BANKING_HINTS: [&str; 3] = ["transaction", "amount", "description"];

pub const TRANSACTION_HEADERS: [&str; 4] = ["date", "description", "amount", "type"];

/// Which cleaner an export goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportKind {
    /// Decide from the header line.
    #[default]
    Auto,
    Holdings,
    Banking,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown export kind: {0}")]
pub struct UnknownExportKind(pub String);

impl FromStr for ExportKind {
    type Err = UnknownExportKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(ExportKind::Auto),
            "holdings" | "investment" => Ok(ExportKind::Holdings),
            "banking" | "bank" => Ok(ExportKind::Banking),
            _ => Err(UnknownExportKind(s.to_string())),
        }
    }
}

impl Display for ExportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ExportKind::Auto => "auto",
                ExportKind::Holdings => "holdings",
                ExportKind::Banking => "banking",
            }
        )
    }
}

impl ExportKind {
    /// Resolves `Auto` from the first line of the file. Holdings hints win
    /// over banking hints; with neither the file is read as holdings.
    pub fn resolve(self, header_line: &str) -> ExportKind {
        if self != ExportKind::Auto {
            return self;
        }
        let header = header_line.to_lowercase();
        if HOLDINGS_HINTS.iter().any(|hint| header.contains(hint)) {
            ExportKind::Holdings
        } else if BANKING_HINTS.iter().any(|hint| header.contains(hint)) {
            ExportKind::Banking
        } else {
            ExportKind::Holdings
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentTransaction {
    pub date: String,
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Investment-related transactions and the 1-based rows whose amount could
/// not be read.
#[derive(Debug, Clone, Default)]
pub struct TransactionBatch {
    pub transactions: Vec<InvestmentTransaction>,
    pub unreadable_rows: Vec<usize>,
}

fn position(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}

pub fn is_investment_related(description: &str) -> bool {
    let description = description.to_lowercase();
    INVESTMENT_KEYWORDS
        .iter()
        .any(|keyword| description.contains(keyword))
}

/// Keeps rows whose `Description` mentions investing. A missing `Amount`
/// column counts as zero.
pub fn extract_investment_transactions<R: Read>(
    reader: R,
) -> Result<TransactionBatch, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let date = position(&headers, "Date");
    let description = position(&headers, "Description");
    let amount = position(&headers, "Amount");

    let mut batch = TransactionBatch::default();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let cell = |column: Option<usize>| column.and_then(|i| record.get(i)).unwrap_or("");

        let text = cell(description);
        if !is_investment_related(text) {
            continue;
        }

        let value = match amount.and_then(|i| record.get(i)) {
            None => 0.0,
            Some(raw) => match parse_amount(raw) {
                Ok(value) => value,
                Err(e) => {
                    debug!("Row {}: {}", index + 1, e);
                    batch.unreadable_rows.push(index + 1);
                    continue;
                }
            },
        };

        batch.transactions.push(InvestmentTransaction {
            date: cell(date).to_string(),
            description: text.to_string(),
            amount: value,
            kind: "investment_related",
        });
    }

    debug!(
        "Found {} investment transactions, {} unreadable",
        batch.transactions.len(),
        batch.unreadable_rows.len()
    );
    Ok(batch)
}

pub fn write_transactions<W: Write>(
    writer: W,
    transactions: &[InvestmentTransaction],
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for transaction in transactions {
        writer.serialize(transaction)?;
    }
    if transactions.is_empty() {
        writer.write_record(TRANSACTION_HEADERS)?;
    }
    writer.flush()?;
    Ok(())
}
