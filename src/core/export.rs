//! CSV export of holdings joined with their valuation.
use crate::core::holding::HoldingSet;
use crate::core::valuation::ValuationSnapshot;
use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

pub const EXPORT_HEADERS: [&str; 9] = [
    "Symbol",
    "Name",
    "Shares",
    "Average_Cost",
    "Current_Price",
    "Current_Value",
    "Gain",
    "Gain_Pct",
    "Date_Added",
];

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Symbol")]
    symbol: &'a str,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Shares")]
    shares: f64,
    #[serde(rename = "Average_Cost")]
    average_cost: f64,
    #[serde(rename = "Current_Price")]
    current_price: f64,
    #[serde(rename = "Current_Value")]
    current_value: f64,
    #[serde(rename = "Gain")]
    gain: f64,
    #[serde(rename = "Gain_Pct")]
    gain_pct: String,
    #[serde(rename = "Date_Added")]
    date_added: Option<NaiveDate>,
}

/// Writes one row per position of `snapshot`.
///
/// `snapshot` must have been computed from `holdings`; positions and holdings
/// are paired by order.
pub fn write_export<W: Write>(
    writer: W,
    holdings: &HoldingSet,
    snapshot: &ValuationSnapshot,
) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(writer);
    let mut dates = holdings.iter().map(|h| h.date_added);

    for position in &snapshot.positions {
        writer.serialize(ExportRow {
            symbol: &position.symbol,
            name: &position.display_name,
            shares: position.shares,
            average_cost: position.average_cost,
            current_price: position.current_price,
            current_value: position.position_value,
            gain: position.position_gain,
            gain_pct: format!("{:.2}", position.gain_pct),
            date_added: dates.next(),
        })?;
    }
    if snapshot.positions.is_empty() {
        writer.write_record(EXPORT_HEADERS)?;
    }
    writer.flush()?;
    Ok(snapshot.positions.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::holding::Holding;
    use crate::core::valuation::summarize;
    use chrono::Utc;
    use std::collections::HashMap;

    #[test]
    fn test_empty_export_still_has_header() {
        let mut out = Vec::new();
        let written =
            write_export(&mut out, &HoldingSet::new(), &ValuationSnapshot::empty(Utc::now()))
                .unwrap();

        assert_eq!(written, 0);
        assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", EXPORT_HEADERS.join(",")));
    }

    #[test]
    fn test_export_uses_readable_headers() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
        let holdings: HoldingSet = vec![Holding::new("VTI", 2.0, 250.0, date)].into();
        let snapshot = summarize(&holdings, &HashMap::new(), Utc::now());

        let mut out = Vec::new();
        let written = write_export(&mut out, &holdings, &snapshot).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(written, 1);
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Symbol,Name,Shares,Average_Cost,Current_Price,Current_Value,Gain,Gain_Pct,Date_Added")
        );
        assert_eq!(lines.next(), Some("VTI,VTI,2.0,250.0,0.0,0.0,-500.0,-100.00,2025-04-02"));
    }
}
