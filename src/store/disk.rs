use crate::core::holding::{Holding, HoldingSet};
use crate::store::HoldingStore;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const HOLDINGS_FILE: &str = "investments.csv";

/// Holdings kept as a flat CSV file (`symbol,name,shares,avg_cost,date_added`).
pub struct CsvHoldingStore {
    path: PathBuf,
}

impl CsvHoldingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the standard file name inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(HOLDINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Runs `write` against `temp_path`, then renames it over `path`. The temp
/// file is removed when `write` fails.
fn replace_via_temp<F>(path: &Path, temp_path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    if let Err(e) = write(temp_path) {
        if let Err(cleanup) = fs::remove_file(temp_path) {
            debug!("Could not remove {}: {}", temp_path.display(), cleanup);
        }
        return Err(e);
    }
    fs::rename(temp_path, path)
        .with_context(|| format!("Failed to write holdings file: {}", path.display()))
}

fn write_holdings(path: &Path, holdings: &HoldingSet) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for holding in holdings {
        writer.serialize(holding)?;
    }
    if holdings.is_empty() {
        writer.write_record(["symbol", "name", "shares", "avg_cost", "date_added"])?;
    }
    writer.flush()?;
    Ok(())
}

impl HoldingStore for CsvHoldingStore {
    fn load(&self) -> Result<HoldingSet> {
        if !self.path.exists() {
            debug!("No holdings file at {}", self.path.display());
            return Ok(HoldingSet::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("Failed to open holdings file: {}", self.path.display()))?;
        let holdings = reader
            .deserialize::<Holding>()
            .collect::<Result<HoldingSet, _>>()
            .with_context(|| format!("Failed to parse holdings file: {}", self.path.display()))?;

        debug!("Loaded {} holdings from {}", holdings.len(), self.path.display());
        Ok(holdings)
    }

    fn save(&self, holdings: &HoldingSet) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        // Written aside and renamed so a failed save leaves the old file intact.
        replace_via_temp(&self.path, &self.temp_path(), |temp| {
            write_holdings(temp, holdings)
        })?;
        debug!("Saved {} holdings to {}", holdings.len(), self.path.display());
        Ok(())
    }
}
