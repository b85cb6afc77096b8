use crate::core::goal::DEFAULT_MILESTONES;
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Goal {
    pub name: String,
    pub target_amount: f64,
    /// Saved so far. When absent the current portfolio value is used.
    pub current_amount: Option<f64>,
    pub target_date: NaiveDate,
    pub start_date: Option<NaiveDate>,
}

impl Goal {
    pub fn validate(&self) -> Result<()> {
        if self.target_amount <= 0.0 {
            bail!("Goal '{}' must have a positive target amount", self.name);
        }
        if self.current_amount.is_some_and(|c| c < 0.0) {
            bail!("Goal '{}' cannot have a negative current amount", self.name);
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_ttl_secs() -> u64 {
    30
}

fn default_milestones() -> Vec<f64> {
    DEFAULT_MILESTONES.to_vec()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    pub data_path: Option<String>,
    #[serde(default = "default_ttl_secs")]
    pub quote_cache_ttl_secs: u64,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default = "default_milestones")]
    pub milestones: Vec<f64>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "wtrack", "wtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "wtrack", "wtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn quote_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.quote_cache_ttl_secs)
    }

    pub fn yahoo_base_url(&self) -> &str {
        self.providers
            .yahoo
            .as_ref()
            .map_or("https://query1.finance.yahoo.com", |p| &p.base_url)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        for goal in &config.goals {
            goal.validate()
                .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        }
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
currency: "USD"
data_path: "/tmp/wtrack"
quote_cache_ttl_secs: 5
providers:
  yahoo:
    base_url: "http://localhost:9000"
goals:
  - name: "First $100K Portfolio"
    target_amount: 100000
    target_date: 2027-12-31
  - name: "Emergency Fund"
    target_amount: 20000.0
    current_amount: 8500.0
    target_date: 2026-06-30
    start_date: 2025-01-01
milestones: [1000, 5000]
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.currency, "USD");
        assert_eq!(config.quote_cache_ttl(), Duration::from_secs(5));
        assert_eq!(config.yahoo_base_url(), "http://localhost:9000");
        assert_eq!(config.default_data_path().unwrap(), PathBuf::from("/tmp/wtrack"));
        assert_eq!(config.goals.len(), 2);
        assert_eq!(config.goals[0].current_amount, None);
        assert_eq!(
            config.goals[0].target_date,
            NaiveDate::from_ymd_opt(2027, 12, 31).unwrap()
        );
        assert_eq!(config.goals[1].current_amount, Some(8500.0));
        assert_eq!(
            config.goals[1].start_date,
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
        assert_eq!(config.milestones, vec![1000.0, 5000.0]);
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.currency, "USD");
        assert_eq!(config.quote_cache_ttl_secs, 30);
        assert_eq!(config.yahoo_base_url(), "https://query1.finance.yahoo.com");
        assert!(config.goals.is_empty());
        assert_eq!(config.milestones.len(), DEFAULT_MILESTONES.len());
    }

    #[test]
    fn test_invalid_goal_is_rejected() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            "goals:\n  - name: Broken\n    target_amount: 0\n    target_date: 2030-01-01\n"
        )?;

        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("must have a positive target amount"));
        Ok(())
    }
}
