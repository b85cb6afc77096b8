pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::import::ColumnOverrides;
use crate::core::transactions::ExportKind;
use crate::core::{MergeStrategy, QuoteCache};
use crate::store::CsvHoldingStore;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub file: PathBuf,
    pub strategy: MergeStrategy,
    pub columns: ColumnOverrides,
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Import(ImportOptions),
    Clean {
        input: PathBuf,
        output: PathBuf,
        kind: ExportKind,
        columns: ColumnOverrides,
    },
    Summary,
    Alloc,
    Export { output: PathBuf },
    Goals,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Wealth tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider = providers::YahooQuoteProvider::new(config.yahoo_base_url())?;
    let quotes = QuoteCache::with_ttl(Arc::new(provider), config.quote_cache_ttl());
    let store = CsvHoldingStore::in_dir(&config.default_data_path()?);

    match command {
        AppCommand::Import(options) => cli::import::run(&options, &store, &quotes).await,
        AppCommand::Clean {
            input,
            output,
            kind,
            columns,
        } => cli::clean::run(&input, &output, kind, &columns, &quotes).await,
        AppCommand::Summary => cli::summary::run(&store, &quotes, &config.currency).await,
        AppCommand::Alloc => cli::alloc::run(&store, &quotes, &config.currency).await,
        AppCommand::Export { output } => cli::export::run(&output, &store, &quotes).await,
        AppCommand::Goals => cli::goals::run(&config, &store, &quotes).await,
    }
}
