use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use wtrack::core::MergeStrategy;
use wtrack::core::import::ColumnOverrides;
use wtrack::core::transactions::ExportKind;
use wtrack::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ColumnArgs {
    /// Header holding the ticker symbol
    #[arg(long)]
    symbol_col: Option<String>,
    /// Header holding the share count
    #[arg(long)]
    shares_col: Option<String>,
    /// Header holding the cost basis (total or per share)
    #[arg(long)]
    cost_col: Option<String>,
    /// Header holding the market value
    #[arg(long)]
    value_col: Option<String>,
    /// Header holding the price
    #[arg(long)]
    price_col: Option<String>,
}

impl From<ColumnArgs> for ColumnOverrides {
    fn from(args: ColumnArgs) -> Self {
        ColumnOverrides {
            symbol: args.symbol_col,
            shares: args.shares_col,
            cost_basis: args.cost_col,
            market_value: args.value_col,
            price: args.price_col,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Import a brokerage CSV export into the tracked holdings
    Import {
        /// CSV file exported by the brokerage
        file: PathBuf,
        /// How to combine the import with tracked holdings
        #[arg(short, long, default_value = "update-existing-and-add-new")]
        strategy: MergeStrategy,
        #[command(flatten)]
        columns: ColumnArgs,
    },
    /// Convert a brokerage export into the canonical holdings format, or keep
    /// only the investment-related rows of a bank export
    Clean {
        input: PathBuf,
        output: PathBuf,
        /// Export type: auto, holdings or banking
        #[arg(short, long, default_value = "auto")]
        kind: ExportKind,
        #[command(flatten)]
        columns: ColumnArgs,
    },
    /// Display portfolio value and gains
    Summary,
    /// Display each position's share of portfolio value
    Alloc,
    /// Write holdings with current values to a CSV file
    Export { output: PathBuf },
    /// Display progress towards savings goals
    Goals,
}

impl From<Commands> for wtrack::AppCommand {
    fn from(cmd: Commands) -> wtrack::AppCommand {
        match cmd {
            Commands::Import {
                file,
                strategy,
                columns,
            } => wtrack::AppCommand::Import(wtrack::ImportOptions {
                file,
                strategy,
                columns: columns.into(),
            }),
            Commands::Clean {
                input,
                output,
                kind,
                columns,
            } => wtrack::AppCommand::Clean {
                input,
                output,
                kind,
                columns: columns.into(),
            },
            Commands::Summary => wtrack::AppCommand::Summary,
            Commands::Alloc => wtrack::AppCommand::Alloc,
            Commands::Export { output } => wtrack::AppCommand::Export { output },
            Commands::Goals => wtrack::AppCommand::Goals,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => wtrack::cli::setup::setup(),
        Some(cmd) => wtrack::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
