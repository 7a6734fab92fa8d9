//! Balance sheet analytics CLI
//!
//! Prints pretty JSON on stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rust_balance_sheets::{
    api::YahooClient,
    commands::{CommandHandler, CommandRequest, ErrorBody, Operation},
    models::Config,
    pipeline::StatementPipeline,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Balance sheet KPIs and charts for listed companies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct TickerArgs {
    /// Ticker symbols, e.g. AAPL MSFT SAP.DE
    #[arg(required = true)]
    tickers: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Company name, sector, country and employees
    CompanyInfo(TickerArgs),
    /// Condensed balance sheet (Strukturbilanz) for the display years
    StructuralBalanceSheet(TickerArgs),
    /// Equity and liabilities as stacked bars
    Dashboard(TickerArgs),
    /// Equity ratio, debt ratio and static debt ratio over time
    LeverageChart(TickerArgs),
    /// Fixed asset coverage ratios over time
    CoverageChart(TickerArgs),
    /// Liquidity ratios over time
    LiquidityChart(TickerArgs),
    /// Check whether a ticker has balance sheet data
    Check { ticker: String },
    /// Search ticker symbols by name
    Search { query: String },
}

impl Command {
    fn into_request(self) -> Option<CommandRequest> {
        let (operation, args) = match self {
            Command::CompanyInfo(args) => (Operation::CompanyInfo, args),
            Command::StructuralBalanceSheet(args) => (Operation::StructuralBalanceSheet, args),
            Command::Dashboard(args) => (Operation::Dashboard, args),
            Command::LeverageChart(args) => (Operation::LeverageChart, args),
            Command::CoverageChart(args) => (Operation::CoverageChart, args),
            Command::LiquidityChart(args) => (Operation::LiquidityChart, args),
            Command::Check { .. } | Command::Search { .. } => return None,
        };
        Some(CommandRequest {
            symbols: args.tickers,
            operation,
        })
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs on stderr so stdout stays machine readable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rust_balance_sheets=info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("📋 Configuration loaded, provider at {}", config.provider_base_url);

    let client = YahooClient::new(&config).context("Failed to create market data client")?;
    let pipeline = StatementPipeline::new(Arc::new(client), &config);
    let handler = CommandHandler::new(pipeline, &config);

    match cli.command {
        Command::Check { ticker } => print_json(&handler.check_ticker(&ticker).await),
        Command::Search { query } => print_json(&handler.search_tickers(&query).await),
        command => {
            let Some(request) = command.into_request() else {
                return Ok(());
            };
            match handler.handle(&request).await {
                Ok(response) => print_json(&response),
                Err(e) => {
                    error!("❌ {:?} failed: {}", request.operation, e);
                    print_json(&ErrorBody::from(&e))?;
                    std::process::exit(i32::from(e.status_code() / 100));
                }
            }
        }
    }
}
