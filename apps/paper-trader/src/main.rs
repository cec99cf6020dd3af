//! Paper Trader Binary
//!
//! Interactive menu over an Alpaca paper-trading account, plus one-shot
//! subcommands.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p paper-trader
//! cargo run -p paper-trader -- ask "buy 10 shares of Apple"
//! cargo run -p paper-trader -- bars BTC/USD --timeframe 1Hour --limit 24 --csv btc.csv
//! cargo run -p paper-trader -- bars AAPL --start 2024-01-02 --end 2024-01-31 --limit 50
//! ```
//!
//! # Environment Variables
//!
//! ## Required (or entered through the menu)
//! - `ALPACA_API_KEY`: Broker API key
//! - `ALPACA_SECRET_KEY`: Broker API secret
//!
//! ## Optional
//! - `ALPACA_BASE_URL`: Trading API override (default: paper endpoint)
//! - `ALPACA_DATA_URL`: Market data API override
//! - `ALPACA_DATA_FEED`: iex | sip (default: iex)
//! - `ANTHROPIC_API_KEY`: Enables the assistant
//! - `ANTHROPIC_MODEL`: Assistant model
//! - `PAPER_TRADER_CONFIG`: YAML settings file
//! - `RUST_LOG`: Log filter (default: `paper_trader=warn`)

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use paper_trader::cli::{Menu, bars_table};
use paper_trader::config::load_settings;
use paper_trader::domain::{DateRange, Symbol, Timeframe};
use paper_trader::infrastructure::container::{Container, ContainerError};
use paper_trader::infrastructure::export::export_bars_csv;
use paper_trader::telemetry::init_tracing;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a YAML settings file (default: $PAPER_TRADER_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one instruction to the assistant and print its response
    Ask {
        /// Instruction text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Print historical bars for a stock or crypto pair
    Bars {
        /// Symbol, e.g. AAPL or BTC/USD
        symbol: String,
        /// Bar interval
        #[arg(short, long, default_value = "1Day")]
        timeframe: String,
        /// Number of bars
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
        /// First day, YYYY-MM-DD (UTC)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day, YYYY-MM-DD (UTC, inclusive)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Also write the bars to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = Args::parse();
    let settings = load_settings(args.config.as_deref()).context("failed to load settings")?;

    let container = match Container::from_settings(&settings) {
        Ok(container) => Some(container),
        Err(ContainerError::MissingAlpacaCredentials) => None,
        Err(err) => return Err(err.into()),
    };

    match args.command {
        None => {
            let stdin = io::stdin();
            let mut menu = Menu::new(stdin.lock(), io::stdout(), settings, container);
            menu.run().await?;
        }
        Some(Command::Ask { text }) => {
            let container = container.context(ContainerError::MissingAlpacaCredentials)?;
            let Some(interpreter) = container.interpreter() else {
                bail!("assistant unavailable: set ANTHROPIC_API_KEY");
            };
            let response = interpreter.process_instruction(&text.join(" ")).await?;
            println!("{response}");
        }
        Some(Command::Bars {
            symbol,
            timeframe,
            limit,
            start,
            end,
            csv,
        }) => {
            let container = container.context(ContainerError::MissingAlpacaCredentials)?;
            let symbol = Symbol::parse(&symbol)?;
            let timeframe: Timeframe = timeframe.parse()?;
            let range = DateRange::from_dates(start, end)?;
            let series = container
                .market_data()
                .get_bars_within(symbol, timeframe, limit, range)
                .await?;

            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", bars_table(&series))?;
            if let Some(path) = csv {
                let written = export_bars_csv(&path, series.bars())?;
                writeln!(stdout, "Wrote {written} bars to {}", path.display())?;
            }
        }
    }

    Ok(())
}
