//! Interactive numbered menu.
//!
//! The menu reads lines from any `BufRead` and writes to any `Write`, so it
//! runs the same against a terminal and against in-memory buffers. Every
//! failed action is reported and the loop keeps going; only I/O failure
//! or end of input stops it.

mod format;

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

pub use format::{account_summary, bars_table, order_line, orders_table, positions_table};

use crate::application::services::{
    AccountService, DEFAULT_ORDER_LIST_LIMIT, MarketDataService, OrderService,
};
use crate::config::Settings;
use crate::domain::{
    DateRange, OrderRequest, OrderSide, OrderStatusFilter, OrderType, Symbol, TimeInForce,
    Timeframe,
};
use crate::error::{TradingError, ValidationError};
use crate::infrastructure::alpaca::AlpacaEnvironment;
use crate::infrastructure::container::{Container, ContainerError};
use crate::infrastructure::export::{ExportError, default_file_name, export_bars_csv};

const MENU: &str = "\
=== Alpaca Trader Menu ===
1. View Account
2. Place Market Order
3. Place Limit Order
4. Place Stop Order
5. Place Stop Limit Order
6. View Orders
7. Cancel Order
8. Cancel All Orders
9. View Positions
10. Stock Data
11. Crypto Data
12. Setup Account
13. Ask Assistant
0. Exit
==========================";

const DASHBOARD_URL: &str = "https://app.alpaca.markets/paper/dashboard/overview";

/// Errors raised while handling one menu choice.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input ended.
    #[error("end of input")]
    Eof,

    /// A facade call failed.
    #[error(transparent)]
    Trading(#[from] TradingError),

    /// Account setup could not build the clients.
    #[error(transparent)]
    Setup(#[from] ContainerError),

    /// CSV export failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// No Alpaca credentials yet.
    #[error("Alpaca account is not configured; choose 12 (Setup Account) first")]
    NotConfigured,

    /// No language model configured.
    #[error("Assistant unavailable: set ANTHROPIC_API_KEY to enable it")]
    AssistantUnavailable,
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        Self::Trading(err.into())
    }
}

/// One entry of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Show the account snapshot.
    ViewAccount,
    /// Place an order of the given type.
    PlaceOrder(OrderType),
    /// List orders.
    ViewOrders,
    /// Cancel one order.
    CancelOrder,
    /// Cancel every open order.
    CancelAllOrders,
    /// List open positions.
    ViewPositions,
    /// Stock bars.
    StockData,
    /// Crypto bars.
    CryptoData,
    /// Enter credentials for this session.
    SetupAccount,
    /// Free-text instruction.
    AskAssistant,
    /// Leave the menu.
    Quit,
}

impl FromStr for MenuChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let choice = match s.trim().to_lowercase().as_str() {
            "1" => Self::ViewAccount,
            "2" => Self::PlaceOrder(OrderType::Market),
            "3" => Self::PlaceOrder(OrderType::Limit),
            "4" => Self::PlaceOrder(OrderType::Stop),
            "5" => Self::PlaceOrder(OrderType::StopLimit),
            "6" => Self::ViewOrders,
            "7" => Self::CancelOrder,
            "8" => Self::CancelAllOrders,
            "9" => Self::ViewPositions,
            "10" => Self::StockData,
            "11" => Self::CryptoData,
            "12" => Self::SetupAccount,
            "13" => Self::AskAssistant,
            "0" | "q" | "quit" | "exit" => Self::Quit,
            other => return Err(other.to_string()),
        };
        Ok(choice)
    }
}

/// Interactive session over the facades.
pub struct Menu<R, W> {
    input: R,
    output: W,
    settings: Settings,
    container: Option<Container>,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    /// Create a session. `container` is `None` until credentials exist.
    pub const fn new(input: R, output: W, settings: Settings, container: Option<Container>) -> Self {
        Self {
            input,
            output,
            settings,
            container,
        }
    }

    /// Run until the user quits or input ends.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Io` if the terminal cannot be read or written.
    pub async fn run(&mut self) -> Result<(), CliError> {
        if self.container.is_none() {
            writeln!(
                self.output,
                "No Alpaca credentials found. Choose 12 to set up an account."
            )?;
        }

        loop {
            writeln!(self.output, "\n{MENU}")?;
            let line = match self.prompt("Enter your choice: ") {
                Ok(line) => line,
                Err(CliError::Eof) => return Ok(()),
                Err(err) => return Err(err),
            };

            let Ok(choice) = line.parse::<MenuChoice>() else {
                writeln!(self.output, "Invalid choice '{line}'. Please try again.")?;
                continue;
            };
            if choice == MenuChoice::Quit {
                writeln!(self.output, "Goodbye.")?;
                return Ok(());
            }

            match self.dispatch(choice).await {
                Ok(()) => {}
                Err(CliError::Eof) => return Ok(()),
                Err(err @ CliError::Io(_)) => return Err(err),
                Err(err) => self.report(&err)?,
            }
        }
    }

    async fn dispatch(&mut self, choice: MenuChoice) -> Result<(), CliError> {
        tracing::debug!(?choice, "Menu choice");
        match choice {
            MenuChoice::ViewAccount => self.view_account().await,
            MenuChoice::PlaceOrder(order_type) => self.place_order(order_type).await,
            MenuChoice::ViewOrders => self.view_orders().await,
            MenuChoice::CancelOrder => self.cancel_order().await,
            MenuChoice::CancelAllOrders => self.cancel_all_orders().await,
            MenuChoice::ViewPositions => self.view_positions().await,
            MenuChoice::StockData => self.show_bars("Stock Data", "AAPL").await,
            MenuChoice::CryptoData => self.show_bars("Crypto Data", "BTC/USD").await,
            MenuChoice::SetupAccount => self.setup_account().await,
            MenuChoice::AskAssistant => self.ask_assistant().await,
            MenuChoice::Quit => Ok(()),
        }
    }

    fn report(&mut self, err: &CliError) -> io::Result<()> {
        tracing::debug!(error = %err, "Menu action failed");
        match err {
            CliError::Trading(e) => writeln!(self.output, "{}: {e}", e.kind()),
            other => writeln!(self.output, "Error: {other}"),
        }
    }

    // ============================================
    // Actions
    // ============================================

    async fn view_account(&mut self) -> Result<(), CliError> {
        let account = self.accounts()?.get_account().await?;
        writeln!(self.output, "\n{}", account_summary(&account))?;
        Ok(())
    }

    async fn place_order(&mut self, order_type: OrderType) -> Result<(), CliError> {
        let orders = self.orders()?;
        writeln!(self.output, "\n=== Place {} Order ===", order_title(order_type))?;

        let symbol = Symbol::parse(self.prompt("Symbol (e.g., AAPL): ")?)?;
        let side: OrderSide = self.prompt("Order side (buy/sell): ")?.parse()?;

        // dollar-amount orders are market/DAY only, so they skip the rest
        if order_type == OrderType::Market && self.prompt_by_dollars()? {
            let amount = self.prompt_decimal("Dollar amount: $", "notional")?;
            let request = OrderRequest::notional(symbol, side, amount);
            request.validate()?;
            return self.confirm_and_submit(&orders, request).await;
        }

        let quantity = self.prompt_decimal("Quantity (shares): ", "quantity")?;
        let mut request = OrderRequest::market(symbol, side, quantity);
        request.order_type = order_type;
        if order_type.requires_limit_price() {
            request.limit_price = Some(self.prompt_decimal("Limit price: $", "limit_price")?);
        }
        if order_type.requires_stop_price() {
            request.stop_price = Some(self.prompt_decimal("Stop price: $", "stop_price")?);
        }
        request = request.with_time_in_force(self.prompt_time_in_force()?);
        if self.confirm("Allow extended hours trading? (y/n, default: n): ", false)? {
            request = request.with_extended_hours();
        }
        request.validate()?;
        self.confirm_and_submit(&orders, request).await
    }

    async fn confirm_and_submit(
        &mut self,
        orders: &OrderService,
        request: OrderRequest,
    ) -> Result<(), CliError> {
        self.write_order_summary(&request)?;
        if !self.confirm("\nConfirm order (y/n): ", false)? {
            writeln!(self.output, "Order cancelled.")?;
            return Ok(());
        }

        let result = orders.submit_order(request).await?;
        writeln!(self.output, "Order submitted: {}", order_line(&result))?;
        Ok(())
    }

    async fn view_orders(&mut self) -> Result<(), CliError> {
        let orders = self.orders()?;
        let filter: OrderStatusFilter = self
            .prompt_default("Status (open/closed/all, default open): ", "open")?
            .parse()?;
        let listed = orders.list_orders(filter, DEFAULT_ORDER_LIST_LIMIT).await?;
        writeln!(self.output, "\n{}", orders_table(&listed))?;
        Ok(())
    }

    async fn cancel_order(&mut self) -> Result<(), CliError> {
        let orders = self.orders()?;
        let order_id = self.prompt("Order ID: ")?;
        orders.cancel_order(&order_id).await?;
        writeln!(self.output, "Cancel requested for order {order_id}.")?;
        Ok(())
    }

    async fn cancel_all_orders(&mut self) -> Result<(), CliError> {
        let orders = self.orders()?;
        if !self.confirm("Cancel ALL open orders? (y/n): ", false)? {
            writeln!(self.output, "Nothing cancelled.")?;
            return Ok(());
        }
        let outcomes = orders.cancel_all_orders().await?;
        writeln!(self.output, "{}", format::cancel_outcomes(&outcomes))?;
        Ok(())
    }

    async fn view_positions(&mut self) -> Result<(), CliError> {
        let positions = self.accounts()?.list_positions().await?;
        writeln!(self.output, "\n{}", positions_table(&positions))?;
        Ok(())
    }

    async fn show_bars(&mut self, title: &str, default_symbol: &str) -> Result<(), CliError> {
        let market_data = self.market_data()?;
        writeln!(self.output, "\n=== {title} ===")?;

        let symbol = self.prompt_default(
            &format!("Symbol (default {default_symbol}): "),
            default_symbol,
        )?;
        let symbol = Symbol::parse(symbol)?;
        let timeframe: Timeframe = self
            .prompt_default(
                "Timeframe (1Min/5Min/15Min/30Min/1Hour/1Day/1Week/1Month, default 1Day): ",
                "1Day",
            )?
            .parse()?;
        let limit_text = self.prompt_default("Number of bars (default 10): ", "10")?;
        let limit: u32 = limit_text.parse().map_err(|_| ValidationError::InvalidValue {
            field: "limit",
            value: limit_text.clone(),
        })?;
        let start = self.prompt_date("Start date (YYYY-MM-DD, blank for none): ", "start")?;
        let end = self.prompt_date("End date (YYYY-MM-DD, blank for now): ", "end")?;
        let range = DateRange::from_dates(start, end)?;

        let series = market_data
            .get_bars_within(symbol, timeframe, limit, range)
            .await?;
        if !series.is_empty() && series.timeframe != timeframe {
            writeln!(
                self.output,
                "No {timeframe} bars available; showing {} bars instead.",
                series.timeframe
            )?;
        }
        writeln!(self.output, "\n{}", bars_table(&series))?;

        if series.is_empty() || !self.confirm("Export to CSV? (y/n, default: n): ", false)? {
            return Ok(());
        }
        let default_path = default_file_name(series.symbol.as_str(), series.timeframe.as_str());
        let path = self.prompt_default(&format!("File (default {default_path}): "), &default_path)?;
        let written = export_bars_csv(Path::new(&path), series.bars())?;
        writeln!(self.output, "Wrote {written} bars to {path}.")?;
        Ok(())
    }

    async fn setup_account(&mut self) -> Result<(), CliError> {
        if self.settings.alpaca.has_credentials()
            && !self.confirm(
                "Account is already configured. Reconfigure? (y/n): ",
                false,
            )?
        {
            return Ok(());
        }

        writeln!(self.output, "\n=== Alpaca Account Setup ===")?;
        writeln!(self.output, "Generate API keys from the Alpaca dashboard: {DASHBOARD_URL}")?;
        writeln!(self.output, "Keys are kept in memory for this session only.\n")?;

        let api_key = self.prompt("API Key: ")?;
        let secret_key = self.prompt("API Secret: ")?;
        let paper = self.confirm("Use paper trading? (y/n, default: y): ", true)?;

        let mut settings = self.settings.clone();
        settings.alpaca.api_key = api_key;
        settings.alpaca.secret_key = secret_key;
        settings.alpaca.environment = if paper {
            AlpacaEnvironment::Paper
        } else {
            AlpacaEnvironment::Live
        };

        settings.alpaca.check_key_format()?;

        // the previous session stays active unless the new keys work
        let container = Container::from_settings(&settings)?;
        writeln!(self.output, "Verifying credentials...")?;
        let account = match container.accounts().get_account().await {
            Ok(account) => account,
            Err(err) => {
                writeln!(self.output, "Verification failed; previous configuration kept.")?;
                return Err(err.into());
            }
        };

        let environment = settings.alpaca.environment;
        self.settings = settings;
        self.container = Some(container);

        writeln!(
            self.output,
            "Account configured ({environment}). Account {} is {}.",
            account.account_number, account.status
        )?;
        if environment.is_live() {
            writeln!(self.output, "Warning: live trading uses real money.")?;
        }
        Ok(())
    }

    async fn ask_assistant(&mut self) -> Result<(), CliError> {
        let interpreter = self
            .container
            .as_ref()
            .ok_or(CliError::NotConfigured)?
            .interpreter()
            .cloned()
            .ok_or(CliError::AssistantUnavailable)?;

        let text = self.prompt("What would you like to do? ")?;
        if text.is_empty() {
            return Ok(());
        }
        let response = interpreter.process_instruction(&text).await?;
        writeln!(self.output, "\n{response}")?;
        Ok(())
    }

    // ============================================
    // Facade access
    // ============================================

    fn facades(&self) -> Result<&Container, CliError> {
        self.container.as_ref().ok_or(CliError::NotConfigured)
    }

    fn orders(&self) -> Result<OrderService, CliError> {
        Ok(self.facades()?.orders().clone())
    }

    fn accounts(&self) -> Result<AccountService, CliError> {
        Ok(self.facades()?.accounts().clone())
    }

    fn market_data(&self) -> Result<MarketDataService, CliError> {
        Ok(self.facades()?.market_data().clone())
    }

    // ============================================
    // Input helpers
    // ============================================

    fn prompt(&mut self, label: &str) -> Result<String, CliError> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(CliError::Eof);
        }
        Ok(line.trim().to_string())
    }

    fn prompt_default(&mut self, label: &str, default: &str) -> Result<String, CliError> {
        let value = self.prompt(label)?;
        Ok(if value.is_empty() {
            default.to_string()
        } else {
            value
        })
    }

    fn prompt_decimal(&mut self, label: &str, field: &'static str) -> Result<Decimal, CliError> {
        let value = self.prompt(label)?;
        Decimal::from_str(&value)
            .map_err(|_| ValidationError::InvalidValue { field, value }.into())
    }

    fn prompt_by_dollars(&mut self) -> Result<bool, CliError> {
        let value = self.prompt_default(
            "Order by shares or dollar amount? (shares/dollars, default shares): ",
            "shares",
        )?;
        match value.to_lowercase().as_str() {
            "shares" | "s" => Ok(false),
            "dollars" | "dollar" | "d" | "$" => Ok(true),
            _ => Err(ValidationError::InvalidValue {
                field: "order amount",
                value,
            }
            .into()),
        }
    }

    fn prompt_date(
        &mut self,
        label: &str,
        field: &'static str,
    ) -> Result<Option<NaiveDate>, CliError> {
        let value = self.prompt(label)?;
        if value.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(&value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ValidationError::InvalidValue { field, value }.into())
    }

    fn prompt_time_in_force(&mut self) -> Result<TimeInForce, CliError> {
        let value = self.prompt_default(
            "Time in force (day/gtc/ioc/fok/opg/cls, default day): ",
            "day",
        )?;
        Ok(value.parse()?)
    }

    fn confirm(&mut self, label: &str, default: bool) -> Result<bool, CliError> {
        let answer = self.prompt(label)?.to_lowercase();
        Ok(match answer.as_str() {
            "" => default,
            "y" | "yes" => true,
            _ => false,
        })
    }

    fn write_order_summary(&mut self, request: &OrderRequest) -> io::Result<()> {
        writeln!(self.output, "\nOrder Summary:")?;
        writeln!(self.output, "Symbol: {}", request.symbol)?;
        writeln!(self.output, "Side: {}", request.side)?;
        if let Some(quantity) = request.quantity {
            writeln!(self.output, "Quantity: {} shares", quantity.normalize())?;
        }
        if let Some(amount) = request.notional {
            writeln!(self.output, "Notional: ${}", amount.normalize())?;
        }
        writeln!(self.output, "Type: {}", order_title(request.order_type))?;
        if let Some(price) = request.limit_price {
            writeln!(self.output, "Limit Price: ${price}")?;
        }
        if let Some(price) = request.stop_price {
            writeln!(self.output, "Stop Price: ${price}")?;
        }
        writeln!(self.output, "Time in Force: {}", request.time_in_force)?;
        writeln!(
            self.output,
            "Extended Hours: {}",
            if request.extended_hours { "Yes" } else { "No" }
        )
    }
}

const fn order_title(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::Market => "Market",
        OrderType::Limit => "Limit",
        OrderType::Stop => "Stop",
        OrderType::StopLimit => "Stop Limit",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use serde_json::json;
    use test_case::test_case;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::application::ports::{BarsRequest, BrokerPort, MarketDataPort};
    use crate::domain::{
        Account, Bar, CancelOutcome, OrderResult, OrderStatus, Position, Timeframe,
    };
    use crate::error::ExternalApiError;

    #[derive(Default)]
    struct FakeBroker {
        submitted: Mutex<Vec<OrderRequest>>,
        account_error: Option<ExternalApiError>,
    }

    impl FakeBroker {
        fn submitted(&self) -> Vec<OrderRequest> {
            self.submitted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BrokerPort for FakeBroker {
        async fn submit_order(&self, request: &OrderRequest) -> Result<OrderResult, ExternalApiError> {
            self.submitted.lock().unwrap().push(request.clone());
            Ok(OrderResult {
                id: "order-1".to_string(),
                client_order_id: request.client_order_id.clone().unwrap_or_default(),
                symbol: request.symbol.to_string(),
                side: request.side,
                order_type: request.order_type,
                status: OrderStatus::New,
                raw_status: "accepted".to_string(),
                qty: request.quantity,
                filled_qty: Decimal::ZERO,
                filled_avg_price: None,
                limit_price: request.limit_price,
                stop_price: request.stop_price,
                submitted_at: None,
            })
        }

        async fn get_order(&self, order_id: &str) -> Result<OrderResult, ExternalApiError> {
            Err(ExternalApiError::NotFound {
                provider: "alpaca",
                resource: order_id.to_string(),
            })
        }

        async fn list_orders(
            &self,
            _: OrderStatusFilter,
            _: u32,
        ) -> Result<Vec<OrderResult>, ExternalApiError> {
            Ok(Vec::new())
        }

        async fn cancel_order(&self, _: &str) -> Result<(), ExternalApiError> {
            Ok(())
        }

        async fn cancel_all_orders(&self) -> Result<Vec<CancelOutcome>, ExternalApiError> {
            Ok(vec![CancelOutcome {
                order_id: "order-1".to_string(),
                status: 200,
            }])
        }

        async fn get_account(&self) -> Result<Account, ExternalApiError> {
            if let Some(err) = &self.account_error {
                return Err(err.clone());
            }
            Ok(Account {
                account_number: "PA123".to_string(),
                status: "ACTIVE".to_string(),
                currency: "USD".to_string(),
                cash: dec!(100000),
                buying_power: dec!(200000),
                equity: dec!(100000),
                portfolio_value: dec!(100000),
                daytrade_count: Some(0),
                pattern_day_trader: false,
            })
        }

        async fn list_positions(&self) -> Result<Vec<Position>, ExternalApiError> {
            Ok(Vec::new())
        }
    }

    /// Three bars for `only` (or every timeframe when `None`), nothing otherwise.
    struct FakeBars {
        only: Option<Timeframe>,
    }

    #[async_trait]
    impl MarketDataPort for FakeBars {
        async fn get_bars(&self, request: &BarsRequest) -> Result<Vec<Bar>, ExternalApiError> {
            if self.only.is_some_and(|tf| tf != request.timeframe) {
                return Ok(Vec::new());
            }
            let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
            Ok((0..3)
                .map(|i| Bar {
                    timestamp: start + Duration::days(i),
                    open: dec!(100),
                    high: dec!(101),
                    low: dec!(99),
                    close: dec!(100.5),
                    volume: dec!(1000),
                })
                .collect())
        }
    }

    fn container(broker: Arc<FakeBroker>, bars: FakeBars) -> Container {
        Container::new(broker, Arc::new(bars), None, &Settings::default())
    }

    async fn run(input: &str, container: Option<Container>) -> String {
        run_with(input, Settings::default(), container).await
    }

    async fn run_with(input: &str, settings: Settings, container: Option<Container>) -> String {
        let mut output = Vec::new();
        {
            let mut menu = Menu::new(input.as_bytes(), &mut output, settings, container);
            menu.run().await.unwrap();
        }
        String::from_utf8(output).unwrap()
    }

    #[test_case("1", MenuChoice::ViewAccount)]
    #[test_case("5", MenuChoice::PlaceOrder(OrderType::StopLimit))]
    #[test_case(" 11 ", MenuChoice::CryptoData)]
    #[test_case("Q", MenuChoice::Quit)]
    #[test_case("0", MenuChoice::Quit)]
    fn menu_choice_parses(input: &str, expected: MenuChoice) {
        assert_eq!(input.parse::<MenuChoice>().unwrap(), expected);
    }

    #[test]
    fn unknown_menu_choice_rejected() {
        assert!("14".parse::<MenuChoice>().is_err());
    }

    #[tokio::test]
    async fn quit_ends_session() {
        let output = run("0\n", None).await;
        assert!(output.contains("=== Alpaca Trader Menu ==="));
        assert!(output.ends_with("Goodbye.\n"));
    }

    #[tokio::test]
    async fn end_of_input_ends_session() {
        let output = run("", None).await;
        assert!(output.contains("Enter your choice: "));
    }

    #[tokio::test]
    async fn invalid_choice_keeps_looping() {
        let output = run("42\n0\n", None).await;
        assert!(output.contains("Invalid choice '42'"));
        assert!(output.contains("Goodbye."));
    }

    #[tokio::test]
    async fn actions_need_credentials() {
        let output = run("1\n0\n", None).await;
        assert!(output.contains("Error: Alpaca account is not configured"));
        assert!(output.contains("Goodbye."));
    }

    #[tokio::test]
    async fn view_account() {
        let broker = Arc::new(FakeBroker::default());
        let output = run("1\n0\n", Some(container(broker, FakeBars { only: None }))).await;
        assert!(output.contains("Account:         PA123"));
        assert!(output.contains("Buying power:    $200000.00"));
    }

    #[tokio::test]
    async fn vendor_error_is_reported_and_loop_continues() {
        let broker = Arc::new(FakeBroker {
            account_error: Some(ExternalApiError::RateLimited {
                provider: "alpaca",
                retry_after_secs: 60,
            }),
            ..FakeBroker::default()
        });
        let output = run("1\n9\n0\n", Some(container(broker, FakeBars { only: None }))).await;
        assert!(output.contains("external API error: "));
        assert!(output.contains("No open positions."));
        assert!(output.contains("Goodbye."));
    }

    #[tokio::test]
    async fn market_order_is_submitted_after_confirmation() {
        let broker = Arc::new(FakeBroker::default());
        let input = "2\naapl\nbuy\n\n10\n\n\ny\n0\n";
        let output = run(input, Some(container(Arc::clone(&broker), FakeBars { only: None }))).await;

        let submitted = broker.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].symbol.as_str(), "AAPL");
        assert_eq!(submitted[0].side, OrderSide::Buy);
        assert_eq!(submitted[0].quantity, Some(dec!(10)));
        assert_eq!(submitted[0].order_type, OrderType::Market);
        assert_eq!(submitted[0].time_in_force, TimeInForce::Day);
        assert!(output.contains("Order submitted: order-1 buy 10 AAPL MARKET [new]"));
    }

    #[tokio::test]
    async fn stop_limit_order_prompts_for_both_prices() {
        let broker = Arc::new(FakeBroker::default());
        let input = "5\nMSFT\nsell\n3\n405\n400\ngtc\nn\ny\n0\n";
        run(input, Some(container(Arc::clone(&broker), FakeBars { only: None }))).await;

        let submitted = broker.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].limit_price, Some(dec!(405)));
        assert_eq!(submitted[0].stop_price, Some(dec!(400)));
        assert_eq!(submitted[0].time_in_force, TimeInForce::Gtc);
    }

    #[tokio::test]
    async fn declined_order_is_not_submitted() {
        let broker = Arc::new(FakeBroker::default());
        let input = "2\nAAPL\nbuy\nshares\n10\n\n\nn\n0\n";
        let output = run(input, Some(container(Arc::clone(&broker), FakeBars { only: None }))).await;
        assert!(output.contains("Order cancelled."));
        assert!(broker.submitted().is_empty());
    }

    #[tokio::test]
    async fn invalid_price_is_a_validation_error() {
        let broker = Arc::new(FakeBroker::default());
        let input = "3\nAAPL\nbuy\n5\n-1\n\n\n0\n";
        let output = run(input, Some(container(Arc::clone(&broker), FakeBars { only: None }))).await;
        assert!(output.contains("validation error: limit price must be positive"));
        assert!(broker.submitted().is_empty());
        assert!(output.contains("Goodbye."));
    }

    #[tokio::test]
    async fn unparseable_quantity_is_a_validation_error() {
        let broker = Arc::new(FakeBroker::default());
        let input = "2\nAAPL\nbuy\n\nten\n0\n";
        let output = run(input, Some(container(Arc::clone(&broker), FakeBars { only: None }))).await;
        assert!(output.contains("validation error: "));
        assert!(broker.submitted().is_empty());
    }

    #[tokio::test]
    async fn cancel_all_reports_outcomes() {
        let broker = Arc::new(FakeBroker::default());
        let output = run("8\ny\n0\n", Some(container(broker, FakeBars { only: None }))).await;
        assert!(output.contains("Cancel requested for 1 of 1 orders"));
    }

    #[tokio::test]
    async fn stock_data_exports_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aapl.csv");
        let input = format!("10\nAAPL\n1Day\n2\n\n\ny\n{}\n0\n", path.display());
        let broker = Arc::new(FakeBroker::default());
        let output = run(&input, Some(container(broker, FakeBars { only: None }))).await;

        assert!(output.contains("AAPL 1Day (2 bars)"));
        assert!(output.contains("Wrote 2 bars to"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 3);
        assert!(written.starts_with("timestamp,open,high,low,close,volume"));
    }

    #[tokio::test]
    async fn crypto_data_notes_fallback_timeframe() {
        let broker = Arc::new(FakeBroker::default());
        let bars = FakeBars {
            only: Some(Timeframe::OneDay),
        };
        let output = run("11\n\n1Hour\n\n\n\nn\n0\n", Some(container(broker, bars))).await;
        assert!(output.contains("No 1Hour bars available; showing 1Day bars instead."));
        assert!(output.contains("BTC/USD 1Day (3 bars)"));
    }

    #[tokio::test]
    async fn unsupported_timeframe_is_a_validation_error() {
        let broker = Arc::new(FakeBroker::default());
        let output = run("10\nAAPL\n2Day\n0\n", Some(container(broker, FakeBars { only: None }))).await;
        assert!(output.contains("validation error: "));
    }

    #[tokio::test]
    async fn assistant_needs_a_model() {
        let broker = Arc::new(FakeBroker::default());
        let output = run("13\n0\n", Some(container(broker, FakeBars { only: None }))).await;
        assert!(output.contains("Error: Assistant unavailable"));
    }

    #[tokio::test]
    async fn notional_market_order_skips_share_prompts() {
        let broker = Arc::new(FakeBroker::default());
        let input = "2\nspy\nbuy\ndollars\n250.00\ny\n0\n";
        let output = run(input, Some(container(Arc::clone(&broker), FakeBars { only: None }))).await;

        let submitted = broker.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].quantity, None);
        assert_eq!(submitted[0].notional, Some(dec!(250)));
        assert_eq!(submitted[0].time_in_force, TimeInForce::Day);
        assert!(output.contains("Notional: $250"));
        assert!(!output.contains("Quantity (shares): "));
        assert!(!output.contains("Time in force ("));
    }

    #[tokio::test]
    async fn zero_dollar_amount_is_a_validation_error() {
        let broker = Arc::new(FakeBroker::default());
        let input = "2\nSPY\nbuy\nd\n0\n0\n";
        let output = run(input, Some(container(Arc::clone(&broker), FakeBars { only: None }))).await;
        assert!(output.contains("validation error: Notional amount must be positive"));
        assert!(broker.submitted().is_empty());
    }

    /// Records every bars request.
    #[derive(Default)]
    struct RecordingBars {
        requests: Mutex<Vec<BarsRequest>>,
    }

    #[async_trait]
    impl MarketDataPort for RecordingBars {
        async fn get_bars(&self, request: &BarsRequest) -> Result<Vec<Bar>, ExternalApiError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn stock_data_passes_the_date_range() {
        let bars = Arc::new(RecordingBars::default());
        let container = Container::new(
            Arc::new(FakeBroker::default()),
            bars.clone(),
            None,
            &Settings::default(),
        );
        let output = run("10\nAAPL\n1Day\n5\n2024-01-02\n2024-01-31\n0\n", Some(container)).await;

        assert!(output.contains("No bars for AAPL."));
        let requests = bars.requests.lock().unwrap();
        assert_eq!(requests[0].start, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(requests[0].end, Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).single());
        assert_eq!(requests[0].limit, 5);
    }

    #[test_case("2024-02-01\n2024-01-01", "validation error: Start " ; "reversed")]
    #[test_case("01/02/2024", "validation error: Invalid start" ; "wrong format")]
    #[tokio::test]
    async fn bad_dates_are_validation_errors(dates: &str, expected: &str) {
        let bars = Arc::new(RecordingBars::default());
        let container = Container::new(
            Arc::new(FakeBroker::default()),
            bars.clone(),
            None,
            &Settings::default(),
        );
        let input = format!("10\nAAPL\n1Day\n5\n{dates}\n0\n");
        let output = run(&input, Some(container)).await;

        assert!(output.contains(expected), "{output}");
        assert!(bars.requests.lock().unwrap().is_empty());
    }

    const KEY: &str = "PKTEST1234567890";
    const SECRET: &str = "abcdEFGH1234abcdEFGH1234abcdEFGH";

    fn settings_for(server: &MockServer) -> Settings {
        let mut settings = Settings::default();
        settings.alpaca.base_url = Some(server.uri());
        settings.alpaca.data_url = Some(server.uri());
        settings
    }

    #[tokio::test]
    async fn setup_account_verifies_keys_before_enabling_facades() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/account"))
            .and(header("APCA-API-KEY-ID", KEY))
            .and(header("APCA-API-SECRET-KEY", SECRET))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "904837e3-3b76-47ec-b432-046db621571b",
                "account_number": "PA3ZBCD1234",
                "status": "ACTIVE",
                "currency": "USD",
                "cash": "100000",
                "buying_power": "200000",
                "equity": "100000",
                "portfolio_value": "100000",
                "daytrade_count": 0,
                "pattern_day_trader": false
            })))
            // once to verify, once for View Account
            .expect(2)
            .mount(&server)
            .await;

        let input = format!("12\n{KEY}\n{SECRET}\n\n1\n0\n");
        let output = run_with(&input, settings_for(&server), None).await;

        assert!(output.contains("Account configured (PAPER). Account PA3ZBCD1234 is ACTIVE."));
        assert!(output.contains("Account:         PA3ZBCD1234"));
        assert!(!output.contains("Warning: live trading"));
    }

    #[tokio::test]
    async fn rejected_keys_keep_the_previous_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/account"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "unauthorized."})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let previous = container(Arc::new(FakeBroker::default()), FakeBars { only: None });
        let input = format!("12\n{KEY}\n{SECRET}\n\n1\n0\n");
        let output = run_with(&input, settings_for(&server), Some(previous)).await;

        assert!(output.contains("Verification failed; previous configuration kept."));
        assert!(output.contains("external API error: alpaca authentication failed"));
        assert!(!output.contains("Account configured"));
        // the old broker still answers
        assert!(output.contains("Account:         PA123"));
    }

    #[tokio::test]
    async fn malformed_keys_never_reach_the_broker() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let output = run_with("12\npktest\nsecret\n\n1\n0\n", settings_for(&server), None).await;
        assert!(output.contains("validation error: API key has an unexpected format"));
        assert!(output.contains("Error: Alpaca account is not configured"));
    }

    #[tokio::test]
    async fn setup_account_with_blank_keys_fails() {
        let output = run("12\n\n\n\n1\n0\n", None).await;
        assert!(output.contains("validation error: Missing required field: api_key"));
        assert!(output.contains("Error: Alpaca account is not configured"));
    }
}
