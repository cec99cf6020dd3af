//! Natural-language instruction interpreter.
//!
//! One instruction makes exactly one language-model call, with quotes for
//! the symbols it mentions and an account snapshot attached. The reply is
//! parsed in full before anything executes, so an unsupported action
//! aborts with nothing placed. Parsed actions then run one after another
//! against the facades; a failing action is recorded in the results and
//! the rest still run.

mod context;
mod parser;
mod prompt;
mod render;

use std::sync::Arc;

use rust_decimal::Decimal;

pub use context::{MAX_CONTEXT_SYMBOLS, candidate_symbols, gather as gather_context};
pub use parser::{Action, extract_section, parse_actions};
pub use prompt::{COMPANY_TICKERS, TOOL_DESCRIPTIONS, build_request, company_hints};
pub use render::{ActionOutcome, OutcomeStatus, render_response};

use super::{AccountService, MarketDataService, OrderService};
use crate::application::ports::LanguageModelPort;
use crate::domain::{OrderRequest, OrderSide, Symbol};
use crate::error::TradingError;

/// Turns free text into facade calls.
#[derive(Clone)]
pub struct InstructionInterpreter {
    model: Arc<dyn LanguageModelPort>,
    orders: OrderService,
    accounts: AccountService,
    market_data: MarketDataService,
}

impl InstructionInterpreter {
    /// Create an interpreter over the given facades.
    pub fn new(
        model: Arc<dyn LanguageModelPort>,
        orders: OrderService,
        accounts: AccountService,
        market_data: MarketDataService,
    ) -> Self {
        Self {
            model,
            orders,
            accounts,
            market_data,
        }
    }

    /// Process one instruction and render the response text.
    ///
    /// # Errors
    ///
    /// - `ExternalApi` if the language-model call fails
    /// - `UnsupportedAction` if the reply names an action outside the supported set
    /// - `Validation` if a supported action has malformed arguments
    pub async fn process_instruction(&self, text: &str) -> Result<String, TradingError> {
        let symbols = candidate_symbols(text);
        let market_data = gather_context(&self.market_data, &self.accounts, &symbols).await;
        tracing::debug!(symbols = symbols.len(), "Gathered market context");

        let request = build_request(text, &market_data);
        let reply = self.model.complete(&request).await?;

        let actions = parse_actions(&reply)?;
        tracing::info!(count = actions.len(), "Parsed assistant actions");

        let mut outcomes = Vec::with_capacity(actions.len());
        for action in &actions {
            outcomes.push(self.execute(action).await);
        }

        Ok(render_response(&reply, &actions, &outcomes))
    }

    /// Run one action, folding any error into the outcome.
    pub async fn execute(&self, action: &Action) -> ActionOutcome {
        tracing::debug!(action = %action, "Executing action");

        let outcome = match action {
            Action::BuyStock { symbol, quantity } => self.buy(action, symbol, *quantity).await,
            Action::GetStockPrice { symbol } => {
                match self.market_data.latest_price(symbol.as_str()).await {
                    Ok(Some(quote)) => ActionOutcome::success(action, quote),
                    Ok(None) => ActionOutcome::no_data(
                        action,
                        format!("No price data available for {symbol}"),
                    ),
                    Err(e) => ActionOutcome::error(action, e.to_string()),
                }
            }
            Action::GetAccountInfo => match self.accounts.get_account().await {
                Ok(account) => ActionOutcome::success(action, account),
                Err(e) => ActionOutcome::error(action, e.to_string()),
            },
        };

        if outcome.status == OutcomeStatus::Error {
            tracing::warn!(
                action = %action,
                error = outcome.message.as_deref().unwrap_or_default(),
                "Action failed"
            );
        }
        outcome
    }

    async fn buy(&self, action: &Action, symbol: &Symbol, quantity: Decimal) -> ActionOutcome {
        let request = OrderRequest::market(symbol.clone(), OrderSide::Buy, quantity);
        match self.orders.submit_order(request).await {
            Ok(result) => ActionOutcome::success(action, result),
            Err(e) => ActionOutcome::error(action, e.to_string()),
        }
    }
}

impl std::fmt::Debug for InstructionInterpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstructionInterpreter")
            .field("market_data", &self.market_data)
            .finish_non_exhaustive()
    }
}
