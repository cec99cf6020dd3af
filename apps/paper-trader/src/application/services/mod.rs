//! Facades that validate requests, call ports, and return normalized results.

mod account_service;
pub mod instruction;
mod market_data_service;
mod order_service;

pub use account_service::AccountService;
pub use instruction::InstructionInterpreter;
pub use market_data_service::{MAX_BAR_LIMIT, MarketDataService, PriceQuote};
pub use order_service::{DEFAULT_ORDER_LIST_LIMIT, OrderService};
