// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements,
        clippy::unreadable_literal
    )
)]

//! Paper Trader - Alpaca brokerage client
//!
//! A facade over Alpaca's trading and market data REST APIs that turns
//! vendor responses into uniform orders, accounts, positions and bars,
//! with an optional natural-language path through Anthropic.
//!
//! # Architecture
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Value types with no I/O (`OrderRequest`, `OrderResult`,
//!   `Account`, `Position`, `Bar`, `Timeframe`, `Symbol`)
//!
//! - **Application**: Facades and the ports they call
//!   - `ports`: `BrokerPort`, `MarketDataPort`, `LanguageModelPort`
//!   - `services`: `OrderService`, `AccountService`, `MarketDataService`,
//!     `InstructionInterpreter`
//!
//! - **Infrastructure**: Adapters and wiring
//!   - `alpaca`: Trading and market data REST adapters
//!   - `anthropic`: Messages API client
//!   - `export`: Bar CSV export
//!   - `container`: Builds the facades from settings
//!
//! - **Interface**: `cli` menu and the `paper-trader` binary
//!
//! Everything runs on one task; each call completes before the next starts.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Layers
// =============================================================================

/// Domain layer - Value types with no external dependencies.
pub mod domain;

/// Application layer - Facades and port definitions.
pub mod application;

/// Infrastructure layer - Vendor adapters, export, and wiring.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use application::services::{
    AccountService, InstructionInterpreter, MarketDataService, OrderService, PriceQuote,
};
pub use domain::{
    Account, Bar, BarSeries, CancelOutcome, OrderRequest, OrderResult, OrderSide, OrderStatus,
    OrderStatusFilter, OrderType, Position, Symbol, TimeInForce, Timeframe,
};
pub use error::{ExternalApiError, TradingError, ValidationError};
