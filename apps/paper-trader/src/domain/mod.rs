//! Domain types with no I/O.

mod account;
mod bar;
mod order;
mod order_result;
mod symbol;

pub use account::{Account, Position};
pub use bar::{Bar, BarSeries, DateRange, Timeframe};
pub use order::{OrderRequest, OrderSide, OrderType, TimeInForce};
pub use order_result::{CancelOutcome, OrderResult, OrderStatus, OrderStatusFilter};
pub use symbol::Symbol;
