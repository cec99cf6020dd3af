//! Error taxonomy shared by every facade.
//!
//! | Kind | Raised when |
//! |------|-------------|
//! | [`ValidationError`] | A request is malformed locally (missing price, bad enum value) |
//! | [`ExternalApiError`] | A vendor call failed (auth, rate limit, not found, rejected) |
//! | [`TradingError::UnsupportedAction`] | The assistant asked for an action outside the fixed set |
//!
//! Adapter-specific errors convert into [`ExternalApiError`] so callers never
//! match on vendor details.

use thiserror::Error;

/// Top-level error returned by the facades.
#[derive(Debug, Clone, Error)]
pub enum TradingError {
    /// The request was rejected locally, before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A vendor call failed.
    #[error(transparent)]
    ExternalApi(#[from] ExternalApiError),

    /// The interpreter produced an action outside the supported set.
    #[error("Unsupported action: {action}")]
    UnsupportedAction {
        /// Name of the action the model asked for.
        action: String,
    },
}

impl TradingError {
    /// Short label for the error kind, used in CLI output.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation error",
            Self::ExternalApi(_) => "external API error",
            Self::UnsupportedAction { .. } => "unsupported action",
        }
    }
}

/// Malformed local request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Symbol was empty or whitespace.
    #[error("Symbol is required")]
    EmptySymbol,

    /// Quantity was zero or negative.
    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(String),

    /// Dollar amount was zero or negative.
    #[error("Notional amount must be positive, got {0}")]
    NonPositiveNotional(String),

    /// Both a share quantity and a dollar amount were given.
    #[error("Specify either a quantity or a notional amount, not both")]
    QuantityAndNotional,

    /// Dollar-amount orders outside market/DAY.
    #[error("Notional orders must be market orders with DAY time in force")]
    NotionalNotAllowed,

    /// More bars requested than the data API serves in one call.
    #[error("Bar limit must be at most {max}, got {requested}")]
    LimitTooLarge {
        /// Largest accepted limit.
        max: u32,
        /// Requested limit.
        requested: u32,
    },

    /// Date range with the start after the end.
    #[error("Start {start} is after end {end}")]
    InvalidDateRange {
        /// Range start.
        start: String,
        /// Range end.
        end: String,
    },

    /// A price was zero or negative.
    #[error("{field} must be positive, got {value}")]
    NonPositivePrice {
        /// Which price field.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// Limit or stop-limit order without a limit price.
    #[error("{order_type} orders require a limit price")]
    MissingLimitPrice {
        /// Order type that needs it.
        order_type: String,
    },

    /// Stop or stop-limit order without a stop price.
    #[error("{order_type} orders require a stop price")]
    MissingStopPrice {
        /// Order type that needs it.
        order_type: String,
    },

    /// Extended hours requested for an order that cannot trade outside the session.
    #[error("Extended hours trading requires a limit order with DAY time in force")]
    ExtendedHoursNotAllowed,

    /// Timeframe string outside the supported set.
    #[error("Unsupported timeframe '{0}' (expected one of 1Min, 5Min, 15Min, 30Min, 1Hour, 1Day, 1Week, 1Month)")]
    UnsupportedTimeframe(String),

    /// Bar limit was zero.
    #[error("Bar limit must be a positive integer")]
    NonPositiveLimit,

    /// Unknown value for an enumerated field.
    #[error("Invalid {field}: '{value}'")]
    InvalidValue {
        /// Field name.
        field: &'static str,
        /// Value that failed to parse.
        value: String,
    },

    /// A credential does not look like one the broker issues.
    #[error("{0} has an unexpected format")]
    MalformedCredential(&'static str),

    /// A required field was missing.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Vendor call failure, independent of which vendor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExternalApiError {
    /// Network failure or undecodable response.
    #[error("{provider} connection error: {message}")]
    Connection {
        /// Vendor name.
        provider: &'static str,
        /// Error details.
        message: String,
    },

    /// Credentials missing or refused.
    #[error("{provider} authentication failed")]
    AuthenticationFailed {
        /// Vendor name.
        provider: &'static str,
    },

    /// Vendor rate limit hit.
    #[error("{provider} rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited {
        /// Vendor name.
        provider: &'static str,
        /// Suggested wait.
        retry_after_secs: u64,
    },

    /// Resource (order, symbol, position) does not exist.
    #[error("{provider} resource not found: {resource}")]
    NotFound {
        /// Vendor name.
        provider: &'static str,
        /// Resource path or identifier.
        resource: String,
    },

    /// Request understood but refused (insufficient buying power, invalid symbol).
    #[error("{provider} rejected the request: {reason}")]
    Rejected {
        /// Vendor name.
        provider: &'static str,
        /// Vendor message.
        reason: String,
    },

    /// Any other vendor error.
    #[error("{provider} API error {code}: {message}")]
    Api {
        /// Vendor name.
        provider: &'static str,
        /// Vendor error code or HTTP status.
        code: String,
        /// Vendor message.
        message: String,
    },
}
