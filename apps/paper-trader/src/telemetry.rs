//! Tracing setup.
//!
//! Logs go to stderr so menu output on stdout stays readable. The filter
//! comes from `RUST_LOG`; without it only warnings from this crate show.
//!
//! # Usage
//!
//! ```rust,ignore
//! use paper_trader::telemetry::init_tracing;
//!
//! fn main() {
//!     init_tracing();
//!     // ... application code
//! }
//! ```

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "paper_trader=warn";

/// Install the global subscriber.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stderr());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(is_terminal)
        .with_target(false)
        .try_init();
}
