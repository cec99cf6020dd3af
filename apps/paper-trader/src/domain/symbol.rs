//! Symbol value object for tickers and crypto pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// A trading symbol.
///
/// Examples:
/// - Equity: "AAPL", "MSFT"
/// - Crypto pair: "BTC/USD"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol, trimming and uppercasing the input.
    ///
    /// Fails on an empty symbol.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let normalized = value.as_ref().trim().to_uppercase();
        if normalized.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        Ok(Self(normalized))
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Crypto pairs are written `BASE/QUOTE`.
    #[must_use]
    pub fn is_crypto(&self) -> bool {
        self.0.contains('/')
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_normalized() {
        let symbol = Symbol::parse("  aapl ").unwrap();
        assert_eq!(symbol.as_str(), "AAPL");
        assert!(!symbol.is_crypto());
    }

    #[test]
    fn crypto_pair_detected() {
        let symbol = Symbol::parse("btc/usd").unwrap();
        assert_eq!(symbol.as_str(), "BTC/USD");
        assert!(symbol.is_crypto());
    }

    #[test]
    fn empty_symbol_rejected() {
        assert_eq!(Symbol::parse("   "), Err(ValidationError::EmptySymbol));
    }
}
