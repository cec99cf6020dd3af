//! Market context attached to the prompt.
//!
//! Before the model call the instruction is scanned for ticker-like
//! words, `$TICKER` mentions and known company names. The latest quote for
//! each candidate and an account snapshot are then sent along, so the
//! model can answer with real numbers.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value, json};

use super::prompt::{COMPANY_TICKERS, company_hints};
use crate::application::services::{AccountService, MarketDataService};
use crate::domain::Symbol;

/// Most symbols looked up for one instruction.
pub const MAX_CONTEXT_SYMBOLS: usize = 8;

/// Uppercase words that are almost always English in an instruction.
/// `$`-prefixed mentions bypass this list.
const COMMON_WORDS: &[&str] = &[
    "A", "ABOUT", "ALL", "AM", "AN", "AND", "ANY", "ARE", "AS", "AT", "BE", "BEEN", "BEING",
    "BUY", "BY", "CAN", "CASH", "CHECK", "COULD", "DID", "DO", "DOES", "EACH", "FOR", "FROM",
    "GET", "GIVE", "HAD", "HAS", "HAVE", "HOW", "I", "IF", "IN", "INTO", "IS", "IT", "ITS",
    "LIKE", "MANY", "MAY", "ME", "MIGHT", "MUCH", "MUST", "MY", "NEED", "NO", "NOT", "NOW", "OF",
    "ON", "ONE", "OR", "OUR", "OUT", "PRICE", "QUOTE", "S", "SELL", "SHALL", "SHARE", "SHOULD",
    "SHOW", "SOME", "STOCK", "T", "TELL", "THAT", "THE", "THEM", "THEN", "THIS", "TO", "TWO",
    "UP", "US", "WANT", "WAS", "WERE", "WHAT", "WHEN", "WHICH", "WHO", "WHOM", "WHOSE", "WHY",
    "WILL", "WITH", "WORTH", "WOULD", "YOU", "YOUR",
];

#[allow(clippy::expect_used)]
static DOLLAR_TICKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Z]{1,5})\b").expect("valid dollar ticker regex")
});

#[allow(clippy::expect_used)]
static BARE_TICKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{1,5}\b").expect("valid ticker regex"));

/// Symbols worth quoting for `instruction`, first mention first.
///
/// Order: `$TICKER` mentions, then bare words of one to five letters that
/// are not common English, then tickers of named companies. Duplicates are
/// dropped and at most [`MAX_CONTEXT_SYMBOLS`] are returned.
#[must_use]
pub fn candidate_symbols(instruction: &str) -> Vec<Symbol> {
    let upper = instruction.to_uppercase();

    let dollar = DOLLAR_TICKER
        .captures_iter(&upper)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str());
    let bare = BARE_TICKER
        .find_iter(&upper)
        .map(|m| m.as_str())
        .filter(|word| !COMMON_WORDS.contains(word) && !is_company_name(word));
    let companies = company_hints(instruction)
        .into_iter()
        .map(|(_, ticker)| ticker);

    let mut symbols: Vec<Symbol> = Vec::new();
    for word in dollar.chain(bare).chain(companies) {
        let Ok(symbol) = Symbol::parse(word) else {
            continue;
        };
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
        if symbols.len() == MAX_CONTEXT_SYMBOLS {
            break;
        }
    }
    symbols
}

/// Short company names like "APPLE" are mapped through the hint table
/// instead of being quoted as tickers.
fn is_company_name(word: &str) -> bool {
    COMPANY_TICKERS
        .iter()
        .any(|&(company, ticker)| company == word && ticker != word)
}

/// Latest quote per symbol plus an account snapshot, as JSON.
///
/// Lookup failures are recorded in place and never abort the instruction.
pub async fn gather(
    market_data: &MarketDataService,
    accounts: &AccountService,
    symbols: &[Symbol],
) -> Value {
    let mut quotes = Map::new();
    for symbol in symbols {
        let entry = match market_data.latest_price(symbol.as_str()).await {
            Ok(Some(quote)) => json!({
                "price": quote.price,
                "change": quote.change,
                "volume": quote.volume,
                "timestamp": quote.timestamp,
            }),
            Ok(None) => json!({
                "price": null,
                "note": "No recent bars; the symbol can still be traded",
                "tradeable": true,
            }),
            Err(e) => {
                tracing::debug!(symbol = %symbol, error = %e, "Context quote unavailable");
                json!({
                    "price": null,
                    "error": e.to_string(),
                    "note": "The symbol can still be traded without price data",
                    "tradeable": true,
                })
            }
        };
        quotes.insert(symbol.to_string(), entry);
    }

    let account = match accounts.get_account().await {
        Ok(account) => json!({
            "equity": account.equity,
            "cash": account.cash,
            "buying_power": account.buying_power,
            "status": account.status,
        }),
        Err(e) => json!({ "error": e.to_string() }),
    };

    json!({ "quotes": quotes, "account": account })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn names(symbols: &[Symbol]) -> Vec<&str> {
        symbols.iter().map(Symbol::as_str).collect()
    }

    #[test_case("What's the price of Microsoft?", &["MSFT"] ; "company only")]
    #[test_case("buy 10 shares of aapl", &["AAPL"] ; "lowercase ticker")]
    #[test_case("check my account then buy 10 AAPL", &["AAPL"] ; "common words dropped")]
    #[test_case("is $ALL up, and tsla?", &["ALL", "TSLA"] ; "dollar bypasses common words")]
    #[test_case("show my account", &[] ; "nothing to quote")]
    fn candidates(instruction: &str, expected: &[&str]) {
        assert_eq!(names(&candidate_symbols(instruction)), expected);
    }

    #[test]
    fn dollar_mentions_come_first_and_deduplicate() {
        let symbols = candidate_symbols("compare NVDA with $AMD and Apple, then NVDA");
        assert_eq!(names(&symbols), ["AMD", "NVDA", "AAPL"]);
    }

    #[test]
    fn candidate_list_is_capped() {
        let symbols = candidate_symbols("AA BB CC DD EE FF GG HH JJ KK LL");
        assert_eq!(symbols.len(), MAX_CONTEXT_SYMBOLS);
        assert_eq!(symbols[0].as_str(), "AA");
    }
}
