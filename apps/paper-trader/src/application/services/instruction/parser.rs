//! Reply parser for the assistant's `<broker_response>`.
//!
//! Only the `<actions_taken>` section drives execution. Each line in it is
//! one of:
//!
//! - a function call, `name(arg, ...)`, with positional or `key=value`
//!   arguments, quoted or bare
//! - a prose buy, `buy 10 shares of AAPL` or `buy AAPL 10 shares`
//! - anything else, which is treated as narration and skipped
//!
//! A call whose name is not one of the supported actions fails the whole
//! parse with [`TradingError::UnsupportedAction`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::domain::Symbol;
use crate::error::{TradingError, ValidationError};

/// An action the interpreter can execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Market buy.
    BuyStock {
        /// Ticker.
        symbol: Symbol,
        /// Shares.
        quantity: Decimal,
    },
    /// Latest price lookup.
    GetStockPrice {
        /// Ticker.
        symbol: Symbol,
    },
    /// Account snapshot.
    GetAccountInfo,
}

impl Action {
    /// Function name as it appears in the reply contract.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BuyStock { .. } => "buy_stock",
            Self::GetStockPrice { .. } => "get_stock_price",
            Self::GetAccountInfo => "get_account_info",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuyStock { symbol, quantity } => {
                write!(f, "buy_stock(\"{symbol}\", {quantity})")
            }
            Self::GetStockPrice { symbol } => write!(f, "get_stock_price(\"{symbol}\")"),
            Self::GetAccountInfo => f.write_str("get_account_info()"),
        }
    }
}

// Patterns are compile-time constants and always valid.
#[allow(clippy::expect_used)]
static CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\(([^()]*)\)").expect("valid call regex")
});

#[allow(clippy::expect_used)]
static BUY_SHARES_OF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^buy\s+(\d+(?:\.\d+)?)\s+shares?\s+of\s+([A-Za-z./]+)\b")
        .expect("valid buy regex")
});

#[allow(clippy::expect_used)]
static BUY_SYMBOL_SHARES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^buy\s+([A-Za-z./]+)\s+(\d+(?:\.\d+)?)\s+shares?\b").expect("valid buy regex")
});

#[allow(clippy::expect_used)]
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-*•]|\d+[.)])\s*").expect("valid marker regex")
});

/// Text between `<tag>` and `</tag>`, trimmed. `None` when the tag is absent.
#[must_use]
pub fn extract_section<'a>(reply: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = reply.find(&open)? + open.len();
    let end = reply[start..].find(&close)? + start;
    Some(reply[start..end].trim())
}

/// Parse every action in the reply's `<actions_taken>` section.
///
/// No section means no actions.
pub fn parse_actions(reply: &str) -> Result<Vec<Action>, TradingError> {
    let Some(section) = extract_section(reply, "actions_taken") else {
        return Ok(Vec::new());
    };

    let mut actions = Vec::new();
    for raw in section.lines() {
        let line = clean_line(raw);
        if line.is_empty() {
            continue;
        }
        let parsed = parse_line(line)?;
        if parsed.is_empty() {
            tracing::debug!(line = %line, "Skipping non-action line");
        }
        actions.extend(parsed);
    }
    Ok(actions)
}

fn clean_line(raw: &str) -> &str {
    let line = raw.trim();
    let line = LIST_MARKER
        .find(line)
        .map_or(line, |m| &line[m.end()..]);
    line.trim().trim_matches('`').trim()
}

/// Every call on the line, in order, or one prose buy.
///
/// A call in the middle of prose only counts when its name is snake_case,
/// so parenthesized remarks like `Price(daily)` are not read as calls.
fn parse_line(line: &str) -> Result<Vec<Action>, TradingError> {
    let mut actions = Vec::new();
    for caps in CALL.captures_iter(line) {
        let leading = caps.get(0).is_some_and(|m| m.start() == 0);
        let name = &caps[1];
        if !leading && !name.contains('_') {
            continue;
        }
        actions.push(parse_call(name, &parse_args(&caps[2]))?);
    }
    if !actions.is_empty() {
        return Ok(actions);
    }

    if let Some(caps) = BUY_SHARES_OF.captures(line) {
        return buy(&caps[2], &caps[1]).map(|action| vec![action]);
    }

    if let Some(caps) = BUY_SYMBOL_SHARES.captures(line) {
        return buy(&caps[1], &caps[2]).map(|action| vec![action]);
    }

    Ok(Vec::new())
}

/// Arguments split into positional values and `key=value` pairs.
#[derive(Debug, Default)]
struct Args<'a> {
    positional: Vec<&'a str>,
    keyword: Vec<(&'a str, &'a str)>,
}

impl<'a> Args<'a> {
    /// Keyword value if given, otherwise the positional value at `index`.
    fn get(&self, key: &str, index: usize) -> Option<&'a str> {
        self.keyword
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| *v)
            .or_else(|| self.positional.get(index).copied())
    }

    fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

fn parse_args(raw: &str) -> Args<'_> {
    let mut args = Args::default();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.split_once('=') {
            Some((key, value)) => args.keyword.push((key.trim(), unquote(value))),
            None => args.positional.push(unquote(part)),
        }
    }
    args
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches(['"', '\'']).trim()
}

fn parse_call(name: &str, args: &Args<'_>) -> Result<Action, TradingError> {
    match name.to_ascii_lowercase().as_str() {
        "buy_stock" => {
            let symbol = args
                .get("symbol", 0)
                .ok_or(ValidationError::MissingField("symbol"))?;
            let quantity = args
                .get("quantity", 1)
                .or_else(|| args.get("qty", 1))
                .ok_or(ValidationError::MissingField("quantity"))?;
            buy(symbol, quantity)
        }
        "get_stock_price" => {
            let symbol = args
                .get("symbol", 0)
                .ok_or(ValidationError::MissingField("symbol"))?;
            Ok(Action::GetStockPrice {
                symbol: Symbol::parse(symbol)?,
            })
        }
        "get_account_info" => {
            if !args.is_empty() {
                tracing::debug!("Ignoring arguments to get_account_info");
            }
            Ok(Action::GetAccountInfo)
        }
        _ => Err(TradingError::UnsupportedAction {
            action: name.to_string(),
        }),
    }
}

fn buy(symbol: &str, quantity: &str) -> Result<Action, TradingError> {
    let quantity: Decimal = quantity
        .parse()
        .map_err(|_| ValidationError::InvalidValue {
            field: "quantity",
            value: quantity.to_string(),
        })?;
    if quantity <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveQuantity(quantity.to_string()).into());
    }
    Ok(Action::BuyStock {
        symbol: Symbol::parse(symbol)?,
        quantity,
    })
}
