//! Prompt construction for the instruction interpreter.

use std::fmt::Write as _;

use serde_json::Value;

use crate::application::ports::CompletionRequest;

/// Actions the assistant may call, with their exact call syntax.
pub const TOOL_DESCRIPTIONS: [(&str, &str); 3] = [
    (
        "buy_stock(symbol, quantity)",
        "Place a market buy order. Example: buy_stock(\"AAPL\", 10)",
    ),
    (
        "get_stock_price(symbol)",
        "Look up the latest price. Example: get_stock_price(\"AAPL\")",
    ),
    (
        "get_account_info()",
        "Fetch cash, buying power and equity. Example: get_account_info()",
    ),
];

/// Common company names and their tickers, matched case-insensitively
/// against the instruction.
pub const COMPANY_TICKERS: &[(&str, &str)] = &[
    ("APPLE", "AAPL"),
    ("MICROSOFT", "MSFT"),
    ("AMAZON", "AMZN"),
    ("GOOGLE", "GOOGL"),
    ("ALPHABET", "GOOGL"),
    ("TESLA", "TSLA"),
    ("NVIDIA", "NVDA"),
    ("META", "META"),
    ("FACEBOOK", "META"),
    ("NETFLIX", "NFLX"),
    ("ANALOG DEVICES", "ADI"),
    ("INTEL", "INTC"),
    ("ADVANCED MICRO DEVICES", "AMD"),
    ("COCA COLA", "KO"),
    ("COCA-COLA", "KO"),
    ("WALT DISNEY", "DIS"),
    ("DISNEY", "DIS"),
    ("JPMORGAN", "JPM"),
    ("JP MORGAN", "JPM"),
    ("BANK OF AMERICA", "BAC"),
    ("GOLDMAN SACHS", "GS"),
    ("JOHNSON & JOHNSON", "JNJ"),
    ("JOHNSON AND JOHNSON", "JNJ"),
    ("VISA", "V"),
    ("MASTERCARD", "MA"),
    ("WALMART", "WMT"),
    ("TARGET", "TGT"),
    ("COSTCO", "COST"),
    ("HOME DEPOT", "HD"),
    ("NIKE", "NKE"),
    ("MCDONALDS", "MCD"),
    ("MCDONALD'S", "MCD"),
    ("STARBUCKS", "SBUX"),
    ("PFIZER", "PFE"),
    ("MODERNA", "MRNA"),
    ("EXXON MOBIL", "XOM"),
    ("EXXONMOBIL", "XOM"),
    ("EXXON", "XOM"),
    ("CHEVRON", "CVX"),
    ("BOEING", "BA"),
    ("AMERICAN AIRLINES", "AAL"),
    ("DELTA AIR LINES", "DAL"),
    ("DELTA", "DAL"),
];

const SYSTEM_PROMPT: &str = "\
You are a brokerage assistant for a paper-trading account. Interpret the \
user's instruction, decide which actions to run, and report back.

Rules:
- Only call the actions listed in <available_actions>, using the exact call syntax shown.
- Put one call per line inside <actions_taken>. Write nothing else on those lines.
- If the user asks to buy, call buy_stock even when no price is known.
- For price questions call get_stock_price; for balances call get_account_info.
- If no action is needed, leave <actions_taken> empty.
- When the user names a company, use its ticker and mention both.
- Use the figures in <market_data> when answering. A symbol without a \
price can still be bought.

Reply in exactly this format:

<broker_response>
<actions_taken>
one function call per line
</actions_taken>

<results>
what you expect the actions to show
</results>

<additional_info>
any other useful context
</additional_info>
</broker_response>";

/// Company names found in `instruction`, paired with their tickers.
///
/// Longer names win over the shorter names they contain, so
/// "Walt Disney" is reported once.
#[must_use]
pub fn company_hints(instruction: &str) -> Vec<(&'static str, &'static str)> {
    let upper = instruction.to_uppercase();
    let mut hints: Vec<(&str, &str)> = Vec::new();

    for &(company, ticker) in COMPANY_TICKERS {
        if !contains_word(&upper, company) {
            continue;
        }
        if hints.iter().any(|(_, t)| *t == ticker) {
            continue;
        }
        hints.push((company, ticker));
    }
    hints
}

fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Build the single completion request for `instruction`.
///
/// `market_data` is the gathered context; `Value::Null` leaves the
/// section out.
#[must_use]
pub fn build_request(instruction: &str, market_data: &Value) -> CompletionRequest {
    let mut prompt = String::from("<available_actions>\n");
    for (call, description) in TOOL_DESCRIPTIONS {
        let _ = writeln!(prompt, "- {call}: {description}");
    }
    prompt.push_str("</available_actions>\n\n");

    let hints = company_hints(instruction);
    if !hints.is_empty() {
        prompt.push_str("<company_mapping>\n");
        for (company, ticker) in hints {
            let _ = writeln!(prompt, "{company} = {ticker}");
        }
        prompt.push_str("</company_mapping>\n\n");
    }

    if !market_data.is_null() {
        let rendered =
            serde_json::to_string_pretty(market_data).unwrap_or_else(|_| market_data.to_string());
        let _ = write!(prompt, "<market_data>\n{rendered}\n</market_data>\n\n");
    }

    let _ = write!(prompt, "<user_input>\n{}\n</user_input>", instruction.trim());

    CompletionRequest {
        system: SYSTEM_PROMPT.to_string(),
        prompt,
    }
}
