//! Plain-text rendering of facade results.

use std::fmt::Write as _;

use rust_decimal::Decimal;

use crate::domain::{Account, BarSeries, CancelOutcome, OrderResult, Position};

/// Multi-line account snapshot.
pub fn account_summary(account: &Account) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Account:         {}", account.account_number);
    let _ = writeln!(out, "Status:          {}", account.status);
    let _ = writeln!(out, "Currency:        {}", account.currency);
    let _ = writeln!(out, "Cash:            {}", money(account.cash));
    let _ = writeln!(out, "Buying power:    {}", money(account.buying_power));
    let _ = writeln!(out, "Equity:          {}", money(account.equity));
    let _ = writeln!(out, "Portfolio value: {}", money(account.portfolio_value));
    if let Some(count) = account.daytrade_count {
        let _ = writeln!(out, "Day trades:      {count}");
    }
    let _ = write!(
        out,
        "Pattern day trader: {}",
        if account.pattern_day_trader { "yes" } else { "no" }
    );
    out
}

/// One order on one line.
pub fn order_line(order: &OrderResult) -> String {
    let qty = order
        .qty
        .map_or_else(|| "-".to_string(), |q| q.normalize().to_string());
    let mut line = format!(
        "{} {} {} {} {} [{}] filled {}",
        order.id,
        order.side,
        qty,
        order.symbol,
        order.order_type,
        order.status,
        order.filled_qty.normalize()
    );
    if let Some(price) = order.filled_avg_price {
        let _ = write!(line, " @ {}", money(price));
    }
    if let Some(price) = order.limit_price {
        let _ = write!(line, " limit {}", money(price));
    }
    if let Some(price) = order.stop_price {
        let _ = write!(line, " stop {}", money(price));
    }
    line
}

/// One line per order.
pub fn orders_table(orders: &[OrderResult]) -> String {
    if orders.is_empty() {
        return "No orders.".to_string();
    }
    orders.iter().map(order_line).collect::<Vec<_>>().join("\n")
}

/// Aligned position table.
pub fn positions_table(positions: &[Position]) -> String {
    if positions.is_empty() {
        return "No open positions.".to_string();
    }

    let mut out = format!(
        "{:<10} {:>10} {:<6} {:>12} {:>12} {:>14} {:>12}",
        "SYMBOL", "QTY", "SIDE", "AVG ENTRY", "PRICE", "MARKET VALUE", "UNREAL P/L"
    );
    for p in positions {
        let _ = write!(
            out,
            "\n{:<10} {:>10} {:<6} {:>12} {:>12} {:>14} {:>12}",
            p.symbol,
            p.qty.normalize().to_string(),
            p.side,
            money(p.avg_entry_price),
            money(p.current_price),
            money(p.market_value),
            money(p.unrealized_pl)
        );
    }
    out
}

/// Aligned OHLCV table, oldest first.
pub fn bars_table(series: &BarSeries) -> String {
    if series.is_empty() {
        return format!("No bars for {}.", series.symbol);
    }

    let mut out = format!(
        "{} {} ({} bars)\n{:<20} {:>12} {:>12} {:>12} {:>12} {:>14}",
        series.symbol,
        series.timeframe,
        series.len(),
        "TIMESTAMP",
        "OPEN",
        "HIGH",
        "LOW",
        "CLOSE",
        "VOLUME"
    );
    for bar in series.bars() {
        let _ = write!(
            out,
            "\n{:<20} {:>12} {:>12} {:>12} {:>12} {:>14}",
            bar.timestamp.format("%Y-%m-%d %H:%M"),
            bar.open.normalize().to_string(),
            bar.high.normalize().to_string(),
            bar.low.normalize().to_string(),
            bar.close.normalize().to_string(),
            bar.volume.normalize().to_string()
        );
    }
    out
}

pub fn cancel_outcomes(outcomes: &[CancelOutcome]) -> String {
    if outcomes.is_empty() {
        return "No open orders to cancel.".to_string();
    }

    let accepted = outcomes.iter().filter(|o| o.accepted()).count();
    let mut out = format!("Cancel requested for {accepted} of {} orders", outcomes.len());
    for outcome in outcomes.iter().filter(|o| !o.accepted()) {
        let _ = write!(out, "\n  {} failed (HTTP {})", outcome.order_id, outcome.status);
    }
    out
}

fn money(value: Decimal) -> String {
    format!("${:.2}", value)
}
