//! Normalized order request and its enumerations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Symbol;
use crate::error::ValidationError;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
    /// Buy.
    Buy,
    /// Sell.
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" | "b" => Ok(Self::Buy),
            "sell" | "s" => Ok(Self::Sell),
            other => Err(ValidationError::InvalidValue {
                field: "side",
                value: other.to_string(),
            }),
        }
    }
}

/// Order type specifying execution behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Execute at best available price.
    Market,
    /// Execute at the limit price or better.
    Limit,
    /// Becomes a market order when the stop price is reached.
    Stop,
    /// Becomes a limit order when the stop price is reached.
    StopLimit,
}

impl OrderType {
    /// Returns true if this order type requires a limit price.
    #[must_use]
    pub const fn requires_limit_price(&self) -> bool {
        matches!(self, Self::Limit | Self::StopLimit)
    }

    /// Returns true if this order type requires a stop price.
    #[must_use]
    pub const fn requires_stop_price(&self) -> bool {
        matches!(self, Self::Stop | Self::StopLimit)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
            Self::Stop => write!(f, "STOP"),
            Self::StopLimit => write!(f, "STOP_LIMIT"),
        }
    }
}

impl FromStr for OrderType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "market" => Ok(Self::Market),
            "limit" => Ok(Self::Limit),
            "stop" => Ok(Self::Stop),
            "stop_limit" => Ok(Self::StopLimit),
            other => Err(ValidationError::InvalidValue {
                field: "order type",
                value: other.to_string(),
            }),
        }
    }
}

/// Time in force specifying order validity duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeInForce {
    /// Valid for the current trading day only.
    #[default]
    Day,
    /// Good-til-canceled.
    Gtc,
    /// Immediate-or-cancel.
    Ioc,
    /// Fill-or-kill.
    Fok,
    /// Market on open.
    Opg,
    /// Market on close.
    Cls,
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Day => "DAY",
            Self::Gtc => "GTC",
            Self::Ioc => "IOC",
            Self::Fok => "FOK",
            Self::Opg => "OPG",
            Self::Cls => "CLS",
        };
        f.write_str(s)
    }
}

impl FromStr for TimeInForce {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "gtc" => Ok(Self::Gtc),
            "ioc" => Ok(Self::Ioc),
            "fok" => Ok(Self::Fok),
            "opg" => Ok(Self::Opg),
            "cls" => Ok(Self::Cls),
            other => Err(ValidationError::InvalidValue {
                field: "time in force",
                value: other.to_string(),
            }),
        }
    }
}

/// Normalized order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Quantity in shares (fractional allowed). Exclusive with `notional`.
    pub quantity: Option<Decimal>,
    /// Dollar amount to trade instead of a share count. Market/DAY only.
    pub notional: Option<Decimal>,
    /// Order type.
    pub order_type: OrderType,
    /// Limit price (limit and stop-limit orders).
    pub limit_price: Option<Decimal>,
    /// Stop price (stop and stop-limit orders).
    pub stop_price: Option<Decimal>,
    /// Time in force.
    pub time_in_force: TimeInForce,
    /// Allow execution outside regular hours.
    pub extended_hours: bool,
    /// Caller-supplied order ID; generated on submission when absent.
    pub client_order_id: Option<String>,
}

impl OrderRequest {
    /// Create a market order request.
    #[must_use]
    pub const fn market(symbol: Symbol, side: OrderSide, quantity: Decimal) -> Self {
        Self {
            symbol,
            side,
            quantity: Some(quantity),
            notional: None,
            order_type: OrderType::Market,
            limit_price: None,
            stop_price: None,
            time_in_force: TimeInForce::Day,
            extended_hours: false,
            client_order_id: None,
        }
    }

    /// Create a limit order request.
    #[must_use]
    pub const fn limit(
        symbol: Symbol,
        side: OrderSide,
        quantity: Decimal,
        limit_price: Decimal,
    ) -> Self {
        let mut request = Self::market(symbol, side, quantity);
        request.order_type = OrderType::Limit;
        request.limit_price = Some(limit_price);
        request
    }

    /// Create a market order for a dollar amount rather than a share count.
    #[must_use]
    pub const fn notional(symbol: Symbol, side: OrderSide, amount: Decimal) -> Self {
        let mut request = Self::market(symbol, side, Decimal::ZERO);
        request.quantity = None;
        request.notional = Some(amount);
        request
    }

    /// Create a stop order request.
    #[must_use]
    pub const fn stop(symbol: Symbol, side: OrderSide, quantity: Decimal, stop_price: Decimal) -> Self {
        let mut request = Self::market(symbol, side, quantity);
        request.order_type = OrderType::Stop;
        request.stop_price = Some(stop_price);
        request
    }

    /// Create a stop-limit order request.
    #[must_use]
    pub const fn stop_limit(
        symbol: Symbol,
        side: OrderSide,
        quantity: Decimal,
        stop_price: Decimal,
        limit_price: Decimal,
    ) -> Self {
        let mut request = Self::market(symbol, side, quantity);
        request.order_type = OrderType::StopLimit;
        request.stop_price = Some(stop_price);
        request.limit_price = Some(limit_price);
        request
    }

    /// Set time in force.
    #[must_use]
    pub const fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }

    /// Enable extended hours.
    #[must_use]
    pub const fn with_extended_hours(mut self) -> Self {
        self.extended_hours = true;
        self
    }

    /// Set the client order ID.
    #[must_use]
    pub fn with_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.client_order_id = Some(id.into());
        self
    }

    /// Check the request against the order-type invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.quantity, self.notional) {
            (Some(_), Some(_)) => return Err(ValidationError::QuantityAndNotional),
            (None, None) => return Err(ValidationError::MissingField("quantity or notional")),
            (Some(qty), None) if qty <= Decimal::ZERO => {
                return Err(ValidationError::NonPositiveQuantity(qty.to_string()));
            }
            (None, Some(amount)) => {
                if amount <= Decimal::ZERO {
                    return Err(ValidationError::NonPositiveNotional(amount.to_string()));
                }
                if self.order_type != OrderType::Market || self.time_in_force != TimeInForce::Day {
                    return Err(ValidationError::NotionalNotAllowed);
                }
            }
            _ => {}
        }

        if self.order_type.requires_limit_price() && self.limit_price.is_none() {
            return Err(ValidationError::MissingLimitPrice {
                order_type: self.order_type.to_string(),
            });
        }

        if self.order_type.requires_stop_price() && self.stop_price.is_none() {
            return Err(ValidationError::MissingStopPrice {
                order_type: self.order_type.to_string(),
            });
        }

        for (field, price) in [
            ("limit price", self.limit_price),
            ("stop price", self.stop_price),
        ] {
            if let Some(value) = price
                && value <= Decimal::ZERO
            {
                return Err(ValidationError::NonPositivePrice {
                    field,
                    value: value.to_string(),
                });
            }
        }

        if self.extended_hours
            && !(self.order_type == OrderType::Limit && self.time_in_force == TimeInForce::Day)
        {
            return Err(ValidationError::ExtendedHoursNotAllowed);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn aapl() -> Symbol {
        Symbol::parse("AAPL").unwrap()
    }

    #[test]
    fn market_order_is_valid() {
        let request = OrderRequest::market(aapl(), OrderSide::Buy, dec!(10));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn limit_without_price_rejected() {
        let mut request = OrderRequest::limit(aapl(), OrderSide::Buy, dec!(10), dec!(150));
        request.limit_price = None;
        assert!(matches!(
            request.validate(),
            Err(ValidationError::MissingLimitPrice { .. })
        ));
    }

    #[test]
    fn stop_limit_needs_both_prices() {
        let mut request =
            OrderRequest::stop_limit(aapl(), OrderSide::Sell, dec!(5), dec!(140), dec!(139));
        assert!(request.validate().is_ok());

        request.stop_price = None;
        assert!(matches!(
            request.validate(),
            Err(ValidationError::MissingStopPrice { .. })
        ));
    }

    #[test]
    fn zero_quantity_rejected() {
        let request = OrderRequest::market(aapl(), OrderSide::Buy, Decimal::ZERO);
        assert!(matches!(
            request.validate(),
            Err(ValidationError::NonPositiveQuantity(_))
        ));
    }

    #[test]
    fn negative_stop_price_rejected() {
        let request = OrderRequest::stop(aapl(), OrderSide::Sell, dec!(1), dec!(-3));
        assert!(matches!(
            request.validate(),
            Err(ValidationError::NonPositivePrice { field: "stop price", .. })
        ));
    }

    #[test]
    fn extended_hours_only_for_day_limit() {
        let market = OrderRequest::market(aapl(), OrderSide::Buy, dec!(1)).with_extended_hours();
        assert_eq!(
            market.validate(),
            Err(ValidationError::ExtendedHoursNotAllowed)
        );

        let limit = OrderRequest::limit(aapl(), OrderSide::Buy, dec!(1), dec!(100))
            .with_extended_hours();
        assert!(limit.validate().is_ok());

        let gtc = limit.with_time_in_force(TimeInForce::Gtc);
        assert_eq!(gtc.validate(), Err(ValidationError::ExtendedHoursNotAllowed));
    }

    #[test]
    fn notional_market_order_is_valid() {
        let request = OrderRequest::notional(aapl(), OrderSide::Buy, dec!(250));
        assert_eq!(request.quantity, None);
        assert_eq!(request.notional, Some(dec!(250)));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn quantity_and_notional_are_exclusive() {
        let mut request = OrderRequest::market(aapl(), OrderSide::Buy, dec!(1));
        request.notional = Some(dec!(100));
        assert_eq!(request.validate(), Err(ValidationError::QuantityAndNotional));

        request.quantity = None;
        request.notional = None;
        assert_eq!(
            request.validate(),
            Err(ValidationError::MissingField("quantity or notional"))
        );
    }

    #[test]
    fn notional_only_for_market_day() {
        let mut request = OrderRequest::notional(aapl(), OrderSide::Buy, dec!(100));
        request.order_type = OrderType::Limit;
        request.limit_price = Some(dec!(10));
        assert_eq!(request.validate(), Err(ValidationError::NotionalNotAllowed));

        let gtc = OrderRequest::notional(aapl(), OrderSide::Sell, dec!(100))
            .with_time_in_force(TimeInForce::Gtc);
        assert_eq!(gtc.validate(), Err(ValidationError::NotionalNotAllowed));

        let negative = OrderRequest::notional(aapl(), OrderSide::Buy, dec!(-5));
        assert!(matches!(
            negative.validate(),
            Err(ValidationError::NonPositiveNotional(_))
        ));
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("BUY".parse::<OrderSide>().unwrap(), OrderSide::Buy);
        assert_eq!("stop-limit".parse::<OrderType>().unwrap(), OrderType::StopLimit);
        assert_eq!("Gtc".parse::<TimeInForce>().unwrap(), TimeInForce::Gtc);
        assert!("hold".parse::<OrderSide>().is_err());
    }

    #[test]
    fn order_type_serde() {
        let json = serde_json::to_string(&OrderType::StopLimit).unwrap();
        assert_eq!(json, "\"stop_limit\"");
    }
}
