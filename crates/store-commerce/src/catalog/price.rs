//! Price fields of a product summary.

use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Base and effective price of a product.
///
/// On the wire the fields are flat decimals next to the rest of the product
/// record (`price`, `final_price`, `on_sale`, `discount_percentage`,
/// `currency`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WirePrice", into = "WirePrice")]
pub struct PriceInfo {
    /// List price before any sale.
    pub base: Money,
    /// Price the customer pays.
    pub effective: Money,
    /// Whether the product is flagged as on sale.
    pub on_sale: bool,
    /// Discount relative to the base price, in whole percent.
    pub discount_percentage: u8,
}

impl PriceInfo {
    /// A regular (not discounted) price.
    pub fn regular(base: Money) -> Self {
        Self {
            base,
            effective: base,
            on_sale: false,
            discount_percentage: 0,
        }
    }

    /// A sale price; the discount is derived from the two amounts.
    pub fn sale(base: Money, effective: Money) -> Self {
        Self {
            base,
            effective,
            on_sale: true,
            discount_percentage: base.percent_off(&effective).unwrap_or(0),
        }
    }

    /// Whether the effective price is actually below the base price.
    pub fn is_discounted(&self) -> bool {
        self.effective.amount_minor < self.base.amount_minor
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WirePrice {
    price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    final_price: Option<f64>,
    #[serde(default)]
    on_sale: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    discount_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
}

impl From<WirePrice> for PriceInfo {
    fn from(wire: WirePrice) -> Self {
        let currency = wire
            .currency
            .as_deref()
            .and_then(Currency::from_code)
            .unwrap_or_default();
        let base = Money::from_decimal(wire.price, currency);
        let effective = wire
            .final_price
            .map(|p| Money::from_decimal(p, currency))
            .unwrap_or(base);

        // The server omits the percentage on some endpoints.
        let discount_percentage = match wire.discount_percentage {
            Some(p) => p.round().clamp(0.0, 100.0) as u8,
            None => base.percent_off(&effective).unwrap_or(0),
        };

        Self {
            base,
            effective,
            on_sale: wire.on_sale.unwrap_or(discount_percentage > 0),
            discount_percentage,
        }
    }
}

impl From<PriceInfo> for WirePrice {
    fn from(price: PriceInfo) -> Self {
        Self {
            price: price.base.to_decimal(),
            final_price: Some(price.effective.to_decimal()),
            on_sale: Some(price.on_sale),
            discount_percentage: Some(f64::from(price.discount_percentage)),
            currency: Some(price.base.currency.code().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_price_derives_discount() {
        let price = PriceInfo::sale(
            Money::new(20000, Currency::SAR),
            Money::new(15000, Currency::SAR),
        );
        assert!(price.on_sale);
        assert!(price.is_discounted());
        assert_eq!(price.discount_percentage, 25);
    }

    #[test]
    fn test_wire_price_without_discount_field() {
        let price: PriceInfo =
            serde_json::from_str(r#"{"price": 100.0, "final_price": 80.0, "currency": "AED"}"#)
                .unwrap();
        assert_eq!(price.base, Money::new(10000, Currency::AED));
        assert_eq!(price.effective, Money::new(8000, Currency::AED));
        assert_eq!(price.discount_percentage, 20);
        assert!(price.on_sale);
    }

    #[test]
    fn test_wire_price_with_extreme_amounts() {
        let price: PriceInfo =
            serde_json::from_str(r#"{"price": 1e300, "final_price": -1e300}"#).unwrap();
        assert_eq!(price.base.amount_minor, i64::MAX);
        assert_eq!(price.effective.amount_minor, i64::MIN);
        assert_eq!(price.discount_percentage, 0);
        assert!(!price.on_sale);
    }

    #[test]
    fn test_wire_price_regular() {
        let price: PriceInfo = serde_json::from_str(r#"{"price": 12.5}"#).unwrap();
        assert_eq!(price, PriceInfo::regular(Money::new(1250, Currency::USD)));
    }
}
