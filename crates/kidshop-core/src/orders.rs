//! Pure order arithmetic and validation rules.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::CoreError;

/// Checkout refuses carts with fewer units than this.
pub const MINIMUM_CHECKOUT_QUANTITY: i64 = 3;

/// Stock is an `INTEGER` column, so no line can ask for more units.
pub const MAX_LINE_QUANTITY: i64 = i32::MAX as i64;

/// Prices and totals are stored as `NUMERIC(12,2)`.
const MONEY_SCALE: u32 = 2;

/// Largest amount a `NUMERIC(12,2)` column holds: 9,999,999,999.99.
#[must_use]
pub fn max_money() -> Decimal {
    Decimal::new(999_999_999_999, MONEY_SCALE)
}

/// Round a price to whole cents, half away from zero as Postgres does.
/// Every stored line price goes through this, so stored totals stay equal
/// to `Σ price × quantity` over the stored lines.
#[must_use]
pub fn round_price(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Price and quantity of one order line, the inputs to order totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub quantity: i64,
    pub price: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub total_price: Decimal,
    pub total_items: i64,
}

/// Sum `price × quantity` and the unit count across `lines`. Prices are
/// rounded with [`round_price`] first.
///
/// # Errors
///
/// Returns [`CoreError::Validation`] if any line has a quantity outside
/// 1..=[`MAX_LINE_QUANTITY`], a negative or oversized price, or if the sums
/// exceed what an order row can store.
pub fn summarize_lines(lines: &[OrderLine]) -> Result<OrderTotals, CoreError> {
    let mut total_price = Decimal::ZERO;
    let mut total_items = 0_i64;
    let too_large = || CoreError::Validation("Order total is too large".to_string());

    for line in lines {
        if line.quantity < 1 {
            return Err(CoreError::Validation(format!(
                "quantity must be at least 1, got {}",
                line.quantity
            )));
        }
        if line.quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::Validation(format!(
                "quantity must be at most {MAX_LINE_QUANTITY}, got {}",
                line.quantity
            )));
        }
        let price = round_price(line.price);
        if price.is_sign_negative() && !price.is_zero() {
            return Err(CoreError::Validation(format!(
                "price must not be negative, got {}",
                line.price
            )));
        }
        if price > max_money() {
            return Err(CoreError::Validation(format!(
                "price must be at most {}, got {}",
                max_money(),
                line.price
            )));
        }

        let subtotal = price
            .checked_mul(Decimal::from(line.quantity))
            .ok_or_else(too_large)?;
        total_price = total_price.checked_add(subtotal).ok_or_else(too_large)?;
        total_items = total_items
            .checked_add(line.quantity)
            .ok_or_else(too_large)?;
    }

    if total_price > max_money() {
        return Err(too_large());
    }

    Ok(OrderTotals {
        total_price,
        total_items,
    })
}

/// Enforce the checkout minimum on the summed quantity.
///
/// # Errors
///
/// Returns [`CoreError::MinimumQuantity`] reporting the actual count.
pub fn validate_checkout_quantity(total_items: i64) -> Result<(), CoreError> {
    if total_items < MINIMUM_CHECKOUT_QUANTITY {
        return Err(CoreError::MinimumQuantity {
            minimum: MINIMUM_CHECKOUT_QUANTITY,
            actual: total_items,
        });
    }
    Ok(())
}

/// Order numbers are `ORD-` followed by the Unix time in milliseconds.
#[must_use]
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    format!("ORD-{}", now.timestamp_millis())
}
