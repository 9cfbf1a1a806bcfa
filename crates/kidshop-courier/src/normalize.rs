//! Preparation of dashboard orders into Steadfast's wire format.

use crate::error::CourierError;
use crate::types::{CourierOrderInput, SteadfastOrder};

const PHONE_DIGITS: usize = 11;

/// Strips everything but digits and restores the leading `0` on
/// Bangladeshi mobile numbers entered without it.
///
/// `"+880 1712-345678"` is left as `"8801712345678"`; only a bare ten-digit
/// number starting with `1` gains the prefix.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 && digits.starts_with('1') {
        format!("0{digits}")
    } else {
        digits
    }
}

fn cod_amount(value: Option<&serde_json::Value>) -> f64 {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
    .max(0.0)
}

/// Maps and validates a batch before any network call.
///
/// # Errors
///
/// Returns [`CourierError::EmptyBatch`] for an empty batch, or
/// [`CourierError::InvalidOrder`] for the first order lacking an invoice or
/// an 11-digit phone number after normalization.
pub fn prepare_orders(orders: &[CourierOrderInput]) -> Result<Vec<SteadfastOrder>, CourierError> {
    if orders.is_empty() {
        return Err(CourierError::EmptyBatch);
    }

    orders
        .iter()
        .map(|order| {
            let invoice = order
                .invoice
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string();
            let phone = normalize_phone(order.recipient_phone.as_deref().unwrap_or_default());
            if invoice.is_empty() || phone.len() != PHONE_DIGITS {
                return Err(CourierError::InvalidOrder(invoice));
            }
            Ok(SteadfastOrder {
                invoice,
                recipient_name: order.recipient_name.clone().unwrap_or_default(),
                recipient_address: order.recipient_address.clone().unwrap_or_default(),
                recipient_phone: phone,
                cod_amount: cod_amount(order.cod_amount.as_ref()),
                note: order.note.clone().unwrap_or_default(),
                delivery_type: 0,
            })
        })
        .collect()
}
