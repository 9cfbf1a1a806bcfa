//! Steadfast API request and response types.
//!
//! Steadfast answers with HTTP 200 and reports success in a numeric
//! `"status"` field of the body. Single-order creation returns
//! `{"status": 200, "consignment": {...}}`; bulk creation returns a bare
//! array of per-invoice results whose `"status"` is the string `"success"`.

use serde::{Deserialize, Serialize};

/// One order as submitted by the admin dashboard.
///
/// Field names follow the Steadfast wire format. `cod_amount` arrives as a
/// number or a numeric string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourierOrderInput {
    #[serde(default)]
    pub invoice: Option<String>,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub recipient_address: Option<String>,
    #[serde(default)]
    pub recipient_phone: Option<String>,
    #[serde(default)]
    pub cod_amount: Option<serde_json::Value>,
    #[serde(default)]
    pub note: Option<String>,
}

/// A validated order in the shape Steadfast expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SteadfastOrder {
    pub invoice: String,
    pub recipient_name: String,
    pub recipient_address: String,
    pub recipient_phone: String,
    pub cod_amount: f64,
    pub note: String,
    /// 0 = home delivery.
    pub delivery_type: u8,
}

// ---------------------------------------------------------------------------
// create_order
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct SingleCreateResponse {
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub consignment: Option<ConsignmentBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConsignmentBody {
    pub consignment_id: serde_json::Value,
    pub invoice: String,
    #[serde(default)]
    pub tracking_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkResultItem {
    #[serde(default)]
    pub invoice: Option<String>,
    #[serde(default)]
    pub consignment_id: Option<serde_json::Value>,
    #[serde(default)]
    pub tracking_code: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A consignment Steadfast accepted, keyed back to our order number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedConsignment {
    pub invoice: String,
    pub consignment_id: String,
    pub tracking_code: Option<String>,
}

/// Result of a create call: the untouched courier body, for relaying to the
/// caller, and the consignments it reports as created.
#[derive(Debug, Clone)]
pub struct CreateOutcome {
    pub raw: serde_json::Value,
    pub created: Vec<CreatedConsignment>,
}

// ---------------------------------------------------------------------------
// status_by_cid
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub delivery_status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusOutcome {
    pub raw: serde_json::Value,
    /// Present only when Steadfast reported `status: 200`.
    pub delivery_status: Option<String>,
}

/// Renders a consignment id that Steadfast may send as a number or a string.
pub(crate) fn id_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
