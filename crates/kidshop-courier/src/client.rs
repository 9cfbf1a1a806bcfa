//! HTTP client for the Steadfast courier REST API.
//!
//! Credentials live in the store settings and can change at runtime, so
//! each call takes a [`SteadfastCredentials`] instead of the client owning
//! one key pair.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::credentials::SteadfastCredentials;
use crate::error::CourierError;
use crate::types::{
    id_to_string, BulkResultItem, CreateOutcome, CreatedConsignment, SingleCreateResponse,
    StatusOutcome, StatusResponse, SteadfastOrder,
};

/// Client for the Steadfast REST API.
#[derive(Clone)]
pub struct SteadfastClient {
    client: Client,
}

impl SteadfastClient {
    /// # Errors
    ///
    /// Returns [`CourierError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, CourierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("kidshop/0.1 (courier)")
            .build()?;
        Ok(Self { client })
    }

    /// Submits orders to Steadfast.
    ///
    /// One order goes to `create_order`; more than one goes to
    /// `create_order/bulk-order` as `{"data": "<JSON array>"}`.
    ///
    /// # Errors
    ///
    /// - [`CourierError::EmptyBatch`] if `orders` is empty.
    /// - [`CourierError::Http`] on network failure or non-2xx HTTP status.
    /// - [`CourierError::Deserialize`] if the body is not JSON.
    pub async fn create_orders(
        &self,
        credentials: &SteadfastCredentials,
        orders: &[SteadfastOrder],
    ) -> Result<CreateOutcome, CourierError> {
        match orders {
            [] => Err(CourierError::EmptyBatch),
            [order] => self.create_single(credentials, order).await,
            _ => self.create_bulk(credentials, orders).await,
        }
    }

    async fn create_single(
        &self,
        credentials: &SteadfastCredentials,
        order: &SteadfastOrder,
    ) -> Result<CreateOutcome, CourierError> {
        let url = build_url(credentials, &["create_order"])?;
        let body = serde_json::to_value(order).map_err(|e| CourierError::Deserialize {
            context: format!("create_order(invoice={})", order.invoice),
            source: e,
        })?;
        let raw = self.post_json(credentials, &url, &body).await?;

        // Unexpected shapes are relayed as-is with nothing recorded.
        let created = serde_json::from_value::<SingleCreateResponse>(raw.clone())
            .ok()
            .filter(|r| r.status == Some(200))
            .and_then(|r| r.consignment)
            .and_then(|c| {
                Some(CreatedConsignment {
                    consignment_id: id_to_string(&c.consignment_id)?,
                    invoice: c.invoice,
                    tracking_code: c.tracking_code,
                })
            })
            .into_iter()
            .collect();

        Ok(CreateOutcome { raw, created })
    }

    async fn create_bulk(
        &self,
        credentials: &SteadfastCredentials,
        orders: &[SteadfastOrder],
    ) -> Result<CreateOutcome, CourierError> {
        let url = build_url(credentials, &["create_order", "bulk-order"])?;
        let data = serde_json::to_string(orders).map_err(|e| CourierError::Deserialize {
            context: "create_order/bulk-order".to_string(),
            source: e,
        })?;
        let raw = self
            .post_json(credentials, &url, &serde_json::json!({ "data": data }))
            .await?;

        let created = serde_json::from_value::<Vec<BulkResultItem>>(raw.clone())
            .unwrap_or_default()
            .into_iter()
            .filter(|item| item.status.as_deref() == Some("success"))
            .filter_map(|item| {
                Some(CreatedConsignment {
                    invoice: item.invoice?,
                    consignment_id: id_to_string(item.consignment_id.as_ref()?)?,
                    tracking_code: item.tracking_code,
                })
            })
            .collect();

        Ok(CreateOutcome { raw, created })
    }

    /// Looks up the delivery status of one consignment.
    ///
    /// # Errors
    ///
    /// - [`CourierError::Http`] on network failure or non-2xx HTTP status.
    /// - [`CourierError::Deserialize`] if the body is not JSON.
    pub async fn status_by_consignment(
        &self,
        credentials: &SteadfastCredentials,
        consignment_id: &str,
    ) -> Result<StatusOutcome, CourierError> {
        let url = build_url(credentials, &["status_by_cid", consignment_id])?;
        let response = self
            .client
            .get(url.clone())
            .header("Api-Key", &credentials.api_key)
            .header("Secret-Key", &credentials.secret_key)
            .header("Content-Type", "application/json")
            .send()
            .await?;
        let raw = parse_body(response, &url).await?;

        let delivery_status = serde_json::from_value::<StatusResponse>(raw.clone())
            .ok()
            .filter(|r| r.status == Some(200))
            .and_then(|r| r.delivery_status);

        Ok(StatusOutcome {
            raw,
            delivery_status,
        })
    }

    async fn post_json(
        &self,
        credentials: &SteadfastCredentials,
        url: &Url,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, CourierError> {
        let response = self
            .client
            .post(url.clone())
            .header("Api-Key", &credentials.api_key)
            .header("Secret-Key", &credentials.secret_key)
            .json(body)
            .send()
            .await?;
        parse_body(response, url).await
    }
}

/// Appends `segments` to the credentials' base URL, keeping any base path
/// such as `/api/v1`. Each segment is percent-encoded, so caller-supplied
/// ids cannot change the path.
fn build_url(credentials: &SteadfastCredentials, segments: &[&str]) -> Result<Url, CourierError> {
    let mut url = Url::parse(credentials.base_url.trim_end_matches('/')).map_err(|e| {
        CourierError::ApiError(format!("invalid base URL '{}': {e}", credentials.base_url))
    })?;
    url.path_segments_mut()
        .map_err(|()| {
            CourierError::ApiError(format!("invalid base URL '{}'", credentials.base_url))
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Asserts a 2xx HTTP status and parses the response body as JSON.
async fn parse_body(
    response: reqwest::Response,
    url: &Url,
) -> Result<serde_json::Value, CourierError> {
    let response = response.error_for_status()?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        tracing::warn!(url = %url, error = %e, "courier returned a non-JSON body");
        CourierError::Deserialize {
            context: url.to_string(),
            source: e,
        }
    })
}
