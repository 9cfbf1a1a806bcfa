//! Store-wide settings, one strongly typed singleton per concern.

use serde::{Deserialize, Serialize};

use crate::catalog::LOW_STOCK_THRESHOLD;

/// Default Steadfast API root.
pub const STEADFAST_DEFAULT_BASE_URL: &str = "https://portal.packzy.com/api/v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralSettings {
    pub store_name: String,
    pub store_email: String,
    pub store_phone: String,
    pub store_address: String,
    pub currency: String,
    pub currency_symbol: String,
    pub google_tag_manager_id: String,
    pub facebook_pixel_id: String,
    pub meta_title: String,
    pub meta_description: String,
    pub low_stock_threshold: i32,
    pub order_prefix: String,
    #[serde(rename = "enableGTM")]
    pub enable_gtm: bool,
    #[serde(rename = "enableFBPixel")]
    pub enable_fb_pixel: bool,
    /// Legacy courier credentials, used when no courier provider is configured.
    pub steadfast_api_key: Option<String>,
    pub steadfast_secret_key: Option<String>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            store_name: "Kids Shop".to_string(),
            store_email: String::new(),
            store_phone: String::new(),
            store_address: String::new(),
            currency: "BDT".to_string(),
            currency_symbol: "৳".to_string(),
            google_tag_manager_id: String::new(),
            facebook_pixel_id: String::new(),
            meta_title: "Kids Shop - Quality Kids Clothing".to_string(),
            meta_description: "Shop for quality kids clothing with fun designs".to_string(),
            low_stock_threshold: LOW_STOCK_THRESHOLD,
            order_prefix: "KS".to_string(),
            enable_gtm: false,
            enable_fb_pixel: false,
            steadfast_api_key: None,
            steadfast_secret_key: None,
        }
    }
}

/// Sparse update for [`GeneralSettings`]; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSettingsUpdate {
    pub store_name: Option<String>,
    pub store_email: Option<String>,
    pub store_phone: Option<String>,
    pub store_address: Option<String>,
    pub currency: Option<String>,
    pub currency_symbol: Option<String>,
    pub google_tag_manager_id: Option<String>,
    pub facebook_pixel_id: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub low_stock_threshold: Option<i32>,
    pub order_prefix: Option<String>,
    #[serde(rename = "enableGTM")]
    pub enable_gtm: Option<bool>,
    #[serde(rename = "enableFBPixel")]
    pub enable_fb_pixel: Option<bool>,
    pub steadfast_api_key: Option<String>,
    pub steadfast_secret_key: Option<String>,
}

impl GeneralSettingsUpdate {
    #[must_use]
    pub fn apply(self, mut current: GeneralSettings) -> GeneralSettings {
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = self.$field {
                    current.$field = value;
                })*
            };
        }
        overlay!(
            store_name,
            store_email,
            store_phone,
            store_address,
            currency,
            currency_symbol,
            google_tag_manager_id,
            facebook_pixel_id,
            meta_title,
            meta_description,
            low_stock_threshold,
            order_prefix,
            enable_gtm,
            enable_fb_pixel,
        );
        if self.steadfast_api_key.is_some() {
            current.steadfast_api_key = self.steadfast_api_key;
        }
        if self.steadfast_secret_key.is_some() {
            current.steadfast_secret_key = self.steadfast_secret_key;
        }
        current
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourierProvider {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_default: bool,
}

impl CourierProvider {
    /// Whether this entry points at Steadfast, by name or by its packzy host.
    #[must_use]
    pub fn is_steadfast(&self) -> bool {
        self.name.to_lowercase().contains("steadfast")
            || self
                .base_url
                .as_deref()
                .is_some_and(|url| url.contains("packzy"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourierSettings {
    #[serde(default)]
    pub providers: Vec<CourierProvider>,
}

impl Default for CourierSettings {
    fn default() -> Self {
        Self {
            providers: vec![CourierProvider {
                id: "steadfast".to_string(),
                name: "Steadfast Courier".to_string(),
                base_url: None,
                api_key: String::new(),
                secret_key: String::new(),
                is_active: true,
                is_default: true,
            }],
        }
    }
}

impl CourierSettings {
    /// First active Steadfast provider, if any.
    #[must_use]
    pub fn active_steadfast(&self) -> Option<&CourierProvider> {
        self.providers.iter().find(|p| p.is_active && p.is_steadfast())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_defaults_match_storefront_expectations() {
        let settings = GeneralSettings::default();
        assert_eq!(settings.store_name, "Kids Shop");
        assert_eq!(settings.currency, "BDT");
        assert_eq!(settings.low_stock_threshold, 10);
        assert_eq!(settings.order_prefix, "KS");
    }

    #[test]
    fn general_update_overlays_only_present_fields() {
        let update: GeneralSettingsUpdate = serde_json::from_value(serde_json::json!({
            "storeName": "Little Steps",
            "enableGTM": true,
            "steadfastApiKey": "k"
        }))
        .expect("update");

        let merged = update.apply(GeneralSettings::default());
        assert_eq!(merged.store_name, "Little Steps");
        assert!(merged.enable_gtm);
        assert_eq!(merged.currency, "BDT");
        assert_eq!(merged.steadfast_api_key.as_deref(), Some("k"));
        assert!(merged.steadfast_secret_key.is_none());
    }

    #[test]
    fn general_serializes_camel_case_toggles() {
        let json = serde_json::to_value(GeneralSettings::default()).expect("json");
        assert_eq!(json["enableGTM"], false);
        assert_eq!(json["storeName"], "Kids Shop");
    }

    #[test]
    fn active_steadfast_matches_name_or_packzy_host() {
        let settings = CourierSettings {
            providers: vec![
                CourierProvider {
                    id: "other".to_string(),
                    name: "Pathao".to_string(),
                    base_url: None,
                    api_key: "a".to_string(),
                    secret_key: "b".to_string(),
                    is_active: true,
                    is_default: false,
                },
                CourierProvider {
                    id: "sf".to_string(),
                    name: "Primary".to_string(),
                    base_url: Some("https://portal.packzy.com/api/v1".to_string()),
                    api_key: "key".to_string(),
                    secret_key: "secret".to_string(),
                    is_active: true,
                    is_default: true,
                },
            ],
        };
        assert_eq!(settings.active_steadfast().map(|p| p.id.as_str()), Some("sf"));
    }

    #[test]
    fn inactive_steadfast_is_ignored() {
        let mut settings = CourierSettings::default();
        settings.providers[0].is_active = false;
        assert!(settings.active_steadfast().is_none());
    }
}
