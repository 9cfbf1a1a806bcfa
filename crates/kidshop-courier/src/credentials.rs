use kidshop_core::{CourierSettings, GeneralSettings, STEADFAST_DEFAULT_BASE_URL};

use crate::error::CourierError;

/// Key pair and API root for one Steadfast account.
#[derive(Clone, PartialEq, Eq)]
pub struct SteadfastCredentials {
    pub api_key: String,
    pub secret_key: String,
    pub base_url: String,
}

impl std::fmt::Debug for SteadfastCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SteadfastCredentials")
            .field("api_key", &"[redacted]")
            .field("secret_key", &"[redacted]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn filled(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

/// Picks the Steadfast key pair to use.
///
/// The first active provider that looks like Steadfast wins when both its
/// keys are set; otherwise the legacy pair in the general settings is used.
/// The base URL comes from that provider when it has one.
///
/// # Errors
///
/// Returns [`CourierError::MissingCredentials`] if neither source has both
/// keys.
pub fn resolve_credentials(
    courier: &CourierSettings,
    general: &GeneralSettings,
) -> Result<SteadfastCredentials, CourierError> {
    let provider = courier.active_steadfast();
    let base_url = provider
        .and_then(|p| filled(p.base_url.as_deref()))
        .unwrap_or_else(|| STEADFAST_DEFAULT_BASE_URL.to_string());

    let from_provider = provider.and_then(|p| {
        Some((
            filled(Some(p.api_key.as_str()))?,
            filled(Some(p.secret_key.as_str()))?,
        ))
    });
    let from_general = || {
        Some((
            filled(general.steadfast_api_key.as_deref())?,
            filled(general.steadfast_secret_key.as_deref())?,
        ))
    };

    let (api_key, secret_key) = from_provider
        .or_else(from_general)
        .ok_or(CourierError::MissingCredentials)?;

    Ok(SteadfastCredentials {
        api_key,
        secret_key,
        base_url,
    })
}
