//! Admin session tokens and the `admin_token` cookie.

use std::sync::Arc;

use axum::http::{header::COOKIE, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

pub const ADMIN_COOKIE: &str = "admin_token";
const SESSION_DAYS: i64 = 7;
const SESSION_MAX_AGE_SECS: i64 = SESSION_DAYS * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

/// Signing keys and the static credential pair for the single admin.
#[derive(Clone)]
pub struct AdminAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    username: Arc<str>,
    password: Arc<str>,
    secure_cookie: bool,
}

impl AdminAuth {
    #[must_use]
    pub fn from_config(config: &kidshop_core::AppConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            &config.admin_user,
            &config.admin_pass,
            config.is_production(),
        )
    }

    #[must_use]
    pub fn new(secret: &str, username: &str, password: &str, secure_cookie: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            username: Arc::from(username),
            password: Arc::from(password),
            secure_cookie,
        }
    }

    /// Constant-time comparison of both fields; both are always compared.
    #[must_use]
    pub fn check_credentials(&self, username: &str, password: &str) -> bool {
        let user_ok = username.as_bytes().ct_eq(self.username.as_bytes());
        let pass_ok = password.as_bytes().ct_eq(self.password.as_bytes());
        (user_ok & pass_ok).into()
    }

    /// Issues an HS256 token valid for seven days from `now`.
    ///
    /// # Errors
    ///
    /// Returns the `jsonwebtoken` error if encoding fails.
    pub fn issue_token(&self, now: DateTime<Utc>) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = AdminClaims {
            sub: self.username.to_string(),
            role: "admin".to_string(),
            iat: unix_secs(now),
            exp: unix_secs(now + Duration::days(SESSION_DAYS)),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
    }

    /// Checks the signature and expiry of `token`.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<AdminClaims> {
        jsonwebtoken::decode::<AdminClaims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .inspect_err(|e| tracing::debug!(error = %e, "admin token rejected"))
            .ok()
    }

    #[must_use]
    pub fn session_cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{ADMIN_COOKIE}={token}; HttpOnly; SameSite=Strict; Path=/; Max-Age={SESSION_MAX_AGE_SECS}"
        );
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }

    #[must_use]
    pub fn cleared_cookie(&self) -> String {
        let mut cookie =
            format!("{ADMIN_COOKIE}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0");
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

fn unix_secs(at: DateTime<Utc>) -> usize {
    usize::try_from(at.timestamp()).unwrap_or(0)
}

/// Value of cookie `name` across every `Cookie` header.
#[must_use]
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn auth() -> AdminAuth {
        AdminAuth::new("test-secret", "admin", "hunter2", false)
    }

    #[test]
    fn credentials_must_both_match() {
        let auth = auth();
        assert!(auth.check_credentials("admin", "hunter2"));
        assert!(!auth.check_credentials("admin", "hunter3"));
        assert!(!auth.check_credentials("root", "hunter2"));
        assert!(!auth.check_credentials("", ""));
    }

    #[test]
    fn issued_token_verifies_and_expires_in_seven_days() {
        let auth = auth();
        let now = Utc::now();
        let token = auth.issue_token(now).expect("token");
        let claims = auth.verify(&token).expect("valid token");
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn token_from_other_secret_or_expired_is_rejected() {
        let other = AdminAuth::new("other-secret", "admin", "hunter2", false);
        let token = other.issue_token(Utc::now()).expect("token");
        assert!(auth().verify(&token).is_none());

        let stale = auth()
            .issue_token(Utc::now() - Duration::days(8))
            .expect("token");
        assert!(auth().verify(&stale).is_none());
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = auth().session_cookie("abc");
        assert!(cookie.starts_with("admin_token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(!cookie.contains("Secure"));

        let secure = AdminAuth::new("s", "a", "p", true).session_cookie("abc");
        assert!(secure.ends_with("; Secure"));
    }

    #[test]
    fn cookie_value_finds_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; admin_token=tok123; lang=bn"),
        );
        assert_eq!(cookie_value(&headers, "admin_token"), Some("tok123"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }
}
