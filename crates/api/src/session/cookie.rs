//! Session and settings cookies.
//!
//! Both cookies carry a JSON payload sealed with the state's
//! [`SessionCipher`](rms_core::crypto::SessionCipher), so their values are
//! opaque and tamper-evident.

use axum_extra::extract::cookie::{Cookie, SameSite};
use rms_core::roles::{KIND_CLIENT, KIND_STAFF};
use rms_core::types::DbId;
use serde::{Deserialize, Serialize};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "rating-management-system";

/// Name of the UI settings cookie.
pub const SETTINGS_COOKIE: &str = "rms-settings";

/// Lifetime of the settings cookie.
pub const SETTINGS_MAX_AGE_DAYS: i64 = 90;

const DEFAULT_MAX_AGE_SECS: i64 = 3600;

/// Session cookie configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Key material for cookie encryption.
    pub secret: String,
    /// Session cookie `Max-Age` in seconds (default: 3600).
    pub max_age_secs: i64,
    /// Whether cookies carry the `Secure` attribute (default: true).
    pub cookie_secure: bool,
}

impl SessionConfig {
    /// Load session configuration from environment variables.
    ///
    /// | Env Var                | Required | Default |
    /// |------------------------|----------|---------|
    /// | `SESSION_SECRET`       | **yes**  | --      |
    /// | `SESSION_MAX_AGE_SECS` | no       | `3600`  |
    /// | `COOKIE_SECURE`        | no       | `true`  |
    ///
    /// # Panics
    ///
    /// Panics if `SESSION_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret = std::env::var("SESSION_SECRET")
            .expect("SESSION_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "SESSION_SECRET must not be empty");

        let max_age_secs: i64 = std::env::var("SESSION_MAX_AGE_SECS")
            .unwrap_or_else(|_| DEFAULT_MAX_AGE_SECS.to_string())
            .parse()
            .expect("SESSION_MAX_AGE_SECS must be a valid i64");

        let cookie_secure: bool = std::env::var("COOKIE_SECURE")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("COOKIE_SECURE must be true or false");

        Self {
            secret,
            max_age_secs,
            cookie_secure,
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Who a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Principal {
    /// Internal staff member.
    #[serde(rename_all = "camelCase")]
    User {
        id: DbId,
        name: String,
        email: String,
        role: String,
    },
    /// External client, signed in with the primary or an additional login.
    #[serde(rename_all = "camelCase")]
    Client {
        client_id: DbId,
        login_id: Option<DbId>,
        company_name: String,
        email: String,
    },
}

impl Principal {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::User { .. } => KIND_STAFF,
            Self::Client { .. } => KIND_CLIENT,
        }
    }

    /// Token subject: the staff user id or the client id.
    pub fn subject(&self) -> DbId {
        match self {
            Self::User { id, .. } => *id,
            Self::Client { client_id, .. } => *client_id,
        }
    }

    pub fn role(&self) -> &str {
        match self {
            Self::User { role, .. } => role,
            Self::Client { .. } => KIND_CLIENT,
        }
    }
}

/// Sealed content of the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPayload {
    pub token: String,
    pub principal: Principal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

/// Sealed content of the settings cookie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub theme: Theme,
}

// ---------------------------------------------------------------------------
// Cookie builders
// ---------------------------------------------------------------------------

pub fn session_cookie(sealed: String, config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, sealed))
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(config.max_age_secs))
        .build()
}

/// A cookie that makes the browser drop the session cookie.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

pub fn settings_cookie(sealed: String, config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((SETTINGS_COOKIE, sealed))
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::days(SETTINGS_MAX_AGE_DAYS))
        .build()
}
