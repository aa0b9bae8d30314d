//! Authorization handshake request and response types.
//!
//! The handshake is two sequential POST exchanges against the companion
//! server. Step one trades the application identity for a short-lived code;
//! step two trades the code for a bearer token once the user approves the
//! request inside the player.
//!
//! # Example Responses
//!
//! ```json
//! { "code": "f4k3c0d3" }
//! ```
//!
//! ```json
//! { "token": "secret_token" }
//! ```
//!
//! # Note
//!
//! The server replies may carry additional fields; only the ones below are
//! required. Both the code and the token are credentials and are redacted
//! from debug output.

use serde::Serialize;
use veil::Redact;

use crate::config::Config;

/// Body of `POST /auth/requestcode`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeRequest<'a> {
    pub app_id: &'a str,
    pub app_name: &'a str,
    pub app_version: &'a str,
}

impl<'a> CodeRequest<'a> {
    #[must_use]
    pub fn from_config(config: &'a Config) -> Self {
        Self {
            app_id: &config.app_id,
            app_name: &config.app_name,
            app_version: &config.app_version,
        }
    }
}

/// Reply to the request-code call.
#[derive(Clone, Eq, PartialEq, serde::Deserialize, Redact)]
pub struct CodeResponse {
    /// Short-lived authorization code, consumed immediately by
    /// [`TokenRequest`] and never persisted.
    #[redact]
    pub code: String,
}

/// Body of `POST /auth/request`.
///
/// The server holds this call open until the user approves or rejects the
/// request in the player, which can take arbitrarily long.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest<'a> {
    pub app_id: &'a str,
    pub code: &'a str,
}

/// Reply to the request-token call.
#[derive(Clone, Eq, PartialEq, serde::Deserialize, Redact)]
pub struct TokenResponse {
    /// Bearer token granting control over the player.
    #[redact]
    pub token: String,
}
