//! Request options and response shapes for the player service.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::session::{is_truthy, scalar_string};

/// Options for [`super::ApiClient::login`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoginOptions {
    /// Overrides the configured deadline.
    pub timeout: Option<Duration>,
    /// Attach the configured cookie. Off by default: no cookies are sent.
    pub include_credentials: bool,
}

/// Options for [`super::ApiClient::signup`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignupOptions {
    pub timeout: Option<Duration>,
}

#[derive(Serialize)]
pub(crate) struct CredentialsBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct UsernameBody<'a> {
    pub username: &'a str,
}

/// Result of a successful signup. Synthesized locally; the server's own
/// success message is not used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupOutcome {
    pub success: bool,
    pub message: String,
}

impl SignupOutcome {
    pub(crate) fn created() -> Self {
        Self { success: true, message: "Account created, please login".to_owned() }
    }
}

// =============================================================================
// PLAYER RECORD
// =============================================================================

/// Account status value the service uses for banned players.
pub const BANNED_STATUS: &str = "banned";

/// Read-only projection of a remote player record.
///
/// Built leniently from whatever JSON the service returns: missing or
/// oddly-typed fields become `None` instead of failing the whole record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerRecord {
    pub id: Option<String>,
    pub username: String,
    pub playername: Option<String>,
    pub level: Option<i64>,
    pub coins: Option<i64>,
    pub enemies_defeated: Option<i64>,
    pub account_status: Option<String>,
    pub online: bool,
}

impl PlayerRecord {
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: value.get("_id").and_then(scalar_string),
            username: value.get("username").and_then(scalar_string).unwrap_or_default(),
            playername: value.get("playername").and_then(scalar_string),
            level: value.get("level").and_then(integer),
            coins: value.get("coins").and_then(integer),
            enemies_defeated: value.get("EnemiesDefeated").and_then(integer),
            account_status: value.get("accountStatus").and_then(scalar_string),
            online: value.get("onlineStatus").is_some_and(is_truthy),
        }
    }

    #[must_use]
    pub fn is_banned(&self) -> bool {
        self.account_status.as_deref() == Some(BANNED_STATUS)
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
