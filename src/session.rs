//! Persisted operator session.
//!
//! DESIGN
//! ======
//! The session is a client-trusted flag: whoever can write the storage slot
//! is "logged in". Nothing here verifies anything with the server. The
//! store keeps no in-memory copy; every call goes back to storage so a
//! logout is visible to the very next check.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::SessionError;
use crate::storage::KeyValueStorage;

/// Storage key holding the serialized session.
pub const SESSION_KEY: &str = "my_app_auth_v1";

/// Locally persisted record of a logged-in operator.
///
/// Stored documents are parsed, never validated: every field is optional
/// and read leniently, so an oddly-typed field degrades instead of failing
/// the read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: String,
    #[serde(rename = "loggedIn", default, deserialize_with = "truthy")]
    pub logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_option")]
    pub message: Option<String>,
    /// Any truthy stored token, rendered as a string. Falsy tokens read as `None`.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "truthy_token")]
    pub token: Option<String>,
}

impl Session {
    /// Session written after a successful login.
    #[must_use]
    pub fn logged_in(username: impl Into<String>, message: Option<String>) -> Self {
        Self { username: username.into(), logged_in: true, message, token: None }
    }

    /// A session grants access when it carries a non-empty token or the logged-in flag.
    #[must_use]
    pub fn grants_access(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty()) || self.logged_in
    }
}

/// JavaScript truthiness, so hand-edited documents like `"loggedIn": 1` still count.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(is_truthy(&value))
}

fn truthy_token<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if !is_truthy(&value) {
        return Ok(None);
    }
    Ok(Some(match value {
        Value::String(s) => s,
        other => other.to_string(),
    }))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_option(deserializer)?.unwrap_or_default())
}

fn lenient_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_string(&value))
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strings as-is, numbers and booleans in their JSON spelling, anything else `None`.
pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Reads and writes the session through an injected storage capability.
///
/// Cloning is cheap and every clone sees the same storage.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("key", &SESSION_KEY).finish_non_exhaustive()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Overwrite the stored session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when the backend refuses the write.
    pub fn set_session(&self, session: &Session) -> Result<(), SessionError> {
        let raw = serde_json::to_string(session).map_err(|e| SessionError::Serialize(e.to_string()))?;
        self.storage.set_item(SESSION_KEY, &raw)
    }

    /// Read the stored session.
    ///
    /// `None` when nothing is stored or the stored JSON is not an object
    /// (`null`, `0`, `"x"`, a list). Such values never grant access.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Parse` when the stored value is not valid JSON.
    pub fn get_session(&self) -> Result<Option<Session>, SessionError> {
        let Some(raw) = self.storage.get_item(SESSION_KEY)? else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(&raw).map_err(|e| SessionError::Parse(e.to_string()))?;
        if !value.is_object() {
            tracing::debug!(key = SESSION_KEY, "stored session is not an object");
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| SessionError::Parse(e.to_string()))
    }

    /// Remove the stored session. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when the backend is unavailable.
    pub fn clear_session(&self) -> Result<(), SessionError> {
        self.storage.remove_item(SESSION_KEY)
    }

    /// True iff a session is stored and it carries a token or the logged-in flag.
    ///
    /// # Errors
    ///
    /// Propagates read and parse failures from [`SessionStore::get_session`].
    pub fn is_authenticated(&self) -> Result<bool, SessionError> {
        Ok(self.get_session()?.is_some_and(|s| s.grants_access()))
    }
}
