//! Player service client.
//!
//! DESIGN
//! ======
//! Login and signup run under a per-call deadline: the whole exchange is
//! wrapped in `tokio::time::timeout`, and dropping the future on expiry
//! aborts the request before any session write can happen. Admin calls
//! only carry the client-wide connect timeout and may wait on a slow server
//! indefinitely.
//!
//! Only a successful login touches the session store.

pub mod response;
pub mod types;

use std::time::Duration;

use reqwest::header::COOKIE;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;

use crate::config::ConsoleConfig;
use crate::error::ApiError;
use crate::session::{Session, SessionStore};
use response::{
    count_field, find_list, interpret_login, interpret_signup, list_field, list_len, parse_json, reports_failure,
};
pub use types::{LoginOptions, PlayerRecord, SignupOptions, SignupOutcome};
use types::{CredentialsBody, UsernameBody};

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    sessions: SessionStore,
    cookie: Option<String>,
    auth_timeout: Duration,
    connect_timeout: Duration,
}

impl ApiClient {
    /// Build a client for `config.base_url` that records logins in `sessions`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ConsoleConfig, sessions: SessionStore) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            sessions,
            cookie: config.cookie.clone(),
            auth_timeout: config.auth_timeout(),
            connect_timeout: config.connect_timeout(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// `POST /login`. On `success: true` persists
    /// `{username, loggedIn: true, message}` and returns the server payload.
    ///
    /// # Errors
    ///
    /// `Timeout`, `Transport`, `InvalidResponse`, `Request`,
    /// `InvalidCredentials`, or `Session` if the session cannot be stored.
    pub async fn login(&self, username: &str, password: &str, options: LoginOptions) -> Result<Value, ApiError> {
        let deadline = options.timeout.unwrap_or(self.auth_timeout);
        let mut request = self
            .http
            .post(self.url("/login"))
            .json(&CredentialsBody { username, password });
        if options.include_credentials
            && let Some(cookie) = &self.cookie
        {
            request = request.header(COOKIE, cookie);
        }

        let (status, body) = self.exchange_with_deadline("login", request, deadline).await?;
        let payload = interpret_login(status, &body).inspect_err(|e| {
            tracing::warn!(%username, error = %e, "login rejected");
        })?;

        self.sessions
            .set_session(&Session::logged_in(username, response::login_message(&payload)))?;
        tracing::info!(%username, "login succeeded");
        Ok(payload)
    }

    /// `POST /signup`. Never writes a session: signing up does not log in.
    ///
    /// # Errors
    ///
    /// `Timeout`, `Transport`, `InvalidResponse`, `Request`, `Signup`.
    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        options: SignupOptions,
    ) -> Result<SignupOutcome, ApiError> {
        let deadline = options.timeout.unwrap_or(self.auth_timeout);
        let request = self
            .http
            .post(self.url("/signup"))
            .json(&CredentialsBody { username, password });
        let (status, body) = self.exchange_with_deadline("signup", request, deadline).await?;
        let outcome = interpret_signup(status, &body)?;
        tracing::info!(%username, "signup succeeded");
        Ok(outcome)
    }

    // =========================================================================
    // ADMIN
    // =========================================================================

    /// `GET /users/total` → `totalUsers`, 0 when absent.
    ///
    /// # Errors
    ///
    /// `Request` on non-2xx, `Transport`, `InvalidResponse`.
    pub async fn total_users(&self) -> Result<u64, ApiError> {
        let request = self.http.get(self.url("/users/total"));
        let data = self
            .admin_json("total_users", request, |_| "Failed to fetch total users".to_owned())
            .await?;
        Ok(count_field(&data, "totalUsers"))
    }

    /// `GET /users/online` → length of `online`, 0 when absent or not a list.
    ///
    /// # Errors
    ///
    /// `Request` on non-2xx, `Transport`, `InvalidResponse`.
    pub async fn active_users(&self) -> Result<usize, ApiError> {
        let request = self.http.get(self.url("/users/online"));
        let data = self
            .admin_json("active_users", request, |_| "Failed to fetch active users".to_owned())
            .await?;
        Ok(list_len(&data, "online"))
    }

    /// `POST /users/ban`, returning the server payload unchanged.
    ///
    /// # Errors
    ///
    /// `Request` on non-2xx, `Transport`, `InvalidResponse`.
    pub async fn ban_user(&self, username: &str) -> Result<Value, ApiError> {
        let request = self.http.post(self.url("/users/ban")).json(&UsernameBody { username });
        let payload = self
            .admin_json("ban_user", request, |_| "Failed to ban user".to_owned())
            .await?;
        tracing::info!(%username, "ban requested");
        Ok(payload)
    }

    /// `POST /users/unban`, returning the server payload unchanged.
    ///
    /// # Errors
    ///
    /// `Request` on non-2xx, `Transport`, `InvalidResponse`.
    pub async fn unban_user(&self, username: &str) -> Result<Value, ApiError> {
        let request = self.http.post(self.url("/users/unban")).json(&UsernameBody { username });
        let payload = self
            .admin_json("unban_user", request, |_| "Failed to unban user".to_owned())
            .await?;
        tracing::info!(%username, "unban requested");
        Ok(payload)
    }

    /// `GET /users/details` → `users`, empty when absent or not a list.
    ///
    /// # Errors
    ///
    /// `Request` on non-2xx, `Transport`, `InvalidResponse`.
    pub async fn all_user_details(&self) -> Result<Vec<Value>, ApiError> {
        let request = self.http.get(self.url("/users/details"));
        let data = self
            .admin_json("all_user_details", request, |_| "Failed to fetch user details".to_owned())
            .await?;
        Ok(list_field(&data, "users"))
    }

    /// `GET /users/banned`, accepting any of the envelope shapes the service
    /// has been seen to return (see [`response::find_list`]).
    ///
    /// # Errors
    ///
    /// `Request` on non-2xx, `Transport`, `InvalidResponse`.
    pub async fn banned_user_details(&self) -> Result<Vec<Value>, ApiError> {
        let request = self.http.get(self.url("/users/banned"));
        let data = self
            .admin_json("banned_user_details", request, |status| {
                format!("Failed to fetch banned users ({})", status.as_u16())
            })
            .await?;
        Ok(find_list(&data))
    }

    /// `POST /users/details/fetch` → the `user` record.
    ///
    /// # Errors
    ///
    /// `NotFound` when the response says `success: false` or carries no
    /// `user` object, plus the usual `Request`, `Transport`, `InvalidResponse`.
    pub async fn fetch_player(&self, username: &str) -> Result<PlayerRecord, ApiError> {
        let request = self
            .http
            .post(self.url("/users/details/fetch"))
            .json(&UsernameBody { username });
        let data = self
            .admin_json("fetch_player", request, |_| "Failed to load player details".to_owned())
            .await?;
        if reports_failure(&data) {
            return Err(ApiError::NotFound("Player not found".to_owned()));
        }
        match data.get("user") {
            Some(user @ Value::Object(_)) => Ok(PlayerRecord::from_value(user)),
            _ => Err(ApiError::NotFound("Player not found".to_owned())),
        }
    }

    // =========================================================================
    // TRANSPORT
    // =========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn exchange_with_deadline(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        deadline: Duration,
    ) -> Result<(StatusCode, String), ApiError> {
        tracing::debug!(operation, timeout_ms = duration_ms(deadline), "sending request");
        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };
        match tokio::time::timeout(deadline, exchange).await {
            Ok(result) => result.map_err(|e| self.transport_error(operation, &e)),
            Err(_) => {
                tracing::warn!(operation, timeout_ms = duration_ms(deadline), "request aborted at deadline");
                Err(ApiError::Timeout { operation, timeout_ms: duration_ms(deadline) })
            }
        }
    }

    async fn admin_json(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        failure: impl FnOnce(StatusCode) -> String,
    ) -> Result<Value, ApiError> {
        tracing::debug!(operation, "sending request");
        let response = request.send().await.map_err(|e| self.transport_error(operation, &e))?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(operation, status = status.as_u16(), "request failed");
            return Err(ApiError::Request { status: status.as_u16(), message: failure(status) });
        }
        let body = response.text().await.map_err(|e| self.transport_error(operation, &e))?;
        tracing::trace!(operation, %body, "response body");
        parse_json(&body)
    }

    fn transport_error(&self, operation: &'static str, err: &reqwest::Error) -> ApiError {
        if err.is_timeout() {
            return ApiError::Timeout { operation, timeout_ms: duration_ms(self.connect_timeout) };
        }
        tracing::warn!(operation, error = %err, "transport failure");
        ApiError::Transport { operation, message: err.to_string() }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
