//! Login page: sign in, sign up, quick logout.

#[cfg(test)]
#[path = "login_test.rs"]
mod tests;

use crate::api::{ApiClient, LoginOptions, SignupOptions};
use crate::error::SessionError;
use crate::guard::Route;
use crate::session::SessionStore;

/// Where the page goes after a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormResult {
    /// Leave the page.
    Navigate(Route),
    /// Stay on the page with an informational line.
    Notice(String),
    /// Stay on the page with an inline error.
    Error(String),
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Submit the login form. Success replaces the page with `/home`.
pub async fn submit_login(api: &ApiClient, form: &LoginForm, options: LoginOptions) -> FormResult {
    match api.login(&form.username, &form.password, options).await {
        Ok(_) => FormResult::Navigate(Route::Home),
        Err(err) => FormResult::Error(err.to_string()),
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub confirm: String,
}

impl SignupForm {
    /// Local checks run before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns the message to show inline.
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("Username is required".to_owned());
        }
        if self.password.is_empty() {
            return Err("Password is required".to_owned());
        }
        if self.password != self.confirm {
            return Err("Passwords do not match".to_owned());
        }
        Ok(())
    }
}

/// Submit the signup form. Success stays on the login page; nobody is logged in.
pub async fn submit_signup(api: &ApiClient, form: &SignupForm, options: SignupOptions) -> FormResult {
    if let Err(message) = form.validate() {
        return FormResult::Error(message);
    }
    match api.signup(form.username.trim(), &form.password, options).await {
        Ok(outcome) => FormResult::Notice(outcome.message),
        Err(err) => FormResult::Error(err.to_string()),
    }
}

/// Clear the session and return to the entry route.
///
/// # Errors
///
/// Returns an error if storage refuses the removal.
pub fn quick_logout(sessions: &SessionStore) -> Result<Route, SessionError> {
    sessions.clear_session()?;
    tracing::info!("logged out");
    Ok(Route::Login)
}
