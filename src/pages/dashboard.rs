//! Dashboard (home) page.
//!
//! Three sections load side by side: stats, the user list and the banned
//! list. None waits on another and a failure in one leaves the others
//! intact; each failure adds a banner line instead.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;

use std::fmt;

use serde_json::Value;

use super::{PLACEHOLDER, online_label, or_placeholder};
use crate::api::{ApiClient, PlayerRecord};
use crate::error::SessionError;
use crate::guard::Route;

pub const STATS_WARNING: &str = "Failed to load stats";
pub const USERS_WARNING: &str = "Failed to load user details";
pub const BANNED_WARNING: &str = "Failed to load banned users";

/// Name shown when the session carries no username.
const FALLBACK_NAME: &str = "Player";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub active: usize,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    pub operator: String,
    /// `None` until both counts arrive.
    pub stats: Option<Stats>,
    pub users: Vec<PlayerRecord>,
    pub banned: Vec<PlayerRecord>,
    pub warnings: Vec<String>,
}

/// Load every dashboard section concurrently.
///
/// # Errors
///
/// Only a corrupt or unreadable session fails the page; API failures become warnings.
pub async fn load_dashboard(api: &ApiClient) -> Result<Dashboard, SessionError> {
    let operator = api
        .sessions()
        .get_session()?
        .map(|s| s.username)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_NAME.to_owned());

    let stats = async { tokio::try_join!(api.active_users(), api.total_users()) };
    let (stats, users, banned) = tokio::join!(stats, api.all_user_details(), api.banned_user_details());

    let mut page = Dashboard { operator, ..Dashboard::default() };
    match stats {
        Ok((active, total)) => page.stats = Some(Stats { active, total }),
        Err(err) => page.warn(STATS_WARNING, &err),
    }
    match users {
        Ok(list) => page.users = records(&list),
        Err(err) => page.warn(USERS_WARNING, &err),
    }
    match banned {
        Ok(list) => page.banned = records(&list),
        Err(err) => page.warn(BANNED_WARNING, &err),
    }
    Ok(page)
}

impl Dashboard {
    fn warn(&mut self, banner: &str, err: &impl fmt::Display) {
        tracing::warn!(error = %err, "{banner}");
        self.warnings.push(banner.to_owned());
    }
}

fn records(list: &[Value]) -> Vec<PlayerRecord> {
    list.iter().map(PlayerRecord::from_value).collect()
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Welcome, {}", self.operator)?;
        for warning in &self.warnings {
            writeln!(f, "! {warning}")?;
        }
        writeln!(f)?;
        let (active, total) = match self.stats {
            Some(stats) => (stats.active.to_string(), stats.total.to_string()),
            None => (PLACEHOLDER.to_owned(), PLACEHOLDER.to_owned()),
        };
        writeln!(f, "Active Users: {active}")?;
        writeln!(f, "Total Users:  {total}")?;

        writeln!(f, "\nActive Users")?;
        if self.users.is_empty() {
            writeln!(f, "  No users found")?;
        }
        for user in &self.users {
            writeln!(
                f,
                "  Player: {:<16} Username: {:<16} Status: {:<8} {}",
                or_placeholder(user.playername.as_ref()),
                user.username,
                online_label(user),
                Route::Details(user.username.clone()),
            )?;
        }

        writeln!(f, "\nBanned Users")?;
        if self.banned.is_empty() {
            writeln!(f, "  No banned users")?;
        }
        for user in &self.banned {
            writeln!(
                f,
                "  Player: {:<16} Username: {:<16} {}",
                or_placeholder(user.playername.as_ref()),
                user.username,
                Route::Details(user.username.clone()),
            )?;
        }
        Ok(())
    }
}
