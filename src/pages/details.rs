//! Player details page with ban and unban.
//!
//! After a moderation call the record is fetched again; the page never
//! edits its copy of the player locally.

#[cfg(test)]
#[path = "details_test.rs"]
mod tests;

use std::fmt;

use serde_json::Value;

use super::or_placeholder;
use crate::api::{ApiClient, PlayerRecord};
use crate::error::ApiError;

pub const LOAD_FAILED: &str = "Failed to load player details";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moderation {
    Ban,
    Unban,
}

impl Moderation {
    /// The action the page offers for a player's current status.
    #[must_use]
    pub fn for_player(player: &PlayerRecord) -> Self {
        if player.is_banned() { Self::Unban } else { Self::Ban }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ban => "Ban",
            Self::Unban => "Unban",
        }
    }

    fn mismatch_message(self, username: &str) -> String {
        match self {
            Self::Ban => format!("{username} is already banned"),
            Self::Unban => format!("{username} is not banned"),
        }
    }

    fn done_message(self) -> &'static str {
        match self {
            Self::Ban => "User banned",
            Self::Unban => "User unbanned",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailsView {
    Player(PlayerRecord),
    Message(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailsPage {
    pub username: String,
    pub view: DetailsView,
}

impl DetailsPage {
    /// Load the page for `username`.
    pub async fn load(api: &ApiClient, username: &str) -> Self {
        let view = match api.fetch_player(username).await {
            Ok(player) => DetailsView::Player(player),
            Err(ApiError::NotFound(message)) => DetailsView::Message(message),
            Err(err) => {
                tracing::warn!(%username, error = %err, "player load failed");
                DetailsView::Message(LOAD_FAILED.to_owned())
            }
        };
        Self { username: username.to_owned(), view }
    }

    #[must_use]
    pub fn player(&self) -> Option<&PlayerRecord> {
        match &self.view {
            DetailsView::Player(player) => Some(player),
            DetailsView::Message(_) => None,
        }
    }

    /// Run `action` against the shown player and reload the record.
    ///
    /// Only the action offered for the player's current status is sent. On
    /// success returns the server's message (or a default). On failure
    /// returns the alert text and leaves the page untouched.
    ///
    /// # Errors
    ///
    /// Returns the alert message when no player is loaded, when `action`
    /// does not match the current status, or when the call fails.
    pub async fn moderate(&mut self, api: &ApiClient, action: Moderation) -> Result<String, String> {
        let Some(player) = self.player() else {
            return Err(format!("Cannot {} {}: no player loaded", action.label().to_lowercase(), self.username));
        };
        if Moderation::for_player(player) != action {
            return Err(action.mismatch_message(&self.username));
        }

        let result = match action {
            Moderation::Ban => api.ban_user(&self.username).await,
            Moderation::Unban => api.unban_user(&self.username).await,
        };
        let payload = result.map_err(|err| {
            tracing::warn!(username = %self.username, error = %err, "{} failed", action.label());
            err.to_string()
        })?;

        let username = self.username.clone();
        *self = Self::load(api, &username).await;
        Ok(payload
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(action.done_message())
            .to_owned())
    }
}

impl fmt::Display for DetailsPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let player = match &self.view {
            DetailsView::Message(message) => return writeln!(f, "{message}"),
            DetailsView::Player(player) => player,
        };
        writeln!(f, "Player Name:      {}", or_placeholder(player.playername.as_ref()))?;
        writeln!(f, "Username:         {}", player.username)?;
        writeln!(f, "Level:            {}", or_placeholder(player.level.as_ref()))?;
        writeln!(f, "Coins:            {}", or_placeholder(player.coins.as_ref()))?;
        writeln!(f, "Enemies Defeated: {}", or_placeholder(player.enemies_defeated.as_ref()))?;
        writeln!(f, "Account Status:   {}", or_placeholder(player.account_status.as_ref()))?;
        writeln!(f, "Online:           {}", super::online_label(player))?;
        write!(f, "Actions:          {} | Back (/home) | Logout", Moderation::for_player(player).label())
    }
}
