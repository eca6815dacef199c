//! Page models behind the terminal front end.
//!
//! Each page decides where to navigate and which message to show, and
//! renders itself as plain text through `Display`. Pages never hold a
//! session copy; they ask the store.

pub mod dashboard;
pub mod details;
pub mod login;

use std::fmt;

use crate::api::PlayerRecord;

/// Placeholder for values that have not loaded or are missing.
pub const PLACEHOLDER: &str = "--";

fn or_placeholder<T: fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_owned(), ToString::to_string)
}

fn online_label(player: &PlayerRecord) -> &'static str {
    if player.online { "Online" } else { "Offline" }
}
