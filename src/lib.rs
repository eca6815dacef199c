//! # playerdesk
//!
//! Operator console for a game's player service: log in, watch player
//! counts, list active and banned players, ban or unban one of them.
//!
//! The session is a flag kept in local storage and trusted as-is; the
//! [`guard::RouteGuard`] only checks that the flag is present.

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod pages;
pub mod session;
pub mod storage;

pub use api::ApiClient;
pub use config::ConsoleConfig;
pub use error::{ApiError, ConfigError, ErrorCode, SessionError};
pub use guard::{Guarded, Route, RouteGuard};
pub use session::{Session, SessionStore};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
