//! Routes and the protected-route guard.
//!
//! The guard holds no state of its own. Each check reads the session store
//! afresh and either hands the wrapped content back untouched or replaces it
//! with a redirect to the public entry route.

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;

use std::fmt;

use crate::error::SessionError;
use crate::session::SessionStore;

// =============================================================================
// ROUTES
// =============================================================================

/// Navigable pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`: login and signup, public.
    Login,
    /// `/home`: dashboard.
    Home,
    /// `/details/:id`: one player, keyed by username.
    Details(String),
}

impl Route {
    /// Resolve a path. Unknown paths and `/details/` without an id resolve to `None`.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(Self::Login),
            "/home" => Some(Self::Home),
            _ => {
                let id = trimmed.strip_prefix("/details/")?;
                if id.is_empty() || id.contains('/') {
                    return None;
                }
                Some(Self::Details(id.to_owned()))
            }
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/".to_owned(),
            Self::Home => "/home".to_owned(),
            Self::Details(id) => format!("/details/{id}"),
        }
    }

    /// Whether the route must pass the guard before rendering.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        !matches!(self, Self::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

// =============================================================================
// GUARD
// =============================================================================

/// Outcome of a guarded render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    Render(T),
    Redirect(Route),
}

impl<T> Guarded<T> {
    #[must_use]
    pub fn into_render(self) -> Option<T> {
        match self {
            Self::Render(children) => Some(children),
            Self::Redirect(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    sessions: SessionStore,
}

impl RouteGuard {
    #[must_use]
    pub fn new(sessions: SessionStore) -> Self {
        Self { sessions }
    }

    /// Render `children` if the stored session grants access, else redirect to `/`.
    ///
    /// # Errors
    ///
    /// Propagates a corrupt or unreadable session.
    pub fn guard<T>(&self, children: T) -> Result<Guarded<T>, SessionError> {
        if self.sessions.is_authenticated()? {
            Ok(Guarded::Render(children))
        } else {
            tracing::debug!("no session, redirecting to login");
            Ok(Guarded::Redirect(Route::Login))
        }
    }

    /// Like [`RouteGuard::guard`] but only builds the children when access is granted.
    ///
    /// # Errors
    ///
    /// Propagates a corrupt or unreadable session.
    pub fn guard_with<T>(&self, children: impl FnOnce() -> T) -> Result<Guarded<T>, SessionError> {
        Ok(match self.guard(())? {
            Guarded::Render(()) => Guarded::Render(children()),
            Guarded::Redirect(route) => Guarded::Redirect(route),
        })
    }

    /// Gate navigation to `route`: public routes always pass.
    ///
    /// # Errors
    ///
    /// Propagates a corrupt or unreadable session.
    pub fn navigate(&self, route: Route) -> Result<Guarded<Route>, SessionError> {
        if route.is_protected() {
            self.guard(route)
        } else {
            Ok(Guarded::Render(route))
        }
    }
}
