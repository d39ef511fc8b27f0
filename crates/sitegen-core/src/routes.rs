//! Client-side routes
//!
//! Routes keep their web path form so return paths stored by one front-end
//! (or typed by the user) resolve the same way everywhere.

use crate::error::CoreError;
use crate::session::{SessionContext, RETURN_PATH_KEY};
use crate::storage::KeyValueStore;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A navigable screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Generate,
    Preview(String),
    Pricing { return_to: Option<String> },
}

impl Route {
    /// Parse a path such as `/preview/abc` or `/Pricing?returnTo=%2Fgenerate`
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        let (path, query) = match trimmed.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (trimmed, None),
        };
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };

        let invalid = || CoreError::InvalidRoute {
            path: raw.to_string(),
        };

        match path {
            "/" => Ok(Route::Landing),
            "/login" => Ok(Route::Login),
            "/generate" => Ok(Route::Generate),
            p if p.eq_ignore_ascii_case("/pricing") => Ok(Route::Pricing {
                return_to: query.and_then(return_to_param),
            }),
            p => match p.strip_prefix("/preview/") {
                Some(id) if !id.is_empty() && !id.contains('/') => {
                    let id = urlencoding::decode(id).map_err(|_| invalid())?;
                    Ok(Route::Preview(id.into_owned()))
                }
                _ => Err(invalid()),
            },
        }
    }

    /// Path form of the route
    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Generate => "/generate".to_string(),
            Route::Preview(id) => format!("/preview/{}", urlencoding::encode(id)),
            Route::Pricing { return_to: None } => "/Pricing".to_string(),
            Route::Pricing {
                return_to: Some(path),
            } => format!("/Pricing?returnTo={}", urlencoding::encode(path)),
        }
    }

    /// Screens that need a signed-in user
    pub fn requires_session(&self) -> bool {
        matches!(
            self,
            Route::Generate | Route::Preview(_) | Route::Pricing { .. }
        )
    }

    /// Resolve the landing page: signed-in users go straight to generation
    pub fn landing_redirect(session: &SessionContext) -> Route {
        if session.is_authenticated() {
            Route::Generate
        } else {
            Route::Landing
        }
    }

    /// Redirect unauthenticated access to gated screens to the login page
    pub fn guard(self, session: &SessionContext) -> Route {
        if self.requires_session() && !session.is_authenticated() {
            debug!(route = %self, "No session, redirecting to login");
            Route::Login
        } else {
            self
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s)
    }
}

fn return_to_param(query: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "returnTo")
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Remember `from` as the pricing return path and build the pricing route
pub fn navigate_to_pricing(store: &dyn KeyValueStore, from: &Route) -> Result<Route, CoreError> {
    let path = from.path();
    store.set(RETURN_PATH_KEY, &path)?;
    Ok(Route::Pricing {
        return_to: Some(path),
    })
}
