//! Route-level access decisions for a presentation layer.

use std::sync::Arc;

use labelhub_core::access::{self, Resource};
use labelhub_core::identity::Identity;

use crate::session::{SessionState, SessionStore};

/// Where signed-in users land.
pub const HOME_PATH: &str = "/projects";
pub const LOGIN_PATH: &str = "/login";

/// Pages only meaningful while signed out.
const AUTH_PAGES: &[&str] = &["/login", "/signup"];
/// Pages anyone may see.
const PUBLIC_PAGES: &[&str] = &["/"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the page, for this identity if signed in.
    Allow(Option<Identity>),
    /// Navigate to this path instead.
    Redirect(String),
    /// Render a not-found page.
    NotFound,
    /// The session store has not finished restoring; try again once it has.
    Pending,
}

/// Decides whether a path may be shown for the current session.
#[derive(Clone)]
pub struct RouteGuard {
    session: Arc<SessionStore>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    /// Decide for `path` (a path with an optional query string).
    ///
    /// | Path                     | Signed in          | Signed out                  |
    /// |--------------------------|--------------------|-----------------------------|
    /// | `/`                      | `Allow(identity)`  | `Allow(None)`               |
    /// | `/login`, `/signup`      | `Redirect(/projects)` | `Allow(None)`            |
    /// | anything else            | `Allow(identity)`  | `Redirect(/login?next=..)`  |
    pub fn check(&self, path: &str) -> GuardDecision {
        let route = route_of(path);
        if matches!(self.session.state(), SessionState::Loading) {
            return if PUBLIC_PAGES.contains(&route) || AUTH_PAGES.contains(&route) {
                GuardDecision::Allow(None)
            } else {
                GuardDecision::Pending
            };
        }

        let identity = self.session.current();
        if AUTH_PAGES.contains(&route) {
            return match identity {
                Some(_) => GuardDecision::Redirect(HOME_PATH.to_string()),
                None => GuardDecision::Allow(None),
            };
        }
        if PUBLIC_PAGES.contains(&route) {
            return GuardDecision::Allow(identity);
        }
        match identity {
            Some(identity) => GuardDecision::Allow(Some(identity)),
            None => GuardDecision::Redirect(login_redirect(path)),
        }
    }

    /// Like [`check`](Self::check) for a page showing one resource.
    ///
    /// A missing resource and one the identity may not read both yield
    /// `NotFound`.
    pub fn check_resource(&self, path: &str, resource: Option<&Resource<'_>>) -> GuardDecision {
        match self.check(path) {
            GuardDecision::Allow(identity) => match resource {
                Some(resource) if access::can_read(identity.as_ref(), resource) => {
                    GuardDecision::Allow(identity)
                }
                _ => GuardDecision::NotFound,
            },
            other => other,
        }
    }
}

/// Strip query and fragment; ignore a trailing slash except on `/`.
fn route_of(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let route = &path[..end];
    if route.len() > 1 {
        route.trim_end_matches('/')
    } else {
        route
    }
}

fn login_redirect(path: &str) -> String {
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(path))
}
