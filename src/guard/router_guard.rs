use tracing::debug;

use super::route::{Access, Route};
use crate::models::{Identity, Role};
use crate::session::Session;

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow(Route),
    Redirect(Route),
}

impl GuardDecision {
    /// The route that ends up rendered.
    pub fn route(&self) -> &Route {
        match self {
            GuardDecision::Allow(route) | GuardDecision::Redirect(route) => route,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow(_))
    }
}

/// Where a user lands after login, or when sent away from a forbidden page.
pub fn landing_route(identity: Option<&Identity>) -> Route {
    match identity {
        Some(identity) => Route::Dashboard(identity.role),
        None => Route::Home,
    }
}

pub fn is_allowed(identity: Option<&Identity>, route: &Route) -> bool {
    match (route.access(), identity) {
        (Access::Public, _) => true,
        (Access::Authenticated, identity) => identity.is_some(),
        (Access::Only(role), Some(identity)) => identity.role == role,
        (Access::Only(_), None) => false,
    }
}

/// Decide what to render for `path`. Forbidden and unknown paths redirect
/// to the landing route of the current session.
pub fn authorize(session: &Session, path: &str) -> GuardDecision {
    let identity = session.identity();
    match Route::parse(path) {
        Some(route) if is_allowed(identity, &route) => GuardDecision::Allow(route),
        parsed => {
            let landing = landing_route(identity);
            debug!(
                path,
                known = parsed.is_some(),
                redirect = %landing,
                "Navigation redirected"
            );
            GuardDecision::Redirect(landing)
        }
    }
}

/// Menu entries for the role, in display order.
pub fn navigation(identity: &Identity) -> Vec<Route> {
    let role: Role = identity.role;
    vec![
        Route::Dashboard(role),
        Route::Projects(role),
        Route::Messages(role),
    ]
}
