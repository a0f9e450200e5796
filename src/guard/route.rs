use std::fmt;

use crate::models::Role;

/// Every page the client can navigate to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    ForgotPassword,
    ResetPassword(String),
    Dashboard(Role),
    Projects(Role),
    Messages(Role),
    /// `/projects/:id`, reachable by both roles.
    ProjectDetails(String),
    /// `/projects-provider/:id`, the provider's management view.
    ProviderProjectDetails(String),
}

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Only(Role),
}

impl Route {
    /// Parse a location path. Query string, fragment and a trailing slash
    /// are ignored. Returns `None` for paths outside the route surface.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let path = path.strip_prefix('/')?;
        let path = path.strip_suffix('/').unwrap_or(path);

        let segments: Vec<&str> = path.split('/').collect();
        match segments.as_slice() {
            [""] => Some(Route::Home),
            ["forgot-password"] => Some(Route::ForgotPassword),
            ["reset-password", token] if !token.is_empty() => {
                Some(Route::ResetPassword(token.to_string()))
            }
            ["projects", id] if !id.is_empty() => Some(Route::ProjectDetails(id.to_string())),
            ["projects-provider", id] if !id.is_empty() => {
                Some(Route::ProviderProjectDetails(id.to_string()))
            }
            [page] => {
                let (section, role) = page.rsplit_once('-')?;
                let role = role.parse::<Role>().ok()?;
                match section {
                    "dashboard" => Some(Route::Dashboard(role)),
                    "projects" => Some(Route::Projects(role)),
                    "messages" => Some(Route::Messages(role)),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::ResetPassword(token) => format!("/reset-password/{}", token),
            Route::Dashboard(role) => format!("/dashboard-{}", role),
            Route::Projects(role) => format!("/projects-{}", role),
            Route::Messages(role) => format!("/messages-{}", role),
            Route::ProjectDetails(id) => format!("/projects/{}", id),
            Route::ProviderProjectDetails(id) => format!("/projects-provider/{}", id),
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Home | Route::ForgotPassword | Route::ResetPassword(_) => Access::Public,
            Route::Dashboard(role) | Route::Projects(role) | Route::Messages(role) => {
                Access::Only(*role)
            }
            Route::ProjectDetails(_) => Access::Authenticated,
            Route::ProviderProjectDetails(_) => Access::Only(Role::Provider),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
