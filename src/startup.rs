//! Application startup and command dispatch.
//!
//! Builds the shared state from the configuration, resumes the persisted
//! session, and runs the commands of the `vitrine` binary.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{create_email_relay, AuthService, PasswordReset};
use crate::config::ConfigV1;
use crate::guard::{authorize, landing_route, GuardDecision};
use crate::models::project::recent_projects;
use crate::models::ProjectStats;
use crate::session::{create_storage, Session, SessionStore};
use crate::state::AppState;

const RECENT_PROJECTS: usize = 5;

pub const USAGE: &str = "\
Usage: vitrine [--config <file>] <command>

Commands:
  --print-schema            print the configuration JSON schema
  status                    show the current session
  login <email> <password>  log in and store the session
  logout                    clear the session
  route <path>              show where navigating to <path> ends up
  projects                  list project statistics and recent projects";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    PrintSchema,
    Status,
    Login { email: String, password: String },
    Logout,
    Route { path: String },
    Projects,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Command, String> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match args.as_slice() {
            ["--print-schema"] => Ok(Command::PrintSchema),
            ["status"] => Ok(Command::Status),
            ["login", email, password] => Ok(Command::Login {
                email: email.to_string(),
                password: password.to_string(),
            }),
            ["logout"] => Ok(Command::Logout),
            ["route", path] => Ok(Command::Route {
                path: path.to_string(),
            }),
            ["projects"] => Ok(Command::Projects),
            _ => Err(USAGE.to_string()),
        }
    }
}

/// Wire storage, session, API client and auth services together, then
/// resume whatever session the storage holds.
pub fn build_state(config: Arc<ConfigV1>) -> Result<AppState, ApiError> {
    let storage = create_storage(&config.storage);
    let session = Arc::new(SessionStore::new(storage));
    let resumed = session.load();

    let api = Arc::new(ApiClient::new(&config.api, &config.cache)?);
    let auth = Arc::new(AuthService::new(api.clone(), session.clone()));
    let relay = create_email_relay(config.email_relay.as_ref());
    let password_reset = Arc::new(PasswordReset::new(
        api.clone(),
        relay,
        &config.password_reset,
    ));

    info!(
        authenticated = resumed.is_authenticated(),
        landing = %landing_route(resumed.identity()),
        "Application state ready"
    );

    Ok(AppState {
        config,
        api,
        session,
        auth,
        password_reset,
    })
}

/// Run one command and return the text to print.
pub async fn run(state: &AppState, command: Command) -> Result<String, String> {
    match command {
        Command::PrintSchema => Ok(crate::config::schema_json()),
        Command::Status => status(state).await,
        Command::Login { email, password } => {
            let landing = state
                .auth
                .login(&email, &password)
                .await
                .map_err(|e| e.user_message().to_string())?;
            let identity = state.session.identity();
            Ok(format!(
                "Welcome, {}. Landing on {}",
                identity.as_ref().map(|i| i.greeting_name()).unwrap_or("user"),
                landing
            ))
        }
        Command::Logout => {
            let landing = state
                .auth
                .logout()
                .await
                .map_err(|e| format!("Logged out here, but {}", e))?;
            Ok(format!("Logged out. Landing on {}", landing))
        }
        Command::Route { path } => Ok(match authorize(&state.session.current(), &path) {
            GuardDecision::Allow(route) => format!("allow {}", route),
            GuardDecision::Redirect(route) => format!("redirect {}", route),
        }),
        Command::Projects => projects(state).await,
    }
}

async fn status(state: &AppState) -> Result<String, String> {
    let Session::Authenticated {
        credential,
        identity,
    } = state.session.current()
    else {
        return Ok("Not logged in".to_string());
    };

    let mut out = String::new();
    let _ = writeln!(out, "Logged in as {} ({})", identity.greeting_name(), identity.role);
    if let Some(id) = &identity.subject_id {
        let _ = writeln!(out, "Subject: {}", id);
    }
    let _ = write!(out, "Landing: {}", landing_route(Some(&identity)));

    match state.api.verify_token(&credential).await {
        Ok(_) => out.push_str("\nBackend: credential accepted"),
        Err(e) => match state.auth.expire_on_unauthorized(&credential, &e) {
            Ok(true) => out.push_str("\nBackend: credential refused, session cleared"),
            Ok(false) => {
                let _ = write!(out, "\nBackend: {}", e.user_message());
            }
            Err(clear_error) => {
                let _ = write!(out, "\nBackend: credential refused, {}", clear_error);
            }
        },
    }
    Ok(out)
}

async fn projects(state: &AppState) -> Result<String, String> {
    let credential = state
        .session
        .credential()
        .ok_or_else(|| "Not logged in".to_string())?;

    let projects = match state.api.list_projects(&credential).await {
        Ok(projects) => projects,
        Err(e) => {
            if let Err(clear_error) = state.auth.expire_on_unauthorized(&credential, &e) {
                warn!("Could not drop the refused session: {}", clear_error);
            }
            return Err(e.user_message().to_string());
        }
    };

    let stats = ProjectStats::from_projects(&projects);
    let mut out = format!(
        "Total: {}  Pending: {}  In progress: {}  Completed: {}",
        stats.total, stats.pending, stats.in_progress, stats.completed
    );
    for project in recent_projects(&projects, RECENT_PROJECTS) {
        let _ = write!(
            out,
            "\n  [{}] {} ({})",
            project.status,
            project.name,
            project.created_at.as_deref().unwrap_or("-")
        );
    }
    Ok(out)
}
