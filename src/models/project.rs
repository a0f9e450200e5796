use std::cmp::Reverse;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::value::{lenient_opt_string, lenient_string, string_or_empty};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Pending,
    InProgress,
    Completed,
    /// Anything the backend sends that this client does not know yet.
    #[serde(other)]
    Unknown,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of `GET /api/all-projects`, joined with its owner.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    #[serde(rename = "project_id", deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "project_name", default, deserialize_with = "string_or_empty")]
    pub name: String,
    #[serde(rename = "project_description", default, deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
    #[serde(rename = "project_status")]
    pub status: ProjectStatus,
    #[serde(rename = "project_created_at", default, deserialize_with = "lenient_opt_string")]
    pub created_at: Option<String>,
    #[serde(rename = "user_id", default, deserialize_with = "lenient_opt_string")]
    pub owner_id: Option<String>,
    #[serde(rename = "user_name", default, deserialize_with = "lenient_opt_string")]
    pub owner_name: Option<String>,
    #[serde(rename = "user_email", default, deserialize_with = "lenient_opt_string")]
    pub owner_email: Option<String>,
}

impl ProjectSummary {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }
}

/// A raw project row as returned by `GET /api/projects/:id`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Project {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
    pub status: ProjectStatus,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub user_id: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: String,
}

/// A status note a provider posted on a project.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub project_id: Option<String>,
    #[serde(rename = "update", default, deserialize_with = "string_or_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub created_at: Option<String>,
}

/// Contract and payment proof uploaded for a project.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DocumentSet {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub project_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub contract_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub payment_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub created_at: Option<String>,
}

/// Project counts per status, as shown on both dashboards.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl ProjectStats {
    /// Projects with an unrecognised status count towards `total` only.
    pub fn from_projects(projects: &[ProjectSummary]) -> Self {
        projects
            .iter()
            .fold(ProjectStats::default(), |mut stats, project| {
                stats.total += 1;
                match project.status {
                    ProjectStatus::Pending => stats.pending += 1,
                    ProjectStatus::InProgress => stats.in_progress += 1,
                    ProjectStatus::Completed => stats.completed += 1,
                    ProjectStatus::Unknown => {}
                }
                stats
            })
    }
}

/// Search box plus status dropdown of the project lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub search: String,
    /// `None` means "all".
    pub status: Option<ProjectStatus>,
}

impl ProjectFilter {
    pub fn matches(&self, project: &ProjectSummary) -> bool {
        if let Some(status) = self.status {
            if project.status != status {
                return false;
            }
        }

        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        std::iter::once(Some(project.name.as_str()))
            .chain([
                project.description.as_deref(),
                project.owner_name.as_deref(),
                project.owner_email.as_deref(),
            ])
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn apply<'a>(&self, projects: &'a [ProjectSummary]) -> Vec<&'a ProjectSummary> {
        projects.iter().filter(|p| self.matches(p)).collect()
    }
}

/// The `limit` newest projects; rows without a parseable date go last.
pub fn recent_projects(projects: &[ProjectSummary], limit: usize) -> Vec<&ProjectSummary> {
    let mut sorted: Vec<&ProjectSummary> = projects.iter().collect();
    sorted.sort_by_key(|p| Reverse(p.created_at()));
    sorted.truncate(limit);
    sorted
}

/// Accepts RFC 3339 and the offset-less ISO form Python's `isoformat()` emits.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
