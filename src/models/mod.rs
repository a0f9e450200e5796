pub mod identity;
pub mod message;
pub mod project;

pub use identity::{Identity, Role, UnknownRole};
pub use message::{Message, MessageKind, NewMessage};
pub use project::{
    DocumentSet, NewProject, ProgressUpdate, Project, ProjectFilter, ProjectStats, ProjectStatus,
    ProjectSummary,
};
