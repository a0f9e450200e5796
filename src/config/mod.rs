// Re-exported so callers can "use crate::config::*".
pub mod logging;
pub mod storage;
pub mod types;

pub use logging::*;
pub use storage::*;
pub use types::*;
