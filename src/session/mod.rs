pub mod base;
pub mod file_storage;
pub mod memory_storage;
pub mod no_storage;
pub mod store;

// Re-export the primary items so callers can do
// "use crate::session::{SessionStore, SessionStorage, create_storage};"
pub use base::{create_storage, SessionStorage, CREDENTIAL_SLOT, IDENTITY_SLOT};
pub use store::{LoginTicket, Session, SessionError, SessionStore};
