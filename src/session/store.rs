//! The process-wide session: one credential and the identity decoded from it.

use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::base::{SessionStorage, CREDENTIAL_SLOT, IDENTITY_SLOT};
use super::memory_storage::MemoryStorage;
use crate::models::Identity;
use crate::token::{Credential, DecodeError};

/// Either nobody is logged in, or a credential together with its identity.
/// A credential without identity (or the reverse) cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        credential: Credential,
        identity: Identity,
    },
}

impl Session {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { identity, .. } => Some(identity),
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { credential, .. } => Some(credential),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("Session storage failure: {0}")]
    Storage(String),
    /// The session was set or cleared after the login began.
    #[error("Session changed while the login was in flight; response discarded")]
    Stale,
}

/// Marks the session generation a login request started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginTicket {
    generation: u64,
}

#[derive(Default)]
struct State {
    session: Session,
    /// Bumped by every transition; see [`SessionStore::begin_login`].
    generation: u64,
}

/// Holds the current session and mirrors it into durable storage.
///
/// Every transition runs under one mutex and contains no await point, so
/// readers never observe a half-applied login or logout.
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    state: Mutex<State>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            state: Mutex::new(State::default()),
        }
    }

    /// A store backed by process memory only.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Resume the session persisted by a previous run.
    ///
    /// The identity is always re-derived from the stored credential. Any
    /// failure (unreadable storage, undecodable credential) clears both
    /// slots and yields an anonymous session.
    pub fn load(&self) -> Session {
        let mut state = self.lock();

        let stored = match self.storage.get(CREDENTIAL_SLOT) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(
                    event_name = "session.load.storage_error",
                    event_domain = "session",
                    "Could not read stored credential: {}",
                    e
                );
                None
            }
        };

        // an emptied slot is what `clear` leaves behind when removal fails
        let Some(raw) = stored.filter(|raw| !raw.is_empty()) else {
            debug!("No stored credential, starting anonymous");
            self.clear_quietly(&mut state);
            return Session::Anonymous;
        };

        match self.apply_locked(&mut state, Credential::new(raw)) {
            Ok(identity) => {
                info!(
                    event_name = "session.resumed",
                    event_domain = "session",
                    role = identity.role.as_str(),
                    "Resumed stored session"
                );
            }
            Err(e) => {
                warn!(
                    event_name = "session.load.rejected",
                    event_domain = "session",
                    "Discarding stored credential: {}",
                    e
                );
                self.clear_quietly(&mut state);
            }
        }
        state.session.clone()
    }

    /// Replace the session with `credential`.
    ///
    /// On any error the previous session stays exactly as it was.
    pub fn set(&self, credential: impl Into<Credential>) -> Result<Identity, SessionError> {
        let mut state = self.lock();
        self.apply_locked(&mut state, credential.into())
    }

    /// Remember the current generation before sending a login request.
    pub fn begin_login(&self) -> LoginTicket {
        LoginTicket {
            generation: self.lock().generation,
        }
    }

    /// Install the credential of a login started with `ticket`, unless the
    /// session was set or cleared in the meantime.
    pub fn complete_login(
        &self,
        ticket: LoginTicket,
        credential: impl Into<Credential>,
    ) -> Result<Identity, SessionError> {
        let mut state = self.lock();
        if state.generation != ticket.generation {
            warn!(
                event_name = "session.login.stale",
                event_domain = "session",
                started_at = ticket.generation,
                current = state.generation,
                "Ignoring login response that arrived after a newer session change"
            );
            return Err(SessionError::Stale);
        }
        self.apply_locked(&mut state, credential.into())
    }

    /// Forget the session in memory and in storage. Idempotent.
    ///
    /// Memory is always reset. An error means the stored credential could
    /// be neither removed nor blanked, so the next `load` may resume it.
    pub fn clear(&self) -> Result<(), SessionError> {
        let mut state = self.lock();
        self.clear_locked(&mut state)
    }

    /// Clear the session only if it still holds `credential`.
    ///
    /// Returns `false` when a newer session replaced it, which happens when
    /// a refusal of an old credential arrives after a fresh login.
    pub fn clear_if_current(&self, credential: &Credential) -> Result<bool, SessionError> {
        let mut state = self.lock();
        if state.session.credential() != Some(credential) {
            debug!(
                credential = %credential.redacted(),
                "Refused credential is no longer the current one, keeping session"
            );
            return Ok(false);
        }
        self.clear_locked(&mut state)?;
        Ok(true)
    }

    pub fn current(&self) -> Session {
        self.lock().session.clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.lock().session.identity().cloned()
    }

    pub fn credential(&self) -> Option<Credential> {
        self.lock().session.credential().cloned()
    }

    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }

    fn apply_locked(
        &self,
        state: &mut State,
        credential: Credential,
    ) -> Result<Identity, SessionError> {
        let identity = credential.decode()?;
        let identity_json = serde_json::to_string(&identity)
            .map_err(|e| SessionError::Storage(format!("Failed to encode identity: {}", e)))?;

        self.storage
            .put(&[
                (CREDENTIAL_SLOT, credential.as_str()),
                (IDENTITY_SLOT, identity_json.as_str()),
            ])
            .map_err(SessionError::Storage)?;

        debug!(
            credential = %credential.redacted(),
            role = identity.role.as_str(),
            persisted = self.storage.is_enabled(),
            "Session established"
        );
        state.session = Session::Authenticated {
            credential,
            identity: identity.clone(),
        };
        state.generation += 1;
        Ok(identity)
    }

    fn clear_locked(&self, state: &mut State) -> Result<(), SessionError> {
        if state.session.is_authenticated() {
            info!(
                event_name = "session.cleared",
                event_domain = "session",
                "Session cleared"
            );
        }
        state.session = Session::Anonymous;
        state.generation += 1;

        let Err(remove_error) = self.storage.remove(&[CREDENTIAL_SLOT, IDENTITY_SLOT]) else {
            return Ok(());
        };
        warn!(
            event_name = "session.clear.remove_failed",
            event_domain = "session",
            "Failed to remove stored session, blanking the slots instead: {}",
            remove_error
        );
        self.storage
            .put(&[(CREDENTIAL_SLOT, ""), (IDENTITY_SLOT, "")])
            .map_err(|e| {
                error!(
                    event_name = "session.clear.storage_error",
                    event_domain = "session",
                    "Stored session survives the logout: {}",
                    e
                );
                SessionError::Storage(format!("{}; {}", remove_error, e))
            })
    }

    /// Clear during `load`, where a storage failure is already logged and
    /// the caller gets an anonymous session either way.
    fn clear_quietly(&self, state: &mut State) {
        let _ = self.clear_locked(state);
    }
}
