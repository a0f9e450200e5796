//! Decoding of the backend's compact credential.
//!
//! The credential is a standard three-segment token (header, claims,
//! signature). The client reads the claims to learn who is logged in but
//! never verifies the signature: the backend is the only trust boundary
//! and re-validates the token on every authenticated request.

mod codec;
mod credential;

pub use codec::{decode, decode_claims, DecodeError};
pub use credential::Credential;
