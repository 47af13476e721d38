//! Session authentication for the Cipherpeak backend.
//!
//! This module owns the credential lifecycle:
//! - `Credential`: the access/refresh token pair plus the subject identity
//! - `SessionStore`: in-memory session state mirrored to a file on disk
//! - `expiry`: access-token expiry decoding
//!
//! A session either holds a whole `Credential` or none at all - an access
//! token can never exist without its refresh token. Expired access tokens
//! are kept across restarts: they still carry the refresh token the next
//! request will trade in for a fresh one.

pub mod credential;
pub mod expiry;
pub mod store;

pub use credential::{Credential, Subject, UserInfo};
pub use store::SessionStore;
