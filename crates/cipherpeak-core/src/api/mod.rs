//! REST API client for the Cipherpeak backend.
//!
//! `ApiClient` owns the authorized request pipeline: it attaches the
//! session's bearer token to every outgoing business call, refreshes the
//! token through the dedicated refresh endpoint when it has expired, and
//! maps non-2xx responses into `ApiError`.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
