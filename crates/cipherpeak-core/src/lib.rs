//! Core library for the Cipherpeak business administration client.
//!
//! Cipherpeak is a thin client over a REST backend: every operation fetches
//! or mutates backend-owned records through a small set of HTTP calls. This
//! crate owns everything shared by front ends:
//!
//! - `auth`: the session credential lifecycle (store, expiry, refresh)
//! - `api`: the authenticated HTTP client and its error taxonomy
//! - `models`: serde models for the backend's business records
//! - `config`: client configuration and on-disk locations

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
