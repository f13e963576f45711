//! # crewdesk Shared Library
//!
//! This crate contains the domain types, persistence and business rules used by
//! the crewdesk API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `lifecycle`: Project status/stage lifecycle manager
//! - `auth`: Token validation, request identity and access policies
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod lifecycle;
pub mod models;

/// Current version of the crewdesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
