//! # Coursetrack Shared Library
//!
//! Domain types, persistence and auth primitives used by the Coursetrack API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: users, courses and tasks with their PostgreSQL queries
//! - `store`: the `Store` trait with PostgreSQL and in-memory backends
//! - `auth`: password hashing, input validation, sessions, authorization guard
//! - `db`: connection pool and embedded migrations
//! - `redis`: Redis client used by the session store

pub mod auth;
pub mod db;
pub mod models;
pub mod redis;
pub mod store;

/// Current version of the Coursetrack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
