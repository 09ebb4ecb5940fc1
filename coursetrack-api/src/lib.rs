//! # Coursetrack API Server Library
//!
//! GraphQL API for tracking courses and their tasks.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `cookies`: Session cookie attributes
//! - `error`: Error taxonomy and GraphQL error mapping
//! - `graphql`: Schema, object types and resolvers
//! - `middleware`: Security headers
//! - `routes`: HTTP handlers (`/health`, `/graphql`)
//! - `services`: Auth, ownership and persistence logic per operation

pub mod app;
pub mod config;
pub mod cookies;
pub mod error;
pub mod graphql;
pub mod middleware;
pub mod routes;
pub mod services;
