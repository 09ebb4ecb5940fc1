/// Redis connectivity
///
/// Redis holds the server-side session records (`sess:{sha256(token)}`, see
/// [`crate::auth::session::RedisSessionStore`]). Domain data never goes here.

pub mod client;

pub use client::{RedisClient, RedisClientError, RedisConfig};
