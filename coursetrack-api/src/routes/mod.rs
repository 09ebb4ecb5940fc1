/// API route handlers
///
/// - `health`: liveness check
/// - `graphql`: the GraphQL endpoint

pub mod graphql;
pub mod health;
