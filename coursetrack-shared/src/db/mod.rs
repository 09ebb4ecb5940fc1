/// PostgreSQL plumbing: pool creation and embedded migrations
///
/// Queries live next to their models in [`crate::models`].

pub mod migrations;
pub mod pool;
