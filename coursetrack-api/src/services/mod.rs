/// Operation handlers behind the GraphQL resolvers
///
/// Each function takes the request's [`RequestContext`], runs the auth and
/// ownership checks the operation needs, and talks to the store. Resolvers
/// only convert arguments and results.
///
/// Protected operations check in this order:
///
/// 1. authentication
/// 2. input validation
/// 3. existence of the target (`... not found`)
/// 4. ownership
///
/// [`RequestContext`]: crate::graphql::context::RequestContext

pub mod auth;
pub mod courses;
pub mod tasks;
pub mod users;
