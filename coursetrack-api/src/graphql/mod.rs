/// GraphQL schema
///
/// The query and mutation roots are merged from one object per domain:
///
/// ```text
/// Query     me | courses course coursesByUser
///              | tasks task tasksByCourse tasksByUser completedTasks pendingTasks
/// Mutation  register login logout
///              | createUser updateUser deleteUser
///              | createCourse updateCourse deleteCourse
///              | createTask updateTask toggleTaskCompletion deleteTask
/// ```
///
/// Every execution must carry a [`RequestContext`] in its data.

use async_graphql::{Context, EmptySubscription, MergedObject, Schema};

pub mod auth;
pub mod context;
pub mod courses;
pub mod tasks;
pub mod types;
pub mod users;

pub use context::RequestContext;

/// Nested relationship fields allow cycles (course -> tasks -> course ...)
const MAX_DEPTH: usize = 12;

#[derive(MergedObject, Default)]
pub struct QueryRoot(auth::AuthQuery, courses::CourseQuery, tasks::TaskQuery);

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    auth::AuthMutation,
    users::UserMutation,
    courses::CourseMutation,
    tasks::TaskMutation,
);

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema() -> AppSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .limit_depth(MAX_DEPTH)
        .finish()
}

pub(crate) fn request_context<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a RequestContext> {
    ctx.data::<RequestContext>()
}
