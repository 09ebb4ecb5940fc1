/// GraphQL object types
///
/// Thin wrappers over the shared models. Relationship fields go back to the
/// store on every access. Timestamps are RFC 3339 strings in UTC with
/// millisecond precision, e.g. `2025-03-01T12:00:00.000Z`.
///
/// The password hash is never part of the `User` type.

use async_graphql::{Context, ErrorExtensions, Object, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use coursetrack_shared::models::course::Course;
use coursetrack_shared::models::task::{Task, TaskFilter};
use coursetrack_shared::models::user::User;

use super::request_context;
use crate::error::ApiError;

pub fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn store_error(err: impl Into<ApiError>) -> async_graphql::Error {
    let err: ApiError = err.into();
    err.extend()
}

pub struct UserObject(pub User);

#[Object(name = "User")]
impl UserObject {
    async fn id(&self) -> i32 {
        self.0.id
    }

    async fn first_name(&self) -> &str {
        &self.0.first_name
    }

    async fn last_name(&self) -> &str {
        &self.0.last_name
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    async fn created_at(&self) -> String {
        timestamp(&self.0.created_at)
    }

    async fn courses(&self, ctx: &Context<'_>) -> Result<Vec<CourseObject>> {
        let rc = request_context(ctx)?;
        let courses = rc
            .store
            .list_courses(Some(self.0.id))
            .await
            .map_err(store_error)?;
        Ok(courses.into_iter().map(CourseObject).collect())
    }

    async fn tasks(&self, ctx: &Context<'_>) -> Result<Vec<TaskObject>> {
        let rc = request_context(ctx)?;
        let tasks = rc
            .store
            .list_tasks(TaskFilter::by_user(self.0.id))
            .await
            .map_err(store_error)?;
        Ok(tasks.into_iter().map(TaskObject).collect())
    }
}

pub struct CourseObject(pub Course);

#[Object(name = "Course")]
impl CourseObject {
    async fn id(&self) -> i32 {
        self.0.id
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn user_id(&self) -> i32 {
        self.0.user_id
    }

    async fn created_at(&self) -> String {
        timestamp(&self.0.created_at)
    }

    /// Owner of the course
    async fn user(&self, ctx: &Context<'_>) -> Result<Option<UserObject>> {
        let rc = request_context(ctx)?;
        let user = rc.store.find_user(self.0.user_id).await.map_err(store_error)?;
        Ok(user.map(UserObject))
    }

    async fn tasks(&self, ctx: &Context<'_>) -> Result<Vec<TaskObject>> {
        let rc = request_context(ctx)?;
        let tasks = rc
            .store
            .list_tasks(TaskFilter::by_course(self.0.id))
            .await
            .map_err(store_error)?;
        Ok(tasks.into_iter().map(TaskObject).collect())
    }
}

pub struct TaskObject(pub Task);

#[Object(name = "Task")]
impl TaskObject {
    async fn id(&self) -> i32 {
        self.0.id
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn deadline(&self) -> String {
        timestamp(&self.0.deadline)
    }

    async fn completed(&self) -> bool {
        self.0.completed
    }

    async fn course_id(&self) -> i32 {
        self.0.course_id
    }

    async fn user_id(&self) -> i32 {
        self.0.user_id
    }

    async fn created_at(&self) -> String {
        timestamp(&self.0.created_at)
    }

    async fn course(&self, ctx: &Context<'_>) -> Result<Option<CourseObject>> {
        let rc = request_context(ctx)?;
        let course = rc
            .store
            .find_course(self.0.course_id)
            .await
            .map_err(store_error)?;
        Ok(course.map(CourseObject))
    }

    async fn user(&self, ctx: &Context<'_>) -> Result<Option<UserObject>> {
        let rc = request_context(ctx)?;
        let user = rc.store.find_user(self.0.user_id).await.map_err(store_error)?;
        Ok(user.map(UserObject))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_format() {
        let value = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(timestamp(&value), "2025-03-01T12:00:00.000Z");

        let value = value + chrono::Duration::milliseconds(1234);
        assert_eq!(timestamp(&value), "2025-03-01T12:00:01.234Z");
    }
}
