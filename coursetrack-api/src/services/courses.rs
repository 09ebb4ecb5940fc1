//! Course operations. Any signed-in user may read; only the owner may change.

use coursetrack_shared::models::course::{Course, CreateCourse, UpdateCourse};

use crate::error::{ApiError, ApiResult};
use crate::graphql::context::RequestContext;

pub const COURSE_NOT_FOUND: &str = "Course not found";
const NAME_REQUIRED: &str = "Course name is required";

fn course_name(name: &str) -> ApiResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("name", NAME_REQUIRED));
    }
    Ok(name.to_string())
}

pub async fn list_courses(rc: &RequestContext) -> ApiResult<Vec<Course>> {
    rc.require_auth().await?;
    Ok(rc.store.list_courses(None).await?)
}

pub async fn get_course(rc: &RequestContext, id: i32) -> ApiResult<Option<Course>> {
    rc.require_auth().await?;
    Ok(rc.store.find_course(id).await?)
}

pub async fn courses_by_user(rc: &RequestContext, user_id: i32) -> ApiResult<Vec<Course>> {
    rc.require_auth().await?;
    Ok(rc.store.list_courses(Some(user_id)).await?)
}

/// Creates a course owned by the caller
pub async fn create_course(
    rc: &RequestContext,
    name: &str,
    description: Option<String>,
) -> ApiResult<Course> {
    let user_id = rc.require_auth().await?;
    let name = course_name(name)?;

    let course = rc
        .store
        .create_course(CreateCourse {
            name,
            description,
            user_id,
        })
        .await?;

    tracing::debug!(course_id = course.id, user_id, "Course created");
    Ok(course)
}

/// Partial update; `description: Some(None)` clears the description
pub async fn update_course(
    rc: &RequestContext,
    id: i32,
    name: Option<&str>,
    description: Option<Option<String>>,
) -> ApiResult<Course> {
    rc.require_auth().await?;
    let name = name.map(course_name).transpose()?;

    let course = find_course(rc, id).await?;
    rc.require_ownership(course.user_id).await?;

    rc.store
        .update_course(id, UpdateCourse { name, description })
        .await?
        .ok_or_else(|| ApiError::NotFound(COURSE_NOT_FOUND.to_string()))
}

/// Deletes a course and its tasks
pub async fn delete_course(rc: &RequestContext, id: i32) -> ApiResult<Course> {
    rc.require_auth().await?;

    let course = find_course(rc, id).await?;
    rc.require_ownership(course.user_id).await?;

    let deleted = rc
        .store
        .delete_course(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(COURSE_NOT_FOUND.to_string()))?;

    tracing::debug!(course_id = id, "Course deleted");
    Ok(deleted)
}

pub(crate) async fn find_course(rc: &RequestContext, id: i32) -> ApiResult<Course> {
    rc.store
        .find_course(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(COURSE_NOT_FOUND.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tests::{anonymous, context, signed_in};

    #[tokio::test]
    async fn test_reads_require_login() {
        let rc = context();
        let err = list_courses(&rc).await.unwrap_err();
        assert_eq!(err.to_string(), "Not authenticated. Please login first.");

        assert!(get_course(&rc, 1).await.is_err());
        assert!(courses_by_user(&rc, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_create_attaches_owner() {
        let rc = context();
        let (alice, alice_id) = signed_in(&rc, "alice@example.com").await;

        let course = create_course(&alice, " Math ", None).await.unwrap();
        assert_eq!(course.user_id, alice_id);
        assert_eq!(course.name, "Math");
        assert!(course.description.is_none());
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let rc = context();
        let (alice, _) = signed_in(&rc, "alice@example.com").await;

        let err = create_course(&alice, "  ", None).await.unwrap_err();
        assert_eq!(err.to_string(), NAME_REQUIRED);
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_any_user_can_read() {
        let rc = context();
        let (alice, alice_id) = signed_in(&rc, "alice@example.com").await;
        let (bob, _) = signed_in(&rc, "bob@example.com").await;

        let course = create_course(&alice, "Math", None).await.unwrap();

        assert_eq!(get_course(&bob, course.id).await.unwrap(), Some(course.clone()));
        assert_eq!(list_courses(&bob).await.unwrap(), vec![course.clone()]);
        assert_eq!(courses_by_user(&bob, alice_id).await.unwrap(), vec![course]);
        assert!(get_course(&bob, 999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_update() {
        let rc = context();
        let (alice, _) = signed_in(&rc, "alice@example.com").await;
        let course = create_course(&alice, "Math", Some("Algebra".to_string()))
            .await
            .unwrap();

        let renamed = update_course(&alice, course.id, Some("Maths"), None)
            .await
            .unwrap();
        assert_eq!(renamed.name, "Maths");
        assert_eq!(renamed.description.as_deref(), Some("Algebra"));

        let cleared = update_course(&alice, course.id, None, Some(None)).await.unwrap();
        assert_eq!(cleared.name, "Maths");
        assert!(cleared.description.is_none());
    }

    #[tokio::test]
    async fn test_not_found_before_not_authorized() {
        let rc = context();
        let (alice, _) = signed_in(&rc, "alice@example.com").await;
        let (bob, _) = signed_in(&rc, "bob@example.com").await;
        let course = create_course(&alice, "Math", None).await.unwrap();

        let err = update_course(&bob, 999, Some("X"), None).await.unwrap_err();
        assert_eq!(err.to_string(), COURSE_NOT_FOUND);

        let err = update_course(&bob, course.id, Some("X"), None).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Not authorized. You don't have permission to access this resource."
        );

        let err = delete_course(&bob, course.id).await.unwrap_err();
        assert_eq!(err.code(), "AUTH_ERROR");

        let err = delete_course(&anonymous(&rc), course.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Not authenticated. Please login first.");
    }

    #[tokio::test]
    async fn test_delete_course() {
        let rc = context();
        let (alice, _) = signed_in(&rc, "alice@example.com").await;
        let course = create_course(&alice, "Math", None).await.unwrap();

        let deleted = delete_course(&alice, course.id).await.unwrap();
        assert_eq!(deleted.id, course.id);

        let err = delete_course(&alice, course.id).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
