/// Task operations
///
/// A task always belongs to its course's owner: creating one requires owning
/// the course, and the new task's `user_id` is copied from the course.
///
/// Deadlines are accepted as:
///
/// | Input                      | Meaning            |
/// |----------------------------|--------------------|
/// | `2025-03-01T12:00:00+02:00`| RFC 3339           |
/// | `2025-03-01T12:00:00`      | UTC                |
/// | `2025-03-01T12:00`         | UTC                |
/// | `2025-03-01`               | midnight UTC       |

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use coursetrack_shared::models::task::{CreateTask, Task, TaskFilter, UpdateTask};

use super::courses::find_course;
use crate::error::{ApiError, ApiResult};
use crate::graphql::context::RequestContext;

pub const TASK_NOT_FOUND: &str = "Task not found";
const TITLE_REQUIRED: &str = "Task title is required";
const INVALID_DEADLINE: &str = "Invalid deadline format";

const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses a client-supplied deadline
pub fn parse_deadline(input: &str) -> ApiResult<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ApiError::validation("deadline", INVALID_DEADLINE))
}

fn task_title(title: &str) -> ApiResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::validation("title", TITLE_REQUIRED));
    }
    Ok(title.to_string())
}

async fn list(rc: &RequestContext, filter: TaskFilter) -> ApiResult<Vec<Task>> {
    rc.require_auth().await?;
    Ok(rc.store.list_tasks(filter).await?)
}

pub async fn list_tasks(rc: &RequestContext) -> ApiResult<Vec<Task>> {
    list(rc, TaskFilter::all()).await
}

pub async fn tasks_by_course(rc: &RequestContext, course_id: i32) -> ApiResult<Vec<Task>> {
    list(rc, TaskFilter::by_course(course_id)).await
}

pub async fn tasks_by_user(rc: &RequestContext, user_id: i32) -> ApiResult<Vec<Task>> {
    list(rc, TaskFilter::by_user(user_id)).await
}

pub async fn completed_tasks(rc: &RequestContext, user_id: i32) -> ApiResult<Vec<Task>> {
    list(rc, TaskFilter::completed_for(user_id)).await
}

pub async fn pending_tasks(rc: &RequestContext, user_id: i32) -> ApiResult<Vec<Task>> {
    list(rc, TaskFilter::pending_for(user_id)).await
}

pub async fn get_task(rc: &RequestContext, id: i32) -> ApiResult<Option<Task>> {
    rc.require_auth().await?;
    Ok(rc.store.find_task(id).await?)
}

/// Creates a task under a course the caller owns
pub async fn create_task(
    rc: &RequestContext,
    title: &str,
    deadline: &str,
    course_id: i32,
    completed: Option<bool>,
) -> ApiResult<Task> {
    rc.require_auth().await?;
    let title = task_title(title)?;
    let deadline = parse_deadline(deadline)?;

    let course = find_course(rc, course_id).await?;
    let owner_id = rc.require_ownership(course.user_id).await?;

    let task = rc
        .store
        .create_task(CreateTask {
            title,
            deadline,
            completed: completed.unwrap_or(false),
            course_id: course.id,
            user_id: owner_id,
        })
        .await?;

    tracing::debug!(task_id = task.id, course_id, "Task created");
    Ok(task)
}

pub async fn update_task(
    rc: &RequestContext,
    id: i32,
    title: Option<&str>,
    deadline: Option<&str>,
    completed: Option<bool>,
) -> ApiResult<Task> {
    rc.require_auth().await?;
    let title = title.map(task_title).transpose()?;
    let deadline = deadline.map(parse_deadline).transpose()?;

    let task = find_task(rc, id).await?;
    rc.require_ownership(task.user_id).await?;

    rc.store
        .update_task(
            id,
            UpdateTask {
                title,
                deadline,
                completed,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound(TASK_NOT_FOUND.to_string()))
}

/// Flips `completed` in a single store operation
pub async fn toggle_task_completion(rc: &RequestContext, id: i32) -> ApiResult<Task> {
    rc.require_auth().await?;

    let task = find_task(rc, id).await?;
    rc.require_ownership(task.user_id).await?;

    rc.store
        .toggle_task(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(TASK_NOT_FOUND.to_string()))
}

pub async fn delete_task(rc: &RequestContext, id: i32) -> ApiResult<Task> {
    rc.require_auth().await?;

    let task = find_task(rc, id).await?;
    rc.require_ownership(task.user_id).await?;

    let deleted = rc
        .store
        .delete_task(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(TASK_NOT_FOUND.to_string()))?;

    tracing::debug!(task_id = id, "Task deleted");
    Ok(deleted)
}

async fn find_task(rc: &RequestContext, id: i32) -> ApiResult<Task> {
    rc.store
        .find_task(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(TASK_NOT_FOUND.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::services::courses::{create_course, delete_course};
    use crate::services::tests::{context, signed_in};

    #[test]
    fn test_parse_deadline_formats() {
        let noon = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

        assert_eq!(parse_deadline("2025-03-01T12:00:00Z").unwrap(), noon);
        assert_eq!(parse_deadline("2025-03-01T14:00:00+02:00").unwrap(), noon);
        assert_eq!(parse_deadline("2025-03-01T12:00:00").unwrap(), noon);
        assert_eq!(parse_deadline("2025-03-01T12:00").unwrap(), noon);
        assert_eq!(
            parse_deadline("2025-03-01").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_deadline_rejects_garbage() {
        for input in ["", "tomorrow", "2025-13-01", "01/03/2025"] {
            let err = parse_deadline(input).unwrap_err();
            assert_eq!(err.to_string(), INVALID_DEADLINE, "input {:?}", input);
        }
    }

    #[tokio::test]
    async fn test_task_owner_is_course_owner() {
        let rc = context();
        let (alice, alice_id) = signed_in(&rc, "alice@example.com").await;
        let course = create_course(&alice, "Math", None).await.unwrap();

        let task = create_task(&alice, "Homework", "2025-03-01", course.id, None)
            .await
            .unwrap();
        assert_eq!(task.user_id, alice_id);
        assert_eq!(task.course_id, course.id);
        assert!(!task.completed);
    }

    #[tokio::test]
    async fn test_create_under_foreign_course() {
        let rc = context();
        let (alice, _) = signed_in(&rc, "alice@example.com").await;
        let (bob, _) = signed_in(&rc, "bob@example.com").await;
        let course = create_course(&alice, "Math", None).await.unwrap();

        let err = create_task(&bob, "Sneaky", "2025-03-01", course.id, None)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Not authorized. You don't have permission to access this resource."
        );

        let err = create_task(&bob, "Lost", "2025-03-01", 999, None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Course not found");
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let rc = context();
        let (alice, _) = signed_in(&rc, "alice@example.com").await;
        let course = create_course(&alice, "Math", None).await.unwrap();

        let err = create_task(&alice, " ", "2025-03-01", course.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), TITLE_REQUIRED);

        let err = create_task(&alice, "Homework", "soon", course.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), INVALID_DEADLINE);
    }

    #[tokio::test]
    async fn test_filtered_lists() {
        let rc = context();
        let (alice, alice_id) = signed_in(&rc, "alice@example.com").await;
        let (bob, _) = signed_in(&rc, "bob@example.com").await;
        let course = create_course(&alice, "Math", None).await.unwrap();

        let done = create_task(&alice, "Done", "2025-03-01", course.id, Some(true))
            .await
            .unwrap();
        let open = create_task(&alice, "Open", "2025-03-02", course.id, None)
            .await
            .unwrap();

        assert_eq!(list_tasks(&bob).await.unwrap().len(), 2);
        assert_eq!(tasks_by_course(&bob, course.id).await.unwrap().len(), 2);
        assert_eq!(tasks_by_user(&bob, alice_id).await.unwrap().len(), 2);
        assert_eq!(completed_tasks(&bob, alice_id).await.unwrap(), vec![done]);
        assert_eq!(pending_tasks(&bob, alice_id).await.unwrap(), vec![open.clone()]);
        assert_eq!(get_task(&bob, open.id).await.unwrap(), Some(open));
    }

    #[tokio::test]
    async fn test_update_and_toggle() {
        let rc = context();
        let (alice, _) = signed_in(&rc, "alice@example.com").await;
        let (bob, _) = signed_in(&rc, "bob@example.com").await;
        let course = create_course(&alice, "Math", None).await.unwrap();
        let task = create_task(&alice, "Homework", "2025-03-01", course.id, None)
            .await
            .unwrap();

        let updated = update_task(&alice, task.id, Some("Essay"), None, None)
            .await
            .unwrap();
        assert_eq!(updated.title, "Essay");
        assert_eq!(updated.deadline, task.deadline);

        let toggled = toggle_task_completion(&alice, task.id).await.unwrap();
        assert!(toggled.completed);
        let toggled = toggle_task_completion(&alice, task.id).await.unwrap();
        assert!(!toggled.completed);

        let err = toggle_task_completion(&bob, task.id).await.unwrap_err();
        assert_eq!(err.code(), "AUTH_ERROR");

        let err = update_task(&bob, 999, Some("X"), None, None).await.unwrap_err();
        assert_eq!(err.to_string(), TASK_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_course_delete_removes_tasks() {
        let rc = context();
        let (alice, _) = signed_in(&rc, "alice@example.com").await;
        let course = create_course(&alice, "Math", None).await.unwrap();
        let task = create_task(&alice, "Homework", "2025-03-01", course.id, None)
            .await
            .unwrap();

        delete_course(&alice, course.id).await.unwrap();

        let err = delete_task(&alice, task.id).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(list_tasks(&alice).await.unwrap().is_empty());
    }
}
