/// Task model and database operations
///
/// A task hangs off a course and carries a denormalized `user_id` equal to the
/// course owner at creation time. The owner equality is checked by the caller
/// before insert; the database only guarantees the foreign keys.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id SERIAL PRIMARY KEY,
///     title TEXT NOT NULL,
///     deadline TIMESTAMPTZ NOT NULL,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     course_id INTEGER NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use coursetrack_shared::models::task::{Task, CreateTask, TaskFilter};
/// use coursetrack_shared::db::pool::{create_pool, DatabaseConfig};
/// use chrono::Utc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     title: "Problem set 1".to_string(),
///     deadline: Utc::now(),
///     completed: false,
///     course_id: 1,
///     user_id: 1,
/// }).await?;
///
/// Task::toggle_completed(&pool, task.id).await?;
/// let pending = Task::list(&pool, TaskFilter::pending_for(1)).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Task attached to a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i32,

    pub title: String,

    /// When the task is due
    pub deadline: DateTime<Utc>,

    pub completed: bool,

    /// Parent course
    pub course_id: i32,

    /// Owner, equal to the parent course's owner
    pub user_id: i32,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub deadline: DateTime<Utc>,
    pub completed: bool,
    pub course_id: i32,
    pub user_id: i32,
}

/// Input for updating a task
///
/// Only `Some` fields are written. Course and owner are fixed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub completed: Option<bool>,
}

impl UpdateTask {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.deadline.is_none() && self.completed.is_none()
    }

    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

/// Conjunctive filter for task listings
///
/// An empty filter matches every task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub course_id: Option<i32>,
    pub user_id: Option<i32>,
    pub completed: Option<bool>,
}

impl TaskFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_course(course_id: i32) -> Self {
        Self {
            course_id: Some(course_id),
            ..Self::default()
        }
    }

    pub fn by_user(user_id: i32) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn completed_for(user_id: i32) -> Self {
        Self {
            user_id: Some(user_id),
            completed: Some(true),
            ..Self::default()
        }
    }

    pub fn pending_for(user_id: i32) -> Self {
        Self {
            user_id: Some(user_id),
            completed: Some(false),
            ..Self::default()
        }
    }

    /// Returns true if `task` satisfies every set criterion
    pub fn matches(&self, task: &Task) -> bool {
        self.course_id.map_or(true, |id| task.course_id == id)
            && self.user_id.map_or(true, |id| task.user_id == id)
            && self.completed.map_or(true, |c| task.completed == c)
    }
}

const TASK_COLUMNS: &str = "id, title, deadline, completed, course_id, user_id, created_at";

impl Task {
    /// Inserts a new task
    ///
    /// # Errors
    ///
    /// Fails with a foreign key violation if the course or user is missing.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (title, deadline, completed, course_id, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(data.title)
        .bind(data.deadline)
        .bind(data.completed)
        .bind(data.course_id)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists tasks matching `filter` in creation order
    pub async fn list(pool: &PgPool, filter: TaskFilter) -> Result<Vec<Self>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {TASK_COLUMNS} FROM tasks WHERE TRUE"));

        if let Some(course_id) = filter.course_id {
            builder.push(" AND course_id = ").push_bind(course_id);
        }
        if let Some(user_id) = filter.user_id {
            builder.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(completed) = filter.completed {
            builder.push(" AND completed = ").push_bind(completed);
        }
        builder.push(" ORDER BY created_at ASC, id ASC");

        let tasks = builder.build_query_as::<Task>().fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Updates the present fields of a task
    ///
    /// # Returns
    ///
    /// The updated task, or None if it doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: i32,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE tasks SET ");
        let mut assignments = builder.separated(", ");

        if let Some(title) = data.title {
            assignments.push("title = ").push_bind_unseparated(title);
        }
        if let Some(deadline) = data.deadline {
            assignments.push("deadline = ").push_bind_unseparated(deadline);
        }
        if let Some(completed) = data.completed {
            assignments.push("completed = ").push_bind_unseparated(completed);
        }

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(format!(" RETURNING {TASK_COLUMNS}"));

        let task = builder
            .build_query_as::<Task>()
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Flips `completed` in a single statement
    ///
    /// # Returns
    ///
    /// The updated task, or None if it doesn't exist
    pub async fn toggle_completed(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET completed = NOT completed
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    pub async fn delete(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "DELETE FROM tasks WHERE id = $1 RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }
}
