/// Course model and database operations
///
/// A course belongs to exactly one user (`user_id`, immutable after creation)
/// and owns zero or more tasks. Deleting a course cascades to its tasks.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE courses (
///     id SERIAL PRIMARY KEY,
///     name TEXT NOT NULL,
///     description TEXT,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Course owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    pub id: i32,

    pub name: String,

    pub description: Option<String>,

    /// Owner of the course
    pub user_id: i32,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourse {
    pub name: String,
    pub description: Option<String>,
    pub user_id: i32,
}

/// Input for updating a course
///
/// `description` uses `Some(None)` to clear the stored value; `None` leaves
/// it untouched. The owner cannot be changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourse {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl UpdateCourse {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    pub fn apply_to(self, course: &mut Course) {
        if let Some(name) = self.name {
            course.name = name;
        }
        if let Some(description) = self.description {
            course.description = description;
        }
    }
}

const COURSE_COLUMNS: &str = "id, name, description, user_id, created_at";

impl Course {
    /// Inserts a new course
    ///
    /// # Errors
    ///
    /// Fails with a foreign key violation if `user_id` does not exist.
    pub async fn create(pool: &PgPool, data: CreateCourse) -> Result<Self, sqlx::Error> {
        let course = sqlx::query_as::<_, Course>(&format!(
            r#"
            INSERT INTO courses (name, description, user_id)
            VALUES ($1, $2, $3)
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(data.name)
        .bind(data.description)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        Ok(course)
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(course)
    }

    /// Lists every course in creation order
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(pool)
        .await?;

        Ok(courses)
    }

    /// Lists the courses owned by `user_id` in creation order
    pub async fn list_by_user(pool: &PgPool, user_id: i32) -> Result<Vec<Self>, sqlx::Error> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            r#"
            SELECT {COURSE_COLUMNS}
            FROM courses
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(courses)
    }

    /// Updates the present fields of a course
    ///
    /// # Returns
    ///
    /// The updated course, or None if it doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: i32,
        data: UpdateCourse,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE courses SET ");
        let mut assignments = builder.separated(", ");

        if let Some(name) = data.name {
            assignments.push("name = ").push_bind_unseparated(name);
        }
        if let Some(description) = data.description {
            assignments.push("description = ").push_bind_unseparated(description);
        }

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(format!(" RETURNING {COURSE_COLUMNS}"));

        let course = builder
            .build_query_as::<Course>()
            .fetch_optional(pool)
            .await?;

        Ok(course)
    }

    /// Deletes a course; its tasks go with it via `ON DELETE CASCADE`
    pub async fn delete(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "DELETE FROM courses WHERE id = $1 RETURNING {COURSE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(course)
    }
}
