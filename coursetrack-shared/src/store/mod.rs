/// Persistence boundary for users, courses and tasks
///
/// Resolvers talk to an `Arc<dyn Store>` and never to a pool directly, so the
/// same code runs against PostgreSQL in production and against the in-process
/// [`MemoryStore`] in development and tests.
///
/// Both backends honor the same contract:
///
/// - ids are assigned by the store and strictly increase
/// - `users.email` is unique; a duplicate is [`StoreError::Conflict`] and
///   leaves the store unchanged
/// - deleting a user removes their courses and tasks; deleting a course
///   removes its tasks
/// - listings come back in creation order
/// - [`Store::toggle_task`] flips `completed` atomically
/// - `find_*`, `update_*`, `delete_*` and `toggle_*` return `Ok(None)` for a
///   missing id

use async_trait::async_trait;
use thiserror::Error;

use crate::models::course::{Course, CreateCourse, UpdateCourse};
use crate::models::task::{CreateTask, Task, TaskFilter, UpdateTask};
use crate::models::user::{CreateUser, UpdateUser, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {constraint}")]
    Conflict { constraint: String },

    /// A referenced row does not exist
    #[error("Foreign key constraint violated: {constraint}")]
    MissingReference { constraint: String },

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default().to_string();

            if db_err.is_unique_violation() {
                return StoreError::Conflict { constraint };
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::MissingReference { constraint };
            }
        }
        StoreError::Database(err)
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for logs
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError>;

    async fn find_user(&self, id: i32) -> Result<Option<User>, StoreError>;

    /// Looks up by normalized email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn update_user(&self, id: i32, data: UpdateUser) -> Result<Option<User>, StoreError>;

    /// Deletes the user with everything they own
    async fn delete_user(&self, id: i32) -> Result<Option<User>, StoreError>;

    async fn create_course(&self, data: CreateCourse) -> Result<Course, StoreError>;

    async fn find_course(&self, id: i32) -> Result<Option<Course>, StoreError>;

    /// All courses, or only those owned by `owner`
    async fn list_courses(&self, owner: Option<i32>) -> Result<Vec<Course>, StoreError>;

    async fn update_course(
        &self,
        id: i32,
        data: UpdateCourse,
    ) -> Result<Option<Course>, StoreError>;

    /// Deletes the course and its tasks
    async fn delete_course(&self, id: i32) -> Result<Option<Course>, StoreError>;

    async fn create_task(&self, data: CreateTask) -> Result<Task, StoreError>;

    async fn find_task(&self, id: i32) -> Result<Option<Task>, StoreError>;

    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>, StoreError>;

    async fn update_task(&self, id: i32, data: UpdateTask) -> Result<Option<Task>, StoreError>;

    /// Flips `completed` in one step
    async fn toggle_task(&self, id: i32) -> Result<Option<Task>, StoreError>;

    async fn delete_task(&self, id: i32) -> Result<Option<Task>, StoreError>;
}
