//! PostgreSQL-backed [`Store`]; delegates to the model query functions.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{Store, StoreError};
use crate::db::pool::health_check;
use crate::models::course::{Course, CreateCourse, UpdateCourse};
use crate::models::task::{CreateTask, Task, TaskFilter, UpdateTask};
use crate::models::user::{CreateUser, UpdateUser, User};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(health_check(&self.pool).await?)
    }

    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn update_user(&self, id: i32, data: UpdateUser) -> Result<Option<User>, StoreError> {
        Ok(User::update(&self.pool, id, data).await?)
    }

    async fn delete_user(&self, id: i32) -> Result<Option<User>, StoreError> {
        Ok(User::delete(&self.pool, id).await?)
    }

    async fn create_course(&self, data: CreateCourse) -> Result<Course, StoreError> {
        Ok(Course::create(&self.pool, data).await?)
    }

    async fn find_course(&self, id: i32) -> Result<Option<Course>, StoreError> {
        Ok(Course::find_by_id(&self.pool, id).await?)
    }

    async fn list_courses(&self, owner: Option<i32>) -> Result<Vec<Course>, StoreError> {
        let courses = match owner {
            Some(user_id) => Course::list_by_user(&self.pool, user_id).await?,
            None => Course::list(&self.pool).await?,
        };
        Ok(courses)
    }

    async fn update_course(
        &self,
        id: i32,
        data: UpdateCourse,
    ) -> Result<Option<Course>, StoreError> {
        Ok(Course::update(&self.pool, id, data).await?)
    }

    async fn delete_course(&self, id: i32) -> Result<Option<Course>, StoreError> {
        Ok(Course::delete(&self.pool, id).await?)
    }

    async fn create_task(&self, data: CreateTask) -> Result<Task, StoreError> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_task(&self, id: i32) -> Result<Option<Task>, StoreError> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>, StoreError> {
        Ok(Task::list(&self.pool, filter).await?)
    }

    async fn update_task(&self, id: i32, data: UpdateTask) -> Result<Option<Task>, StoreError> {
        Ok(Task::update(&self.pool, id, data).await?)
    }

    async fn toggle_task(&self, id: i32) -> Result<Option<Task>, StoreError> {
        Ok(Task::toggle_completed(&self.pool, id).await?)
    }

    async fn delete_task(&self, id: i32) -> Result<Option<Task>, StoreError> {
        Ok(Task::delete(&self.pool, id).await?)
    }
}
