//! In-process [`Store`] for local development and tests.
//!
//! All state sits behind one `tokio::sync::Mutex`, so every operation
//! (including cascades) is atomic with respect to the others. Maps are keyed
//! by id and ids only grow, so iteration order is creation order.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{Store, StoreError};
use crate::models::course::{Course, CreateCourse, UpdateCourse};
use crate::models::task::{CreateTask, Task, TaskFilter, UpdateTask};
use crate::models::user::{CreateUser, UpdateUser, User};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    courses: BTreeMap<i32, Course>,
    tasks: BTreeMap<i32, Task>,
    last_user_id: i32,
    last_course_id: i32,
    last_task_id: i32,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

fn email_conflict() -> StoreError {
    StoreError::Conflict {
        constraint: "users_email_key".to_string(),
    }
}

fn missing(constraint: &str) -> StoreError {
    StoreError::MissingReference {
        constraint: constraint.to_string(),
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// (users, courses, tasks) currently stored
    pub async fn counts(&self) -> (usize, usize, usize) {
        let t = self.tables.lock().await;
        (t.users.len(), t.courses.len(), t.tasks.len())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError> {
        let mut t = self.tables.lock().await;
        if t.email_taken(&data.email, None) {
            return Err(email_conflict());
        }

        t.last_user_id += 1;
        let user = User {
            id: t.last_user_id,
            email: data.email,
            password_hash: data.password_hash,
            first_name: data.first_name,
            last_name: data.last_name,
            created_at: Utc::now(),
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>, StoreError> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let t = self.tables.lock().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, id: i32, data: UpdateUser) -> Result<Option<User>, StoreError> {
        let mut t = self.tables.lock().await;
        if let Some(email) = &data.email {
            if t.email_taken(email, Some(id)) {
                return Err(email_conflict());
            }
        }

        Ok(t.users.get_mut(&id).map(|user| {
            data.apply_to(user);
            user.clone()
        }))
    }

    async fn delete_user(&self, id: i32) -> Result<Option<User>, StoreError> {
        let mut t = self.tables.lock().await;
        let removed = t.users.remove(&id);
        if removed.is_some() {
            t.courses.retain(|_, c| c.user_id != id);
            t.tasks.retain(|_, task| task.user_id != id);
            // tasks whose course vanished with the owner
            let Tables { courses, tasks, .. } = &mut *t;
            tasks.retain(|_, task| courses.contains_key(&task.course_id));
        }
        Ok(removed)
    }

    async fn create_course(&self, data: CreateCourse) -> Result<Course, StoreError> {
        let mut t = self.tables.lock().await;
        if !t.users.contains_key(&data.user_id) {
            return Err(missing("courses_user_id_fkey"));
        }

        t.last_course_id += 1;
        let course = Course {
            id: t.last_course_id,
            name: data.name,
            description: data.description,
            user_id: data.user_id,
            created_at: Utc::now(),
        };
        t.courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn find_course(&self, id: i32) -> Result<Option<Course>, StoreError> {
        Ok(self.tables.lock().await.courses.get(&id).cloned())
    }

    async fn list_courses(&self, owner: Option<i32>) -> Result<Vec<Course>, StoreError> {
        let t = self.tables.lock().await;
        Ok(t.courses
            .values()
            .filter(|c| owner.map_or(true, |id| c.user_id == id))
            .cloned()
            .collect())
    }

    async fn update_course(
        &self,
        id: i32,
        data: UpdateCourse,
    ) -> Result<Option<Course>, StoreError> {
        let mut t = self.tables.lock().await;
        Ok(t.courses.get_mut(&id).map(|course| {
            data.apply_to(course);
            course.clone()
        }))
    }

    async fn delete_course(&self, id: i32) -> Result<Option<Course>, StoreError> {
        let mut t = self.tables.lock().await;
        let removed = t.courses.remove(&id);
        if removed.is_some() {
            t.tasks.retain(|_, task| task.course_id != id);
        }
        Ok(removed)
    }

    async fn create_task(&self, data: CreateTask) -> Result<Task, StoreError> {
        let mut t = self.tables.lock().await;
        if !t.courses.contains_key(&data.course_id) {
            return Err(missing("tasks_course_id_fkey"));
        }
        if !t.users.contains_key(&data.user_id) {
            return Err(missing("tasks_user_id_fkey"));
        }

        t.last_task_id += 1;
        let task = Task {
            id: t.last_task_id,
            title: data.title,
            deadline: data.deadline,
            completed: data.completed,
            course_id: data.course_id,
            user_id: data.user_id,
            created_at: Utc::now(),
        };
        t.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: i32) -> Result<Option<Task>, StoreError> {
        Ok(self.tables.lock().await.tasks.get(&id).cloned())
    }

    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>, StoreError> {
        let t = self.tables.lock().await;
        Ok(t.tasks
            .values()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect())
    }

    async fn update_task(&self, id: i32, data: UpdateTask) -> Result<Option<Task>, StoreError> {
        let mut t = self.tables.lock().await;
        Ok(t.tasks.get_mut(&id).map(|task| {
            data.apply_to(task);
            task.clone()
        }))
    }

    async fn toggle_task(&self, id: i32) -> Result<Option<Task>, StoreError> {
        let mut t = self.tables.lock().await;
        Ok(t.tasks.get_mut(&id).map(|task| {
            task.completed = !task.completed;
            task.clone()
        }))
    }

    async fn delete_task(&self, id: i32) -> Result<Option<Task>, StoreError> {
        Ok(self.tables.lock().await.tasks.remove(&id))
    }
}
