//! Task queries and mutations.

use async_graphql::{Context, Object, Result, ResultExt};
use coursetrack_shared::models::task::Task;

use super::request_context;
use super::types::TaskObject;
use crate::services::tasks;

fn objects(list: Vec<Task>) -> Vec<TaskObject> {
    list.into_iter().map(TaskObject).collect()
}

#[derive(Default)]
pub struct TaskQuery;

#[Object]
impl TaskQuery {
    async fn tasks(&self, ctx: &Context<'_>) -> Result<Vec<TaskObject>> {
        let rc = request_context(ctx)?;
        Ok(objects(tasks::list_tasks(rc).await.extend()?))
    }

    /// Null when no task has this id
    async fn task(&self, ctx: &Context<'_>, id: i32) -> Result<Option<TaskObject>> {
        let rc = request_context(ctx)?;
        let task = tasks::get_task(rc, id).await.extend()?;
        Ok(task.map(TaskObject))
    }

    async fn tasks_by_course(&self, ctx: &Context<'_>, course_id: i32) -> Result<Vec<TaskObject>> {
        let rc = request_context(ctx)?;
        Ok(objects(tasks::tasks_by_course(rc, course_id).await.extend()?))
    }

    async fn tasks_by_user(&self, ctx: &Context<'_>, user_id: i32) -> Result<Vec<TaskObject>> {
        let rc = request_context(ctx)?;
        Ok(objects(tasks::tasks_by_user(rc, user_id).await.extend()?))
    }

    async fn completed_tasks(&self, ctx: &Context<'_>, user_id: i32) -> Result<Vec<TaskObject>> {
        let rc = request_context(ctx)?;
        Ok(objects(tasks::completed_tasks(rc, user_id).await.extend()?))
    }

    async fn pending_tasks(&self, ctx: &Context<'_>, user_id: i32) -> Result<Vec<TaskObject>> {
        let rc = request_context(ctx)?;
        Ok(objects(tasks::pending_tasks(rc, user_id).await.extend()?))
    }
}

#[derive(Default)]
pub struct TaskMutation;

#[Object]
impl TaskMutation {
    /// `deadline` accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (UTC) or
    /// `YYYY-MM-DD`
    async fn create_task(
        &self,
        ctx: &Context<'_>,
        title: String,
        deadline: String,
        course_id: i32,
        completed: Option<bool>,
    ) -> Result<TaskObject> {
        let rc = request_context(ctx)?;
        let task = tasks::create_task(rc, &title, &deadline, course_id, completed)
            .await
            .extend()?;
        Ok(TaskObject(task))
    }

    async fn update_task(
        &self,
        ctx: &Context<'_>,
        id: i32,
        title: Option<String>,
        deadline: Option<String>,
        completed: Option<bool>,
    ) -> Result<TaskObject> {
        let rc = request_context(ctx)?;
        let task = tasks::update_task(rc, id, title.as_deref(), deadline.as_deref(), completed)
            .await
            .extend()?;
        Ok(TaskObject(task))
    }

    async fn toggle_task_completion(&self, ctx: &Context<'_>, id: i32) -> Result<TaskObject> {
        let rc = request_context(ctx)?;
        let task = tasks::toggle_task_completion(rc, id).await.extend()?;
        Ok(TaskObject(task))
    }

    async fn delete_task(&self, ctx: &Context<'_>, id: i32) -> Result<TaskObject> {
        let rc = request_context(ctx)?;
        let task = tasks::delete_task(rc, id).await.extend()?;
        Ok(TaskObject(task))
    }
}
