//! Course queries and mutations.

use async_graphql::{Context, MaybeUndefined, Object, Result, ResultExt};

use super::request_context;
use super::types::CourseObject;
use crate::services::courses;

#[derive(Default)]
pub struct CourseQuery;

#[Object]
impl CourseQuery {
    async fn courses(&self, ctx: &Context<'_>) -> Result<Vec<CourseObject>> {
        let rc = request_context(ctx)?;
        let list = courses::list_courses(rc).await.extend()?;
        Ok(list.into_iter().map(CourseObject).collect())
    }

    /// Null when no course has this id
    async fn course(&self, ctx: &Context<'_>, id: i32) -> Result<Option<CourseObject>> {
        let rc = request_context(ctx)?;
        let course = courses::get_course(rc, id).await.extend()?;
        Ok(course.map(CourseObject))
    }

    async fn courses_by_user(&self, ctx: &Context<'_>, user_id: i32) -> Result<Vec<CourseObject>> {
        let rc = request_context(ctx)?;
        let list = courses::courses_by_user(rc, user_id).await.extend()?;
        Ok(list.into_iter().map(CourseObject).collect())
    }
}

#[derive(Default)]
pub struct CourseMutation;

#[Object]
impl CourseMutation {
    async fn create_course(
        &self,
        ctx: &Context<'_>,
        name: String,
        description: Option<String>,
    ) -> Result<CourseObject> {
        let rc = request_context(ctx)?;
        let course = courses::create_course(rc, &name, description).await.extend()?;
        Ok(CourseObject(course))
    }

    /// Omitted arguments are left unchanged; `description: null` clears it
    async fn update_course(
        &self,
        ctx: &Context<'_>,
        id: i32,
        name: Option<String>,
        description: MaybeUndefined<String>,
    ) -> Result<CourseObject> {
        let rc = request_context(ctx)?;
        let description = match description {
            MaybeUndefined::Undefined => None,
            MaybeUndefined::Null => Some(None),
            MaybeUndefined::Value(value) => Some(Some(value)),
        };
        let course = courses::update_course(rc, id, name.as_deref(), description)
            .await
            .extend()?;
        Ok(CourseObject(course))
    }

    async fn delete_course(&self, ctx: &Context<'_>, id: i32) -> Result<CourseObject> {
        let rc = request_context(ctx)?;
        let course = courses::delete_course(rc, id).await.extend()?;
        Ok(CourseObject(course))
    }
}
