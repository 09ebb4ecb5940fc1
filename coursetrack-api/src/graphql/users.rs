//! `createUser`, `updateUser` and `deleteUser`.

use async_graphql::{Context, Object, Result, ResultExt};
use axum::http::header::SET_COOKIE;
use coursetrack_shared::auth::credentials::ProfileChanges;

use super::request_context;
use super::types::UserObject;
use crate::services::users;

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        first_name: String,
        last_name: String,
        email: String,
        password: String,
    ) -> Result<UserObject> {
        let rc = request_context(ctx)?;
        let user = users::create_user(rc, &first_name, &last_name, &email, &password)
            .await
            .extend()?;
        Ok(UserObject(user))
    }

    async fn update_user(
        &self,
        ctx: &Context<'_>,
        id: i32,
        first_name: Option<String>,
        last_name: Option<String>,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<UserObject> {
        let rc = request_context(ctx)?;
        let changes = ProfileChanges::new(
            email.as_deref(),
            password.as_deref(),
            first_name.as_deref(),
            last_name.as_deref(),
        );
        let user = users::update_user(rc, id, changes).await.extend()?;
        Ok(UserObject(user))
    }

    /// Deletes the caller's account and logs them out
    async fn delete_user(&self, ctx: &Context<'_>, id: i32) -> Result<UserObject> {
        let rc = request_context(ctx)?;
        let user = users::delete_user(rc, id).await.extend()?;
        ctx.append_http_header(SET_COOKIE, rc.cookies.clear());
        Ok(UserObject(user))
    }
}
