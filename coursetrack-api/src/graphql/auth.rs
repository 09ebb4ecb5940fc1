//! `me`, `register`, `login` and `logout`.

use async_graphql::{Context, Object, Result, ResultExt};
use axum::http::header::SET_COOKIE;

use super::request_context;
use super::types::UserObject;
use crate::services::auth;

#[derive(Default)]
pub struct AuthQuery;

#[Object]
impl AuthQuery {
    /// The logged-in user, or null
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<UserObject>> {
        let rc = request_context(ctx)?;
        let user = auth::me(rc).await.extend()?;
        Ok(user.map(UserObject))
    }
}

#[derive(Default)]
pub struct AuthMutation;

#[Object]
impl AuthMutation {
    async fn register(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
        first_name: String,
        last_name: String,
    ) -> Result<String> {
        let rc = request_context(ctx)?;
        let message = auth::register(rc, &email, &password, &first_name, &last_name)
            .await
            .extend()?;
        Ok(message.to_string())
    }

    /// Starts a session and sets the session cookie
    async fn login(&self, ctx: &Context<'_>, email: String, password: String) -> Result<String> {
        let rc = request_context(ctx)?;
        let cookie = auth::login(rc, &email, &password).await.extend()?;
        ctx.append_http_header(SET_COOKIE, rc.cookies.set(&cookie));
        Ok(auth::LOGGED_IN.to_string())
    }

    /// Ends the session and clears the session cookie
    async fn logout(&self, ctx: &Context<'_>) -> Result<String> {
        let rc = request_context(ctx)?;
        let message = auth::logout(rc).await.extend()?;
        ctx.append_http_header(SET_COOKIE, rc.cookies.clear());
        Ok(message.to_string())
    }
}
