/// GraphQL endpoint
///
/// ```text
/// POST /graphql
/// Cookie: sid=<token>.<signature>      (optional)
/// ```
///
/// The session cookie is resolved once per request, before execution. A bad
/// or stale cookie simply means "not logged in"; only a failure of the
/// session store itself aborts the request, with a single `SESSION_ERROR`.

use async_graphql::{ErrorExtensions, ServerError};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;

use crate::app::AppState;
use crate::error::ApiError;
use crate::graphql::RequestContext;

pub async fn graphql_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let cookie = jar
        .get(&state.cookies.name)
        .map(|cookie| cookie.value().to_string());

    let session = match state.sessions.resolve(cookie.as_deref()).await {
        Ok(session) => session,
        Err(err) => return session_failure(err.into()),
    };

    let context = RequestContext::new(
        state.store.clone(),
        state.sessions.clone(),
        state.cookies.clone(),
        session,
    );

    state
        .schema
        .execute(request.into_inner().data(context))
        .await
        .into()
}

fn session_failure(err: ApiError) -> GraphQLResponse {
    let extended = err.extend();
    let mut error = ServerError::new(extended.message, None);
    error.extensions = extended.extensions;

    async_graphql::Response::from_errors(vec![error]).into()
}
