/// Registration, login and logout
///
/// Login always issues a fresh session. A session presented with the login
/// request is destroyed first, so a token seen before authentication never
/// becomes an authenticated one.

use coursetrack_shared::auth::credentials::{normalize_email, Registration};
use coursetrack_shared::auth::password::{hash_password, verify_password};
use coursetrack_shared::models::user::{CreateUser, User};

use crate::error::{ApiError, ApiResult, EMAIL_TAKEN};
use crate::graphql::context::RequestContext;

pub const REGISTERED: &str = "User registered successfully";
pub const LOGGED_IN: &str = "Successful login";
pub const LOGGED_OUT: &str = "Logged out successfully";

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const LOGOUT_FAILED: &str = "Failed to logout";

/// Validates `input`, checks email uniqueness and stores the new account
///
/// Shared by `register` and `createUser`.
pub async fn create_account(rc: &RequestContext, input: Registration) -> ApiResult<User> {
    input.check()?;

    if rc.store.find_user_by_email(&input.email).await?.is_some() {
        tracing::debug!("Registration rejected, email already in use");
        return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let password_hash = hash_password(&input.password)?;

    // a concurrent registration can still win the race; the unique
    // constraint turns that into the same conflict
    let user = rc
        .store
        .create_user(CreateUser {
            email: input.email,
            password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
        })
        .await?;

    tracing::info!(user_id = user.id, "User registered");
    Ok(user)
}

pub async fn register(
    rc: &RequestContext,
    email: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
) -> ApiResult<&'static str> {
    create_account(rc, Registration::new(email, password, first_name, last_name)).await?;
    Ok(REGISTERED)
}

/// Verifies credentials and establishes a new session
///
/// # Returns
///
/// The signed cookie value for the new session
pub async fn login(rc: &RequestContext, email: &str, password: &str) -> ApiResult<String> {
    let email = normalize_email(email);

    let user = match rc.store.find_user_by_email(&email).await? {
        Some(user) => user,
        None => {
            tracing::warn!("Login failed: unknown email");
            return Err(ApiError::Auth(INVALID_CREDENTIALS.to_string()));
        }
    };

    if !verify_password(password, &user.password_hash)? {
        tracing::warn!(user_id = user.id, "Login failed: wrong password");
        return Err(ApiError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    if let Some(previous) = rc.take_session().await {
        if let Err(err) = rc.sessions.destroy(&previous).await {
            rc.replace_session(Some(previous)).await;
            return Err(err.into());
        }
    }

    let (session, cookie) = rc.sessions.establish(user.id).await?;
    rc.replace_session(Some(session)).await;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(cookie)
}

/// Destroys the current session, if any
pub async fn logout(rc: &RequestContext) -> ApiResult<&'static str> {
    let Some(session) = rc.take_session().await else {
        return Ok(LOGGED_OUT);
    };

    if let Err(err) = rc.sessions.destroy(&session).await {
        tracing::error!(error = %err, user_id = session.user_id(), "Logout failed");
        rc.replace_session(Some(session)).await;
        return Err(ApiError::Session(LOGOUT_FAILED.to_string()));
    }

    tracing::info!(
        user_id = session.user_id(),
        issued_at = %session.created_at(),
        "User logged out"
    );
    Ok(LOGGED_OUT)
}

/// The logged-in user, or `None` when anonymous or the account is gone
pub async fn me(rc: &RequestContext) -> ApiResult<Option<User>> {
    match rc.user_id().await {
        Some(user_id) => Ok(rc.store.find_user(user_id).await?),
        None => Ok(None),
    }
}
