//! Account management: `createUser`, `updateUser`, `deleteUser`.

use coursetrack_shared::auth::credentials::{ProfileChanges, Registration};
use coursetrack_shared::auth::password::hash_password;
use coursetrack_shared::models::user::{UpdateUser, User};

use super::auth::create_account;
use crate::error::{ApiError, ApiResult, EMAIL_TAKEN};
use crate::graphql::context::RequestContext;

const USER_NOT_FOUND: &str = "User not found";

/// Public account creation; returns the stored user
pub async fn create_user(
    rc: &RequestContext,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> ApiResult<User> {
    create_account(rc, Registration::new(email, password, first_name, last_name)).await
}

/// Applies `changes` to the caller's own account
pub async fn update_user(rc: &RequestContext, id: i32, changes: ProfileChanges) -> ApiResult<User> {
    rc.require_auth().await?;
    changes.check()?;

    let user = find_user(rc, id).await?;
    rc.require_ownership(user.id).await?;

    if let Some(email) = changes.email.as_deref() {
        if email != user.email && rc.store.find_user_by_email(email).await?.is_some() {
            return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
        }
    }

    let password_hash = match changes.password.as_deref() {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let update = UpdateUser {
        email: changes.email,
        password_hash,
        first_name: changes.first_name,
        last_name: changes.last_name,
    };

    let updated = rc
        .store
        .update_user(id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    tracing::info!(user_id = id, "User updated");
    Ok(updated)
}

/// Ends the caller's session, then deletes their account with its courses
/// and tasks
///
/// The session goes first: if the session store fails, nothing is deleted
/// and the caller stays logged in.
pub async fn delete_user(rc: &RequestContext, id: i32) -> ApiResult<User> {
    rc.require_auth().await?;

    let user = find_user(rc, id).await?;
    rc.require_ownership(user.id).await?;

    if let Some(session) = rc.take_session().await {
        if let Err(err) = rc.sessions.destroy(&session).await {
            tracing::error!(error = %err, user_id = id, "Account deletion aborted, session not ended");
            rc.replace_session(Some(session)).await;
            return Err(err.into());
        }
    }

    let deleted = rc
        .store
        .delete_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    tracing::info!(user_id = id, "User deleted");
    Ok(deleted)
}

async fn find_user(rc: &RequestContext, id: i32) -> ApiResult<User> {
    rc.store
        .find_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursetrack_shared::auth::password::verify_password;

    use std::sync::Arc;

    use crate::services::tests::{anonymous, context, context_with, signed_in, FlakySessions};

    fn changes(
        email: Option<&str>,
        password: Option<&str>,
        first_name: Option<&str>,
    ) -> ProfileChanges {
        ProfileChanges::new(email, password, first_name, None)
    }

    #[tokio::test]
    async fn test_create_user_returns_record() {
        let rc = context();
        let user = create_user(&rc, "Ada", "Lovelace", "Ada@Example.com", "secret1")
            .await
            .unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.first_name, "Ada");
        assert!(verify_password("secret1", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_update_own_account() {
        let rc = context();
        let (alice, alice_id) = signed_in(&rc, "alice@example.com").await;

        let user = update_user(&alice, alice_id, changes(None, Some("newpass"), Some(" Alicia ")))
            .await
            .unwrap();

        assert_eq!(user.first_name, "Alicia");
        assert_eq!(user.last_name, "User");
        assert!(verify_password("newpass", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_update_requires_ownership() {
        let rc = context();
        let (_, alice_id) = signed_in(&rc, "alice@example.com").await;
        let (bob, _) = signed_in(&rc, "bob@example.com").await;

        let err = update_user(&bob, alice_id, changes(None, None, Some("Mallory")))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "AUTH_ERROR");

        let err = update_user(&anonymous(&rc), alice_id, changes(None, None, Some("X")))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Not authenticated. Please login first.");
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let rc = context();
        let (alice, _) = signed_in(&rc, "alice@example.com").await;

        let err = update_user(&alice, 999, changes(None, None, Some("X")))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), USER_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_email_conflict() {
        let rc = context();
        let (alice, alice_id) = signed_in(&rc, "alice@example.com").await;
        signed_in(&rc, "bob@example.com").await;

        let err = update_user(&alice, alice_id, changes(Some("BOB@example.com"), None, None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CONFLICT");

        // keeping the same address is not a conflict
        update_user(&alice, alice_id, changes(Some("alice@example.com"), None, None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_validates_fields() {
        let rc = context();
        let (alice, alice_id) = signed_in(&rc, "alice@example.com").await;

        let err = update_user(&alice, alice_id, changes(Some("not-an-email"), None, None))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email format");

        let err = update_user(&alice, alice_id, changes(None, Some("123"), None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_delete_user_ends_session() {
        let rc = context();
        let (alice, alice_id) = signed_in(&rc, "alice@example.com").await;

        let deleted = delete_user(&alice, alice_id).await.unwrap();
        assert_eq!(deleted.id, alice_id);
        assert!(alice.user_id().await.is_none());
        assert!(rc.store.find_user(alice_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_other_user_denied() {
        let rc = context();
        let (_, alice_id) = signed_in(&rc, "alice@example.com").await;
        let (bob, _) = signed_in(&rc, "bob@example.com").await;

        let err = delete_user(&bob, alice_id).await.unwrap_err();
        assert_eq!(err.code(), "AUTH_ERROR");
        assert!(rc.store.find_user(alice_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_user_keeps_account_when_session_store_fails() {
        let sessions = Arc::new(FlakySessions::default());
        let rc = context_with(sessions.clone());
        let (alice, alice_id) = signed_in(&rc, "alice@example.com").await;

        sessions.fail_destroys(true);
        let err = delete_user(&alice, alice_id).await.unwrap_err();
        assert_eq!(err.code(), "SESSION_ERROR");
        assert!(rc.store.find_user(alice_id).await.unwrap().is_some());
        assert_eq!(alice.user_id().await, Some(alice_id));

        sessions.fail_destroys(false);
        delete_user(&alice, alice_id).await.unwrap();
        assert!(rc.store.find_user(alice_id).await.unwrap().is_none());
        assert!(alice.user_id().await.is_none());
    }
}
