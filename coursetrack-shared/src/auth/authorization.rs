/// Authorization guard
///
/// Two checks cover every protected operation:
///
/// 1. [`require_auth`]: the request carries a live session
/// 2. [`require_ownership`]: the session's user owns the resource
///
/// Reads need only the first. Mutations of a course or task, creating a task
/// under a course, and updating or deleting a user record need both. There is
/// no admin override; a user only ever owns their own records.
///
/// # Example
///
/// ```
/// use coursetrack_shared::auth::authorization::{require_auth, require_ownership, AuthzError};
///
/// // No session on the request
/// assert_eq!(require_auth(None), Err(AuthzError::NotAuthenticated));
/// assert_eq!(require_ownership(None, 1), Err(AuthzError::NotAuthenticated));
/// ```

use super::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// No session, or the session carries no user
    #[error("Not authenticated. Please login first.")]
    NotAuthenticated,

    /// Authenticated, but the resource belongs to someone else
    #[error("Not authorized. You don't have permission to access this resource.")]
    NotAuthorized,
}

/// Returns the id of the authenticated user
///
/// # Errors
///
/// `AuthzError::NotAuthenticated` if `session` is `None`
pub fn require_auth(session: Option<&Session>) -> Result<i32, AuthzError> {
    session
        .map(Session::user_id)
        .ok_or(AuthzError::NotAuthenticated)
}

/// Checks that the authenticated user is `resource_owner_id`
///
/// Authentication is checked first, so an anonymous caller always gets
/// `NotAuthenticated` regardless of the owner.
///
/// # Returns
///
/// The authenticated user id
pub fn require_ownership(
    session: Option<&Session>,
    resource_owner_id: i32,
) -> Result<i32, AuthzError> {
    let user_id = require_auth(session)?;

    if user_id != resource_owner_id {
        tracing::debug!(user_id, resource_owner_id, "Ownership check failed");
        return Err(AuthzError::NotAuthorized);
    }

    Ok(user_id)
}
