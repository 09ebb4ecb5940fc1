//! Per-request state handed to every resolver.

use std::sync::Arc;

use coursetrack_shared::auth::authorization::{require_auth, require_ownership};
use coursetrack_shared::auth::session::{Session, SessionManager};
use coursetrack_shared::store::Store;
use tokio::sync::RwLock;

use crate::cookies::CookieSettings;
use crate::error::ApiResult;

/// What a resolver can see of the current request
///
/// `session` starts as whatever the request's cookie resolved to. Mutations
/// that log in or out replace it, so later fields of the same operation see
/// the new state.
pub struct RequestContext {
    pub store: Arc<dyn Store>,
    pub sessions: SessionManager,
    pub cookies: CookieSettings,
    session: RwLock<Option<Session>>,
}

impl RequestContext {
    pub fn new(
        store: Arc<dyn Store>,
        sessions: SessionManager,
        cookies: CookieSettings,
        session: Option<Session>,
    ) -> Self {
        Self {
            store,
            sessions,
            cookies,
            session: RwLock::new(session),
        }
    }

    pub async fn user_id(&self) -> Option<i32> {
        self.session.read().await.as_ref().map(Session::user_id)
    }

    /// Removes and returns the current session
    pub async fn take_session(&self) -> Option<Session> {
        self.session.write().await.take()
    }

    pub async fn replace_session(&self, session: Option<Session>) {
        *self.session.write().await = session;
    }

    pub async fn require_auth(&self) -> ApiResult<i32> {
        let session = self.session.read().await;
        Ok(require_auth(session.as_ref())?)
    }

    pub async fn require_ownership(&self, owner_id: i32) -> ApiResult<i32> {
        let session = self.session.read().await;
        Ok(require_ownership(session.as_ref(), owner_id)?)
    }
}
