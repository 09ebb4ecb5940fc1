/// Server-side sessions
///
/// A session is an opaque random token mapped to a [`SessionRecord`] in a
/// [`SessionStore`]. The browser only ever holds `token.signature`, where the
/// signature is HMAC-SHA256 of the token under the server secret; a cookie
/// whose signature does not verify is treated as no session at all.
///
/// Stores never see raw tokens. Records are keyed by `sess:{sha256(token)}`,
/// so a leaked store dump can't be replayed as cookies.
///
/// ```text
/// login ──> SessionManager::establish ──> SessionStore::save (awaited)
///                                     └─> Set-Cookie: sid=token.sig
///
/// request ──> Cookie: sid=token.sig ──> verify sig ──> SessionStore::load
/// ```
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use coursetrack_shared::auth::session::{MemorySessionStore, SessionManager};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = SessionManager::new(
///     Arc::new(MemorySessionStore::new()),
///     "0123456789abcdef0123456789abcdef",
///     Duration::from_secs(3600),
/// )?;
///
/// let (session, cookie) = manager.establish(42).await?;
/// let resolved = manager.resolve(Some(&cookie)).await?.expect("session");
/// assert_eq!(resolved.user_id(), 42);
///
/// manager.destroy(&session).await?;
/// assert!(manager.resolve(Some(&cookie)).await?.is_none());
/// # Ok(())
/// # }
/// ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::redis::{RedisClient, RedisClientError};

type HmacSha256 = Hmac<Sha256>;

/// Length of a session token in characters
pub const TOKEN_LENGTH: usize = 32;

/// Minimum length of the cookie signing secret in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

const KEY_PREFIX: &str = "sess:";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session secret must be at least {MIN_SECRET_LENGTH} bytes")]
    InvalidSecret,

    #[error("Session store error: {0}")]
    Store(#[from] RedisClientError),

    /// A stored record could not be decoded
    #[error("Corrupt session record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// What the store keeps per session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: i32,

    /// Issue time
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(user_id: i32) -> Self {
        Self {
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// A session resolved for the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    record: SessionRecord,
}

impl Session {
    pub fn user_id(&self) -> i32 {
        self.record.user_id
    }

    /// When the session was issued
    pub fn created_at(&self) -> DateTime<Utc> {
        self.record.created_at
    }
}

/// Key-value persistence for session records
///
/// Implementations receive the already-hashed storage key, never the raw
/// token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<SessionRecord>, SessionError>;

    /// Writes `record` under `key`, expiring after `ttl`
    async fn save(&self, key: &str, record: &SessionRecord, ttl: Duration)
        -> Result<(), SessionError>;

    /// Removes `key`; removing a missing key is not an error
    async fn destroy(&self, key: &str) -> Result<(), SessionError>;
}

/// Redis-backed sessions, `SET key json EX ttl`
#[derive(Debug, Clone)]
pub struct RedisSessionStore {
    client: RedisClient,
}

impl RedisSessionStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, key: &str) -> Result<Option<SessionRecord>, SessionError> {
        let mut conn = self.client.get_connection();
        let value: Option<String> = self
            .client
            .with_timeout(async move {
                redis::cmd("GET").arg(key).query_async(&mut conn).await
            })
            .await?;

        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        key: &str,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionError> {
        let value = serde_json::to_string(record)?;
        let seconds = ttl.as_secs().max(1);
        let mut conn = self.client.get_connection();

        self.client
            .with_timeout(async move {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("EX")
                    .arg(seconds)
                    .query_async::<_, ()>(&mut conn)
                    .await
            })
            .await?;

        tracing::trace!(ttl = seconds, "Session saved");
        Ok(())
    }

    async fn destroy(&self, key: &str) -> Result<(), SessionError> {
        let mut conn = self.client.get_connection();
        let deleted: u32 = self
            .client
            .with_timeout(async move { redis::cmd("DEL").arg(key).query_async(&mut conn).await })
            .await?;

        tracing::trace!(deleted, "Session destroyed");
        Ok(())
    }
}

/// In-process sessions with lazy expiry
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, (SessionRecord, Instant)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) sessions
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        entries.values().filter(|(_, expires)| *expires > now).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, key: &str) -> Result<Option<SessionRecord>, SessionError> {
        let mut entries = self.entries.lock().await;

        match entries.get(key) {
            Some((record, expires)) => {
                if *expires > Instant::now() {
                    return Ok(Some(record.clone()));
                }
            }
            None => return Ok(None),
        }

        // expired
        entries.remove(key);
        Ok(None)
    }

    async fn save(
        &self,
        key: &str,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionError> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), (record.clone(), Instant::now() + ttl));
        Ok(())
    }

    async fn destroy(&self, key: &str) -> Result<(), SessionError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// Issues, resolves and destroys sessions on top of a [`SessionStore`]
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    secret: Arc<Vec<u8>>,
    ttl: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// # Errors
    ///
    /// `SessionError::InvalidSecret` if `secret` is shorter than
    /// [`MIN_SECRET_LENGTH`] bytes
    pub fn new(
        store: Arc<dyn SessionStore>,
        secret: impl AsRef<[u8]>,
        ttl: Duration,
    ) -> Result<Self, SessionError> {
        let secret = secret.as_ref();
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(SessionError::InvalidSecret);
        }

        Ok(Self {
            store,
            secret: Arc::new(secret.to_vec()),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Creates and persists a new session for `user_id`
    ///
    /// The store write completes before this returns.
    ///
    /// # Returns
    ///
    /// The session and the signed cookie value to hand to the client
    pub async fn establish(&self, user_id: i32) -> Result<(Session, String), SessionError> {
        let token = generate_token();
        let record = SessionRecord::new(user_id);

        self.store
            .save(&storage_key(&token), &record, self.ttl)
            .await?;

        let cookie = self.sign(&token)?;
        tracing::debug!(user_id, "Session established");

        Ok((Session { token, record }, cookie))
    }

    /// Resolves a cookie value into a live session
    ///
    /// Missing cookies, bad signatures and expired or unknown tokens all
    /// resolve to `Ok(None)`. Only store failures are errors.
    pub async fn resolve(&self, cookie: Option<&str>) -> Result<Option<Session>, SessionError> {
        let Some(token) = cookie.and_then(|value| self.verify(value)) else {
            return Ok(None);
        };

        let record = self.store.load(&storage_key(&token)).await?;
        Ok(record.map(|record| Session { token, record }))
    }

    pub async fn destroy(&self, session: &Session) -> Result<(), SessionError> {
        self.store.destroy(&storage_key(&session.token)).await?;
        tracing::debug!(user_id = session.user_id(), "Session destroyed");
        Ok(())
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| SessionError::InvalidSecret)
    }

    /// Produces the cookie value `token.hex(hmac)`
    pub fn sign(&self, token: &str) -> Result<String, SessionError> {
        let mut mac = self.mac()?;
        mac.update(token.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        Ok(format!("{token}.{signature}"))
    }

    /// Returns the token inside a cookie value if its signature verifies
    pub fn verify(&self, cookie: &str) -> Option<String> {
        let (token, signature) = cookie.rsplit_once('.')?;
        let signature = hex::decode(signature).ok()?;

        let mut mac = self.mac().ok()?;
        mac.update(token.as_bytes());
        mac.verify_slice(&signature).ok()?;

        Some(token.to_string())
    }
}

/// 32 random alphanumeric characters
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Store key for a token: `sess:` followed by the hex SHA-256 of the token
pub fn storage_key(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{KEY_PREFIX}{}", hex::encode(digest))
}
