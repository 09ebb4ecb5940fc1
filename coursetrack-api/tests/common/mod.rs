//! Common test utilities for integration tests
//!
//! Every `TestContext` gets its own in-memory store and session store, so
//! tests never share state and need no running services.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use coursetrack_api::app::{build_router, AppState};
use coursetrack_api::config::Config;
use coursetrack_shared::auth::session::{
    MemorySessionStore, SessionError, SessionRecord, SessionStore,
};
use coursetrack_shared::redis::RedisClientError;
use coursetrack_shared::store::MemoryStore;
use serde_json::{json, Value};
use tower::Service as _;

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";

/// In-memory session store that can be switched into an outage
#[derive(Default)]
pub struct TestSessions {
    inner: MemorySessionStore,
    fail_load: AtomicBool,
    fail_destroy: AtomicBool,
}

impl TestSessions {
    pub async fn is_empty(&self) -> bool {
        self.inner.is_empty().await
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn fail_destroys(&self, fail: bool) {
        self.fail_destroy.store(fail, Ordering::SeqCst);
    }

    fn unavailable() -> SessionError {
        SessionError::Store(RedisClientError::ConnectionError("connection refused".to_string()))
    }
}

#[async_trait]
impl SessionStore for TestSessions {
    async fn load(&self, key: &str) -> Result<Option<SessionRecord>, SessionError> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.load(key).await
    }

    async fn save(
        &self,
        key: &str,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionError> {
        self.inner.save(key, record, ttl).await
    }

    async fn destroy(&self, key: &str) -> Result<(), SessionError> {
        if self.fail_destroy.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.destroy(key).await
    }
}

/// Response to a GraphQL request
#[derive(Debug)]
pub struct GqlResponse {
    pub status: StatusCode,
    pub body: Value,
    /// Raw `Set-Cookie` headers
    pub set_cookies: Vec<String>,
}

impl GqlResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// Message of the first error, if any
    pub fn error_message(&self) -> Option<&str> {
        self.body["errors"][0]["message"].as_str()
    }

    pub fn error_code(&self) -> Option<&str> {
        self.body["errors"][0]["extensions"]["code"].as_str()
    }

    /// The session cookie as a `Cookie` header pair (`sid=...`)
    pub fn session_cookie(&self) -> Option<String> {
        self.set_cookies
            .iter()
            .filter_map(|cookie| cookie.split(';').next())
            .find(|pair| pair.starts_with("sid=") && pair.len() > "sid=".len())
            .map(str::to_string)
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub sessions: Arc<TestSessions>,
    pub app: axum::Router,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let sessions = Arc::new(TestSessions::default());

        let state = AppState::new(Config::for_memory(SECRET), store.clone(), sessions.clone())
            .expect("valid session secret");

        Self {
            store,
            sessions,
            app: build_router(state),
        }
    }

    /// POSTs a GraphQL operation, optionally with a `Cookie` header
    pub async fn graphql(&self, query: &str, variables: Value, cookie: Option<&str>) -> GqlResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = builder
            .body(Body::from(
                json!({ "query": query, "variables": variables }).to_string(),
            ))
            .unwrap();

        let response = self.app.clone().call(request).await.unwrap();

        let status = response.status();
        let set_cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap_or_else(|_| {
            panic!("non-JSON response: {}", String::from_utf8_lossy(&body))
        });

        GqlResponse {
            status,
            body,
            set_cookies,
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> GqlResponse {
        self.graphql(
            r#"mutation($email: String!, $password: String!) {
                register(email: $email, password: $password, firstName: "Test", lastName: "User")
            }"#,
            json!({ "email": email, "password": password }),
            None,
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> GqlResponse {
        self.graphql(
            r#"mutation($email: String!, $password: String!) {
                login(email: $email, password: $password)
            }"#,
            json!({ "email": email, "password": password }),
            None,
        )
        .await
    }

    /// Registers and logs in, returning the `Cookie` header value and user id
    pub async fn sign_up(&self, email: &str) -> (String, i64) {
        let response = self.register(email, "secret1").await;
        assert_eq!(response.error_message(), None, "register failed: {:?}", response.body);

        let response = self.login(email, "secret1").await;
        let cookie = response.session_cookie().expect("login sets a session cookie");

        let me = self.graphql("{ me { id } }", json!({}), Some(&cookie)).await;
        let user_id = me.data()["me"]["id"].as_i64().expect("logged in");

        (cookie, user_id)
    }

    pub async fn create_course(&self, cookie: &str, name: &str) -> GqlResponse {
        self.graphql(
            r#"mutation($name: String!) {
                createCourse(name: $name, description: "Intro") { id name description userId }
            }"#,
            json!({ "name": name }),
            Some(cookie),
        )
        .await
    }

    pub async fn create_task(&self, cookie: &str, course_id: i64, title: &str) -> GqlResponse {
        self.graphql(
            r#"mutation($courseId: Int!, $title: String!) {
                createTask(title: $title, deadline: "2025-03-01", courseId: $courseId) {
                    id title deadline completed courseId userId
                }
            }"#,
            json!({ "courseId": course_id, "title": title }),
            Some(cookie),
        )
        .await
    }
}
