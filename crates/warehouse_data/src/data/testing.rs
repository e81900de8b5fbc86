//! Scripted transport for executor and orchestrator tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::client::{ApiResponse, ApiTransport, TransportError};
use crate::shared::config::ApiConfig;
use crate::system::auth::SessionCredentials;

pub const TEST_BASE_URL: &str = "http://gateway.test/api";

pub fn test_config() -> ApiConfig {
    ApiConfig {
        base_url: TEST_BASE_URL.to_string(),
        odoo_base: "http://erp.test".to_string(),
        odoo_db: "warehouse".to_string(),
    }
}

pub fn signed_in() -> SessionCredentials {
    let credentials = SessionCredentials::in_memory();
    credentials.save_session_id("session-1", false);
    credentials
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Start(String),
    End(String),
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Value,
}

/// Handles of a held request
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[derive(Default)]
struct Inner {
    routes: Mutex<HashMap<String, Result<ApiResponse, TransportError>>>,
    gates: Mutex<HashMap<String, (Arc<Notify>, Arc<Notify>)>>,
    requests: Mutex<Vec<RecordedRequest>>,
    journal: Mutex<Vec<Event>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Answers by path relative to [`TEST_BASE_URL`]; unknown paths get
/// `200 {"success": true}`
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_json(&self, path: &str, body: Value) -> &Self {
        self.respond_status(path, 200, &body.to_string())
    }

    pub fn respond_status(&self, path: &str, status: u16, body: &str) -> &Self {
        self.inner.routes.lock().unwrap().insert(
            path.to_string(),
            Ok(ApiResponse {
                status,
                body: body.to_string(),
            }),
        );
        self
    }

    pub fn fail(&self, path: &str, message: &str) -> &Self {
        self.inner
            .routes
            .lock()
            .unwrap()
            .insert(path.to_string(), Err(TransportError(message.to_string())));
        self
    }

    /// Park requests to `path` until the returned gate is released
    pub fn hold(&self, path: &str) -> Gate {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        self.inner
            .gates
            .lock()
            .unwrap()
            .insert(path.to_string(), (entered.clone(), release.clone()));
        Gate { entered, release }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    pub fn journal(&self) -> Vec<Event> {
        self.inner.journal.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: &Value,
    ) -> Result<ApiResponse, TransportError> {
        let path = url
            .strip_prefix(TEST_BASE_URL)
            .unwrap_or(url)
            .trim_start_matches('/')
            .to_string();

        self.inner.requests.lock().unwrap().push(RecordedRequest {
            path: path.clone(),
            headers: headers.to_vec(),
            body: body.clone(),
        });
        self.inner.journal.lock().unwrap().push(Event::Start(path.clone()));
        let now = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let gate = self.inner.gates.lock().unwrap().get(&path).cloned();
        if let Some((entered, release)) = gate {
            entered.notify_one();
            release.notified().await;
        }
        // Let sibling requests of the same batch get dispatched
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }

        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.inner.journal.lock().unwrap().push(Event::End(path.clone()));

        self.inner
            .routes
            .lock()
            .unwrap()
            .get(&path)
            .cloned()
            .unwrap_or_else(|| {
                Ok(ApiResponse {
                    status: 200,
                    body: r#"{"success":true}"#.to_string(),
                })
            })
    }
}
