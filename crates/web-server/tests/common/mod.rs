//! Test doubles for `RecordStore` and helpers for driving the router.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use configuration::{ResourceSettings, ServerSettings};
use core_types::{NewRecord, Record};
use database::{DbError, RecordStore};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use web_server::{build_router, AppState};

/// Stands in for a table: ids come from a sequence, like `SERIAL`.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<BTreeMap<i32, Record>>,
    next_id: Mutex<i32>,
    pub calls: AtomicUsize,
}

impl MemoryStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Record>, DbError> {
        self.touch();
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Record>, DbError> {
        self.touch();
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, record: NewRecord) -> Result<Record, DbError> {
        self.touch();
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        let record = record.into_record(id);
        self.rows.lock().unwrap().insert(id, record.clone());
        Ok(record)
    }

    async fn update_by_id(&self, id: i32, record: NewRecord) -> Result<Option<Record>, DbError> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id) {
            Some(existing) => {
                *existing = record.into_record(id);
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_by_id(&self, id: i32) -> Result<bool, DbError> {
        self.touch();
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }
}

/// Every operation fails the way an exhausted pool does.
pub struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn list(&self) -> Result<Vec<Record>, DbError> {
        Err(DbError::PoolExhausted)
    }

    async fn get_by_id(&self, _id: i32) -> Result<Option<Record>, DbError> {
        Err(DbError::PoolExhausted)
    }

    async fn create(&self, _record: NewRecord) -> Result<Record, DbError> {
        Err(DbError::PoolExhausted)
    }

    async fn update_by_id(&self, _id: i32, _record: NewRecord) -> Result<Option<Record>, DbError> {
        Err(DbError::PoolExhausted)
    }

    async fn delete_by_id(&self, _id: i32) -> Result<bool, DbError> {
        Err(DbError::ConnectionConfigError(
            "postgres://postgres:hunter2@db:5432/moviesPoc".to_string(),
        ))
    }
}

/// Takes `delay` to create a record and notes when it has finished.
pub struct SlowStore {
    pub delay: Duration,
    pub finished: AtomicBool,
}

impl SlowStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            finished: AtomicBool::new(false),
        }
    }

    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for SlowStore {
    async fn list(&self) -> Result<Vec<Record>, DbError> {
        Ok(Vec::new())
    }

    async fn get_by_id(&self, _id: i32) -> Result<Option<Record>, DbError> {
        Ok(None)
    }

    async fn create(&self, record: NewRecord) -> Result<Record, DbError> {
        tokio::time::sleep(self.delay).await;
        self.finished.store(true, Ordering::SeqCst);
        Ok(record.into_record(1))
    }

    async fn update_by_id(&self, _id: i32, _record: NewRecord) -> Result<Option<Record>, DbError> {
        Ok(None)
    }

    async fn delete_by_id(&self, _id: i32) -> Result<bool, DbError> {
        Ok(false)
    }
}

/// Mounts each resource on its own store and returns the router.
pub fn app_with(resources: Vec<(ResourceSettings, Arc<dyn RecordStore>)>) -> Router {
    app_with_server(resources, &ServerSettings::default())
}

pub fn app_with_server(
    resources: Vec<(ResourceSettings, Arc<dyn RecordStore>)>,
    server: &ServerSettings,
) -> Router {
    let states = resources
        .into_iter()
        .map(|(resource, store)| {
            let state = Arc::new(AppState::new(&resource, store));
            (resource.path.clone(), state)
        })
        .collect();
    build_router(states, server)
}

pub fn movies_app(store: Arc<MemoryStore>) -> Router {
    app_with(vec![(ResourceSettings::movies(), store as Arc<dyn RecordStore>)])
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    send_request(app, request).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}
