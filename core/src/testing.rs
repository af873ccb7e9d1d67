//! In-process fake of the remote store for unit tests.
//!
//! Serves the same keyed-document wire contract as the real store from an
//! in-memory map, with per-operation call counters, scriptable failures,
//! and an optional list latency so tests can observe in-flight windows.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::client::StoreClient;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::TodoRecord;

const BASE_URL: &str = "http://fake";

#[derive(Default)]
pub(crate) struct FakeStore {
    records: Mutex<BTreeMap<String, TodoRecord>>,
    next_key: AtomicUsize,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    fail_lists: AtomicBool,
    fail_creates: AtomicBool,
    fail_updates: AtomicBool,
    fail_delete_keys: Mutex<HashSet<String>>,
    list_delay: Mutex<Option<Duration>>,
}

impl FakeStore {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A codec addressing this fake.
    pub fn client() -> StoreClient {
        StoreClient::new(BASE_URL)
    }

    pub fn seed(&self, key: &str, title: &str, done: bool) {
        self.records.lock().unwrap().insert(
            key.to_string(),
            TodoRecord {
                title: title.to_string(),
                done,
                description: String::new(),
            },
        );
    }

    pub fn record(&self, key: &str) -> Option<TodoRecord> {
        self.records.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.records.lock().unwrap().keys().cloned().collect()
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_count(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Make every delete of `key` fail while other deletes succeed.
    pub fn fail_delete_of(&self, key: &str) {
        self.fail_delete_keys.lock().unwrap().insert(key.to_string());
    }

    pub fn set_list_delay(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = Some(delay);
    }

    async fn serve_list(&self) -> HttpResponse {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.list_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_lists.load(Ordering::SeqCst) {
            return failure();
        }
        let records = self.records.lock().unwrap();
        if records.is_empty() {
            // The real store reports an empty collection as null.
            return ok("null".to_string());
        }
        ok(serde_json::to_string(&*records).unwrap())
    }

    fn serve_create(&self, body: Option<String>) -> HttpResponse {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_creates.load(Ordering::SeqCst) {
            return failure();
        }
        let record: TodoRecord = serde_json::from_str(body.as_deref().unwrap_or("")).unwrap();
        let n = self.next_key.fetch_add(1, Ordering::SeqCst) + 1;
        let key = format!("-srv{n:04}");
        self.records.lock().unwrap().insert(key.clone(), record);
        ok(format!(r#"{{"name":"{key}"}}"#))
    }

    fn serve_update(&self, key: &str, body: Option<String>) -> HttpResponse {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return failure();
        }
        let record: TodoRecord = serde_json::from_str(body.as_deref().unwrap_or("")).unwrap();
        let mut records = self.records.lock().unwrap();
        match records.get_mut(key) {
            Some(slot) => {
                *slot = record.clone();
                ok(serde_json::to_string(&record).unwrap())
            }
            None => HttpResponse {
                status: 404,
                headers: Vec::new(),
                body: "unknown key".to_string(),
            },
        }
    }

    fn serve_delete(&self, key: &str) -> HttpResponse {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete_keys.lock().unwrap().contains(key) {
            return failure();
        }
        // Deleting an absent key still succeeds.
        self.records.lock().unwrap().remove(key);
        ok("null".to_string())
    }
}

fn ok(body: String) -> HttpResponse {
    HttpResponse {
        status: 200,
        headers: Vec::new(),
        body,
    }
}

fn failure() -> HttpResponse {
    HttpResponse {
        status: 500,
        headers: Vec::new(),
        body: "simulated failure".to_string(),
    }
}

fn item_key(path: &str) -> Option<&str> {
    path.strip_prefix("todos/")?.strip_suffix(".json")
}

#[async_trait]
impl Transport for FakeStore {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let path = request
            .path
            .strip_prefix("http://fake/")
            .unwrap_or(&request.path)
            .to_string();
        let response = match (request.method, path.as_str()) {
            (HttpMethod::Get, "todos.json") => self.serve_list().await,
            (HttpMethod::Post, "todos.json") => self.serve_create(request.body),
            (HttpMethod::Put, p) => match item_key(p) {
                Some(key) => self.serve_update(key, request.body),
                None => panic!("unexpected PUT path: {p}"),
            },
            (HttpMethod::Delete, p) => match item_key(p) {
                Some(key) => self.serve_delete(key),
                None => panic!("unexpected DELETE path: {p}"),
            },
            (method, p) => panic!("unexpected request: {method:?} {p}"),
        };
        Ok(response)
    }
}
