//! Remote store client: stateless wire codec plus the four async operations.
//!
//! # Design
//! `StoreClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`, keeping the codec deterministic and free of I/O.
//! `RemoteStore` pairs the codec with a [`Transport`] to execute the
//! round-trips; it never retries and never recovers an error.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::{CreateAck, Todo, TodoDraft, TodoId, TodoRecord};

/// Stateless codec for the keyed-document todo collection.
///
/// The store exposes the collection as a single JSON document: a mapping
/// from assigned keys to record bodies. Records carry no id of their own;
/// `parse_list` synthesizes each `Todo`'s id from its mapping key.
#[derive(Debug, Clone)]
pub struct StoreClient {
    base_url: String,
}

impl StoreClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/todos.json", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create(&self, draft: &TodoDraft) -> Result<HttpRequest, TransportError> {
        let body = serde_json::to_string(&draft.record())
            .map_err(|e| TransportError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/todos.json", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_update(&self, todo: &Todo) -> Result<HttpRequest, TransportError> {
        let body = serde_json::to_string(&todo.record())
            .map_err(|e| TransportError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: format!("{}/todos/{}.json", self.base_url, todo.id),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_delete(&self, id: &TodoId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/todos/{id}.json", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Parse the collection document into todos ordered by mapping key.
    ///
    /// An empty collection comes back as JSON `null`, not `{}`; both parse
    /// to the empty list. Keys are time-ordered on the store side, so key
    /// order is creation order.
    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<Todo>, TransportError> {
        check_status(&response)?;
        let mapping: Option<BTreeMap<String, TodoRecord>> =
            serde_json::from_str(&response.body)
                .map_err(|e| TransportError::Deserialization(e.to_string()))?;
        Ok(mapping
            .unwrap_or_default()
            .into_iter()
            .map(|(key, record)| Todo::from_record(key, record))
            .collect())
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<CreateAck, TransportError> {
        check_status(&response)?;
        serde_json::from_str(&response.body)
            .map_err(|e| TransportError::Deserialization(e.to_string()))
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<(), TransportError> {
        // The store echoes the stored record; the refetch is what feeds the
        // cache, so the echo is ignored.
        check_status(&response)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), TransportError> {
        check_status(&response)
    }
}

/// Map non-2xx status codes to `TransportError::Http`.
fn check_status(response: &HttpResponse) -> Result<(), TransportError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    Err(TransportError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}

/// The four operations of the remote store, executed over a [`Transport`].
#[derive(Debug, Clone)]
pub struct RemoteStore<T> {
    client: StoreClient,
    transport: T,
}

impl<T: Transport> RemoteStore<T> {
    pub fn new(client: StoreClient, transport: T) -> Self {
        Self { client, transport }
    }

    /// Fetch every record in the collection.
    pub async fn list(&self) -> Result<Vec<Todo>, TransportError> {
        debug!("listing todos");
        let response = self.transport.execute(self.client.build_list()).await?;
        self.client.parse_list(response)
    }

    /// Submit a new record; the store assigns its key.
    pub async fn create(&self, draft: &TodoDraft) -> Result<CreateAck, TransportError> {
        debug!(title = %draft.title, "creating todo");
        let request = self.client.build_create(draft)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_create(response)
    }

    /// Replace the full record stored under `todo.id`.
    pub async fn update(&self, todo: &Todo) -> Result<(), TransportError> {
        debug!(id = %todo.id, "updating todo");
        let request = self.client.build_update(todo)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_update(response)
    }

    /// Remove the record at `id`. The store treats an absent key as success.
    pub async fn delete(&self, id: &TodoId) -> Result<(), TransportError> {
        debug!(%id, "deleting todo");
        let response = self.transport.execute(self.client.build_delete(id)).await?;
        self.client.parse_delete(response)
    }
}
