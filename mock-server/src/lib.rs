//! In-memory stand-in for the remote JSON document store.
//!
//! Speaks the keyed-document dialect the client expects: the collection is
//! one JSON mapping at `/todos.json` (`null` when empty), creates return
//! the assigned key as `{"name": key}`, and records are addressed at
//! `/todos/{key}.json`. Assigned keys are time-ordered so key order is
//! creation order, like the real store's push ids.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TodoRecord {
    pub title: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub desc: String,
}

/// Acknowledgement for a create: the key assigned to the new record.
#[derive(Debug, Serialize, Deserialize)]
pub struct PushAck {
    pub name: String,
}

pub type Db = Arc<RwLock<HashMap<String, TodoRecord>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/todos.json", get(list_todos).post(create_todo))
        .route(
            "/todos/{key}",
            axum::routing::put(update_todo).delete(delete_todo),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_todos(State(db): State<Db>) -> Json<Option<HashMap<String, TodoRecord>>> {
    let todos = db.read().await;
    if todos.is_empty() {
        // An empty collection is reported as null, not {}.
        Json(None)
    } else {
        Json(Some(todos.clone()))
    }
}

async fn create_todo(State(db): State<Db>, Json(input): Json<TodoRecord>) -> Json<PushAck> {
    // v7 ids embed a timestamp, so assigned keys sort in creation order.
    let key = format!("-{}", Uuid::now_v7().simple());
    db.write().await.insert(key.clone(), input);
    Json(PushAck { name: key })
}

async fn update_todo(
    State(db): State<Db>,
    Path(key): Path<String>,
    Json(input): Json<TodoRecord>,
) -> Result<Json<TodoRecord>, StatusCode> {
    let key = key.strip_suffix(".json").ok_or(StatusCode::NOT_FOUND)?;
    let mut todos = db.write().await;
    match todos.get_mut(key) {
        Some(slot) => {
            *slot = input.clone();
            Ok(Json(input))
        }
        None => Err(StatusCode::NOT_FOUND),
    }
}

async fn delete_todo(
    State(db): State<Db>,
    Path(key): Path<String>,
) -> Result<Json<()>, StatusCode> {
    let key = key.strip_suffix(".json").ok_or(StatusCode::NOT_FOUND)?;
    // Removing an absent key still succeeds.
    db.write().await.remove(key);
    Ok(Json(()))
}
