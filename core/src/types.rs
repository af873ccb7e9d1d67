//! Domain types for the todo store.
//!
//! # Design
//! The remote store keeps a mapping from opaque string keys to records; the
//! record body itself carries no id. `TodoRecord` is that wire shape, `Todo`
//! is the client-side view with the mapping key folded in as `TodoId`.
//! Drafts awaiting submission carry a `ProvisionalId` instead — a separate
//! type with no conversion to `TodoId`, so a record can only be addressed
//! for update/delete with a key the store has actually handed back.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authoritative identifier of a stored todo: the store-assigned mapping key.
///
/// Values only come into existence when a fetched record is paired with its
/// key, so holding a `TodoId` means the store has confirmed the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    pub(crate) fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client-local placeholder key for a draft that has not been stored yet.
///
/// Usable as a list key in a rendering layer; never sent to the store and
/// never accepted by mutation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProvisionalId(Uuid);

impl ProvisionalId {
    fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ProvisionalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A todo as seen by the client: a stored record plus its mapping key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub done: bool,
    pub description: String,
}

impl Todo {
    pub(crate) fn from_record(key: impl Into<String>, record: TodoRecord) -> Self {
        Self {
            id: TodoId::new(key),
            title: record.title,
            done: record.done,
            description: record.description,
        }
    }

    /// The full-record replace payload for this todo. The id stays out of
    /// the body: the store addresses the record by key, and the stored
    /// shape must remain exactly what `list` returns.
    pub fn record(&self) -> TodoRecord {
        TodoRecord {
            title: self.title.clone(),
            done: self.done,
            description: self.description.clone(),
        }
    }
}

/// Wire shape of a stored record. The description travels as `desc` and
/// defaults to empty when the store omits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRecord {
    pub title: String,
    #[serde(default)]
    pub done: bool,
    #[serde(rename = "desc", default)]
    pub description: String,
}

/// A new todo being composed locally, before any create call.
///
/// There is no `done` field: creation always submits an incomplete todo,
/// and completion only happens through an update on the stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    pub provisional_id: ProvisionalId,
    pub title: String,
    pub description: String,
}

impl TodoDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            provisional_id: ProvisionalId::random(),
            title: title.into(),
            description: String::new(),
        }
    }

    pub(crate) fn record(&self) -> TodoRecord {
        TodoRecord {
            title: self.title.clone(),
            done: false,
            description: self.description.clone(),
        }
    }
}

/// Raw acknowledgement for a create: the key the store assigned.
///
/// Deliberately not a `TodoId` — the authoritative record is only picked up
/// by the refetch that follows a successful create.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateAck {
    pub name: String,
}
