//! Client core for a remotely stored todo list.
//!
//! # Overview
//! The remote store is the single source of truth: a keyed JSON document
//! collection spoken to over HTTP. This crate layers three pieces on top of
//! it — a stateless wire codec plus the four store operations
//! ([`StoreClient`], [`RemoteStore`]), a process-wide synchronized cache of
//! the list ([`TodoCache`]), and the view-model that turns user intents
//! into store calls ([`TodoListModel`]).
//!
//! # Design
//! - No optimistic local patches: every acknowledged mutation invalidates
//!   the cached list and the UI only sees server truth after the refetch.
//! - At most one list fetch is in flight at a time; concurrent consumers
//!   share it, and invalidations during a fetch coalesce into one rerun.
//! - Transport is a trait seam ([`Transport`]); the codec never touches the
//!   network, so request building and response parsing test deterministically.
//! - Store-assigned keys ([`TodoId`]) and client-local draft keys
//!   ([`ProvisionalId`]) are distinct types: a record can only be mutated
//!   once a fetch has confirmed its authoritative key.

pub mod cache;
pub mod client;
pub mod error;
pub mod http;
pub mod model;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{ListState, TodoCache, CACHE_KEY};
pub use client::{RemoteStore, StoreClient};
pub use error::TransportError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use model::{has_completed, is_completed, RemoveOutcome, TodoListModel};
pub use transport::HttpTransport;
pub use types::{CreateAck, ProvisionalId, Todo, TodoDraft, TodoId, TodoRecord};
