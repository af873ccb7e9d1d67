//! List view-model: derived state and user intents over the cached list.
//!
//! # Design
//! Every intent reads the current snapshot and turns into plain store calls
//! through the cache; nothing here patches local state. The UI only sees a
//! mutation's effect once the post-mutation refetch delivers server truth.
//! `Pending`/`Error` snapshots act as an empty list — rendering their status
//! indicators is the caller's concern.

use tokio::sync::watch;
use tracing::debug;

use crate::cache::{ListState, TodoCache};
use crate::error::TransportError;
use crate::http::Transport;
use crate::types::{CreateAck, Todo, TodoDraft, TodoId};

/// Completion predicate: the one rule behind both the "has completed"
/// flag and eligibility for bulk removal.
pub fn is_completed(todo: &Todo) -> bool {
    todo.done
}

/// True when any todo in `todos` is completed; false for an empty set.
pub fn has_completed(todos: &[Todo]) -> bool {
    todos.iter().any(is_completed)
}

/// Result of a bulk removal sweep. Deletions are independent, so some can
/// fail while the rest proceed; the refetch shows what actually went.
#[derive(Debug, Default)]
pub struct RemoveOutcome {
    pub removed: usize,
    pub failed: Vec<(TodoId, TransportError)>,
}

impl RemoveOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// User-facing surface of the todo list.
pub struct TodoListModel<T> {
    cache: TodoCache<T>,
}

impl<T: Transport + 'static> TodoListModel<T> {
    pub fn new(cache: TodoCache<T>) -> Self {
        Self { cache }
    }

    /// Current snapshot of the cached list.
    pub fn state(&self) -> ListState {
        self.cache.current()
    }

    /// Subscribe to list transitions, for reactive rendering.
    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.cache.subscribe()
    }

    /// Resolve the list, fetching if needed. Also the manual-refresh path
    /// that retries after a failed fetch.
    pub async fn refresh(&self) -> Result<Vec<Todo>, TransportError> {
        self.cache.list().await
    }

    /// True when any todo in the current snapshot is completed.
    pub fn has_completed(&self) -> bool {
        has_completed(self.state().todos())
    }

    /// Start composing a new todo. The draft lives outside the ready set
    /// until submission; its provisional id is only a local list key.
    pub fn new_draft(&self, title: impl Into<String>) -> TodoDraft {
        TodoDraft::new(title)
    }

    /// Submit a composed draft. A blank (empty or whitespace-only) title is
    /// rejected without any store call; `Ok(None)` reports the rejection.
    pub async fn submit_new(&self, draft: TodoDraft) -> Result<Option<CreateAck>, TransportError> {
        if draft.title.trim().is_empty() {
            debug!("rejecting draft with blank title");
            return Ok(None);
        }
        self.cache.create(&draft).await.map(Some)
    }

    /// Flip the completion flag of the todo with `id` via a full-record
    /// update. An id absent from the current snapshot is a no-op.
    pub async fn toggle_done(&self, id: &TodoId) -> Result<(), TransportError> {
        let state = self.state();
        let Some(todo) = state.todos().iter().find(|todo| &todo.id == id) else {
            debug!(%id, "toggle on a todo not in the snapshot, ignoring");
            return Ok(());
        };
        let mut updated = todo.clone();
        updated.done = !updated.done;
        self.cache.update(&updated).await
    }

    /// Delete every completed todo in the current snapshot. Each deletion
    /// is independent: a failure is recorded and the sweep continues.
    pub async fn remove_completed(&self) -> RemoveOutcome {
        let state = self.state();
        let mut outcome = RemoveOutcome::default();
        for todo in state.todos().iter().filter(|todo| is_completed(todo)) {
            match self.cache.delete(&todo.id).await {
                Ok(()) => outcome.removed += 1,
                Err(err) => outcome.failed.push((todo.id.clone(), err)),
            }
        }
        outcome
    }

    /// Save an edited todo with a full-record update, whether or not any
    /// field actually changed.
    pub async fn edit_and_save(
        &self,
        id: &TodoId,
        title: impl Into<String>,
        description: impl Into<String>,
        done: bool,
    ) -> Result<(), TransportError> {
        let todo = Todo {
            id: id.clone(),
            title: title.into(),
            done,
            description: description.into(),
        };
        self.cache.update(&todo).await
    }

    /// Delete a single todo by id.
    pub async fn delete_one(&self, id: &TodoId) -> Result<(), TransportError> {
        self.cache.delete(id).await
    }
}
