//! Durable per-actor state.
//!
//! Every actor instance owns a scope in the [`StateStore`]. The
//! [`ActorStateManager`] batches `set`/`remove` calls and commits them
//! together on `save`, so one save is atomic for that actor's own entries and
//! nothing else.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::StateError;
use crate::keys::ActorAddress;

/// One pending change in a commit batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    Set { key: String, value: Vec<u8> },
    Remove { key: String },
}

/// Storage backend shared by all actors.
#[async_trait]
pub trait StateStore: Send + Sync + 'static {
    async fn load(&self, scope: &ActorAddress, key: &str) -> Result<Option<Vec<u8>>, StateError>;

    /// Applies all changes for one actor atomically.
    async fn commit(&self, scope: &ActorAddress, changes: Vec<StateChange>) -> Result<(), StateError>;
}

type EntryKey = (ActorAddress, String);

/// In-memory state store.
///
/// Intended for tests/dev. Counts commits so callers can assert that an
/// operation performed no writes.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    entries: RwLock<HashMap<EntryKey, Vec<u8>>>,
    commits: AtomicUsize,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commits applied so far.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn contains(&self, scope: &ActorAddress, key: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(scope.clone(), key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self, scope: &ActorAddress, key: &str) -> Result<Option<Vec<u8>>, StateError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(&(scope.clone(), key.to_string())).cloned())
    }

    async fn commit(&self, scope: &ActorAddress, changes: Vec<StateChange>) -> Result<(), StateError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for change in changes {
            match change {
                StateChange::Set { key, value } => {
                    entries.insert((scope.clone(), key), value);
                }
                StateChange::Remove { key } => {
                    entries.remove(&(scope.clone(), key));
                }
            }
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// State slot of one actor instance.
pub struct ActorStateManager {
    store: Arc<dyn StateStore>,
    scope: ActorAddress,
    // None marks a pending removal.
    pending: BTreeMap<String, Option<Vec<u8>>>,
}

impl ActorStateManager {
    pub fn new(store: Arc<dyn StateStore>, scope: ActorAddress) -> Self {
        Self {
            store,
            scope,
            pending: BTreeMap::new(),
        }
    }

    pub fn scope(&self) -> &ActorAddress {
        &self.scope
    }

    /// Reads a value, seeing pending changes first.
    pub async fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StateError> {
        let bytes = match self.pending.get(key) {
            Some(pending) => pending.clone(),
            None => self.store.load(&self.scope, key).await?,
        };
        bytes
            .map(|bytes| serde_json::from_slice(&bytes).map_err(StateError::from))
            .transpose()
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StateError> {
        let bytes = serde_json::to_vec(value)?;
        self.pending.insert(key.to_string(), Some(bytes));
        Ok(())
    }

    pub fn remove(&mut self, key: &str) {
        self.pending.insert(key.to_string(), None);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drops pending changes without writing them.
    pub fn discard(&mut self) {
        self.pending.clear();
    }

    /// Commits pending changes. A no-op when nothing is pending.
    pub async fn save(&mut self) -> Result<(), StateError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let changes = std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => StateChange::Set { key, value },
                None => StateChange::Remove { key },
            })
            .collect::<Vec<_>>();
        debug!(scope = %self.scope, changes = changes.len(), "Saving actor state");
        self.store.commit(&self.scope, changes).await.inspect_err(|e| {
            error!(scope = %self.scope, error = %e, "Actor state commit failed");
        })
    }
}
