//! Database handle and settings
//!
//! [`Database`] is the root object of the client: it owns the transport,
//! the change tracker, the configured defaults, and the observer registry.
//! It is cheap to clone and safe to share; collections borrow it.

use crate::cursor::{Cursor, CURSOR_API};
use crate::collection::{Collection, CollectionKind, RawCollection};
use crate::document::Document;
use crate::observer::{MutationEvent, MutationObserver};
use crate::query::QueryRequest;
use crate::tracking::ChangeTracker;
use crate::transport::{CommandRequest, Method, Transport};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;
use vellum_core::{Result, RevisionPolicy};

/// Configured defaults applied when an operation leaves an option unset.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// Wait until mutations are synced to disk
    pub wait_for_sync: bool,
    /// Create the target collection on insert if it does not exist
    pub create_collection: bool,
    /// Default revision-conflict policy for mutations
    pub revision_policy: RevisionPolicy,
    /// Keep attributes set to null in partial updates
    pub keep_null_on_update: bool,
    /// Merge nested objects in partial updates instead of replacing them
    pub merge_objects_on_update: bool,
    /// Default batch size for cursors, when set
    pub cursor_batch_size: Option<usize>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            wait_for_sync: false,
            create_collection: false,
            revision_policy: RevisionPolicy::Last,
            keep_null_on_update: true,
            merge_objects_on_update: true,
            cursor_batch_size: None,
        }
    }
}

struct DatabaseInner {
    transport: Arc<dyn Transport>,
    settings: DatabaseSettings,
    tracker: ChangeTracker,
    observers: RwLock<Vec<Arc<dyn MutationObserver>>>,
}

/// Client handle for one database.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// A database with default settings.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Database::with_settings(transport, DatabaseSettings::default())
    }

    /// A database with explicit settings.
    pub fn with_settings(transport: Arc<dyn Transport>, settings: DatabaseSettings) -> Self {
        Database {
            inner: Arc::new(DatabaseInner {
                transport,
                settings,
                tracker: ChangeTracker::new(),
                observers: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Configured defaults.
    pub fn settings(&self) -> &DatabaseSettings {
        &self.inner.settings
    }

    /// The change tracker / identity map.
    pub fn tracker(&self) -> &ChangeTracker {
        &self.inner.tracker
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.inner.transport
    }

    /// Register an observer; it sees every subsequent mutation before
    /// dispatch.
    pub fn register_observer(&self, observer: Arc<dyn MutationObserver>) {
        self.inner.observers.write().push(observer);
    }

    pub(crate) fn notify(&self, event: &MutationEvent<'_>) {
        for observer in self.inner.observers.read().iter() {
            observer.before_mutation(event);
        }
    }

    /// A typed document collection.
    pub fn collection<T: Document>(&self, name: impl Into<String>) -> Collection<T> {
        Collection::new(RawCollection::new(
            self.clone(),
            name,
            CollectionKind::Document,
        ))
    }

    /// A typed edge collection.
    pub fn edge_collection<T: Document>(&self, name: impl Into<String>) -> Collection<T> {
        Collection::new(RawCollection::new(self.clone(), name, CollectionKind::Edge))
    }

    /// An untyped collection working on raw JSON values.
    pub fn raw_collection(&self, name: impl Into<String>, kind: CollectionKind) -> RawCollection {
        RawCollection::new(self.clone(), name, kind)
    }

    /// Execute a raw query, returning a lazy cursor over the results.
    ///
    /// The configured default batch size applies when the request leaves
    /// it unset.
    pub async fn query<T: DeserializeOwned>(
        &self,
        mut request: QueryRequest,
    ) -> Result<Cursor<T>> {
        if request.batch_size.is_none() {
            request.batch_size = self.inner.settings.cursor_batch_size;
        }
        debug!(query = %request.query, "executing query");
        let command = CommandRequest::new(Method::Post, CURSOR_API)
            .with_body(serde_json::to_value(&request)?);
        Cursor::open(Arc::clone(&self.inner.transport), command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = DatabaseSettings::default();
        assert!(!settings.wait_for_sync);
        assert!(!settings.create_collection);
        assert_eq!(settings.revision_policy, RevisionPolicy::Last);
        assert!(settings.keep_null_on_update);
        assert!(settings.merge_objects_on_update);
        assert!(settings.cursor_batch_size.is_none());
    }
}
