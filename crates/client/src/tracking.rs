//! Change tracker and identity map
//!
//! The tracker associates each live document instance with a
//! [`DocumentContainer`]: its server-assigned identifiers, current
//! revision, and the last server-confirmed snapshot of its fields. The
//! snapshot is the diff baseline for partial updates, so only changed
//! fields ship.
//!
//! ## Identity
//!
//! Entries are keyed by [`DocHandle`], an opaque per-instance handle the
//! tracker allocates. Two structurally equal documents are independent
//! entries; the map never hashes document contents. [`Tracked`] pairs a
//! live instance with its handle so tracked entry points are well-typed —
//! an untracked value cannot reach them.
//!
//! ## State advancement
//!
//! [`ChangeTracker::confirm`] is the only place revision state advances
//! and the snapshot is replaced. It runs only after a confirmed server
//! response; the snapshot is swapped wholesale, never mutated in place.
//!
//! The map assumes at most one in-flight mutation per tracked instance;
//! callers serialize access per document. The internal lock only protects
//! map structure across instances.

use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use vellum_core::{diff_documents, DocumentId, DocumentKey, DocumentMeta, Error, Result, Revision};

/// Opaque handle identifying one tracked instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocHandle(u64);

/// Identity-map entry for one tracked document instance.
#[derive(Debug, Clone)]
pub struct DocumentContainer {
    /// Collection-qualified handle
    pub id: DocumentId,
    /// Key local to the collection
    pub key: Option<DocumentKey>,
    /// Last-known revision
    pub rev: Revision,
    /// Edge start vertex, immutable after creation
    pub from: Option<DocumentId>,
    /// Edge end vertex, immutable after creation
    pub to: Option<DocumentId>,
    snapshot: Value,
}

impl DocumentContainer {
    /// The last server-confirmed structural form of the document.
    pub fn snapshot(&self) -> &Value {
        &self.snapshot
    }

    /// The container's identifiers as a mutation-result triple.
    pub fn meta(&self) -> DocumentMeta {
        DocumentMeta {
            id: self.id.clone(),
            key: self.key.clone(),
            rev: self.rev.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }
}

/// A live document instance paired with its identity-map handle.
///
/// Produced by insert and read operations; required by the tracked
/// mutation entry points (`replace`, `update`, `remove`).
#[derive(Debug)]
pub struct Tracked<T> {
    document: T,
    handle: DocHandle,
}

impl<T> Tracked<T> {
    pub(crate) fn new(document: T, handle: DocHandle) -> Self {
        Tracked { document, handle }
    }

    /// The identity-map handle of this instance.
    pub fn handle(&self) -> DocHandle {
        self.handle
    }

    /// Borrow the live instance.
    pub fn get(&self) -> &T {
        &self.document
    }

    /// Mutably borrow the live instance.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.document
    }

    /// Give up tracking association and take the instance.
    pub fn into_inner(self) -> T {
        self.document
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.document
    }
}

impl<T> DerefMut for Tracked<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.document
    }
}

/// In-memory identity map with dirty-checking.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    entries: Mutex<HashMap<DocHandle, DocumentContainer>>,
    next_handle: AtomicU64,
}

impl ChangeTracker {
    /// An empty tracker.
    pub fn new() -> Self {
        ChangeTracker::default()
    }

    /// Allocate a fresh handle for a new instance.
    pub fn allocate_handle(&self) -> DocHandle {
        DocHandle(self.next_handle.fetch_add(1, Ordering::Relaxed))
    }

    /// Register or refresh the association between an instance and its
    /// server identity.
    ///
    /// Overwrites a prior entry for the same handle. Fails with
    /// `TrackingConflict` if the handle is already bound to a different
    /// document id — the caller has aliased two identities onto one
    /// instance.
    pub fn track(&self, handle: DocHandle, meta: &DocumentMeta, snapshot: Value) -> Result<()> {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(&handle) {
            if existing.id != meta.id {
                return Err(Error::TrackingConflict {
                    existing: existing.id.to_string(),
                    supplied: meta.id.to_string(),
                });
            }
        }
        entries.insert(
            handle,
            DocumentContainer {
                id: meta.id.clone(),
                key: meta.key.clone(),
                rev: meta.rev.clone(),
                from: meta.from.clone(),
                to: meta.to.clone(),
                snapshot,
            },
        );
        Ok(())
    }

    /// Look up the container for an instance.
    ///
    /// Fails with `NotTracked` if no entry exists. Mutations that resolve
    /// their target implicitly (`replace`, `update`, `remove` without an
    /// explicit id) depend on this for the server identifier and current
    /// revision.
    pub fn find_info(&self, handle: DocHandle) -> Result<DocumentContainer> {
        self.entries
            .lock()
            .get(&handle)
            .cloned()
            .ok_or(Error::NotTracked)
    }

    /// Compute the minimal patch between an instance's current serialized
    /// form and its snapshot.
    ///
    /// Returns the patch and the container. An empty patch means the
    /// document is clean; callers must treat that as a no-op success and
    /// skip the network call.
    pub fn compute_changes(
        &self,
        handle: DocHandle,
        current: &Value,
    ) -> Result<(Map<String, Value>, DocumentContainer)> {
        let container = self.find_info(handle)?;
        let patch = diff_documents(container.snapshot(), current);
        Ok((patch, container))
    }

    /// Advance revision state after a confirmed mutation.
    ///
    /// Replaces the snapshot wholesale with the post-mutation form. No-op
    /// if the instance is no longer tracked.
    pub fn confirm(&self, handle: DocHandle, rev: Revision, snapshot: Value) {
        if let Some(container) = self.entries.lock().get_mut(&handle) {
            container.rev = rev;
            container.snapshot = snapshot;
        }
    }

    /// Record edge endpoints on a freshly tracked edge document.
    pub fn set_endpoints(&self, handle: DocHandle, from: DocumentId, to: DocumentId) {
        if let Some(container) = self.entries.lock().get_mut(&handle) {
            container.from = Some(from);
            container.to = Some(to);
        }
    }

    /// Remove the identity-map entry for an instance. Idempotent.
    pub fn stop_tracking(&self, handle: DocHandle) {
        self.entries.lock().remove(&handle);
    }

    /// Whether an entry exists for the handle.
    pub fn is_tracked(&self, handle: DocHandle) -> bool {
        self.entries.lock().contains_key(&handle)
    }

    /// Number of tracked instances.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no instance is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(id: &str, rev: &str) -> DocumentMeta {
        DocumentMeta::document(
            DocumentId::new(id),
            id.split_once('/').map(|(_, k)| DocumentKey::new(k)),
            Revision::new(rev),
        )
    }

    #[test]
    fn test_track_and_find_info() {
        let tracker = ChangeTracker::new();
        let handle = tracker.allocate_handle();
        tracker
            .track(handle, &meta("people/1", "R1"), json!({"a": 1}))
            .unwrap();

        let container = tracker.find_info(handle).unwrap();
        assert_eq!(container.id, DocumentId::new("people/1"));
        assert_eq!(container.rev, Revision::new("R1"));
        assert_eq!(container.snapshot(), &json!({"a": 1}));
    }

    #[test]
    fn test_find_info_untracked_fails() {
        let tracker = ChangeTracker::new();
        let handle = tracker.allocate_handle();
        assert!(matches!(tracker.find_info(handle), Err(Error::NotTracked)));
    }

    #[test]
    fn test_track_refresh_same_identity_overwrites() {
        let tracker = ChangeTracker::new();
        let handle = tracker.allocate_handle();
        tracker
            .track(handle, &meta("people/1", "R1"), json!({"a": 1}))
            .unwrap();
        tracker
            .track(handle, &meta("people/1", "R2"), json!({"a": 2}))
            .unwrap();

        let container = tracker.find_info(handle).unwrap();
        assert_eq!(container.rev, Revision::new("R2"));
        assert_eq!(container.snapshot(), &json!({"a": 2}));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_track_different_identity_conflicts() {
        let tracker = ChangeTracker::new();
        let handle = tracker.allocate_handle();
        tracker
            .track(handle, &meta("people/1", "R1"), json!({}))
            .unwrap();

        let err = tracker
            .track(handle, &meta("people/2", "R1"), json!({}))
            .unwrap_err();
        assert!(matches!(err, Error::TrackingConflict { .. }));
    }

    #[test]
    fn test_stop_tracking_then_find_info_fails() {
        let tracker = ChangeTracker::new();
        let handle = tracker.allocate_handle();
        tracker
            .track(handle, &meta("people/1", "R1"), json!({}))
            .unwrap();
        tracker.stop_tracking(handle);
        assert!(matches!(tracker.find_info(handle), Err(Error::NotTracked)));
    }

    #[test]
    fn test_stop_tracking_is_idempotent() {
        let tracker = ChangeTracker::new();
        let handle = tracker.allocate_handle();
        tracker.stop_tracking(handle);
        tracker.stop_tracking(handle);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_compute_changes_minimality() {
        let tracker = ChangeTracker::new();
        let handle = tracker.allocate_handle();
        tracker
            .track(handle, &meta("people/1", "R1"), json!({"a": 1, "b": 2}))
            .unwrap();

        let (patch, container) = tracker
            .compute_changes(handle, &json!({"a": 1, "b": 3}))
            .unwrap();
        assert_eq!(patch.len(), 1);
        assert_eq!(patch["b"], json!(3));
        assert_eq!(container.rev, Revision::new("R1"));
    }

    #[test]
    fn test_diff_idempotence_after_confirm() {
        let tracker = ChangeTracker::new();
        let handle = tracker.allocate_handle();
        tracker
            .track(handle, &meta("people/1", "R1"), json!({"a": 1, "b": 2}))
            .unwrap();

        let current = json!({"a": 1, "b": 3});
        let (patch, _) = tracker.compute_changes(handle, &current).unwrap();
        assert!(!patch.is_empty());

        tracker.confirm(handle, Revision::new("R2"), current.clone());

        let (patch, container) = tracker.compute_changes(handle, &current).unwrap();
        assert!(patch.is_empty());
        assert_eq!(container.rev, Revision::new("R2"));
    }

    #[test]
    fn test_confirm_untracked_is_noop() {
        let tracker = ChangeTracker::new();
        let handle = tracker.allocate_handle();
        tracker.confirm(handle, Revision::new("R1"), json!({}));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_two_equal_documents_are_independent_entries() {
        let tracker = ChangeTracker::new();
        let first = tracker.allocate_handle();
        let second = tracker.allocate_handle();
        // Structurally identical snapshots under different identities.
        tracker
            .track(first, &meta("people/1", "R1"), json!({"a": 1}))
            .unwrap();
        tracker
            .track(second, &meta("people/2", "R1"), json!({"a": 1}))
            .unwrap();

        assert_eq!(tracker.len(), 2);
        tracker.stop_tracking(first);
        assert!(tracker.find_info(second).is_ok());
    }

    #[test]
    fn test_set_endpoints() {
        let tracker = ChangeTracker::new();
        let handle = tracker.allocate_handle();
        tracker
            .track(handle, &meta("knows/1", "R1"), json!({}))
            .unwrap();
        tracker.set_endpoints(handle, DocumentId::new("people/1"), DocumentId::new("people/2"));

        let container = tracker.find_info(handle).unwrap();
        assert_eq!(container.from, Some(DocumentId::new("people/1")));
        assert_eq!(container.to, Some(DocumentId::new("people/2")));
    }

    #[test]
    fn test_tracked_wrapper_derefs() {
        let tracker = ChangeTracker::new();
        let handle = tracker.allocate_handle();
        let mut tracked = Tracked::new(vec![1, 2], handle);
        tracked.push(3);
        assert_eq!(tracked.get(), &vec![1, 2, 3]);
        assert_eq!(tracked.handle(), handle);
        assert_eq!(tracked.into_inner(), vec![1, 2, 3]);
    }
}
