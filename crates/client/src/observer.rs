//! Mutation observers
//!
//! Observers registered on the database are invoked with a read-only view
//! of each pending mutation before it is dispatched. They replace per-call
//! callback parameters: register once, see every operation.

use serde_json::Value;
use vellum_core::Revision;

/// Kind of a pending mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Document insert
    Insert,
    /// Edge insert
    InsertEdge,
    /// Whole-document replace
    Replace,
    /// Partial update
    Update,
    /// Document removal
    Remove,
}

impl MutationKind {
    /// Stable name for logging.
    pub fn as_str(self) -> &'static str {
        match self {
            MutationKind::Insert => "insert",
            MutationKind::InsertEdge => "insert_edge",
            MutationKind::Replace => "replace",
            MutationKind::Update => "update",
            MutationKind::Remove => "remove",
        }
    }
}

/// Read-only view of a pending mutation.
#[derive(Debug)]
pub struct MutationEvent<'a> {
    /// Target collection name
    pub collection: &'a str,
    /// Kind of operation
    pub kind: MutationKind,
    /// Outbound document or patch body; `None` for removals
    pub document: Option<&'a Value>,
    /// Revision precondition attached to the request, if any
    pub precondition: Option<&'a Revision>,
}

/// Interceptor invoked before each mutation is dispatched.
///
/// Observers must not block; they see the operation, they cannot veto it.
pub trait MutationObserver: Send + Sync {
    /// Called with the pending operation before dispatch.
    fn before_mutation(&self, event: &MutationEvent<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(MutationKind::Insert.as_str(), "insert");
        assert_eq!(MutationKind::InsertEdge.as_str(), "insert_edge");
        assert_eq!(MutationKind::Remove.as_str(), "remove");
    }
}
