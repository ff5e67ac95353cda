//! Identifier types shared across the client
//!
//! A document has two identifiers assigned by the server at creation:
//! - `DocumentId`: collection-qualified handle, `"<collection>/<key>"`
//! - `DocumentKey`: the key local to its collection
//!
//! plus an opaque [`Revision`] token that changes on every successful
//! server-side mutation and drives optimistic concurrency.
//!
//! [`DocumentMeta`] is the identifier triple the server returns from every
//! mutation (with edge endpoints where applicable); it is what gets written
//! back onto live instances and into the identity map.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Collection-qualified document handle, `"<collection>/<key>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap an already-qualified handle.
    pub fn new(id: impl Into<String>) -> Self {
        DocumentId(id.into())
    }

    /// Qualify a handle against a collection.
    ///
    /// A bare key becomes `"<collection>/<key>"`; an input that already
    /// contains a `/` is taken as fully qualified and passed through.
    pub fn qualify(collection: &str, id_or_key: &str) -> Self {
        if id_or_key.contains('/') {
            DocumentId(id_or_key.to_string())
        } else {
            DocumentId(format!("{}/{}", collection, id_or_key))
        }
    }

    /// The qualified handle as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The collection part of the handle, if qualified.
    pub fn collection(&self) -> Option<&str> {
        self.0.split_once('/').map(|(c, _)| c)
    }

    /// The key part of the handle, if qualified.
    pub fn key(&self) -> Option<&str> {
        self.0.split_once('/').map(|(_, k)| k)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Document key, local to its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentKey(String);

impl DocumentKey {
    /// Wrap a key.
    pub fn new(key: impl Into<String>) -> Self {
        DocumentKey(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque revision token.
///
/// Changes on every successful server-side mutation. The client never
/// interprets its contents; it only compares and forwards it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    /// Wrap a revision token.
    pub fn new(rev: impl Into<String>) -> Self {
        Revision(rev.into())
    }

    /// The token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-assigned identifiers returned from a mutation.
///
/// `key` may be absent in responses from older servers; `from`/`to` are
/// present only for edge documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Collection-qualified handle
    #[serde(rename = "_id")]
    pub id: DocumentId,
    /// Key local to the collection
    #[serde(rename = "_key", skip_serializing_if = "Option::is_none")]
    pub key: Option<DocumentKey>,
    /// Revision after the mutation
    #[serde(rename = "_rev")]
    pub rev: Revision,
    /// Edge start vertex, edges only
    #[serde(rename = "_from", skip_serializing_if = "Option::is_none")]
    pub from: Option<DocumentId>,
    /// Edge end vertex, edges only
    #[serde(rename = "_to", skip_serializing_if = "Option::is_none")]
    pub to: Option<DocumentId>,
}

impl DocumentMeta {
    /// Build a meta with no edge endpoints.
    pub fn document(id: DocumentId, key: Option<DocumentKey>, rev: Revision) -> Self {
        DocumentMeta {
            id,
            key,
            rev,
            from: None,
            to: None,
        }
    }
}
