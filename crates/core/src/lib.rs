//! Core types for the Vellum client
//!
//! This crate defines the foundational, transport-independent pieces:
//! - DocumentId / DocumentKey / Revision: server-assigned identifiers
//! - DocumentMeta: the identifier triple returned from every mutation
//! - RevisionPolicy: optimistic-concurrency conflict policy
//! - diff: structural diffing between a document and its snapshot
//! - Error: error type hierarchy
//!
//! Everything here is pure and synchronous; the async client surface lives
//! in `vellum-client`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diff;
pub mod error;
pub mod policy;
pub mod types;

// Re-export commonly used types at the crate root
pub use diff::diff_documents;
pub use error::{Error, Result, ERROR_NUM_DOCUMENT_NOT_FOUND};
pub use policy::{resolve, RevisionPolicy};
pub use types::{DocumentId, DocumentKey, DocumentMeta, Revision};
