//! Vellum client
//!
//! Client-side access layer for a document/graph database reachable over
//! HTTP. Raw REST calls hide behind typed collection operations, graph
//! management, and query execution, with three client-side behaviors on
//! top:
//! - an identity map with dirty-checking, so partial updates only ship
//!   changed fields;
//! - optimistic-concurrency revision handling with a configurable
//!   conflict policy;
//! - a lazy, batched cursor protocol for streaming query results larger
//!   than one response.
//!
//! The HTTP transport itself is a collaborator: implement [`Transport`]
//! over your HTTP client of choice and hand it to [`Database::new`].
//!
//! ## Quick start
//!
//! ```ignore
//! use vellum_client::{Database, InsertOptions, UpdateOptions};
//!
//! let db = Database::new(transport);
//! let people = db.collection::<Person>("people");
//!
//! let mut ada = people.insert(person, &InsertOptions::default()).await?;
//! ada.age += 1;
//! // Ships exactly {"age": ...}; a clean document skips the request.
//! people.update(&mut ada, &UpdateOptions::default()).await?;
//! ```
//!
//! Every operation also exists in a blocking variant under [`blocking`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blocking;
pub mod collection;
pub mod cursor;
pub mod database;
pub mod document;
pub mod graph;
pub mod observer;
pub mod query;
pub mod tracking;
pub mod transport;

// Re-export the foundational types alongside the client surface
pub use vellum_core::{
    diff_documents, DocumentId, DocumentKey, DocumentMeta, Error, Result, Revision,
    RevisionPolicy, ERROR_NUM_DOCUMENT_NOT_FOUND,
};

pub use collection::{
    Collection, CollectionKind, EdgeDirection, GeoQueryOptions, InsertOptions, PageOptions,
    RawCollection, RemoveOptions, ReplaceOptions, UpdateOptions,
};
pub use cursor::Cursor;
pub use database::{Database, DatabaseSettings};
pub use document::Document;
pub use graph::{EdgeDefinition, GraphInfo};
pub use observer::{MutationEvent, MutationKind, MutationObserver};
pub use query::{QueryOptions, QueryRequest, SimpleQuery};
pub use tracking::{ChangeTracker, DocHandle, DocumentContainer, Tracked};
pub use transport::{
    CommandRequest, CommandResponse, CursorPage, Method, StatusMeta, Transport,
    ERROR_NUM_CONFLICT,
};
