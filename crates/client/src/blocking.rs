//! Blocking facade over the async surface
//!
//! Every mutating and query operation exists in a blocking variant here.
//! Each wrapper is a thin adapter: it owns a dedicated current-thread
//! runtime and calls `block_on` on the corresponding async operation — no
//! logic is duplicated.
//!
//! Do not use these from inside an async context; blocking a runtime
//! thread on another runtime deadlocks.

use crate::collection::{
    CollectionKind, EdgeDirection, GeoQueryOptions, InsertOptions, PageOptions, RemoveOptions,
    ReplaceOptions, UpdateOptions,
};
use crate::database::DatabaseSettings;
use crate::document::Document;
use crate::graph::{EdgeDefinition, GraphInfo};
use crate::observer::MutationObserver;
use crate::query::QueryRequest;
use crate::tracking::Tracked;
use crate::transport::Transport;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use vellum_core::{DocumentId, DocumentMeta, Error, Result, Revision};

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::InvalidOperation(format!("failed to build blocking runtime: {e}")))
}

/// Blocking database handle.
#[derive(Clone)]
pub struct Database {
    inner: crate::Database,
    runtime: Arc<tokio::runtime::Runtime>,
}

impl Database {
    /// A blocking database with default settings.
    pub fn new(transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Database {
            inner: crate::Database::new(transport),
            runtime: Arc::new(build_runtime()?),
        })
    }

    /// A blocking database with explicit settings.
    pub fn with_settings(transport: Arc<dyn Transport>, settings: DatabaseSettings) -> Result<Self> {
        Ok(Database {
            inner: crate::Database::with_settings(transport, settings),
            runtime: Arc::new(build_runtime()?),
        })
    }

    /// The async database beneath this facade.
    pub fn as_async(&self) -> &crate::Database {
        &self.inner
    }

    /// Configured defaults.
    pub fn settings(&self) -> &DatabaseSettings {
        self.inner.settings()
    }

    /// Register an observer; it sees every subsequent mutation before
    /// dispatch.
    pub fn register_observer(&self, observer: Arc<dyn MutationObserver>) {
        self.inner.register_observer(observer);
    }

    /// A typed document collection.
    pub fn collection<T: Document>(&self, name: impl Into<String>) -> Collection<T> {
        Collection {
            inner: self.inner.collection(name),
            runtime: Arc::clone(&self.runtime),
        }
    }

    /// A typed edge collection.
    pub fn edge_collection<T: Document>(&self, name: impl Into<String>) -> Collection<T> {
        Collection {
            inner: self.inner.edge_collection(name),
            runtime: Arc::clone(&self.runtime),
        }
    }

    /// An untyped collection working on raw JSON values.
    pub fn raw_collection(&self, name: impl Into<String>, kind: CollectionKind) -> RawCollection {
        RawCollection {
            inner: self.inner.raw_collection(name, kind),
            runtime: Arc::clone(&self.runtime),
        }
    }

    /// Execute a raw query, returning a blocking cursor.
    pub fn query<T: DeserializeOwned>(&self, request: QueryRequest) -> Result<Cursor<T>> {
        let inner = self.runtime.block_on(self.inner.query(request))?;
        Ok(Cursor {
            inner,
            runtime: Arc::clone(&self.runtime),
        })
    }

    /// Create a named graph.
    pub fn create_graph(
        &self,
        name: &str,
        edge_definitions: &[EdgeDefinition],
        orphan_collections: Option<&[String]>,
    ) -> Result<GraphInfo> {
        self.runtime
            .block_on(self.inner.create_graph(name, edge_definitions, orphan_collections))
    }

    /// Fetch a named graph's definition.
    pub fn graph(&self, name: &str) -> Result<GraphInfo> {
        self.runtime.block_on(self.inner.graph(name))
    }

    /// Drop a named graph.
    pub fn drop_graph(&self, name: &str, drop_collections: bool) -> Result<()> {
        self.runtime
            .block_on(self.inner.drop_graph(name, drop_collections))
    }
}

/// Blocking typed collection.
pub struct Collection<T: Document> {
    inner: crate::Collection<T>,
    runtime: Arc<tokio::runtime::Runtime>,
}

impl<T: Document> Collection<T> {
    /// Collection name.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Create a new document and start tracking it.
    pub fn insert(&self, document: T, options: &InsertOptions) -> Result<Tracked<T>> {
        self.runtime.block_on(self.inner.insert(document, options))
    }

    /// Create a new edge document and start tracking it.
    pub fn insert_edge(
        &self,
        from: &DocumentId,
        to: &DocumentId,
        document: T,
        options: &InsertOptions,
    ) -> Result<Tracked<T>> {
        self.runtime
            .block_on(self.inner.insert_edge(from, to, document, options))
    }

    /// Completely replace a tracked document.
    pub fn replace(&self, document: &mut Tracked<T>, options: &ReplaceOptions) -> Result<DocumentMeta> {
        self.runtime.block_on(self.inner.replace(document, options))
    }

    /// Partially update a tracked document.
    pub fn update(&self, document: &mut Tracked<T>, options: &UpdateOptions) -> Result<DocumentMeta> {
        self.runtime.block_on(self.inner.update(document, options))
    }

    /// Delete a tracked document and stop tracking it.
    pub fn remove(&self, document: &Tracked<T>, options: &RemoveOptions) -> Result<DocumentMeta> {
        self.runtime.block_on(self.inner.remove(document, options))
    }

    /// Completely replace a document by explicit id, without tracking.
    pub fn replace_by_id(
        &self,
        id_or_key: &str,
        document: &T,
        rev: Option<&Revision>,
        options: &ReplaceOptions,
    ) -> Result<DocumentMeta> {
        self.runtime
            .block_on(self.inner.replace_by_id(id_or_key, document, rev, options))
    }

    /// Partially update a document by explicit id, without tracking.
    pub fn update_by_id(
        &self,
        id_or_key: &str,
        patch: &Value,
        rev: Option<&Revision>,
        options: &UpdateOptions,
    ) -> Result<DocumentMeta> {
        self.runtime
            .block_on(self.inner.update_by_id(id_or_key, patch, rev, options))
    }

    /// Delete a document by explicit id, without tracking.
    pub fn remove_by_id(
        &self,
        id_or_key: &str,
        rev: Option<&Revision>,
        options: &RemoveOptions,
    ) -> Result<DocumentMeta> {
        self.runtime
            .block_on(self.inner.remove_by_id(id_or_key, rev, options))
    }

    /// Read a single document and start tracking it.
    pub fn document(&self, id_or_key: &str) -> Result<Tracked<T>> {
        self.runtime.block_on(self.inner.document(id_or_key))
    }

    /// Read a single document, converting `NotFound` to `None`.
    pub fn try_document(&self, id_or_key: &str) -> Result<Option<Tracked<T>>> {
        self.runtime.block_on(self.inner.try_document(id_or_key))
    }

    /// Check whether a document exists.
    pub fn exists(&self, id_or_key: &str) -> Result<bool> {
        self.runtime.block_on(self.inner.exists(id_or_key))
    }

    /// Read edges starting or ending at a vertex.
    pub fn edges(&self, vertex: &DocumentId, direction: EdgeDirection) -> Result<Vec<T>> {
        self.runtime.block_on(self.inner.edges(vertex, direction))
    }

    /// Return all documents of the collection as a blocking cursor.
    pub fn all(&self, page: &PageOptions) -> Result<Cursor<T>> {
        let inner = self.runtime.block_on(self.inner.all(page))?;
        Ok(Cursor {
            inner,
            runtime: Arc::clone(&self.runtime),
        })
    }

    /// Return all documents matching an example as a blocking cursor.
    pub fn by_example(&self, example: Value, page: &PageOptions) -> Result<Cursor<T>> {
        let inner = self.runtime.block_on(self.inner.by_example(example, page))?;
        Ok(Cursor {
            inner,
            runtime: Arc::clone(&self.runtime),
        })
    }

    /// Return documents whose attribute falls within a range, as a blocking
    /// cursor.
    pub fn range(
        &self,
        attribute: &str,
        left: Value,
        right: Value,
        closed: bool,
        page: &PageOptions,
    ) -> Result<Cursor<T>> {
        let inner = self
            .runtime
            .block_on(self.inner.range(attribute, left, right, closed, page))?;
        Ok(Cursor {
            inner,
            runtime: Arc::clone(&self.runtime),
        })
    }

    /// Return documents near a coordinate as a blocking cursor.
    pub fn near(
        &self,
        latitude: f64,
        longitude: f64,
        options: &GeoQueryOptions,
        page: &PageOptions,
    ) -> Result<Cursor<T>> {
        let inner = self
            .runtime
            .block_on(self.inner.near(latitude, longitude, options, page))?;
        Ok(Cursor {
            inner,
            runtime: Arc::clone(&self.runtime),
        })
    }

    /// Return documents within a radius around a coordinate as a blocking
    /// cursor.
    pub fn within(
        &self,
        latitude: f64,
        longitude: f64,
        radius: f64,
        options: &GeoQueryOptions,
        page: &PageOptions,
    ) -> Result<Cursor<T>> {
        let inner = self
            .runtime
            .block_on(self.inner.within(latitude, longitude, radius, options, page))?;
        Ok(Cursor {
            inner,
            runtime: Arc::clone(&self.runtime),
        })
    }

    /// Return documents matching a fulltext query as a blocking cursor.
    pub fn fulltext(
        &self,
        attribute: &str,
        query: &str,
        index: Option<&str>,
        page: &PageOptions,
    ) -> Result<Cursor<T>> {
        let inner = self
            .runtime
            .block_on(self.inner.fulltext(attribute, query, index, page))?;
        Ok(Cursor {
            inner,
            runtime: Arc::clone(&self.runtime),
        })
    }

    /// Return one random document of the collection, if it has any.
    pub fn any(&self) -> Result<Option<T>> {
        self.runtime.block_on(self.inner.any())
    }

    /// Return the first document matching an example, if any.
    pub fn first_example(&self, example: Value) -> Result<Option<T>> {
        self.runtime.block_on(self.inner.first_example(example))
    }
}

/// Blocking untyped collection.
pub struct RawCollection {
    inner: crate::RawCollection,
    runtime: Arc<tokio::runtime::Runtime>,
}

impl RawCollection {
    /// Collection name.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Create a new document.
    pub fn insert(&self, document: &Value, options: &InsertOptions) -> Result<DocumentMeta> {
        self.runtime.block_on(self.inner.insert(document, options))
    }

    /// Create a new edge document between two vertices.
    pub fn insert_edge(
        &self,
        from: &DocumentId,
        to: &DocumentId,
        document: &Value,
        options: &InsertOptions,
    ) -> Result<DocumentMeta> {
        self.runtime
            .block_on(self.inner.insert_edge(from, to, document, options))
    }

    /// Completely replace a document addressed by id or key.
    pub fn replace_by_id(
        &self,
        id_or_key: &str,
        document: &Value,
        rev: Option<&Revision>,
        options: &ReplaceOptions,
    ) -> Result<DocumentMeta> {
        self.runtime
            .block_on(self.inner.replace_by_id(id_or_key, document, rev, options))
    }

    /// Partially update a document addressed by id or key.
    pub fn update_by_id(
        &self,
        id_or_key: &str,
        patch: &Value,
        rev: Option<&Revision>,
        options: &UpdateOptions,
    ) -> Result<DocumentMeta> {
        self.runtime
            .block_on(self.inner.update_by_id(id_or_key, patch, rev, options))
    }

    /// Delete a document by explicit id.
    pub fn remove_by_id(
        &self,
        id_or_key: &str,
        rev: Option<&Revision>,
        options: &RemoveOptions,
    ) -> Result<DocumentMeta> {
        self.runtime
            .block_on(self.inner.remove_by_id(id_or_key, rev, options))
    }

    /// Read a single document.
    pub fn document(&self, id_or_key: &str) -> Result<Value> {
        self.runtime.block_on(self.inner.document(id_or_key))
    }

    /// Read a single document, converting `NotFound` to `None`.
    pub fn try_document(&self, id_or_key: &str) -> Result<Option<Value>> {
        self.runtime.block_on(self.inner.try_document(id_or_key))
    }

    /// Check whether a document exists.
    pub fn exists(&self, id_or_key: &str) -> Result<bool> {
        self.runtime.block_on(self.inner.exists(id_or_key))
    }

    /// Read edges starting or ending at a vertex.
    pub fn edges(&self, vertex: &DocumentId, direction: EdgeDirection) -> Result<Vec<Value>> {
        self.runtime.block_on(self.inner.edges(vertex, direction))
    }

    /// Return all documents of the collection as a blocking cursor.
    pub fn all(&self, page: &PageOptions) -> Result<Cursor<Value>> {
        let inner = self.runtime.block_on(self.inner.all(page))?;
        Ok(Cursor {
            inner,
            runtime: Arc::clone(&self.runtime),
        })
    }

    /// Return all documents matching an example as a blocking cursor.
    pub fn by_example(&self, example: Value, page: &PageOptions) -> Result<Cursor<Value>> {
        let inner = self.runtime.block_on(self.inner.by_example(example, page))?;
        Ok(Cursor {
            inner,
            runtime: Arc::clone(&self.runtime),
        })
    }

    /// Return documents whose attribute falls within a range, as a blocking
    /// cursor.
    pub fn range(
        &self,
        attribute: &str,
        left: Value,
        right: Value,
        closed: bool,
        page: &PageOptions,
    ) -> Result<Cursor<Value>> {
        let inner = self
            .runtime
            .block_on(self.inner.range(attribute, left, right, closed, page))?;
        Ok(Cursor {
            inner,
            runtime: Arc::clone(&self.runtime),
        })
    }

    /// Return documents near a coordinate as a blocking cursor.
    pub fn near(
        &self,
        latitude: f64,
        longitude: f64,
        options: &GeoQueryOptions,
        page: &PageOptions,
    ) -> Result<Cursor<Value>> {
        let inner = self
            .runtime
            .block_on(self.inner.near(latitude, longitude, options, page))?;
        Ok(Cursor {
            inner,
            runtime: Arc::clone(&self.runtime),
        })
    }

    /// Return documents within a radius around a coordinate as a blocking
    /// cursor.
    pub fn within(
        &self,
        latitude: f64,
        longitude: f64,
        radius: f64,
        options: &GeoQueryOptions,
        page: &PageOptions,
    ) -> Result<Cursor<Value>> {
        let inner = self
            .runtime
            .block_on(self.inner.within(latitude, longitude, radius, options, page))?;
        Ok(Cursor {
            inner,
            runtime: Arc::clone(&self.runtime),
        })
    }

    /// Return documents matching a fulltext query as a blocking cursor.
    pub fn fulltext(
        &self,
        attribute: &str,
        query: &str,
        index: Option<&str>,
        page: &PageOptions,
    ) -> Result<Cursor<Value>> {
        let inner = self
            .runtime
            .block_on(self.inner.fulltext(attribute, query, index, page))?;
        Ok(Cursor {
            inner,
            runtime: Arc::clone(&self.runtime),
        })
    }

    /// Return one random document of the collection, if it has any.
    pub fn any(&self) -> Result<Option<Value>> {
        self.runtime.block_on(self.inner.any())
    }

    /// Return the first document matching an example, if any.
    pub fn first_example(&self, example: Value) -> Result<Option<Value>> {
        self.runtime.block_on(self.inner.first_example(example))
    }
}

/// Blocking cursor over query results.
pub struct Cursor<T> {
    inner: crate::Cursor<T>,
    runtime: Arc<tokio::runtime::Runtime>,
}

impl<T: DeserializeOwned> Cursor<T> {
    /// Yield the next item, fetching the next batch at a boundary.
    pub fn next(&mut self) -> Result<Option<T>> {
        self.runtime.block_on(self.inner.next())
    }

    /// Drain the remaining items into a vector.
    pub fn all(&mut self) -> Result<Vec<T>> {
        self.runtime.block_on(self.inner.all())
    }

    /// Release the server-side cursor resource.
    pub fn dispose(&mut self) {
        self.runtime.block_on(self.inner.dispose())
    }

    /// Total result count, when the query requested count semantics.
    pub fn total_count(&self) -> Option<u64> {
        self.inner.total_count()
    }
}

impl<T: DeserializeOwned> Iterator for Cursor<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match Cursor::next(self) {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
