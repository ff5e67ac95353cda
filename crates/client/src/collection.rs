//! Collection operations
//!
//! [`RawCollection`] is the untyped operation set working on
//! `serde_json::Value` bodies: it builds the wire requests, applies the
//! configured defaults, notifies observers, and maps server status to
//! errors. [`Collection`] is the typed surface over it; every typed call
//! desugars to exactly one raw call plus tracking bookkeeping.
//!
//! Tracked mutations (`replace`, `update`, `remove`) take a
//! [`Tracked`] instance and resolve the target id and revision through the
//! identity map; `*_by_id` variants take explicit identifiers and touch no
//! tracking state.

use crate::cursor::Cursor;
use crate::database::Database;
use crate::document::Document;
use crate::observer::{MutationEvent, MutationKind};
use crate::query::SimpleQuery;
use crate::tracking::Tracked;
use crate::transport::{parse_meta, CommandRequest, Method};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;
use vellum_core::{
    resolve, DocumentId, DocumentMeta, Error, Result, Revision, RevisionPolicy,
};

const DOCUMENT_API: &str = "_api/document";
const EDGE_API: &str = "_api/edge";
const EDGES_API: &str = "_api/edges";
const SIMPLE_API: &str = "_api/simple";

// Status reported by simple single-document commands when nothing matches.
const ERROR_NUM_NO_MATCH: i64 = 404;

/// Whether a collection holds plain documents or edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// Plain document collection
    Document,
    /// Edge collection
    Edge,
}

impl CollectionKind {
    fn api(self) -> &'static str {
        match self {
            CollectionKind::Document => DOCUMENT_API,
            CollectionKind::Edge => EDGE_API,
        }
    }
}

/// Direction filter for edge reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    /// Edges in either direction
    Any,
    /// Edges ending at the vertex
    Inbound,
    /// Edges starting at the vertex
    Outbound,
}

/// Options for inserts; unset fields fall back to the database settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertOptions {
    /// Create the collection if it does not exist
    pub create_collection: Option<bool>,
    /// Wait until the document is synced to disk
    pub wait_for_sync: Option<bool>,
}

/// Options for replaces; unset fields fall back to the database settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceOptions {
    /// Revision-conflict policy for this operation
    pub policy: Option<RevisionPolicy>,
    /// Wait until the document is synced to disk
    pub wait_for_sync: Option<bool>,
}

/// Options for partial updates; unset fields fall back to the database
/// settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Keep attributes that the patch sets to null
    pub keep_null: Option<bool>,
    /// Merge nested objects instead of replacing them
    pub merge_objects: Option<bool>,
    /// Revision-conflict policy for this operation
    pub policy: Option<RevisionPolicy>,
    /// Wait until the document is synced to disk
    pub wait_for_sync: Option<bool>,
}

/// Options for removals; unset fields fall back to the database settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveOptions {
    /// Revision-conflict policy for this operation
    pub policy: Option<RevisionPolicy>,
    /// Wait until the document is synced to disk
    pub wait_for_sync: Option<bool>,
}

/// Pagination options for canned collection queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageOptions {
    /// Number of documents to skip
    pub skip: Option<usize>,
    /// Maximum number of documents to return
    pub limit: Option<usize>,
    /// Maximum items transferred per batch
    pub batch_size: Option<usize>,
}

/// Options for the geo simple queries (`near`, `within`).
#[derive(Debug, Clone, Default)]
pub struct GeoQueryOptions {
    /// Attribute name to report computed distances under
    pub distance: Option<String>,
    /// Identifier of the geo index to use
    pub geo: Option<String>,
}

/// Untyped collection operations over raw JSON bodies.
#[derive(Clone)]
pub struct RawCollection {
    db: Database,
    name: String,
    kind: CollectionKind,
}

impl RawCollection {
    pub(crate) fn new(db: Database, name: impl Into<String>, kind: CollectionKind) -> Self {
        RawCollection {
            db,
            name: name.into(),
            kind,
        }
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Document or edge collection.
    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Qualify a handle or key against this collection.
    pub fn qualify(&self, id_or_key: &str) -> DocumentId {
        DocumentId::qualify(&self.name, id_or_key)
    }

    /// Create a new document.
    pub async fn insert(&self, document: &Value, options: &InsertOptions) -> Result<DocumentMeta> {
        let settings = self.db.settings();
        let request = CommandRequest::new(Method::Post, self.kind.api())
            .with_param("collection", &self.name)
            .with_param(
                "createCollection",
                options.create_collection.unwrap_or(settings.create_collection),
            )
            .with_param(
                "waitForSync",
                options.wait_for_sync.unwrap_or(settings.wait_for_sync),
            )
            .with_body(document.clone());
        self.dispatch(MutationKind::Insert, request, Some(document), None, &self.name)
            .await
    }

    /// Create a new edge document between two vertices.
    pub async fn insert_edge(
        &self,
        from: &DocumentId,
        to: &DocumentId,
        document: &Value,
        options: &InsertOptions,
    ) -> Result<DocumentMeta> {
        let settings = self.db.settings();
        let request = CommandRequest::new(Method::Post, EDGE_API)
            .with_param("collection", &self.name)
            .with_param(
                "createCollection",
                options.create_collection.unwrap_or(settings.create_collection),
            )
            .with_param(
                "waitForSync",
                options.wait_for_sync.unwrap_or(settings.wait_for_sync),
            )
            .with_param("from", from)
            .with_param("to", to)
            .with_body(document.clone());
        let mut meta = self
            .dispatch(
                MutationKind::InsertEdge,
                request,
                Some(document),
                None,
                &self.name,
            )
            .await?;
        // Endpoints are fixed at creation; older servers omit them from the
        // response.
        meta.from.get_or_insert_with(|| from.clone());
        meta.to.get_or_insert_with(|| to.clone());
        Ok(meta)
    }

    /// Completely replace a document addressed by id or key.
    pub async fn replace_by_id(
        &self,
        id_or_key: &str,
        document: &Value,
        rev: Option<&Revision>,
        options: &ReplaceOptions,
    ) -> Result<DocumentMeta> {
        let settings = self.db.settings();
        let id = self.qualify(id_or_key);
        let policy = options.policy.unwrap_or(settings.revision_policy);
        let mut request = CommandRequest::new(Method::Put, format!("{}/{}", DOCUMENT_API, id))
            .with_param(
                "waitForSync",
                options.wait_for_sync.unwrap_or(settings.wait_for_sync),
            )
            .with_param("policy", policy.as_str())
            .with_body(document.clone());
        if let Some(rev) = rev {
            request = request.with_param("rev", rev);
        }
        self.dispatch(
            MutationKind::Replace,
            request,
            Some(document),
            rev,
            id.as_str(),
        )
        .await
    }

    /// Partially update a document addressed by id or key.
    pub async fn update_by_id(
        &self,
        id_or_key: &str,
        patch: &Value,
        rev: Option<&Revision>,
        options: &UpdateOptions,
    ) -> Result<DocumentMeta> {
        let settings = self.db.settings();
        let id = self.qualify(id_or_key);
        let policy = options.policy.unwrap_or(settings.revision_policy);
        let mut request = CommandRequest::new(Method::Patch, format!("{}/{}", DOCUMENT_API, id))
            .with_param(
                "keepNull",
                options.keep_null.unwrap_or(settings.keep_null_on_update),
            )
            .with_param(
                "mergeObjects",
                options
                    .merge_objects
                    .unwrap_or(settings.merge_objects_on_update),
            )
            .with_param(
                "waitForSync",
                options.wait_for_sync.unwrap_or(settings.wait_for_sync),
            )
            .with_param("policy", policy.as_str())
            .with_body(patch.clone());
        if let Some(rev) = rev {
            request = request.with_param("rev", rev);
        }
        self.dispatch(MutationKind::Update, request, Some(patch), rev, id.as_str())
            .await
    }

    /// Delete a document addressed by id or key.
    pub async fn remove_by_id(
        &self,
        id_or_key: &str,
        rev: Option<&Revision>,
        options: &RemoveOptions,
    ) -> Result<DocumentMeta> {
        let settings = self.db.settings();
        let id = self.qualify(id_or_key);
        let policy = options.policy.unwrap_or(settings.revision_policy);
        let mut request = CommandRequest::new(Method::Delete, format!("{}/{}", DOCUMENT_API, id))
            .with_param(
                "waitForSync",
                options.wait_for_sync.unwrap_or(settings.wait_for_sync),
            )
            .with_param("policy", policy.as_str());
        if let Some(rev) = rev {
            request = request.with_param("rev", rev);
        }
        self.dispatch(MutationKind::Remove, request, None, rev, id.as_str())
            .await
    }

    /// Read a single document.
    ///
    /// Surfaces `NotFound` when the document does not exist; use
    /// [`RawCollection::try_document`] for the non-erroring variant.
    pub async fn document(&self, id_or_key: &str) -> Result<Value> {
        let id = self.qualify(id_or_key);
        let request = CommandRequest::new(Method::Get, format!("{}/{}", self.kind.api(), id));
        let response = self.db.transport().send(request).await?;
        response.into_result(id.as_str(), None)
    }

    /// Read a single document, converting `NotFound` to `None`.
    pub async fn try_document(&self, id_or_key: &str) -> Result<Option<Value>> {
        match self.document(id_or_key).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Check whether a document exists.
    ///
    /// A missing document is a negative answer, not an error.
    pub async fn exists(&self, id_or_key: &str) -> Result<bool> {
        Ok(self.try_document(id_or_key).await?.is_some())
    }

    /// Read edges starting or ending at a vertex.
    pub async fn edges(
        &self,
        vertex: &DocumentId,
        direction: EdgeDirection,
    ) -> Result<Vec<Value>> {
        let mut request =
            CommandRequest::new(Method::Get, format!("{}/{}", EDGES_API, self.name))
                .with_param("vertex", vertex);
        match direction {
            EdgeDirection::Any => {}
            EdgeDirection::Inbound => request = request.with_param("direction", "in"),
            EdgeDirection::Outbound => request = request.with_param("direction", "out"),
        }
        let response = self.db.transport().send(request).await?;
        let body = response.into_result(vertex.as_str(), None)?;
        let edges = body
            .get("edges")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(edges)
    }

    pub(crate) fn all_request(&self, page: &PageOptions) -> Result<CommandRequest> {
        self.simple_request("all", self.paged(page))
    }

    pub(crate) fn by_example_request(
        &self,
        example: Value,
        page: &PageOptions,
    ) -> Result<CommandRequest> {
        let mut body = self.paged(page);
        body.example = Some(example);
        self.simple_request("by-example", body)
    }

    pub(crate) fn range_request(
        &self,
        attribute: &str,
        left: Value,
        right: Value,
        closed: bool,
        page: &PageOptions,
    ) -> Result<CommandRequest> {
        let mut body = self.paged(page);
        body.attribute = Some(attribute.to_string());
        body.left = Some(left);
        body.right = Some(right);
        body.closed = Some(closed);
        self.simple_request("range", body)
    }

    pub(crate) fn near_request(
        &self,
        latitude: f64,
        longitude: f64,
        options: &GeoQueryOptions,
        page: &PageOptions,
    ) -> Result<CommandRequest> {
        let mut body = self.paged(page);
        body.latitude = Some(latitude);
        body.longitude = Some(longitude);
        body.distance = options.distance.clone();
        body.geo = options.geo.clone();
        self.simple_request("near", body)
    }

    pub(crate) fn within_request(
        &self,
        latitude: f64,
        longitude: f64,
        radius: f64,
        options: &GeoQueryOptions,
        page: &PageOptions,
    ) -> Result<CommandRequest> {
        let mut body = self.paged(page);
        body.latitude = Some(latitude);
        body.longitude = Some(longitude);
        body.radius = Some(radius);
        body.distance = options.distance.clone();
        body.geo = options.geo.clone();
        self.simple_request("within", body)
    }

    pub(crate) fn fulltext_request(
        &self,
        attribute: &str,
        query: &str,
        index: Option<&str>,
        page: &PageOptions,
    ) -> Result<CommandRequest> {
        let mut body = self.paged(page);
        body.attribute = Some(attribute.to_string());
        body.query = Some(query.to_string());
        body.index = index.map(str::to_string);
        self.simple_request("fulltext", body)
    }

    fn paged(&self, page: &PageOptions) -> SimpleQuery {
        SimpleQuery {
            collection: self.name.clone(),
            skip: page.skip,
            limit: page.limit,
            batch_size: page.batch_size.or(self.db.settings().cursor_batch_size),
            ..SimpleQuery::default()
        }
    }

    fn simple_request(&self, command: &str, body: SimpleQuery) -> Result<CommandRequest> {
        Ok(
            CommandRequest::new(Method::Put, format!("{}/{}", SIMPLE_API, command))
                .with_body(serde_json::to_value(&body)?),
        )
    }

    /// Return all documents of the collection as a cursor.
    pub async fn all(&self, page: &PageOptions) -> Result<Cursor<Value>> {
        let request = self.all_request(page)?;
        Cursor::open(Arc::clone(self.db.transport()), request).await
    }

    /// Return all documents matching an example as a cursor.
    pub async fn by_example(&self, example: Value, page: &PageOptions) -> Result<Cursor<Value>> {
        let request = self.by_example_request(example, page)?;
        Cursor::open(Arc::clone(self.db.transport()), request).await
    }

    /// Return documents whose attribute falls within a range, as a cursor.
    ///
    /// With `closed` the upper bound is included; the lower bound always is.
    pub async fn range(
        &self,
        attribute: &str,
        left: Value,
        right: Value,
        closed: bool,
        page: &PageOptions,
    ) -> Result<Cursor<Value>> {
        let request = self.range_request(attribute, left, right, closed, page)?;
        Cursor::open(Arc::clone(self.db.transport()), request).await
    }

    /// Return documents near a coordinate, closest first, as a cursor.
    pub async fn near(
        &self,
        latitude: f64,
        longitude: f64,
        options: &GeoQueryOptions,
        page: &PageOptions,
    ) -> Result<Cursor<Value>> {
        let request = self.near_request(latitude, longitude, options, page)?;
        Cursor::open(Arc::clone(self.db.transport()), request).await
    }

    /// Return documents within a radius around a coordinate, as a cursor.
    pub async fn within(
        &self,
        latitude: f64,
        longitude: f64,
        radius: f64,
        options: &GeoQueryOptions,
        page: &PageOptions,
    ) -> Result<Cursor<Value>> {
        let request = self.within_request(latitude, longitude, radius, options, page)?;
        Cursor::open(Arc::clone(self.db.transport()), request).await
    }

    /// Return documents matching a fulltext query on an indexed attribute,
    /// as a cursor.
    pub async fn fulltext(
        &self,
        attribute: &str,
        query: &str,
        index: Option<&str>,
        page: &PageOptions,
    ) -> Result<Cursor<Value>> {
        let request = self.fulltext_request(attribute, query, index, page)?;
        Cursor::open(Arc::clone(self.db.transport()), request).await
    }

    /// Return one random document of the collection, if it has any.
    pub async fn any(&self) -> Result<Option<Value>> {
        let body = SimpleQuery {
            collection: self.name.clone(),
            ..SimpleQuery::default()
        };
        let request = self.simple_request("any", body)?;
        let response = self.db.transport().send(request).await?;
        let body = response.into_result(&self.name, None)?;
        match body.get("document") {
            None | Some(Value::Null) => Ok(None),
            Some(document) => Ok(Some(document.clone())),
        }
    }

    /// Return the first document matching an example, if any.
    pub async fn first_example(&self, example: Value) -> Result<Option<Value>> {
        let body = SimpleQuery {
            collection: self.name.clone(),
            example: Some(example),
            ..SimpleQuery::default()
        };
        let request = self.simple_request("first-example", body)?;
        let response = self.db.transport().send(request).await?;
        // No match is reported as a 404 status, not an empty result. Any
        // other error status is a real failure and surfaces as such.
        if response.status.error && response.status.code == Some(ERROR_NUM_NO_MATCH) {
            return Ok(None);
        }
        let body = response.into_result(&self.name, None)?;
        Ok(body.get("document").cloned())
    }

    async fn dispatch(
        &self,
        kind: MutationKind,
        request: CommandRequest,
        document: Option<&Value>,
        precondition: Option<&Revision>,
        subject: &str,
    ) -> Result<DocumentMeta> {
        self.db.notify(&MutationEvent {
            collection: &self.name,
            kind,
            document,
            precondition,
        });
        debug!(collection = %self.name, op = kind.as_str(), subject, "dispatching mutation");
        let response = self.db.transport().send(request).await?;
        let body = response.into_result(subject, precondition)?;
        parse_meta(&body)
    }

    pub(crate) fn database(&self) -> &Database {
        &self.db
    }
}

/// Typed collection surface.
///
/// Insert and read produce [`Tracked`] instances; tracked mutations diff
/// against the identity-map snapshot and only ship what changed.
pub struct Collection<T: Document> {
    raw: RawCollection,
    _item: PhantomData<fn() -> T>,
}

impl<T: Document> Collection<T> {
    pub(crate) fn new(raw: RawCollection) -> Self {
        Collection {
            raw,
            _item: PhantomData,
        }
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        self.raw.name()
    }

    /// The untyped operation set beneath this collection.
    pub fn raw(&self) -> &RawCollection {
        &self.raw
    }

    /// Create a new document and start tracking it.
    ///
    /// Server-assigned identifiers are written back through
    /// [`Document::assign_identifiers`]; the post-insert serialized form
    /// becomes the diff baseline.
    pub async fn insert(&self, mut document: T, options: &InsertOptions) -> Result<Tracked<T>> {
        let body = serde_json::to_value(&document)?;
        let meta = self.raw.insert(&body, options).await?;
        document.assign_identifiers(&meta);
        self.start_tracking(document, &meta)
    }

    /// Create a new edge document between two vertices and start tracking
    /// it.
    pub async fn insert_edge(
        &self,
        from: &DocumentId,
        to: &DocumentId,
        mut document: T,
        options: &InsertOptions,
    ) -> Result<Tracked<T>> {
        let body = serde_json::to_value(&document)?;
        let meta = self.raw.insert_edge(from, to, &body, options).await?;
        document.assign_identifiers(&meta);
        let tracked = self.start_tracking(document, &meta)?;
        self.raw
            .database()
            .tracker()
            .set_endpoints(tracked.handle(), from.clone(), to.clone());
        Ok(tracked)
    }

    /// Completely replace a tracked document.
    ///
    /// The target id and revision come from the identity map; under the
    /// `Error` policy the last-known revision is sent as a precondition.
    pub async fn replace(
        &self,
        document: &mut Tracked<T>,
        options: &ReplaceOptions,
    ) -> Result<DocumentMeta> {
        let tracker = self.raw.database().tracker();
        let container = tracker.find_info(document.handle())?;
        let (effective, precondition) = resolve(
            options.policy,
            self.raw.database().settings().revision_policy,
            Some(&container.rev),
        );
        let body = serde_json::to_value(document.get())?;
        let meta = self
            .raw
            .replace_by_id(
                container.id.as_str(),
                &body,
                precondition.as_ref(),
                &ReplaceOptions {
                    policy: Some(effective),
                    wait_for_sync: options.wait_for_sync,
                },
            )
            .await?;
        self.confirm(document, &meta)?;
        Ok(meta)
    }

    /// Partially update a tracked document, shipping only changed fields.
    ///
    /// A clean document is a no-op success: no request is sent and the
    /// current identifiers are returned unchanged.
    pub async fn update(
        &self,
        document: &mut Tracked<T>,
        options: &UpdateOptions,
    ) -> Result<DocumentMeta> {
        let tracker = self.raw.database().tracker();
        let current = serde_json::to_value(document.get())?;
        let (patch, container) = tracker.compute_changes(document.handle(), &current)?;
        if patch.is_empty() {
            debug!(collection = %self.raw.name(), id = %container.id, "document clean, update skipped");
            return Ok(container.meta());
        }
        // A null in a computed patch encodes a field removal, which only
        // takes effect with keepNull off.
        let keep_null = options
            .keep_null
            .or_else(|| patch.values().any(Value::is_null).then_some(false));
        let (effective, precondition) = resolve(
            options.policy,
            self.raw.database().settings().revision_policy,
            Some(&container.rev),
        );
        let meta = self
            .raw
            .update_by_id(
                container.id.as_str(),
                &Value::Object(patch),
                precondition.as_ref(),
                &UpdateOptions {
                    policy: Some(effective),
                    keep_null,
                    merge_objects: options.merge_objects,
                    wait_for_sync: options.wait_for_sync,
                },
            )
            .await?;
        self.confirm(document, &meta)?;
        Ok(meta)
    }

    /// Delete a tracked document and stop tracking it.
    pub async fn remove(
        &self,
        document: &Tracked<T>,
        options: &RemoveOptions,
    ) -> Result<DocumentMeta> {
        let tracker = self.raw.database().tracker();
        let container = tracker.find_info(document.handle())?;
        let (effective, precondition) = resolve(
            options.policy,
            self.raw.database().settings().revision_policy,
            Some(&container.rev),
        );
        let meta = self
            .raw
            .remove_by_id(
                container.id.as_str(),
                precondition.as_ref(),
                &RemoveOptions {
                    policy: Some(effective),
                    wait_for_sync: options.wait_for_sync,
                },
            )
            .await?;
        tracker.stop_tracking(document.handle());
        Ok(meta)
    }

    /// Completely replace a document by explicit id, without tracking.
    pub async fn replace_by_id(
        &self,
        id_or_key: &str,
        document: &T,
        rev: Option<&Revision>,
        options: &ReplaceOptions,
    ) -> Result<DocumentMeta> {
        let body = serde_json::to_value(document)?;
        self.raw.replace_by_id(id_or_key, &body, rev, options).await
    }

    /// Partially update a document by explicit id with a raw patch,
    /// without tracking.
    pub async fn update_by_id(
        &self,
        id_or_key: &str,
        patch: &Value,
        rev: Option<&Revision>,
        options: &UpdateOptions,
    ) -> Result<DocumentMeta> {
        self.raw.update_by_id(id_or_key, patch, rev, options).await
    }

    /// Delete a document by explicit id, without tracking.
    pub async fn remove_by_id(
        &self,
        id_or_key: &str,
        rev: Option<&Revision>,
        options: &RemoveOptions,
    ) -> Result<DocumentMeta> {
        self.raw.remove_by_id(id_or_key, rev, options).await
    }

    /// Read a single document and start tracking it.
    ///
    /// Surfaces `NotFound` when the document does not exist; use
    /// [`Collection::try_document`] for the non-erroring variant.
    pub async fn document(&self, id_or_key: &str) -> Result<Tracked<T>> {
        let body = self.raw.document(id_or_key).await?;
        self.adopt(body)
    }

    /// Read a single document, converting `NotFound` to `None`.
    pub async fn try_document(&self, id_or_key: &str) -> Result<Option<Tracked<T>>> {
        match self.raw.try_document(id_or_key).await? {
            Some(body) => Ok(Some(self.adopt(body)?)),
            None => Ok(None),
        }
    }

    /// Check whether a document exists.
    pub async fn exists(&self, id_or_key: &str) -> Result<bool> {
        self.raw.exists(id_or_key).await
    }

    /// Read edges starting or ending at a vertex.
    pub async fn edges(&self, vertex: &DocumentId, direction: EdgeDirection) -> Result<Vec<T>> {
        let edges = self.raw.edges(vertex, direction).await?;
        edges
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(Error::from))
            .collect()
    }

    /// Return all documents of the collection as a typed cursor.
    pub async fn all(&self, page: &PageOptions) -> Result<Cursor<T>> {
        let request = self.raw.all_request(page)?;
        Cursor::open(Arc::clone(self.raw.database().transport()), request).await
    }

    /// Return all documents matching an example as a typed cursor.
    pub async fn by_example(&self, example: Value, page: &PageOptions) -> Result<Cursor<T>> {
        let request = self.raw.by_example_request(example, page)?;
        Cursor::open(Arc::clone(self.raw.database().transport()), request).await
    }

    /// Return documents whose attribute falls within a range, as a typed
    /// cursor.
    pub async fn range(
        &self,
        attribute: &str,
        left: Value,
        right: Value,
        closed: bool,
        page: &PageOptions,
    ) -> Result<Cursor<T>> {
        let request = self.raw.range_request(attribute, left, right, closed, page)?;
        Cursor::open(Arc::clone(self.raw.database().transport()), request).await
    }

    /// Return documents near a coordinate, closest first, as a typed
    /// cursor.
    pub async fn near(
        &self,
        latitude: f64,
        longitude: f64,
        options: &GeoQueryOptions,
        page: &PageOptions,
    ) -> Result<Cursor<T>> {
        let request = self.raw.near_request(latitude, longitude, options, page)?;
        Cursor::open(Arc::clone(self.raw.database().transport()), request).await
    }

    /// Return documents within a radius around a coordinate, as a typed
    /// cursor.
    pub async fn within(
        &self,
        latitude: f64,
        longitude: f64,
        radius: f64,
        options: &GeoQueryOptions,
        page: &PageOptions,
    ) -> Result<Cursor<T>> {
        let request = self
            .raw
            .within_request(latitude, longitude, radius, options, page)?;
        Cursor::open(Arc::clone(self.raw.database().transport()), request).await
    }

    /// Return documents matching a fulltext query on an indexed attribute,
    /// as a typed cursor.
    pub async fn fulltext(
        &self,
        attribute: &str,
        query: &str,
        index: Option<&str>,
        page: &PageOptions,
    ) -> Result<Cursor<T>> {
        let request = self.raw.fulltext_request(attribute, query, index, page)?;
        Cursor::open(Arc::clone(self.raw.database().transport()), request).await
    }

    /// Return one random document of the collection, if it has any.
    pub async fn any(&self) -> Result<Option<T>> {
        match self.raw.any().await? {
            Some(body) => Ok(Some(serde_json::from_value(body)?)),
            None => Ok(None),
        }
    }

    /// Return the first document matching an example, if any.
    pub async fn first_example(&self, example: Value) -> Result<Option<T>> {
        match self.raw.first_example(example).await? {
            Some(body) => Ok(Some(serde_json::from_value(body)?)),
            None => Ok(None),
        }
    }

    fn start_tracking(&self, document: T, meta: &DocumentMeta) -> Result<Tracked<T>> {
        let tracker = self.raw.database().tracker();
        let handle = tracker.allocate_handle();
        let snapshot = serde_json::to_value(&document)?;
        tracker.track(handle, meta, snapshot)?;
        Ok(Tracked::new(document, handle))
    }

    fn adopt(&self, body: Value) -> Result<Tracked<T>> {
        let meta = parse_meta(&body)?;
        let mut document: T = serde_json::from_value(body)?;
        document.assign_identifiers(&meta);
        self.start_tracking(document, &meta)
    }

    fn confirm(&self, document: &mut Tracked<T>, meta: &DocumentMeta) -> Result<()> {
        document.get_mut().assign_identifiers(meta);
        let snapshot = serde_json::to_value(document.get())?;
        self.raw
            .database()
            .tracker()
            .confirm(document.handle(), meta.rev.clone(), snapshot);
        Ok(())
    }
}
