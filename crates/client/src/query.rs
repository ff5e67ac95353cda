//! Query request shapes
//!
//! [`QueryRequest`] is the body of the initial cursor request for a raw
//! query; [`SimpleQuery`] covers the canned per-collection queries
//! (`all`, `by-example`, `first-example`, `any`, `range`, `near`,
//! `within`, `fulltext`). Both serialize camelCase with unset options
//! omitted, matching what the server expects.

use serde::Serialize;
use serde_json::{Map, Value};

/// Body of a raw query's initial cursor request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Query text
    pub query: String,
    /// Named bind parameters
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub bind_vars: Map<String, Value>,
    /// Maximum items transferred per batch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    /// Request total-count semantics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<bool>,
    /// Server-side cursor time-to-live, seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<f64>,
    /// Optional execution options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<QueryOptions>,
}

impl QueryRequest {
    /// A query with no bind parameters and default options.
    pub fn new(query: impl Into<String>) -> Self {
        QueryRequest {
            query: query.into(),
            bind_vars: Map::new(),
            batch_size: None,
            count: None,
            ttl: None,
            options: None,
        }
    }

    /// Bind a named parameter.
    pub fn bind(mut self, name: impl Into<String>, value: Value) -> Self {
        self.bind_vars.insert(name.into(), value);
        self
    }

    /// Limit the number of items per batch.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    /// Ask the server to report the total result count.
    pub fn with_count(mut self) -> Self {
        self.count = Some(true);
        self
    }

    /// Set the server-side cursor time-to-live.
    pub fn ttl(mut self, seconds: f64) -> Self {
        self.ttl = Some(seconds);
        self
    }

    /// Request the full count of results before any final limit.
    pub fn full_count(mut self) -> Self {
        self.options = Some(QueryOptions { full_count: true });
        self
    }
}

/// Execution options of a raw query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    /// Report the result count before a final limit is applied
    pub full_count: bool,
}

/// Body of a canned per-collection query.
///
/// One bag for every simple command; each command reads the fields it
/// understands and the rest stay unset.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleQuery {
    /// Target collection
    pub collection: String,
    /// Example document for by-example matching
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Attribute targeted by range and fulltext commands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    /// Lower bound of a range scan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<Value>,
    /// Upper bound of a range scan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<Value>,
    /// Whether the range includes the upper bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
    /// Latitude for geo commands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude for geo commands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Maximal radius for within, in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Attribute name to report computed distances under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    /// Identifier of the geo index to use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<String>,
    /// Fulltext query text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Identifier of the fulltext index to use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// Number of documents to skip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<usize>,
    /// Maximum number of documents to return
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Maximum items transferred per batch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
}
