//! Graph management commands
//!
//! Create, fetch, and drop named graphs. A graph is defined by its edge
//! definitions (edge collection plus allowed from/to vertex collections)
//! and optional orphan vertex collections.

use crate::database::Database;
use crate::transport::{CommandRequest, Method};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vellum_core::Result;

const GRAPH_API: &str = "_api/gharial";

/// One edge definition of a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDefinition {
    /// Edge collection name
    pub collection: String,
    /// Allowed start-vertex collections
    pub from: Vec<String>,
    /// Allowed end-vertex collections
    pub to: Vec<String>,
}

/// Description of a named graph as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphInfo {
    /// Graph name
    #[serde(alias = "_key")]
    pub name: String,
    /// Edge definitions
    #[serde(default)]
    pub edge_definitions: Vec<EdgeDefinition>,
    /// Vertex collections not referenced by any edge definition
    #[serde(default)]
    pub orphan_collections: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateGraphBody<'a> {
    name: &'a str,
    edge_definitions: &'a [EdgeDefinition],
    #[serde(skip_serializing_if = "Option::is_none")]
    orphan_collections: Option<&'a [String]>,
}

impl Database {
    /// Create a named graph.
    pub async fn create_graph(
        &self,
        name: &str,
        edge_definitions: &[EdgeDefinition],
        orphan_collections: Option<&[String]>,
    ) -> Result<GraphInfo> {
        debug!(graph = name, "creating graph");
        let body = serde_json::to_value(CreateGraphBody {
            name,
            edge_definitions,
            orphan_collections,
        })?;
        let request = CommandRequest::new(Method::Post, GRAPH_API).with_body(body);
        let response = self.transport().send(request).await?;
        let body = response.into_result(name, None)?;
        let info = serde_json::from_value(body["graph"].clone())?;
        Ok(info)
    }

    /// Fetch a named graph's definition.
    pub async fn graph(&self, name: &str) -> Result<GraphInfo> {
        let request = CommandRequest::new(Method::Get, format!("{}/{}", GRAPH_API, name));
        let response = self.transport().send(request).await?;
        let body = response.into_result(name, None)?;
        let info = serde_json::from_value(body["graph"].clone())?;
        Ok(info)
    }

    /// Drop a named graph.
    ///
    /// With `drop_collections`, its collections are dropped too unless
    /// another graph uses them.
    pub async fn drop_graph(&self, name: &str, drop_collections: bool) -> Result<()> {
        debug!(graph = name, drop_collections, "dropping graph");
        let request = CommandRequest::new(Method::Delete, format!("{}/{}", GRAPH_API, name))
            .with_param("dropCollections", drop_collections);
        let response = self.transport().send(request).await?;
        response.into_result(name, None)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_edge_definition_wire_shape() {
        let def = EdgeDefinition {
            collection: "knows".into(),
            from: vec!["people".into()],
            to: vec!["people".into()],
        };
        let body = serde_json::to_value(&def).unwrap();
        assert_eq!(
            body,
            json!({"collection": "knows", "from": ["people"], "to": ["people"]})
        );
    }

    #[test]
    fn test_graph_info_accepts_key_alias() {
        let info: GraphInfo = serde_json::from_value(json!({
            "_key": "social",
            "edgeDefinitions": [
                {"collection": "knows", "from": ["people"], "to": ["people"]}
            ],
        }))
        .unwrap();
        assert_eq!(info.name, "social");
        assert_eq!(info.edge_definitions.len(), 1);
        assert!(info.orphan_collections.is_empty());
    }
}
