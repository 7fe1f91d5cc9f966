//! A graph backend: an arena of nodes plus an edge list, queried through
//! the Cypher subset implemented in [`crate::graph`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::{match_pattern, Edge, GraphNode, NodeId, Pattern};
use crate::storage::{Capabilities, EngineMetrics, StorageEngine, StorageKey};
use crate::value::Value;

/// The JSON shape `save` accepts: either a new node or a new edge.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind")]
enum GraphWrite {
    /// Adds a node with the given labels and properties.
    Node {
        labels: Vec<String>,
        properties: std::collections::HashMap<String, Value>,
    },
    /// Adds an edge between two already-saved nodes.
    Edge { from: u32, to: u32, label: String },
}

/// An in-memory graph store: nodes addressed by an integer arena handle,
/// edges stored as a flat adjacency list.
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: Vec<GraphNode>,
    edges: Vec<Edge>,
}

impl GraphStore {
    /// Builds an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrows all nodes.
    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Borrows all edges.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Runs a `MATCH` pattern against this graph.
    #[must_use]
    pub fn match_pattern(&self, pattern: &Pattern) -> Vec<crate::graph::Match> {
        match_pattern(&self.nodes, &self.edges, pattern)
    }
}

#[async_trait]
impl StorageEngine for GraphStore {
    async fn save(&mut self, bytes: &[u8]) -> Result<StorageKey> {
        let write: GraphWrite = serde_json::from_slice(bytes)?;
        match write {
            GraphWrite::Node { labels, properties } => {
                let id = NodeId(self.nodes.len() as u32);
                self.nodes.push(GraphNode { id, labels, properties });
                Ok(StorageKey(u64::from(id.0)))
            }
            GraphWrite::Edge { from, to, label } => {
                let from_id = NodeId(from);
                let to_id = NodeId(to);
                if !self.nodes.iter().any(|n| n.id == from_id) || !self.nodes.iter().any(|n| n.id == to_id) {
                    return Err(Error::not_found("edge endpoint references an unknown node"));
                }
                self.edges.push(Edge { from: from_id, to: to_id, label });
                Ok(StorageKey(self.edges.len() as u64 - 1))
            }
        }
    }

    async fn load(&self, key: &StorageKey) -> Result<Vec<u8>> {
        let node = self
            .nodes
            .iter()
            .find(|n| u64::from(n.id.0) == key.0)
            .ok_or_else(|| Error::not_found(format!("no node with id {}", key.0)))?;
        Ok(serde_json::to_vec(&(node.labels.clone(), node.properties.clone()))?)
    }

    async fn query(&self, query: &str) -> Result<Vec<Value>> {
        let trimmed = query.trim();
        if !trimmed.to_uppercase().starts_with("MATCH") {
            return Err(Error::not_implemented("GraphStore only supports MATCH ... RETURN ... queries"));
        }
        Err(Error::not_implemented(
            "parsing MATCH text into a Pattern is the responsibility of the (external, out-of-scope) query front end; use match_pattern directly",
        ))
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            graph: true,
            ..Capabilities::default()
        }
    }

    fn metrics(&self) -> EngineMetrics {
        EngineMetrics {
            read_latency_ms: 0.3,
            write_latency_ms: 0.2,
            compression_ratio: 1.0,
            throughput_mbps: 80.0,
        }
    }

    async fn deinit(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeDirection, EdgePattern};

    #[tokio::test]
    async fn save_node_then_edge_then_match() {
        let mut store = GraphStore::new();
        let alice = GraphWrite::Node {
            labels: vec!["Person".into()],
            properties: std::collections::HashMap::new(),
        };
        let bob = GraphWrite::Node {
            labels: vec!["Person".into()],
            properties: std::collections::HashMap::new(),
        };
        store.save(&serde_json::to_vec(&alice).unwrap()).await.unwrap();
        store.save(&serde_json::to_vec(&bob).unwrap()).await.unwrap();
        let edge = GraphWrite::Edge {
            from: 0,
            to: 1,
            label: "KNOWS".into(),
        };
        store.save(&serde_json::to_vec(&edge).unwrap()).await.unwrap();

        let pattern = Pattern {
            node_var: "n".into(),
            labels: vec!["Person".into()],
            properties: Vec::new(),
            edge: Some(EdgePattern {
                rel_type: Some("KNOWS".into()),
                direction: EdgeDirection::Outgoing,
                target_var: "m".into(),
            }),
        };
        let matches = store.match_pattern(&pattern);
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test]
    async fn edge_to_unknown_node_is_not_found() {
        let mut store = GraphStore::new();
        let edge = GraphWrite::Edge {
            from: 0,
            to: 1,
            label: "KNOWS".into(),
        };
        let err = store.save(&serde_json::to_vec(&edge).unwrap()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn capabilities_declare_graph_only() {
        let store = GraphStore::new();
        assert!(store.capabilities().graph);
        assert!(!store.capabilities().olap);
    }
}
