//! Graph node/edge types and a Cypher-subset pattern matcher.
//!
//! Nodes are stored in an arena and addressed by an integer handle rather
//! than by owning pointers to one another, per the redesign note in
//! `SPEC_FULL.md` §3/§9: an arena plus integer `NodeId`s sidesteps the
//! reference cycles a direct-pointer graph representation would need
//! `Rc`/`Weak` gymnastics to avoid.

use std::collections::HashMap;

use crate::value::Value;

/// An arena-relative handle to a [`GraphNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// A single graph node: zero or more labels plus a property map.
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// This node's arena handle.
    pub id: NodeId,
    /// The labels attached to this node.
    pub labels: Vec<String>,
    /// This node's properties.
    pub properties: HashMap<String, Value>,
}

/// A directed, labeled edge between two nodes.
#[derive(Debug, Clone)]
pub struct Edge {
    /// The source node.
    pub from: NodeId,
    /// The destination node.
    pub to: NodeId,
    /// The edge's relationship type.
    pub label: String,
}

/// The direction a [`EdgePattern`] must match relative to the anchor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    /// The anchor node must be the edge's source.
    Outgoing,
    /// The anchor node must be the edge's destination.
    Incoming,
    /// The edge may point either way relative to the anchor node.
    Bidirectional,
}

/// An edge constraint attached to a [`Pattern`].
#[derive(Debug, Clone)]
pub struct EdgePattern {
    /// The required relationship type, if any.
    pub rel_type: Option<String>,
    /// The direction the edge must traverse relative to the anchor node.
    pub direction: EdgeDirection,
    /// A caller-chosen variable name bound to the matched neighbor node.
    pub target_var: String,
}

/// A single `MATCH` pattern: an anchor node constraint plus an optional
/// edge constraint to a neighbor.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// A caller-chosen variable name bound to the matched anchor node.
    pub node_var: String,
    /// Labels the anchor node must carry at least one of, if any are
    /// specified (an empty list matches any node).
    pub labels: Vec<String>,
    /// Property equality constraints the anchor node must satisfy.
    pub properties: Vec<(String, Value)>,
    /// An optional constraint on an edge from the anchor node.
    pub edge: Option<EdgePattern>,
}

/// A single matched binding: the anchor node and, if the pattern
/// specified an edge, the matched neighbor.
#[derive(Debug, Clone)]
pub struct Match {
    /// The anchor node that satisfied the pattern.
    pub anchor: NodeId,
    /// The neighbor node reached via the pattern's edge constraint, if any.
    pub neighbor: Option<NodeId>,
}

fn node_matches(node: &GraphNode, pattern: &Pattern) -> bool {
    if !pattern.labels.is_empty() && !pattern.labels.iter().any(|l| node.labels.contains(l)) {
        return false;
    }
    pattern
        .properties
        .iter()
        .all(|(key, expected)| node.properties.get(key).is_some_and(|actual| actual == expected))
}

fn edge_matches(edge: &Edge, anchor: NodeId, edge_pattern: &EdgePattern) -> Option<NodeId> {
    if let Some(rel_type) = &edge_pattern.rel_type {
        if &edge.label != rel_type {
            return None;
        }
    }
    match edge_pattern.direction {
        EdgeDirection::Outgoing if edge.from == anchor => Some(edge.to),
        EdgeDirection::Incoming if edge.to == anchor => Some(edge.from),
        EdgeDirection::Bidirectional if edge.from == anchor => Some(edge.to),
        EdgeDirection::Bidirectional if edge.to == anchor => Some(edge.from),
        _ => None,
    }
}

/// Matches `pattern` against every node in `nodes`, following `edges` for
/// the pattern's edge constraint if one is present.
///
/// A node matches if its label set intersects `pattern.labels` (when
/// non-empty) and every key in `pattern.properties` is present on the node
/// with an equal value. When `pattern.edge` is set, only anchors with at
/// least one qualifying edge produce a match (one [`Match`] per
/// qualifying edge); when it is unset, every matching anchor produces a
/// single [`Match`] with `neighbor: None`.
#[must_use]
pub fn match_pattern(nodes: &[GraphNode], edges: &[Edge], pattern: &Pattern) -> Vec<Match> {
    let mut matches = Vec::new();
    for node in nodes {
        if !node_matches(node, pattern) {
            continue;
        }
        match &pattern.edge {
            None => matches.push(Match {
                anchor: node.id,
                neighbor: None,
            }),
            Some(edge_pattern) => {
                for edge in edges {
                    if let Some(neighbor) = edge_matches(edge, node.id, edge_pattern) {
                        matches.push(Match {
                            anchor: node.id,
                            neighbor: Some(neighbor),
                        });
                    }
                }
            }
        }
    }
    matches
}
