//! Core graph data structure.
//!
//! TrustGraph wraps petgraph and adds an id index plus an edge dedup set.
//! Builders write to it; the scorer and neighborhood extraction only read.

use crate::edge::{EdgeKey, TrustEdge};
use crate::error::{GraphError, Result};
use crate::node::{NodeUpdate, TrustNode, ORGANIZATION_ROLE};
use chrono::{DateTime, Utc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use trellis_core::DEFAULT_ROLE;

/// Index of a node inside one graph. Not stable across graphs.
pub type NodeId = NodeIndex;

/// The organization's trust graph.
///
/// Nodes are unique by id. Edges are unique by (from, to, credential id)
/// and iterate in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustGraph {
    pub(crate) graph: DiGraph<TrustNode, TrustEdge>,

    /// Maps identity ids to graph node indexes.
    id_index: HashMap<String, NodeId>,

    /// Dedup keys of every edge already present.
    edge_keys: HashSet<EdgeKey>,

    /// The organization's own identifier.
    root: String,

    built_at: DateTime<Utc>,
}

impl Default for TrustGraph {
    /// A graph with no nodes at all, not even a root.
    fn default() -> Self {
        Self {
            graph: DiGraph::new(),
            id_index: HashMap::new(),
            edge_keys: HashSet::new(),
            root: String::new(),
            built_at: Utc::now(),
        }
    }
}

impl TrustGraph {
    /// Creates a graph seeded with the root node.
    pub fn new(root: impl Into<String>) -> Self {
        let mut graph = Self::unseeded(root);
        let root_node = TrustNode::new(graph.root.clone()).with_role(ORGANIZATION_ROLE);
        graph.insert_node(root_node);
        graph
    }

    /// Creates a graph that names `root` but holds no nodes yet.
    pub(crate) fn unseeded(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub(crate) fn stamp(&mut self, at: DateTime<Utc>) {
        self.built_at = at;
    }

    /// Adds a node, or applies `update` to the existing node with that id.
    pub fn add_or_update_node(&mut self, id: &str, update: NodeUpdate) -> NodeId {
        if let Some(&index) = self.id_index.get(id) {
            let node = &mut self.graph[index];
            if let Some(alias) = update.alias {
                node.alias = Some(alias);
            }
            if let Some(role) = update.role {
                node.role = role;
            }
            if let Some(at) = update.seen_at {
                node.observe(at);
            }
            node.credential_count += update.credentials;
            return index;
        }

        let mut node = TrustNode::new(id);
        node.alias = update.alias;
        node.role = update.role.unwrap_or_else(|| DEFAULT_ROLE.to_string());
        node.joined_at = update.seen_at;
        node.credential_count = update.credentials;
        self.insert_node(node)
    }

    /// Inserts a node as-is, replacing any node with the same id.
    pub(crate) fn insert_node(&mut self, node: TrustNode) -> NodeId {
        if let Some(&index) = self.id_index.get(&node.id) {
            self.graph[index] = node;
            return index;
        }
        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.id_index.insert(id, index);
        index
    }

    /// Adds an edge unless one with the same (from, to, credential id)
    /// already exists.
    ///
    /// Returns `Ok(true)` when the edge was added, `Ok(false)` for a
    /// duplicate. Both endpoints must already be nodes.
    pub fn add_edge(&mut self, edge: TrustEdge) -> Result<bool> {
        let (from, to) = match (self.get_index(&edge.from), self.get_index(&edge.to)) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                return Err(GraphError::MissingEndpoint {
                    from: edge.from,
                    to: edge.to,
                })
            }
        };

        if !self.edge_keys.insert(edge.key()) {
            return Ok(false);
        }
        self.graph.add_edge(from, to, edge);
        Ok(true)
    }

    /// True when an edge with this dedup key is present.
    pub fn contains_edge(&self, from: &str, to: &str, credential_id: &str) -> bool {
        self.edge_keys
            .contains(&(from.to_string(), to.to_string(), credential_id.to_string()))
    }

    /// Gets a node by its id.
    pub fn get_by_id(&self, id: &str) -> Option<&TrustNode> {
        let index = self.id_index.get(id)?;
        self.graph.node_weight(*index)
    }

    /// Gets a node by its graph index.
    pub fn get(&self, index: NodeId) -> Option<&TrustNode> {
        self.graph.node_weight(index)
    }

    /// Gets the node index for an id.
    pub fn get_index(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.id_index.contains_key(id)
    }

    /// Edges issued by `id`, in insertion order.
    pub fn outgoing(&self, id: &str) -> Vec<&TrustEdge> {
        self.edges_directed(id, Direction::Outgoing)
    }

    /// Edges whose subject is `id`, in insertion order.
    pub fn incoming(&self, id: &str) -> Vec<&TrustEdge> {
        self.edges_directed(id, Direction::Incoming)
    }

    fn edges_directed(&self, id: &str, direction: Direction) -> Vec<&TrustEdge> {
        let Some(index) = self.get_index(id) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(index, direction)
            .map(|edge_ref| (edge_ref.id(), edge_ref.weight()))
            .collect();
        // petgraph walks adjacency lists newest-first
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, edge)| edge).collect()
    }

    /// True when `a` and `b` are distinct and edges run both ways between
    /// them, whatever their kinds.
    pub fn is_bidirectional(&self, a: &str, b: &str) -> bool {
        if a == b {
            return false;
        }
        match (self.get_index(a), self.get_index(b)) {
            (Some(a), Some(b)) => {
                self.graph.find_edge(a, b).is_some() && self.graph.find_edge(b, a).is_some()
            }
            _ => false,
        }
    }

    /// Sets the bidirectional flag on every edge that has a reverse
    /// counterpart and clears it everywhere else.
    pub fn mark_bidirectional(&mut self) {
        let flags: Vec<bool> = self
            .graph
            .edge_references()
            .map(|edge_ref| {
                edge_ref.source() != edge_ref.target()
                    && self
                        .graph
                        .find_edge(edge_ref.target(), edge_ref.source())
                        .is_some()
            })
            .collect();

        for (edge, flag) in self.graph.edge_weights_mut().zip(flags) {
            edge.bidirectional = flag;
        }
    }

    /// Neighbors of `index` along edges in either direction.
    pub(crate) fn neighbors_undirected(&self, index: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.neighbors_undirected(index)
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterates over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &TrustNode> {
        self.graph.node_weights()
    }

    /// Iterates over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &TrustEdge> {
        self.graph.edge_weights()
    }

    /// Iterates over all node indexes.
    pub fn node_indexes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            bidirectional_edges: self.edges().filter(|e| e.bidirectional).count(),
        }
    }

    /// Flattens the graph for serialization.
    ///
    /// Nodes are sorted by id so the output is stable.
    pub fn export(&self) -> GraphExport {
        let mut nodes: Vec<TrustNode> = self.nodes().cloned().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        GraphExport {
            root: self.root.clone(),
            built_at: self.built_at,
            nodes,
            edges: self.edges().cloned().collect(),
        }
    }
}

/// Graph statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub bidirectional_edges: usize,
}

/// A flat, serializable view of a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphExport {
    pub root: String,
    pub built_at: DateTime<Utc>,
    pub nodes: Vec<TrustNode>,
    pub edges: Vec<TrustEdge>,
}
