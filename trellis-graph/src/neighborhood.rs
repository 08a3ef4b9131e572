//! Breadth-first traversal and neighborhood extraction.
//!
//! Trust relationships are navigable both ways for distance purposes, so
//! every traversal here treats edges as undirected.

use crate::graph::{NodeId, TrustGraph};
use crate::node::TrustNode;
use std::collections::{HashMap, HashSet, VecDeque};

/// Hop distance from `start` to every node it can reach, ignoring edge
/// direction.
///
/// With `max_depth` set, nodes further than that many hops are left out.
pub fn undirected_distances(
    graph: &TrustGraph,
    start: NodeId,
    max_depth: Option<usize>,
) -> HashMap<NodeId, usize> {
    let mut distances: HashMap<NodeId, usize> = HashMap::new();
    if graph.get(start).is_none() {
        return distances;
    }

    let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();
    distances.insert(start, 0);
    queue.push_back((start, 0));

    while let Some((current, depth)) = queue.pop_front() {
        if max_depth.is_some_and(|max| depth >= max) {
            continue;
        }
        for neighbor in graph.neighbors_undirected(current) {
            if distances.contains_key(&neighbor) {
                continue;
            }
            distances.insert(neighbor, depth + 1);
            queue.push_back((neighbor, depth + 1));
        }
    }

    distances
}

/// Returns the subgraph induced by the nodes within `depth` hops of `id`.
///
/// `id` is always present, even when it has no relationships or is not in
/// `graph` at all. A depth of zero yields the node alone, without edges.
/// The result keeps the source graph's root id and build time; the root
/// node itself is only included when it falls inside the neighborhood.
pub fn extract_neighborhood(graph: &TrustGraph, id: &str, depth: usize) -> TrustGraph {
    let mut sub = TrustGraph::unseeded(graph.root());
    sub.stamp(graph.built_at());

    let Some(start) = graph.get_index(id) else {
        sub.insert_node(TrustNode::new(id));
        return sub;
    };

    let reached = undirected_distances(graph, start, Some(depth));
    let mut indexes: Vec<NodeId> = reached.keys().copied().collect();
    indexes.sort();

    let mut ids: HashSet<&str> = HashSet::new();
    for index in indexes {
        if let Some(node) = graph.get(index) {
            ids.insert(node.id.as_str());
            sub.insert_node(node.clone());
        }
    }

    if depth > 0 {
        for edge in graph.edges() {
            if ids.contains(edge.from.as_str()) && ids.contains(edge.to.as_str()) {
                // Both endpoints were inserted above, so this cannot fail
                let _ = sub.add_edge(edge.clone());
            }
        }
    }

    sub.mark_bidirectional();
    sub
}
