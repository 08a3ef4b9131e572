//! Trust scoring.
//!
//! A node's score combines how many credentials it holds, how many distinct
//! identities issued them, how many of its relationships are mutual, and
//! how far it sits from the organization root:
//!
//! ```text
//! score = incoming × w_incoming
//!       + unique_issuers × w_issuer
//!       + bidirectional × w_bidirectional
//!       − depth × w_depth            (reachable nodes only)
//!       + w_org_bonus                (if the root issued any incoming credential)
//! ```
//!
//! Scoring is a pure function of the graph. The calculator keeps no state
//! beyond its weights.

use crate::graph::{NodeId, TrustGraph};
use crate::neighborhood::undirected_distances;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Depth reported for nodes with no path to the root.
pub const UNREACHABLE_DEPTH: i32 = -1;

/// Coefficients of the scoring formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoreWeights {
    /// Per incoming credential.
    pub incoming_credential: f64,
    /// Per distinct issuer among incoming credentials.
    pub unique_issuer: f64,
    /// Per incoming credential that is part of a mutual relationship.
    pub bidirectional_relation: f64,
    /// Subtracted per hop from the root.
    pub depth_penalty: f64,
    /// Added once when the root issued any incoming credential.
    pub org_issued_bonus: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            incoming_credential: 1.0,
            unique_issuer: 2.0,
            bidirectional_relation: 3.0,
            depth_penalty: 0.1,
            org_issued_bonus: 2.0,
        }
    }
}

impl ScoreWeights {
    /// Applies the formula to a set of structural factors.
    pub fn apply(&self, factors: &ScoreFactors) -> f64 {
        let mut score = factors.incoming_credentials as f64 * self.incoming_credential
            + factors.unique_issuers as f64 * self.unique_issuer
            + factors.bidirectional_relations as f64 * self.bidirectional_relation;

        if factors.graph_depth >= 0 {
            score -= factors.graph_depth as f64 * self.depth_penalty;
        }
        if factors.org_issued {
            score += self.org_issued_bonus;
        }
        score
    }
}

/// The structural inputs to a node's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreFactors {
    pub incoming_credentials: usize,
    pub unique_issuers: usize,
    pub bidirectional_relations: usize,
    pub graph_depth: i32,
    pub org_issued: bool,
}

/// A node's score and the metrics behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub id: String,
    pub alias: Option<String>,
    pub role: String,
    pub incoming_credentials: usize,
    pub outgoing_credentials: usize,
    pub unique_issuers: usize,
    pub bidirectional_relations: usize,
    /// Hops from the root, or [`UNREACHABLE_DEPTH`].
    pub graph_depth: i32,
    /// Whether the root issued one of this node's credentials.
    pub org_issued: bool,
    pub score: f64,
}

impl Score {
    /// The score of an identity that is not in the graph.
    pub fn absent(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            alias: None,
            role: String::new(),
            incoming_credentials: 0,
            outgoing_credentials: 0,
            unique_issuers: 0,
            bidirectional_relations: 0,
            graph_depth: UNREACHABLE_DEPTH,
            org_issued: false,
            score: 0.0,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.graph_depth >= 0
    }

    /// Ranking order: score descending, then depth ascending, then id.
    ///
    /// Unreachable nodes carry depth -1 but rank after every reachable
    /// depth on a tie, not before depth 0.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| depth_rank(self.graph_depth).cmp(&depth_rank(other.graph_depth)))
            .then_with(|| self.id.cmp(&other.id))
    }
}

fn depth_rank(depth: i32) -> u32 {
    u32::try_from(depth).unwrap_or(u32::MAX)
}

/// Aggregate statistics over every node's score.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub mean_score: f64,
    pub max_score: f64,
    pub min_score: f64,
    /// Median depth over nodes reachable from the root.
    pub median_depth: f64,
    /// Edges flagged as part of a mutual relationship.
    pub bidirectional_relations: usize,
}

/// Computes scores over a built graph.
#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    weights: ScoreWeights,
}

impl ScoreCalculator {
    /// Creates a calculator with the default weights.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Scores one identity.
    ///
    /// An id that is not in the graph gets [`Score::absent`].
    pub fn calculate_score(&self, graph: &TrustGraph, id: &str) -> Score {
        let depths = root_distances(graph);
        self.score_with_depths(graph, id, &depths)
    }

    /// Scores every node, ordered by id.
    pub fn calculate_all_scores(&self, graph: &TrustGraph) -> Vec<Score> {
        let depths = root_distances(graph);
        let mut ids: Vec<&str> = graph.nodes().map(|n| n.id.as_str()).collect();
        ids.sort_unstable();

        ids.into_iter()
            .map(|id| self.score_with_depths(graph, id, &depths))
            .collect()
    }

    /// The `n` highest-ranked scores, ordered by [`Score::rank_cmp`].
    ///
    /// Score ties go to the node closer to the root. Unreachable nodes
    /// come after all reachable ones.
    pub fn top_scores(&self, graph: &TrustGraph, n: usize) -> Vec<Score> {
        let mut scores = self.calculate_all_scores(graph);
        scores.sort_by(Score::rank_cmp);
        scores.truncate(n);
        scores
    }

    /// Aggregates all scores.
    ///
    /// A graph with no nodes besides the root gives an all-zero summary,
    /// including `total_nodes`.
    pub fn calculate_summary(&self, graph: &TrustGraph) -> ScoreSummary {
        // Only the root, or nothing at all: no members to summarize yet
        if graph.nodes().all(|node| node.id == graph.root()) {
            return ScoreSummary::default();
        }
        let scores = self.calculate_all_scores(graph);

        let total: f64 = scores.iter().map(|s| s.score).sum();
        let max_score = scores
            .iter()
            .map(|s| s.score)
            .fold(f64::NEG_INFINITY, f64::max);
        let min_score = scores.iter().map(|s| s.score).fold(f64::INFINITY, f64::min);

        let mut depths: Vec<i32> = scores
            .iter()
            .filter(|s| s.is_reachable())
            .map(|s| s.graph_depth)
            .collect();
        depths.sort_unstable();

        ScoreSummary {
            total_nodes: graph.node_count(),
            total_edges: graph.edge_count(),
            mean_score: total / scores.len() as f64,
            max_score,
            min_score,
            median_depth: median(&depths),
            bidirectional_relations: graph.edges().filter(|e| e.bidirectional).count(),
        }
    }

    fn score_with_depths(
        &self,
        graph: &TrustGraph,
        id: &str,
        depths: &HashMap<NodeId, usize>,
    ) -> Score {
        let Some(node) = graph.get_by_id(id) else {
            return Score::absent(id);
        };

        let incoming = graph.incoming(id);
        let outgoing = graph.outgoing(id);

        let issuers: HashSet<&str> = incoming.iter().map(|e| e.from.as_str()).collect();
        let factors = ScoreFactors {
            incoming_credentials: incoming.len(),
            unique_issuers: issuers.len(),
            bidirectional_relations: incoming.iter().filter(|e| e.bidirectional).count(),
            graph_depth: depth_of(graph, id, depths),
            org_issued: incoming.iter().any(|e| e.from == graph.root()),
        };

        Score {
            id: node.id.clone(),
            alias: node.alias.clone(),
            role: node.role.clone(),
            incoming_credentials: factors.incoming_credentials,
            outgoing_credentials: outgoing.len(),
            unique_issuers: factors.unique_issuers,
            bidirectional_relations: factors.bidirectional_relations,
            graph_depth: factors.graph_depth,
            org_issued: factors.org_issued,
            score: self.weights.apply(&factors),
        }
    }
}

fn root_distances(graph: &TrustGraph) -> HashMap<NodeId, usize> {
    match graph.get_index(graph.root()) {
        Some(root) => undirected_distances(graph, root, None),
        None => HashMap::new(),
    }
}

fn depth_of(graph: &TrustGraph, id: &str, depths: &HashMap<NodeId, usize>) -> i32 {
    if id == graph.root() {
        return 0;
    }
    graph
        .get_index(id)
        .and_then(|index| depths.get(&index))
        .and_then(|depth| i32::try_from(*depth).ok())
        .unwrap_or(UNREACHABLE_DEPTH)
}

fn median(sorted: &[i32]) -> f64 {
    match sorted.len() {
        0 => 0.0,
        len if len % 2 == 1 => sorted[len / 2] as f64,
        len => (sorted[len / 2 - 1] as f64 + sorted[len / 2] as f64) / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::{EdgeKind, TrustEdge};
    use crate::node::NodeUpdate;
    use chrono::Utc;

    const EPSILON: f64 = 1e-9;

    fn link(graph: &mut TrustGraph, from: &str, to: &str, cred: &str, kind: EdgeKind) {
        for id in [from, to] {
            graph.add_or_update_node(id, NodeUpdate::default());
        }
        graph
            .add_edge(TrustEdge::new(from, to, kind, cred, Utc::now()))
            .unwrap();
    }

    /// org→A membership, org→B steward, A→B invitation, B→A invitation
    fn example() -> TrustGraph {
        let mut graph = TrustGraph::new("org");
        link(&mut graph, "org", "A", "c1", EdgeKind::Membership);
        link(&mut graph, "org", "B", "c2", EdgeKind::Steward);
        link(&mut graph, "A", "B", "c3", EdgeKind::Invitation);
        link(&mut graph, "B", "A", "c4", EdgeKind::Invitation);
        graph.mark_bidirectional();
        graph
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_example_scores() {
        let graph = example();
        let calc = ScoreCalculator::new();

        let b = calc.calculate_score(&graph, "B");
        assert_eq!(b.incoming_credentials, 2);
        assert_eq!(b.outgoing_credentials, 1);
        assert_eq!(b.unique_issuers, 2);
        assert_eq!(b.bidirectional_relations, 1);
        assert_eq!(b.graph_depth, 1);
        assert!(b.org_issued);
        // 2×1 + 2×2 + 1×3 − 1×0.1 + 2
        assert_close(b.score, 10.9);

        let root = calc.calculate_score(&graph, "org");
        assert_eq!(root.graph_depth, 0);
        assert_eq!(root.incoming_credentials, 0);
        assert_eq!(root.outgoing_credentials, 2);
        assert_close(root.score, 0.0);
    }

    #[test]
    fn test_absent_id_scores_zero() {
        let score = ScoreCalculator::new().calculate_score(&example(), "nobody");
        assert_eq!(score, Score::absent("nobody"));
        assert_eq!(score.graph_depth, UNREACHABLE_DEPTH);
    }

    #[test]
    fn test_unreachable_node_has_no_depth_penalty() {
        let mut graph = example();
        link(&mut graph, "x", "y", "c9", EdgeKind::Invitation);

        let y = ScoreCalculator::new().calculate_score(&graph, "y");
        assert_eq!(y.graph_depth, UNREACHABLE_DEPTH);
        assert!(!y.org_issued);
        // 1×1 + 1×2, nothing subtracted
        assert_close(y.score, 3.0);
    }

    #[test]
    fn test_adding_edge_never_increases_depth() {
        let mut graph = TrustGraph::new("org");
        link(&mut graph, "org", "a", "c1", EdgeKind::Membership);
        link(&mut graph, "a", "b", "c2", EdgeKind::Invitation);
        link(&mut graph, "b", "c", "c3", EdgeKind::Invitation);
        let calc = ScoreCalculator::new();

        let before: HashMap<String, i32> = calc
            .calculate_all_scores(&graph)
            .into_iter()
            .map(|s| (s.id, s.graph_depth))
            .collect();

        link(&mut graph, "c", "org", "c4", EdgeKind::Other);
        for score in calc.calculate_all_scores(&graph) {
            assert!(score.graph_depth <= before[&score.id]);
        }
        assert_eq!(calc.calculate_score(&graph, "c").graph_depth, 1);
    }

    #[test]
    fn test_unique_issuer_weight() {
        let weights = ScoreWeights::default();
        let base = ScoreFactors {
            incoming_credentials: 3,
            unique_issuers: 1,
            bidirectional_relations: 0,
            graph_depth: 2,
            org_issued: false,
        };
        let more = ScoreFactors {
            unique_issuers: 2,
            ..base
        };
        assert_close(
            weights.apply(&more) - weights.apply(&base),
            weights.unique_issuer,
        );
    }

    #[test]
    fn test_new_issuer_raises_score() {
        let mut graph = example();
        let calc = ScoreCalculator::new();
        let before = calc.calculate_score(&graph, "A").score;

        link(&mut graph, "C", "A", "c5", EdgeKind::Invitation);
        graph.mark_bidirectional();
        let after = calc.calculate_score(&graph, "A").score;

        let w = calc.weights();
        assert_close(after - before, w.incoming_credential + w.unique_issuer);
    }

    #[test]
    fn test_custom_weights() {
        let weights = ScoreWeights {
            incoming_credential: 0.0,
            unique_issuer: 0.0,
            bidirectional_relation: 0.0,
            depth_penalty: 1.0,
            org_issued_bonus: 10.0,
        };
        let b = ScoreCalculator::with_weights(weights).calculate_score(&example(), "B");
        assert_close(b.score, 9.0);
    }

    #[test]
    fn test_weights_deserialize_partial() {
        let weights: ScoreWeights = serde_json::from_str(r#"{"depthPenalty": 0.5}"#).unwrap();
        assert_close(weights.depth_penalty, 0.5);
        assert_close(weights.unique_issuer, 2.0);
    }

    #[test]
    fn test_top_scores_ordering() {
        let mut graph = TrustGraph::new("org");
        // b and c tie on score; b is closer to the root
        link(&mut graph, "org", "a", "c1", EdgeKind::Membership);
        link(&mut graph, "a", "b", "c2", EdgeKind::Invitation);
        link(&mut graph, "x", "c", "c3", EdgeKind::Invitation);
        let weights = ScoreWeights {
            depth_penalty: 0.0,
            ..ScoreWeights::default()
        };
        let calc = ScoreCalculator::with_weights(weights);

        let top = calc.top_scores(&graph, 10);
        let ids: Vec<&str> = top.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "org", "x"]);

        assert_eq!(calc.top_scores(&graph, 2).len(), 2);
        assert!(calc.top_scores(&graph, 0).is_empty());
    }

    #[test]
    fn test_ties_break_by_id() {
        let mut graph = TrustGraph::new("org");
        link(&mut graph, "org", "zed", "c1", EdgeKind::Membership);
        link(&mut graph, "org", "amy", "c2", EdgeKind::Membership);

        let top = ScoreCalculator::new().top_scores(&graph, 2);
        assert_eq!(top[0].id, "amy");
        assert_eq!(top[1].id, "zed");
    }

    #[test]
    fn test_summary() {
        let graph = example();
        let summary = ScoreCalculator::new().calculate_summary(&graph);

        assert_eq!(summary.total_nodes, 3);
        assert_eq!(summary.total_edges, 4);
        assert_eq!(summary.bidirectional_relations, 2);
        assert!(summary.min_score <= summary.mean_score);
        assert!(summary.mean_score <= summary.max_score);
        assert_close(summary.max_score, 10.9);
        assert_close(summary.min_score, 0.0);
        // depths 0, 1, 1
        assert_close(summary.median_depth, 1.0);
    }

    #[test]
    fn test_summary_ignores_unreachable_depths() {
        let mut graph = TrustGraph::new("org");
        link(&mut graph, "org", "a", "c1", EdgeKind::Membership);
        link(&mut graph, "x", "y", "c2", EdgeKind::Membership);

        let summary = ScoreCalculator::new().calculate_summary(&graph);
        // reachable depths 0, 1
        assert_close(summary.median_depth, 0.5);
    }

    #[test]
    fn test_empty_graph_summary() {
        let summary = ScoreCalculator::new().calculate_summary(&TrustGraph::default());
        assert_eq!(summary, ScoreSummary::default());
        assert!(ScoreCalculator::new()
            .calculate_all_scores(&TrustGraph::default())
            .is_empty());
    }

    #[test]
    fn test_root_only_graph_summary() {
        let summary = ScoreCalculator::new().calculate_summary(&TrustGraph::new("org"));
        assert_eq!(summary, ScoreSummary::default());
        assert_eq!(summary.total_nodes, 0);
    }

    #[test]
    fn test_root_with_self_claim_summary_is_empty() {
        let mut graph = TrustGraph::new("org");
        link(&mut graph, "org", "org", "c1", EdgeKind::SelfClaim);
        let summary = ScoreCalculator::new().calculate_summary(&graph);
        assert_eq!(summary, ScoreSummary::default());
    }
}
