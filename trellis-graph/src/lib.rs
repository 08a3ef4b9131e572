//! Trellis Graph - Trust graph construction and scoring
//!
//! This crate turns a flat set of credentials into a directed trust graph
//! and ranks the identities in it.
//!
//! # Architecture
//!
//! The graph uses petgraph internally with additional indexes for:
//! - Id-based node lookups
//! - Edge dedup by (issuer, subject, credential id)
//!
//! Building and scoring are separate steps. The builder never scores and
//! the calculator never reads credentials.
//!
//! # Example
//!
//! ```no_run
//! use trellis_core::MemoryCredentialStore;
//! use trellis_graph::{GraphBuilder, ScoreCalculator};
//!
//! # async fn run() -> trellis_graph::Result<()> {
//! let builder = GraphBuilder::new(MemoryCredentialStore::default(), "org");
//! let graph = builder.build().await?;
//!
//! let calculator = ScoreCalculator::new();
//! let top = calculator.top_scores(&graph, 10);
//! let summary = calculator.calculate_summary(&graph);
//! # Ok(())
//! # }
//! ```

mod builder;
mod edge;
mod error;
mod graph;
mod neighborhood;
mod node;
mod scoring;
mod store;

pub use builder::{BuildReport, GraphBuilder};
pub use edge::{EdgeKey, EdgeKind, TrustEdge};
pub use error::{GraphError, Result};
pub use graph::{GraphExport, GraphStats, NodeId, TrustGraph};
pub use neighborhood::{extract_neighborhood, undirected_distances};
pub use node::{NodeUpdate, TrustNode, ORGANIZATION_ROLE};
pub use scoring::{
    Score, ScoreCalculator, ScoreFactors, ScoreSummary, ScoreWeights, UNREACHABLE_DEPTH,
};
pub use store::{JsonFileStore, SledCredentialStore};
