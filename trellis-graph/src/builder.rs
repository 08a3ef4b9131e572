//! Graph builder for constructing the trust graph from credentials.
//!
//! The builder reads the full credential set from a store, decodes each
//! record, and folds it into a fresh graph. Every build starts from
//! scratch; nothing is cached between calls.

use crate::edge::TrustEdge;
use crate::error::Result;
use crate::graph::TrustGraph;
use crate::neighborhood::extract_neighborhood;
use crate::node::NodeUpdate;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use trellis_core::{
    short_id, CredentialRecord, CredentialStore, DecodedCredential, SchemaRegistry,
};

/// What happened to the records fed into one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    /// Records turned into edges.
    pub processed: usize,
    /// Records skipped as malformed.
    pub skipped: usize,
    /// Records whose edge was already present.
    pub duplicates: usize,
    /// One line per skipped record.
    pub warnings: Vec<String>,
}

/// Builds trust graphs from a credential store.
pub struct GraphBuilder<S> {
    store: S,
    /// The organization's identifier, used as the graph root.
    root: String,
    registry: SchemaRegistry,
}

impl<S: CredentialStore> GraphBuilder<S> {
    /// Creates a builder with the built-in schema names only.
    pub fn new(store: S, root: impl Into<String>) -> Self {
        Self {
            store,
            root: root.into(),
            registry: SchemaRegistry::new(),
        }
    }

    /// Uses `registry` to resolve schema identifiers.
    pub fn with_registry(mut self, registry: SchemaRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Builds the whole organization's graph.
    pub async fn build(&self) -> Result<TrustGraph> {
        let (graph, _) = self.build_with_report().await?;
        Ok(graph)
    }

    /// Builds the whole graph and reports skipped and duplicate records.
    ///
    /// Fails only when the credential store fails.
    pub async fn build_with_report(&self) -> Result<(TrustGraph, BuildReport)> {
        debug!("Fetching credentials for root {}", self.root);
        let records = self.store.list_all_credentials().await?;
        debug!("Fetched {} credentials", records.len());

        let (graph, report) = self.build_from_records(&records)?;

        info!(
            "Built trust graph: {} nodes, {} edges ({} skipped, {} duplicate)",
            graph.node_count(),
            graph.edge_count(),
            report.skipped,
            report.duplicates
        );
        Ok((graph, report))
    }

    /// Builds the graph around `id`: everything within `depth` hops in
    /// either direction.
    ///
    /// An unknown `id` yields a graph holding just that bare node.
    pub async fn build_for_aid(&self, id: &str, depth: usize) -> Result<TrustGraph> {
        let full = self.build().await?;
        let graph = extract_neighborhood(&full, id, depth);
        debug!(
            "Neighborhood of {} at depth {}: {} nodes, {} edges",
            id,
            depth,
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Folds already-fetched records into a new graph.
    pub fn build_from_records(
        &self,
        records: &[CredentialRecord],
    ) -> Result<(TrustGraph, BuildReport)> {
        let mut graph = TrustGraph::new(self.root.clone());
        let mut report = BuildReport::default();

        for record in records {
            let credential = match record.decode(&self.registry) {
                Ok(credential) => credential,
                Err(e) => {
                    warn!("Skipping credential: {}", e);
                    report.skipped += 1;
                    report.warnings.push(e.to_string());
                    continue;
                }
            };

            if apply_credential(&mut graph, &credential)? {
                report.processed += 1;
            } else {
                report.duplicates += 1;
            }
        }

        graph.mark_bidirectional();
        graph.stamp(Utc::now());

        Ok((graph, report))
    }
}

/// Adds one credential's nodes and edge. Returns false for a duplicate.
fn apply_credential(graph: &mut TrustGraph, credential: &DecodedCredential) -> Result<bool> {
    if graph.contains_edge(&credential.issuer, &credential.subject, &credential.id) {
        debug!("Credential {} already applied", credential.id);
        return Ok(false);
    }

    if credential.is_self_issued() {
        let update = NodeUpdate {
            alias: alias_for(graph, &credential.subject, credential.display_name.as_deref()),
            role: credential.role.clone(),
            seen_at: Some(credential.issued_at),
            credentials: 1,
        };
        graph.add_or_update_node(&credential.subject, update);
    } else {
        let issuer = NodeUpdate {
            alias: alias_for(graph, &credential.issuer, None),
            role: None,
            seen_at: Some(credential.issued_at),
            credentials: 1,
        };
        graph.add_or_update_node(&credential.issuer, issuer);

        let subject = NodeUpdate {
            alias: alias_for(graph, &credential.subject, credential.display_name.as_deref()),
            role: credential.role.clone(),
            seen_at: Some(credential.issued_at),
            credentials: 1,
        };
        graph.add_or_update_node(&credential.subject, subject);
    }

    graph.add_edge(TrustEdge::new(
        credential.issuer.clone(),
        credential.subject.clone(),
        credential.kind.into(),
        credential.id.clone(),
        credential.issued_at,
    ))
}

/// An explicit display name always wins; otherwise nodes without an alias
/// get a shortened id.
fn alias_for(graph: &TrustGraph, id: &str, display_name: Option<&str>) -> Option<String> {
    if let Some(name) = display_name {
        return Some(name.to_string());
    }
    match graph.get_by_id(id) {
        Some(node) if node.alias.is_some() => None,
        _ => Some(short_id(id)),
    }
}
