//! Edge types for the trust graph.
//!
//! Each edge is one credential, pointing from its issuer to its subject.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trellis_core::CredentialKind;

/// The type of relationship an edge records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Issuer admitted subject as a member.
    Membership,

    /// Issuer granted subject a steward role.
    Steward,

    /// Issuer invited subject.
    Invitation,

    /// Identity vouching for itself.
    SelfClaim,

    /// Credential of an unrecognized schema.
    Other,
}

impl From<CredentialKind> for EdgeKind {
    fn from(kind: CredentialKind) -> Self {
        match kind {
            CredentialKind::Membership => Self::Membership,
            CredentialKind::Steward => Self::Steward,
            CredentialKind::Invitation => Self::Invitation,
            CredentialKind::SelfClaim => Self::SelfClaim,
            CredentialKind::Other => Self::Other,
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Membership => "membership",
            Self::Steward => "steward",
            Self::Invitation => "invitation",
            Self::SelfClaim => "self_claim",
            Self::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// A directed issuer → subject relationship derived from one credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustEdge {
    /// Issuer id.
    pub from: String,

    /// Subject id.
    pub to: String,

    /// The kind of relationship.
    #[serde(rename = "type")]
    pub kind: EdgeKind,

    /// Credential this edge came from.
    pub credential_id: String,

    pub issued_at: DateTime<Utc>,

    /// Set when the graph also holds an edge in the opposite direction.
    pub bidirectional: bool,
}

impl TrustEdge {
    /// Creates a new edge. The bidirectional flag starts cleared.
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        kind: EdgeKind,
        credential_id: impl Into<String>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            credential_id: credential_id.into(),
            issued_at,
            bidirectional: false,
        }
    }

    /// The dedup key for this edge.
    pub fn key(&self) -> EdgeKey {
        (
            self.from.clone(),
            self.to.clone(),
            self.credential_id.clone(),
        )
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// (from, to, credential id)
pub type EdgeKey = (String, String, String);
