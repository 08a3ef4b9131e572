//! Identity nodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trellis_core::DEFAULT_ROLE;

/// Role given to the organization's own node.
pub const ORGANIZATION_ROLE: &str = "organization";

/// One identity participating in the organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustNode {
    /// Externally assigned identifier. Unique within a graph.
    pub id: String,

    pub alias: Option<String>,

    pub role: String,

    /// Earliest issuance time among credentials touching this identity.
    /// `None` until a credential is seen.
    pub joined_at: Option<DateTime<Utc>>,

    /// Credentials naming this identity as issuer or subject.
    pub credential_count: u32,
}

impl TrustNode {
    /// Creates a bare node with the default member role.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            alias: None,
            role: DEFAULT_ROLE.to_string(),
            joined_at: None,
            credential_count: 0,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Records an observation time, keeping the earliest.
    pub fn observe(&mut self, at: DateTime<Utc>) {
        self.joined_at = Some(match self.joined_at {
            Some(existing) if existing <= at => existing,
            _ => at,
        });
    }
}

/// Changes to apply when a node is added or updated.
///
/// Fields left `None` keep the existing value on update and fall back to
/// defaults on insert.
#[derive(Debug, Clone, Default)]
pub struct NodeUpdate {
    pub alias: Option<String>,
    pub role: Option<String>,
    pub seen_at: Option<DateTime<Utc>>,
    /// Added to the node's credential count.
    pub credentials: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_observe_keeps_earliest() {
        let mut node = TrustNode::new("a");
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();

        node.observe(late);
        assert_eq!(node.joined_at, Some(late));

        node.observe(early);
        assert_eq!(node.joined_at, Some(early));

        node.observe(late);
        assert_eq!(node.joined_at, Some(early));
    }
}
