//! Credential schema kinds.
//!
//! Every credential declares a schema identifier. The registry turns that
//! identifier into one of a closed set of kinds so the rest of the engine
//! can match exhaustively instead of comparing strings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The kind of relationship a credential asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// Issuer admits the subject as a member.
    Membership,

    /// Issuer grants the subject a steward role.
    Steward,

    /// Issuer invited the subject.
    Invitation,

    /// An identity asserting something about itself.
    SelfClaim,

    /// Any schema the registry does not recognize.
    Other,
}

impl CredentialKind {
    /// Returns the canonical name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Membership => "membership",
            Self::Steward => "steward",
            Self::Invitation => "invitation",
            Self::SelfClaim => "self_claim",
            Self::Other => "other",
        }
    }

    /// Parses one of the built-in schema names.
    ///
    /// Matching ignores case. Returns `None` for anything unrecognized.
    pub fn from_builtin(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "membership" | "member" => Some(Self::Membership),
            "steward" | "role" | "steward_role" => Some(Self::Steward),
            "invitation" | "invite" => Some(Self::Invitation),
            "self-claim" | "self_claim" | "selfclaim" => Some(Self::SelfClaim),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolves schema identifiers to credential kinds.
///
/// Built-in names always resolve. Opaque identifiers (for example the
/// content-addressed ids a credential issuer assigns to its schemas) are
/// registered as aliases.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    aliases: HashMap<String, CredentialKind>,
}

impl SchemaRegistry {
    /// Creates a registry that only knows the built-in names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `schema` as an alias for `kind`.
    pub fn register(&mut self, schema: impl Into<String>, kind: CredentialKind) {
        self.aliases.insert(schema.into(), kind);
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with_alias(mut self, schema: impl Into<String>, kind: CredentialKind) -> Self {
        self.register(schema, kind);
        self
    }

    /// Resolves a schema identifier. Unknown schemas map to `Other`.
    pub fn resolve(&self, schema: &str) -> CredentialKind {
        if let Some(kind) = self.aliases.get(schema) {
            return *kind;
        }
        CredentialKind::from_builtin(schema).unwrap_or(CredentialKind::Other)
    }

    /// Number of registered aliases.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl FromIterator<(String, CredentialKind)> for SchemaRegistry {
    fn from_iter<I: IntoIterator<Item = (String, CredentialKind)>>(iter: I) -> Self {
        Self {
            aliases: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names() {
        let registry = SchemaRegistry::new();
        assert_eq!(registry.resolve("membership"), CredentialKind::Membership);
        assert_eq!(registry.resolve("Steward"), CredentialKind::Steward);
        assert_eq!(registry.resolve("role"), CredentialKind::Steward);
        assert_eq!(registry.resolve("INVITE"), CredentialKind::Invitation);
        assert_eq!(registry.resolve("self-claim"), CredentialKind::SelfClaim);
    }

    #[test]
    fn test_unknown_schema_is_other() {
        let registry = SchemaRegistry::new();
        assert_eq!(registry.resolve("vLEI-ecr"), CredentialKind::Other);
        assert_eq!(registry.resolve(""), CredentialKind::Other);
    }

    #[test]
    fn test_alias_takes_precedence() {
        let registry = SchemaRegistry::new()
            .with_alias("EBfdlu8R27Fbx-ehrqwImnK", CredentialKind::Membership)
            .with_alias("invite", CredentialKind::Other);

        assert_eq!(
            registry.resolve("EBfdlu8R27Fbx-ehrqwImnK"),
            CredentialKind::Membership
        );
        assert_eq!(registry.resolve("invite"), CredentialKind::Other);
        assert_eq!(registry.len(), 2);
    }
}
