//! Credential records and their decoded form.
//!
//! A `CredentialRecord` is what the credential store hands us: a schema id,
//! issuer, subject and a loosely typed attribute block. Decoding validates
//! the record once and pulls out the hints the graph builder cares about.

use crate::error::CredentialError;
use crate::schema::{CredentialKind, SchemaRegistry};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role assigned when a credential carries no role hint.
pub const DEFAULT_ROLE: &str = "member";

/// Number of identifier characters kept in a fallback display name.
const SHORT_ID_LEN: usize = 8;

const ROLE_KEYS: &[&str] = &["role"];
const NAME_KEYS: &[&str] = &["displayName", "display_name", "name"];
const TIMESTAMP_KEYS: &[&str] = &["issuedAt", "issued_at", "timestamp", "dt"];
const ISSUER_KEYS: &[&str] = &["issuer"];
const SUBJECT_KEYS: &[&str] = &["subject", "holder"];

/// A raw credential as supplied by a credential store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    /// Stable credential identifier.
    pub id: String,

    /// Schema (kind) identifier.
    pub schema: String,

    /// Issuer identifier. May be empty when the attributes carry it.
    #[serde(default)]
    pub issuer: String,

    /// Subject identifier. May be empty when the attributes carry it.
    #[serde(default)]
    pub subject: String,

    /// Free-form attribute block.
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl CredentialRecord {
    /// Creates a record with an empty attribute block.
    pub fn new(
        id: impl Into<String>,
        schema: impl Into<String>,
        issuer: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            schema: schema.into(),
            issuer: issuer.into(),
            subject: subject.into(),
            attributes: Map::new(),
        }
    }

    /// Adds an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Sets the issuance timestamp attribute.
    pub fn issued_at(self, at: DateTime<Utc>) -> Self {
        self.with_attribute("issuedAt", at.to_rfc3339())
    }

    /// Validates the record and extracts the fields the graph needs.
    pub fn decode(&self, registry: &SchemaRegistry) -> Result<DecodedCredential, CredentialError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(CredentialError::MissingId);
        }

        let issuer = resolve_party(&self.issuer, &self.attributes, ISSUER_KEYS)
            .ok_or_else(|| CredentialError::MissingIssuer(id.to_string()))?;
        let subject = resolve_party(&self.subject, &self.attributes, SUBJECT_KEYS)
            .ok_or_else(|| CredentialError::MissingSubject(id.to_string()))?;

        let issued_at = match lookup(&self.attributes, TIMESTAMP_KEYS) {
            Some(value) => parse_timestamp(value).ok_or_else(|| {
                CredentialError::InvalidTimestamp {
                    id: id.to_string(),
                    value: value.to_string(),
                }
            })?,
            None => return Err(CredentialError::MissingTimestamp(id.to_string())),
        };

        Ok(DecodedCredential {
            id: id.to_string(),
            kind: registry.resolve(&self.schema),
            issuer,
            subject,
            role: lookup_str(&self.attributes, ROLE_KEYS),
            display_name: lookup_str(&self.attributes, NAME_KEYS),
            issued_at,
        })
    }
}

/// A validated credential.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCredential {
    pub id: String,
    pub kind: CredentialKind,
    pub issuer: String,
    pub subject: String,
    /// Role granted to the subject, when stated.
    pub role: Option<String>,
    /// Display name of the subject, when stated.
    pub display_name: Option<String>,
    pub issued_at: DateTime<Utc>,
}

impl DecodedCredential {
    /// Role for a subject first seen through this credential.
    pub fn role_or_default(&self) -> &str {
        self.role.as_deref().unwrap_or(DEFAULT_ROLE)
    }

    /// True when issuer and subject are the same identity.
    pub fn is_self_issued(&self) -> bool {
        self.issuer == self.subject
    }
}

/// Shortened identifier used as a display name when none is known.
pub fn short_id(id: &str) -> String {
    if id.chars().count() <= SHORT_ID_LEN {
        return id.to_string();
    }
    let prefix: String = id.chars().take(SHORT_ID_LEN).collect();
    format!("{}...", prefix)
}

fn resolve_party(field: &str, attributes: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    let field = field.trim();
    if !field.is_empty() {
        return Some(field.to_string());
    }
    lookup_str(attributes, keys)
}

fn lookup<'a>(attributes: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| attributes.get(*key))
        .find(|value| !value.is_null())
}

fn lookup_str(attributes: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| attributes.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Accepts RFC 3339 strings and integer Unix seconds (as number or string).
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            s.parse::<i64>()
                .ok()
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        _ => None,
    }
}
