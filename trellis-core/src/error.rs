//! Error types for credential decoding and credential stores.

use thiserror::Error;

/// Why a single credential record could not be used.
///
/// These are never fatal to a graph build. The builder logs them and
/// moves on to the next record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("credential has no id")]
    MissingId,

    #[error("credential {0} has no resolvable issuer")]
    MissingIssuer(String),

    #[error("credential {0} has no resolvable subject")]
    MissingSubject(String),

    #[error("credential {0} has no issuance timestamp")]
    MissingTimestamp(String),

    #[error("credential {id} has an unparseable timestamp: {value}")]
    InvalidTimestamp { id: String, value: String },
}

/// Failure of the credential store itself.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store backend error: {0}")]
    Backend(String),
}
