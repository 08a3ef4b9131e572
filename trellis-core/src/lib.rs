//! Trellis Core - Credential records and schema decoding
//!
//! This crate holds the types every other Trellis crate speaks: the raw
//! credential record handed over by a credential store, the schema kinds a
//! credential can assert, and the store trait itself.
//!
//! # Example
//!
//! ```
//! use trellis_core::{CredentialKind, CredentialRecord, SchemaRegistry};
//!
//! let record = CredentialRecord::new("cred-1", "membership", "org", "alice")
//!     .with_attribute("issuedAt", "2024-01-01T00:00:00Z");
//!
//! let decoded = record.decode(&SchemaRegistry::new()).unwrap();
//! assert_eq!(decoded.kind, CredentialKind::Membership);
//! ```

mod credential;
mod error;
mod schema;
mod store;

pub use credential::{short_id, CredentialRecord, DecodedCredential, DEFAULT_ROLE};
pub use error::{CredentialError, StoreError};
pub use schema::{CredentialKind, SchemaRegistry};
pub use store::{CredentialStore, MemoryCredentialStore};
