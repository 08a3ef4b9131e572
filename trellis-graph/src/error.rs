use thiserror::Error;
use trellis_core::StoreError;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("credential store failed: {0}")]
    Store(#[from] StoreError),

    #[error("edge {from} -> {to} references a node that is not in the graph")]
    MissingEndpoint { from: String, to: String },
}

pub type Result<T> = std::result::Result<T, GraphError>;
