use metastore_types::EntityKind;
use thiserror::Error;

/// Errors that can occur in the metadata store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// The kind of the missing entity.
        entity: EntityKind,
        /// The requested identifier.
        id: i64,
    },

    /// An entity with the same identity already exists.
    #[error("{entity} `{name}` already exists")]
    AlreadyExists {
        /// The kind of the conflicting entity.
        entity: EntityKind,
        /// The conflicting name.
        name: String,
    },

    /// The request is malformed, e.g. it connects nodes of the wrong kinds.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The store cannot serve requests right now.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Errors related to serialization of payloads.
    #[error("serde error: {context}")]
    Serde {
        /// What was being serialized.
        context: String,
        /// The underlying error.
        #[source]
        cause: serde_json::Error,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
