use metastore_service::StoreError;
use metastore_types::EntityKind;
use thiserror::Error;

/// Errors that can occur while preparing or executing a workload.
#[derive(Debug, Error)]
pub enum WorkloadError {
    /// A sampler was asked to choose from zero candidates.
    #[error("cannot sample from an empty population")]
    EmptyPopulation,

    /// A work item cannot be built because a required entity kind is absent from the store.
    #[error("insufficient population: the store holds no usable {kind}")]
    InsufficientPopulation {
        /// The missing kind of entity.
        kind: EntityKind,
    },

    /// The store call itself failed.
    #[error("store operation failed: {0}")]
    StoreOperationFailed(#[from] StoreError),

    /// An operation was executed before `prepare` or after `tear_down`.
    #[error("workload is not prepared")]
    NotPrepared,

    /// `prepare` was called more than once.
    #[error("workload is already prepared")]
    AlreadyPrepared,

    /// The operation index is not within `0..num_operations`.
    #[error("operation index {index} is out of range for {len} operations")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of prepared work items.
        len: usize,
    },

    /// The workload configuration violates a constraint.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A payload could not be encoded for measuring its size.
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for workload operations.
pub type Result<T, E = WorkloadError> = std::result::Result<T, E>;
