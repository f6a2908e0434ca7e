use crate::asset::AssetId;

/// Domain-level error returned by the coordinator and the asset model.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure reported by a metadata store adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The identifier is already taken; the existing record is untouched.
    #[error("Asset with ID '{0}' already exists")]
    DuplicateIdentity(AssetId),

    /// A terminal replacement found no `PENDING` record with this identifier.
    #[error("No pending asset with ID '{0}'")]
    NotPending(AssetId),

    /// Any other infrastructure failure (connection, query, row decoding).
    #[error("Store error: {0}")]
    Backend(String),
}

/// Failure reported by a content publisher adapter.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Publisher rejected the asset: {0}")]
    Rejected(String),

    #[error("Publisher transport error: {0}")]
    Transport(String),

    #[error("Publisher I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
