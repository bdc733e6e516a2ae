//! Error types for StatEngine

use field_registry::FieldLookupError;
use persistence::StoreError;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, StatsError>;

/// Request failures, each mapped to one HTTP status by the gateway
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// A requested stat field is not in the registry
    #[error("Invalid stat field: {0}")]
    InvalidField(String),

    /// A missing or malformed identifier or filter
    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    /// The entity or stat row does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store failed or the deadline passed
    #[error("Storage error: {0}")]
    Storage(String),

    /// A create request hit an existing key
    #[error("Duplicate entity: {0}")]
    DuplicateEntity(String),
}

impl StatsError {
    /// Create a new invalid scope error
    pub fn invalid_scope(msg: impl Into<String>) -> Self {
        Self::InvalidScope(msg.into())
    }

    /// Create a new not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new duplicate entity error
    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::DuplicateEntity(msg.into())
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            StatsError::InvalidField(_) => "INVALID_FIELD",
            StatsError::InvalidScope(_) => "INVALID_SCOPE",
            StatsError::NotFound(_) => "NOT_FOUND",
            StatsError::Storage(_) => "STORAGE_ERROR",
            StatsError::DuplicateEntity(_) => "DUPLICATE_ENTITY",
        }
    }

    /// Whether the caller, rather than the system, is at fault
    pub fn is_client_error(&self) -> bool {
        !matches!(self, StatsError::Storage(_))
    }
}

impl From<FieldLookupError> for StatsError {
    fn from(err: FieldLookupError) -> Self {
        match err {
            FieldLookupError::UnknownField { field, .. } => StatsError::InvalidField(field),
            FieldLookupError::InvalidPosition(_) => StatsError::InvalidScope(err.to_string()),
        }
    }
}

impl From<StoreError> for StatsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists(msg) => StatsError::DuplicateEntity(msg),
            other => StatsError::Storage(other.to_string()),
        }
    }
}
