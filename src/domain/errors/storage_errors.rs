use crate::domain::value_objects::ObjectKey;

/// Errors that can occur while listing or reading the bucket
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// Object not found
    ObjectNotFound { key: ObjectKey },

    /// Credentials were rejected by the backend
    AccessDenied { operation: String, reason: String },

    /// A listing stream failed while being consumed
    ListingFailed {
        prefix: Option<String>,
        message: String,
    },

    /// Validation error
    ValidationError { message: String },

    /// Infrastructure error with external source
    InfrastructureError {
        message: String,
        source: Option<String>, // Store error as string to allow Clone
    },
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::ObjectNotFound { key } => {
                write!(f, "Object not found: {}", key)
            }
            StorageError::AccessDenied { operation, reason } => {
                write!(f, "Access denied for operation '{}': {}", operation, reason)
            }
            StorageError::ListingFailed { prefix, message } => match prefix {
                Some(prefix) => write!(f, "Failed to list objects under '{}': {}", prefix, message),
                None => write!(f, "Failed to list objects: {}", message),
            },
            StorageError::ValidationError { message } => {
                write!(f, "Validation error: {}", message)
            }
            StorageError::InfrastructureError { message, .. } => {
                write!(f, "Infrastructure error: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
