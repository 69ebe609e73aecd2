use super::StorageError;

/// Errors raised while turning a selected object into a chat reply
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryError {
    /// Selecting or reading the object failed at the storage layer
    Storage(StorageError),

    /// The image host answered with a non-success status
    DownloadFailed { status: u16 },

    /// The image host could not be reached
    Transport { message: String },

    /// Temporary file could not be written or removed
    Io { message: String },

    /// The reply could not be handed to the message sink
    Sink { message: String },
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryError::Storage(err) => write!(f, "{}", err),
            DeliveryError::DownloadFailed { status } => {
                write!(f, "Image download failed, status code: {}", status)
            }
            DeliveryError::Transport { message } => {
                write!(f, "Image transport error: {}", message)
            }
            DeliveryError::Io { message } => write!(f, "I/O error: {}", message),
            DeliveryError::Sink { message } => write!(f, "Failed to emit reply: {}", message),
        }
    }
}

impl std::error::Error for DeliveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeliveryError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for DeliveryError {
    fn from(err: StorageError) -> Self {
        DeliveryError::Storage(err)
    }
}

impl From<std::io::Error> for DeliveryError {
    fn from(err: std::io::Error) -> Self {
        DeliveryError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for delivery operations
pub type DeliveryResult<T> = Result<T, DeliveryError>;
