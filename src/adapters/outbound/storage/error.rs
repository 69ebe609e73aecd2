use crate::domain::{errors::StorageError, value_objects::ObjectKey};

/// Convert object_store errors to domain storage errors
impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { ref path, .. } => {
                // Try to create ObjectKey, fallback to validation error if invalid
                match ObjectKey::new(path.to_string()) {
                    Ok(key) => StorageError::ObjectNotFound { key },
                    Err(_) => StorageError::ValidationError {
                        message: format!("Invalid object path from store: {}", path),
                    },
                }
            }
            object_store::Error::Unauthenticated { .. }
            | object_store::Error::PermissionDenied { .. } => StorageError::AccessDenied {
                operation: "read".to_string(),
                reason: err.to_string(),
            },
            _ => StorageError::InfrastructureError {
                message: format!("Object store operation failed: {}", err),
                source: Some(err.to_string()),
            },
        }
    }
}

/// Map a failure raised while a listing stream is consumed
pub fn listing_error(prefix: Option<&str>, err: object_store::Error) -> StorageError {
    match err {
        object_store::Error::Unauthenticated { .. }
        | object_store::Error::PermissionDenied { .. } => StorageError::AccessDenied {
            operation: "list".to_string(),
            reason: err.to_string(),
        },
        _ => StorageError::ListingFailed {
            prefix: prefix.map(str::to_string),
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::path::Path;

    #[test]
    fn test_not_found_maps_to_object_not_found() {
        let err = object_store::Error::NotFound {
            path: "cats/a.png".to_string(),
            source: "missing".into(),
        };

        match StorageError::from(err) {
            StorageError::ObjectNotFound { key } => assert_eq!(key.as_str(), "cats/a.png"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_listing_error_keeps_prefix() {
        let err = object_store::Error::Generic {
            store: "S3",
            source: "connection reset".into(),
        };

        match listing_error(Some("cats/"), err) {
            StorageError::ListingFailed { prefix, message } => {
                assert_eq!(prefix.as_deref(), Some("cats/"));
                assert!(message.contains("connection reset"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_permission_denied_maps_to_access_denied() {
        let err = object_store::Error::PermissionDenied {
            path: Path::from("cats").to_string(),
            source: "bad signature".into(),
        };

        assert!(matches!(
            listing_error(None, err),
            StorageError::AccessDenied { .. }
        ));
    }
}
