//! Error types for payment link operations.
//!
//! Two layers: [`StoreError`] is what a storage backend reports, and
//! [`LinkError`] is what the service reports to its callers. A
//! `StoreError::DuplicateKey` never crosses into `LinkError`; the service
//! consumes it as a retry signal during id allocation.

use thiserror::Error;

/// Stable error codes for API consumers and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum LinkErrorCode {
    /// Payment link not found
    NotFound = 4000,
    /// A required creation field was absent or empty
    MissingField = 5000,
    /// Amount did not parse to a positive number
    InvalidAmount = 5001,
    /// Storage backend unreachable, failed, or timed out
    StorageUnavailable = 7000,
    /// Every allocation attempt collided with an existing id
    IdSpaceExhausted = 7001,
}

/// Errors reported by a [`PaymentLinkStore`](crate::storage::PaymentLinkStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with this short id already exists.
    #[error("duplicate payment link id: {0}")]
    DuplicateKey(String),

    /// The backing storage could not serve the request.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unavailable(format!("corrupt record: {}", err))
    }
}

/// Errors reported by the payment link service.
#[derive(Debug, Error)]
pub enum LinkError {
    /// A required field was absent, null, or empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The amount was present but not a positive number.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// No payment link has this id.
    #[error("payment link not found: {0}")]
    NotFound(String),

    /// Allocation gave up after colliding on every attempt.
    #[error("could not allocate a unique payment link id after {attempts} attempts")]
    IdSpaceExhausted {
        /// Number of candidates tried
        attempts: u32,
    },

    /// The store failed or timed out.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl LinkError {
    /// Get the stable error code.
    pub fn code(&self) -> LinkErrorCode {
        match self {
            Self::MissingField(_) => LinkErrorCode::MissingField,
            Self::InvalidAmount(_) => LinkErrorCode::InvalidAmount,
            Self::NotFound(_) => LinkErrorCode::NotFound,
            Self::IdSpaceExhausted { .. } => LinkErrorCode::IdSpaceExhausted,
            Self::StorageUnavailable(_) => LinkErrorCode::StorageUnavailable,
        }
    }

    /// Returns true if the same request may succeed when retried later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}

impl From<StoreError> for LinkError {
    fn from(err: StoreError) -> Self {
        match err {
            // Only reachable if a caller bypasses the allocation loop.
            StoreError::DuplicateKey(id) => {
                Self::StorageUnavailable(format!("unexpected duplicate id {}", id))
            }
            StoreError::Unavailable(reason) => Self::StorageUnavailable(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = LinkError::StorageUnavailable("connection refused".to_string());
        assert_eq!(err.code(), LinkErrorCode::StorageUnavailable);
        assert!(err.is_retryable());

        let err = LinkError::IdSpaceExhausted { attempts: 10 };
        assert_eq!(err.code(), LinkErrorCode::IdSpaceExhausted);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_missing_field_display() {
        let err = LinkError::MissingField("title");
        assert_eq!(err.to_string(), "Missing required field: title");
        assert_eq!(err.code(), LinkErrorCode::MissingField);
    }

    #[test]
    fn test_store_error_conversion() {
        let err: LinkError = StoreError::Unavailable("disk full".to_string()).into();
        assert!(matches!(err, LinkError::StorageUnavailable(ref r) if r == "disk full"));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StoreError = io.into();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
