//! Error types for placemark operations.
//!
//! Absence of a record is an expected outcome and is returned as
//! `Ok(None)`, never as an error. The variants here cover store failures,
//! payload validation, and the two failure modes of the conditional-update
//! protocol in `save`.

use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for placemark operations.
pub type PlacemarkResult<T> = Result<T, PlacemarkError>;

/// Main error type for all placemark operations.
#[derive(Error, Debug)]
pub enum PlacemarkError {
    /// The document store could not be reached or an operation against it
    /// failed. Propagated to the caller; retry policy is theirs.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Submitted payload failed validation. No write was attempted.
    #[error("Invalid payload: {message}")]
    InvalidPayload {
        message: String,
        code: ErrorCode,
        details: HashMap<String, String>,
    },

    /// An update targeted a record whose live document no longer exists.
    /// Surfaced distinctly rather than silently creating a new record.
    #[error("Record not found on update: {message}")]
    NotFoundOnUpdate {
        message: String,
        code: ErrorCode,
        listing_id: Option<String>,
    },

    /// Concurrent writers kept invalidating the version guard and the
    /// bounded retry loop gave up.
    #[error("Version conflict: {message}")]
    Conflict {
        message: String,
        code: ErrorCode,
        listing_id: Option<String>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Store (STORE_xxx)
    StoreConnectionFailed,
    StoreOperationFailed,
    StoreDuplicateIdentity,

    // Validation (VAL_xxx)
    ValMissingNaturalKey,
    ValInvalidInput,

    // Record (REC_xxx)
    RecNotFoundOnUpdate,
    RecVersionConflict,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::StoreConnectionFailed => "STORE_001",
            ErrorCode::StoreOperationFailed => "STORE_002",
            ErrorCode::StoreDuplicateIdentity => "STORE_003",
            ErrorCode::ValMissingNaturalKey => "VAL_001",
            ErrorCode::ValInvalidInput => "VAL_002",
            ErrorCode::RecNotFoundOnUpdate => "REC_001",
            ErrorCode::RecVersionConflict => "REC_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl PlacemarkError {
    /// Create a store operation error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            code: ErrorCode::StoreOperationFailed,
            source: None,
        }
    }

    /// Create a store connection error.
    pub fn store_connection(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            code: ErrorCode::StoreConnectionFailed,
            source: None,
        }
    }

    /// Create a store error wrapping the driver error as its source.
    pub fn store_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            code: ErrorCode::StoreOperationFailed,
            source: Some(Box::new(source)),
        }
    }

    /// Create a duplicate-identity error: a live record with the same
    /// identity hash already exists.
    pub fn duplicate_identity(url_hash: impl Into<String>) -> Self {
        let hash = url_hash.into();
        Self::StoreUnavailable {
            message: format!("A live record with identity hash '{}' already exists", hash),
            code: ErrorCode::StoreDuplicateIdentity,
            source: None,
        }
    }

    /// Create a payload validation error.
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
        }
    }

    /// Create a missing-natural-key validation error.
    pub fn missing_natural_key() -> Self {
        let mut details = HashMap::new();
        details.insert("field".to_string(), "website".to_string());
        Self::InvalidPayload {
            message: "Listing has no website; the website is the natural key".to_string(),
            code: ErrorCode::ValMissingNaturalKey,
            details,
        }
    }

    /// Create a not-found-on-update error.
    pub fn not_found_on_update(listing_id: impl Into<String>) -> Self {
        let id = listing_id.into();
        Self::NotFoundOnUpdate {
            message: format!("Live record '{}' disappeared before the update applied", id),
            code: ErrorCode::RecNotFoundOnUpdate,
            listing_id: Some(id),
        }
    }

    /// Create a version conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            code: ErrorCode::RecVersionConflict,
            listing_id: None,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::StoreUnavailable { code, .. } => *code,
            Self::InvalidPayload { code, .. } => *code,
            Self::NotFoundOnUpdate { code, .. } => *code,
            Self::Conflict { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }
}
