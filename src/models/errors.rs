//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so log lines can be grepped
//! and counted without parsing free-form messages.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - MODEL_xxx: inference engine errors
//! - RPC_xxx: chain-state lookup errors
//! - CFG_xxx: configuration errors
//! - ADDRESS_LIST_xxx: blacklist/whitelist persistence errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Model Errors (1xx)
    // ============================================
    /// Prediction requested before weights exist
    ModelNotInitialized,
    /// Weight tensors do not match the fixed topology
    ModelShapeMismatch,

    // ============================================
    // RPC Errors (2xx)
    // ============================================
    /// RPC connection failed
    RpcConnectionFailed,
    /// RPC request timeout
    RpcTimeout,
    /// RPC returned error response
    RpcError,
    /// Invalid RPC response
    RpcInvalidResponse,

    // ============================================
    // Configuration Errors (3xx)
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Address List Errors (4xx)
    // ============================================
    /// Blacklist/whitelist file could not be read or written
    AddressListIo,

    // ============================================
    // Generic Errors (9xx)
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModelNotInitialized => "MODEL_NOT_INITIALIZED",
            Self::ModelShapeMismatch => "MODEL_SHAPE_MISMATCH",

            Self::RpcConnectionFailed => "RPC_CONNECTION_FAILED",
            Self::RpcTimeout => "RPC_TIMEOUT",
            Self::RpcError => "RPC_ERROR",
            Self::RpcInvalidResponse => "RPC_INVALID_RESPONSE",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::AddressListIo => "ADDRESS_LIST_IO",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Check if error is retryable
    ///
    /// Only chain-state lookups are ever worth retrying; the scoring core is
    /// deterministic and fails the same way twice.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RpcTimeout | Self::RpcConnectionFailed
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Inference requested before the model has weights
    pub fn not_initialized() -> Self {
        Self::new(ErrorCode::ModelNotInitialized, "Model not initialized")
    }

    /// Weight tensor dimensions disagree with the topology
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ModelShapeMismatch, msg)
    }

    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    /// RPC returned an error object
    pub fn rpc_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcError, msg)
    }

    /// RPC response had an unexpected shape
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcInvalidResponse, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::RpcTimeout, "Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::RpcConnectionFailed, "Connection failed")
        } else {
            Self::new(ErrorCode::Unknown, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::RpcInvalidResponse, "JSON parse error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::not_initialized();
        assert_eq!(err.code, ErrorCode::ModelNotInitialized);
        assert_eq!(err.code_str(), "MODEL_NOT_INITIALIZED");
        assert_eq!(err.to_string(), "[MODEL_NOT_INITIALIZED] Model not initialized");
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::RpcTimeout.is_retryable());
        assert!(ErrorCode::RpcConnectionFailed.is_retryable());
        assert!(!ErrorCode::ModelNotInitialized.is_retryable());
        assert!(!ErrorCode::ConfigInvalidValue.is_retryable());
    }

    #[test]
    fn test_io_error_maps_to_unknown() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AppError = io.into();
        assert_eq!(err.code, ErrorCode::Unknown);
        assert_eq!(err.code_str(), "UNKNOWN_ERROR");
        assert!(std::error::Error::source(&err).is_some());
    }
}
