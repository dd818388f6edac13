use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform-wide error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Generic
    Internal,
    NullReference,
    InvalidArgument,
    InvalidLength,
    InvalidValue,
    AllocationFailure,

    // Generator
    UnsupportedOperation,
    WipeFailed,

    // I/O
    ReadFailed,
}

impl ErrorCode {
    /// Returns a short string code suitable for logs and API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Internal => "INTERNAL",
            ErrorCode::NullReference => "NULL_REFERENCE",
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::InvalidLength => "INVALID_LENGTH",
            ErrorCode::InvalidValue => "INVALID_VALUE",
            ErrorCode::AllocationFailure => "ALLOCATION_FAILURE",
            ErrorCode::UnsupportedOperation => "UNSUPPORTED_OPERATION",
            ErrorCode::WipeFailed => "WIPE_FAILED",
            ErrorCode::ReadFailed => "READ_FAILED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_display() {
        assert_eq!(ErrorCode::Internal.to_string(), "INTERNAL");
        assert_eq!(
            ErrorCode::UnsupportedOperation.to_string(),
            "UNSUPPORTED_OPERATION"
        );
    }

    #[test]
    fn error_code_as_str() {
        assert_eq!(ErrorCode::InvalidValue.as_str(), "INVALID_VALUE");
    }
}
