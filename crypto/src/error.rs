use rngforge_types::{ErrorCode, GeneratorKind};
use thiserror::Error;

/// Errors produced by generator operations.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("null reference: {0}")]
    NullReference(&'static str),

    #[error("invalid length: {0}")]
    InvalidLength(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("{operation}() is not supported by the {generator} generator")]
    UnsupportedOperation {
        operation: &'static str,
        generator: GeneratorKind,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("allocation failure: {0}")]
    AllocationFailure(String),

    #[error("memory wipe fell back to zero-fill: {0}")]
    WipeFailed(Box<GeneratorError>),
}

impl GeneratorError {
    /// Map to a platform error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            GeneratorError::NullReference(_) => ErrorCode::NullReference,
            GeneratorError::InvalidLength(_) => ErrorCode::InvalidLength,
            GeneratorError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            GeneratorError::InvalidValue(_) => ErrorCode::InvalidValue,
            GeneratorError::UnsupportedOperation { .. } => ErrorCode::UnsupportedOperation,
            GeneratorError::Io(_) => ErrorCode::ReadFailed,
            GeneratorError::AllocationFailure(_) => ErrorCode::AllocationFailure,
            GeneratorError::WipeFailed(_) => ErrorCode::WipeFailed,
        }
    }

    pub(crate) fn unsupported(operation: &'static str, generator: GeneratorKind) -> Self {
        GeneratorError::UnsupportedOperation {
            operation,
            generator,
        }
    }
}

pub type GeneratorResult<T> = Result<T, GeneratorError>;
