use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    /// A unique constraint rejected the write.
    #[error("Conflict: record already exists")]
    Conflict,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found")]
    NotFound,

    /// An upstream service (billing, image, storage) failed or answered unexpectedly.
    #[error("Upstream provider error: {0}")]
    Provider(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    DatabaseError,
    Conflict,
    Unauthenticated,
    InvalidSignature,
    InvalidInput,
    NotFound,
    ProviderError,
    InternalError,
    SafetyRejected,
    QuotaExceeded,
    GenerationFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::InvalidSignature => "INVALID_SIGNATURE",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ProviderError => "PROVIDER_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::SafetyRejected => "SAFETY_REJECTED",
            ErrorCode::QuotaExceeded => "QUOTA_EXCEEDED",
            ErrorCode::GenerationFailed => "GENERATION_FAILED",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
