//! Error types for the Jimeng client

use thiserror::Error;

/// Result type alias using the client's Error
pub type Result<T> = std::result::Result<T, Error>;

/// The closed set of failure kinds surfaced by the client.
///
/// Every [`Error`] maps onto exactly one kind, and every kind carries a
/// stable numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidParams,
    RequestFailed,
    TokenExpired,
    ContentFiltered,
    GenerationFailed,
    InsufficientPoints,
}

impl ErrorKind {
    /// Stable numeric code for this kind
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidParams => -2000,
            Self::RequestFailed => -2001,
            Self::TokenExpired => -2002,
            Self::ContentFiltered => -2006,
            Self::GenerationFailed => -2007,
            Self::InsufficientPoints => -2009,
        }
    }

    /// Message used when the caller supplies none
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::InvalidParams => "Request parameters are invalid",
            Self::RequestFailed => "Request failed",
            Self::TokenExpired => "Token has expired",
            Self::ContentFiltered => "Content was blocked by the compliance filter",
            Self::GenerationFailed => "Image generation failed",
            Self::InsufficientPoints => "Insufficient points",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParams => write!(f, "invalid-params"),
            Self::RequestFailed => write!(f, "request-failed"),
            Self::TokenExpired => write!(f, "token-expired"),
            Self::ContentFiltered => write!(f, "content-filtered"),
            Self::GenerationFailed => write!(f, "generation-failed"),
            Self::InsufficientPoints => write!(f, "insufficient-points"),
        }
    }
}

/// Client error types
#[derive(Error, Debug)]
pub enum Error {
    // Caller errors
    #[error("[-2000] {0}")]
    InvalidParams(String),

    // Upstream errors
    #[error("[-2001] {0}")]
    RequestFailed(String),

    /// Reserved for credential refresh support. Never raised today.
    #[error("[-2002] {0}")]
    TokenExpired(String),

    #[error("[-2009] {0}")]
    InsufficientPoints(String),

    // Job errors
    #[error("[-2006] {0}")]
    ContentFiltered(String),

    #[error("[-2007] {0}")]
    GenerationFailed(String),

    // Ambient errors
    #[error("[-2001] Network error: {0}. Check your internet connection.")]
    NetworkError(#[from] reqwest::Error),

    #[error("[-2000] Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build an error of the given kind with a custom message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::InvalidParams => Self::InvalidParams(message),
            ErrorKind::RequestFailed => Self::RequestFailed(message),
            ErrorKind::TokenExpired => Self::TokenExpired(message),
            ErrorKind::ContentFiltered => Self::ContentFiltered(message),
            ErrorKind::GenerationFailed => Self::GenerationFailed(message),
            ErrorKind::InsufficientPoints => Self::InsufficientPoints(message),
        }
    }

    /// Build an error of the given kind carrying its default message
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::new(kind, kind.default_message())
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParams, message)
    }

    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestFailed, message)
    }

    pub fn token_expired() -> Self {
        Self::from_kind(ErrorKind::TokenExpired)
    }

    pub fn insufficient_points(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientPoints, message)
    }

    pub fn content_filtered() -> Self {
        Self::from_kind(ErrorKind::ContentFiltered)
    }

    pub fn generation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::GenerationFailed, message)
    }

    /// Get the taxonomy kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParams(_) | Self::ConfigError(_) => ErrorKind::InvalidParams,
            Self::RequestFailed(_) | Self::NetworkError(_) | Self::Io(_) => {
                ErrorKind::RequestFailed
            }
            Self::TokenExpired(_) => ErrorKind::TokenExpired,
            Self::InsufficientPoints(_) => ErrorKind::InsufficientPoints,
            Self::ContentFiltered(_) => ErrorKind::ContentFiltered,
            Self::GenerationFailed(_) => ErrorKind::GenerationFailed,
        }
    }

    /// Get the numeric error code for this error
    pub fn code(&self) -> i32 {
        self.kind().code()
    }

    /// Whether a later attempt could plausibly succeed.
    ///
    /// Informational only: the chat adapter retries every failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NetworkError(_) | Self::RequestFailed(_) | Self::GenerationFailed(_) => true,
            Self::InvalidParams(_)
            | Self::ConfigError(_)
            | Self::TokenExpired(_)
            | Self::InsufficientPoints(_)
            | Self::ContentFiltered(_)
            | Self::Io(_) => false,
        }
    }
}
