use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CondoError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CondoError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// The message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Forbidden(msg)
            | Self::Conflict(msg)
            | Self::Transport(msg)
            | Self::LockError(msg)
            | Self::Config(msg)
            | Self::Internal(msg) => msg,
        }
    }

    /// Stable machine-readable code, used by the web layer and in log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::Conflict(_) => "conflict",
            Self::Transport(_) => "transport_error",
            Self::LockError(_) => "lock_error",
            Self::Config(_) => "config_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, CondoError>;

impl<T> From<std::sync::PoisonError<T>> for CondoError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<reqwest::Error> for CondoError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
