use thiserror::Error;

use crate::{application::render::MdxError, infra::error::InfraError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Render(#[from] MdxError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Message safe to show to whoever submitted the content. Details stay in
    /// the log.
    pub fn presentation_message(&self) -> &'static str {
        match self {
            AppError::Render(err) => err.public_message(),
            AppError::Infra(InfraError::Configuration { .. }) => "Service misconfigured",
            AppError::Infra(InfraError::Telemetry(_)) => "Logging subsystem could not start",
            AppError::Infra(InfraError::Io(_)) => "I/O failure during request",
            AppError::Infra(InfraError::Serialization(_)) | AppError::Unexpected(_) => {
                "Internal server error"
            }
        }
    }
}
