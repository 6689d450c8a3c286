use thiserror::Error;

#[derive(Error, Debug)]
pub enum HansardError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("External service failure: {service} {operation}: {reason}")]
    ExternalService {
        service: String,
        operation: String,
        reason: String,
    },

    #[error("Extraction log {0} is immutable; create a new entry instead")]
    ImmutableLog(i64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl HansardError {
    pub fn external(
        service: impl Into<String>,
        operation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ExternalService {
            service: service.into(),
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}
