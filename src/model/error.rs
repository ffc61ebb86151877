use thiserror::Error;

/// The standard result type used throughout the application.
pub type StdResult<T> = Result<T, anyhow::Error>;

/// Errors that abort a harvest run.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HarvestError {
    /// Required configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// The API rejected the credentials
    #[error("Authorization error: HTTP {status}: {message}")]
    Auth { status: u16, message: String },

    /// The organization does not exist
    #[error("Organization not found: {0}")]
    OrganizationNotFound(String),

    /// Network failure or unexpected status while listing repositories
    #[error("Transport error: {0}")]
    Transport(String),
}
