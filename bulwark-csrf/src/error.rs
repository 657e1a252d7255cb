use bulwark_config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsrfError {
    /// No secret was configured, or it was empty
    #[error("CSRF secret is missing or empty")]
    MissingSecret,

    /// The operating system's random source failed
    #[error("Secure random source failed: {0}")]
    Entropy(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, CsrfError>;

impl From<CsrfError> for bulwark_core::Error {
    fn from(err: CsrfError) -> Self {
        bulwark_core::Error::Internal(err.to_string())
    }
}
