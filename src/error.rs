//! Error types for constq.

use thiserror::Error;

/// Error type for kernel construction and engine configuration.
///
/// The per-frame path (transform, silence gate) is infallible once an
/// engine has been built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidConfiguration(msg.into())
    }
}
