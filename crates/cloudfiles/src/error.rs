//! Error types for the cloudfiles client.

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] cloudfiles_http::Error),

    #[error("invalid container name '{0}': container names cannot contain '/'")]
    InvalidContainerName(String),

    #[error("container '{0}' is not empty")]
    ContainerNotEmpty(String),

    #[error("invalid metadata entry: {0}")]
    InvalidMetadata(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to build the HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Verification(#[from] cloudfiles_verify::VerificationError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Final HTTP status, when the error came from a completed exchange.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http(err) => err.status(),
            _ => None,
        }
    }

    pub(crate) fn is_not_found(&self) -> bool { self.status() == Some(cloudfiles_http::status::NOT_FOUND) }
}
