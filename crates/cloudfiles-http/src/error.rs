//! Error types for cloudfiles-http.

use std::io;
use std::path::PathBuf;

use cloudfiles_verify::VerificationError;
use thiserror::Error;

use crate::data::Response;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("session is not authenticated")]
    NotAuthenticated,

    #[error("downloaded file digest does not match the ETag sent by the store (path: {}, expected {expected}, got {actual})", path.display())]
    Integrity {
        path:     PathBuf,
        expected: String,
        actual:   String,
    },

    #[error("the cursor must be fetched before it is read or advanced")]
    UnfetchedCursor,

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Final HTTP status, when the error came from a completed exchange.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Request(err) => Some(err.status()),
            _ => None,
        }
    }
}

/// A final response outside the `200..=299` success range.
///
/// Raised only after any permitted reauthentication retry has been spent.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RequestError {
    message:  String,
    response: Box<Response>,
}

impl RequestError {
    pub fn new(response: Response) -> Self {
        Self {
            message:  response.describe(),
            response: Box::new(response),
        }
    }

    pub fn message(&self) -> &str { &self.message }

    pub fn status(&self) -> u16 { self.response.status() }

    pub fn response(&self) -> &Response { &self.response }

    pub fn into_response(self) -> Response { *self.response }
}
