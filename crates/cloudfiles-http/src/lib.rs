//! Token-authenticated HTTP engine for Swift-style object storage.
//!
//! # Architecture
//!
//! The crate follows the three-layer pattern:
//! - [`data`] - requests, responses, the shared session and download options
//! - [`core`] - pure classification and URL/header arithmetic
//! - [`effects`] - the request engine and the loops built on it
//!
//! # Reliability protocol
//!
//! - **Reauthentication**: a [`Request`] carrying an [`Authentication`] that
//!   comes back `401` invokes the [`Authenticator`] once, then replays a fresh
//!   copy of itself. A second `401` is an ordinary [`RequestError`].
//! - **Range downloads**: [`download_to_file`] fetches an object in bounded
//!   `Range` chunks until the store answers `416`, then checks the local
//!   digest against the `ETag` of that final response.
//! - **Pagination**: [`Cursor`] walks a JSON listing page by page using the
//!   last entry's name as the `marker`.

pub mod core;
pub mod data;
pub mod effects;
mod error;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use self::core::headers;
pub use self::core::{
    DEFAULT_CHUNK_SIZE, MAX_BATCH_LIMIT, clamp_batch_limit, effective_chunk_size, is_auth_error,
    is_error, listing_url, range_header, status, status_text,
};
pub use self::data::{
    AuthState, Authentication, Authenticator, DownloadOptions, DownloadPhase, DownloadSummary,
    HttpRequest, Progress, ReqwestClientConfig, ResourcePath, Response, Session, SessionHandle,
};
pub use self::effects::{
    Cursor, HeaderSetter, HttpClient, ListingEntry, Request, download_range, download_to_file,
};

#[cfg(feature = "reqwest")]
pub use self::effects::ReqwestClient;

pub use self::error::{Error, RequestError, Result};
