//! Pure transformations for the storage protocol.
//!
//! Nothing in this module performs I/O: status classification, `Range`
//! arithmetic and listing URL construction are plain functions so the
//! engines in [`crate::effects`] stay thin.

pub mod headers;
pub mod status;

mod listing;
mod range;

pub use listing::{MAX_BATCH_LIMIT, clamp_batch_limit, listing_url};
pub use range::{DEFAULT_CHUNK_SIZE, effective_chunk_size, range_header};
pub use status::{is_auth_error, is_error, status_text};
