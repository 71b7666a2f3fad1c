//! Digest primitives for verifying downloaded objects.
//!
//! Object stores in the Swift family report an object's MD5 as its `ETag`.
//! This crate provides the incremental hashing used to recompute that value
//! locally, plus the [`FileDigest`] collaborator the download engine calls
//! once a destination file has been fully written and closed.
//!
//! # Example
//!
//! ```
//! use cloudfiles_verify::{Hasher, Md5Hasher};
//!
//! let mut hasher = Md5Hasher::new();
//! hasher.update(b"hello world");
//! assert_eq!(hex::encode(hasher.finalize()), "5eb63bbbe01eeed093cb22bb8f5acdc3");
//! ```

pub use self::error::{Result, VerificationError};
pub use self::file::{FileDigest, digest_file, etag_matches};
pub use self::hasher::Hasher;
pub use self::reader::VerifiedReader;

#[cfg(feature = "md5")]
pub use self::file::Md5FileDigest;
#[cfg(feature = "md5")]
pub use self::hasher::Md5Hasher;

mod error;
mod file;
mod hasher;
mod reader;
