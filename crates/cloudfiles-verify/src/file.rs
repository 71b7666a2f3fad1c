use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use crate::{Hasher, Result, VerifiedReader};

/// Computes the digest of a local file, as a hex string comparable with an
/// object's `ETag`.
///
/// Implementations run after the destination has been closed. They are
/// synchronous: verification is not a suspension point.
pub trait FileDigest: Send + Sync {
    fn digest(&self, path: &Path) -> Result<String>;
}

impl<F> FileDigest for F
where
    F: Fn(&Path) -> Result<String> + Send + Sync,
{
    fn digest(&self, path: &Path) -> Result<String> { self(path) }
}

/// Streams `path` through `hasher` and returns the lowercase hex digest.
pub fn digest_file<H: Hasher>(path: &Path, hasher: H) -> Result<String> {
    let file = File::open(path)?;
    let mut reader = VerifiedReader::new(BufReader::new(file), hasher);
    io::copy(&mut reader, &mut io::sink())?;
    Ok(reader.into_hex())
}

/// Compares an `ETag` header value with a locally computed hex digest.
///
/// Surrounding quotes on the tag are ignored, as is hex letter case.
pub fn etag_matches(etag: &str, digest: &str) -> bool {
    etag.trim().trim_matches('"').eq_ignore_ascii_case(digest.trim())
}

/// MD5 file digest, the default integrity check for Swift downloads.
#[cfg(feature = "md5")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5FileDigest;

#[cfg(feature = "md5")]
impl FileDigest for Md5FileDigest {
    fn digest(&self, path: &Path) -> Result<String> { digest_file(path, crate::Md5Hasher::new()) }
}
