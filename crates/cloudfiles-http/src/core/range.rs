/// Bytes requested per chunk when the caller gives no usable size.
pub const DEFAULT_CHUNK_SIZE: u64 = 512_000;

/// Chunk size to use for a download; `None` and `0` fall back to
/// [`DEFAULT_CHUNK_SIZE`].
pub fn effective_chunk_size(requested: Option<u64>) -> u64 {
    match requested {
        Some(size) if size > 0 => size,
        _ => DEFAULT_CHUNK_SIZE,
    }
}

/// `Range` header value for the chunk starting at `offset` (inclusive end).
///
/// # Examples
///
/// ```
/// use cloudfiles_http::range_header;
///
/// assert_eq!(range_header(0, 512_000), "bytes=0-511999");
/// assert_eq!(range_header(512_000, 512_000), "bytes=512000-1023999");
/// ```
pub fn range_header(offset: u64, chunk_size: u64) -> String {
    let end = offset.saturating_add(chunk_size.max(1) - 1);
    format!("bytes={offset}-{end}")
}
