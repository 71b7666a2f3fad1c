use std::fmt;
use std::sync::Arc;

use cloudfiles_verify::FileDigest;

/// Phases of a ranged download.
///
/// Downloads progress through these phases in order:
/// Downloading → Verifying → Completed. Verifying is skipped when no digest
/// is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadPhase {
    /// Requesting chunks and appending them to the destination.
    #[default]
    Downloading,

    /// Destination closed; recomputing its digest.
    Verifying,

    /// Terminal state for successful downloads.
    Completed,
}

impl fmt::Display for DownloadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadPhase::Downloading => write!(f, "Downloading"),
            DownloadPhase::Verifying => write!(f, "Verifying"),
            DownloadPhase::Completed => write!(f, "Completed"),
        }
    }
}

/// State passed to progress callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub phase:            DownloadPhase,
    /// Bytes appended to the destination so far.
    pub bytes_downloaded: u64,
    /// Chunk requests issued so far, including the terminating one.
    pub requests:         u32,
}

/// What a finished download observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub bytes:    u64,
    pub requests: u32,
    /// `ETag` of the response that ended the loop.
    pub etag:     Option<String>,
}

/// Configuration for ranged downloads.
///
/// # Examples
///
/// ```
/// use cloudfiles_http::DownloadOptions;
/// use cloudfiles_verify::Md5FileDigest;
///
/// let options = DownloadOptions::default()
///     .chunk_size(1 << 20)
///     .digest(Md5FileDigest);
/// ```
#[derive(Clone, Default)]
pub struct DownloadOptions {
    /// Bytes per `Range` request. `None` or `0` means 512,000.
    pub chunk_size: Option<u64>,

    /// Integrity check run on the closed destination file.
    pub digest: Option<Arc<dyn FileDigest>>,

    /// Invoked after every appended chunk and on phase transitions.
    pub on_progress: Option<Arc<dyn Fn(&Progress) + Send + Sync>>,
}

impl fmt::Debug for DownloadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadOptions")
            .field("chunk_size", &self.chunk_size)
            .field("digest", &self.digest.as_ref().map(|_| "{ ... }"))
            .field("on_progress", &self.on_progress.as_ref().map(|_| "{ ... }"))
            .finish()
    }
}

impl DownloadOptions {
    #[must_use]
    pub fn chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    #[must_use]
    pub fn digest(mut self, digest: impl FileDigest + 'static) -> Self {
        self.digest = Some(Arc::new(digest));
        self
    }

    #[must_use]
    pub fn on_progress(mut self, on_progress: Arc<dyn Fn(&Progress) + Send + Sync>) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub(crate) fn report(&self, progress: Progress) {
        if let Some(ref callback) = self.on_progress {
            callback(&progress);
        }
    }
}
