//! File (object) operations.

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use cloudfiles_http::headers::{CONTENT_TYPE, ETAG, X_COPY_FROM, X_OBJECT_META_PREFIX};
use cloudfiles_http::{DownloadOptions, DownloadSummary, HttpClient, ResourcePath, download_to_file};
use cloudfiles_verify::{Md5FileDigest, Md5Hasher};
use http::{HeaderValue, Method};

use crate::account::Account;
use crate::error::{Error, Result};
use crate::metadata::{self, Metadata};

/// Tracing target for file operations.
pub const TRACING_TARGET: &str = "cloudfiles::file";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file in a container.
#[derive(Clone)]
pub struct ContainerFile<C: HttpClient> {
    account:   Account<C>,
    container: String,
    name:      String,
    path:      ResourcePath,
}

impl<C: HttpClient> fmt::Debug for ContainerFile<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerFile")
            .field("container", &self.container)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<C: HttpClient> ContainerFile<C> {
    pub(crate) fn new(account: Account<C>, container: String, name: String) -> Self {
        Self {
            account,
            path: ResourcePath::object(container.clone(), name.clone()),
            container,
            name,
        }
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn container_name(&self) -> &str { &self.container }

    pub fn path(&self) -> &ResourcePath { &self.path }

    /// Downloads to `destination` with the account's chunk size, checking the
    /// result against the store's MD5 when verification is enabled.
    pub async fn download(&self, destination: &Path) -> Result<DownloadSummary> {
        self.download_with(destination, self.download_options()).await
    }

    /// Like [`download`](Self::download) with explicit options.
    pub async fn download_with(&self, destination: &Path, options: DownloadOptions) -> Result<DownloadSummary> {
        let summary = download_to_file(
            self.account.client(),
            &self.path,
            self.account.authentication(),
            destination,
            &options,
        )
        .await?;

        tracing::debug!(
            target: TRACING_TARGET,
            container = %self.container,
            file = %self.name,
            bytes = summary.bytes,
            requests = summary.requests,
            "file downloaded"
        );
        Ok(summary)
    }

    /// Options [`download`](Self::download) uses.
    pub fn download_options(&self) -> DownloadOptions {
        let settings = self.account.settings();
        let mut options = DownloadOptions::default();
        options.chunk_size = settings.chunk_size;
        if settings.verify_downloads {
            options = options.digest(Md5FileDigest);
        }
        options
    }

    /// `PUT` the content of `source`.
    ///
    /// With verification on, the MD5 of the content is sent as `ETag` so the
    /// store rejects a corrupted upload.
    pub async fn upload(&self, source: &Path, content_type: Option<&str>) -> Result<&Self> {
        let data = Bytes::from(tokio::fs::read(source).await?);
        let content_type = HeaderValue::from_str(content_type.unwrap_or(DEFAULT_CONTENT_TYPE))
            .map_err(|_| Error::InvalidMetadata(format!("content type of '{}' is not a valid header value", self.name)))?;
        let etag = if self.account.settings().verify_downloads {
            HeaderValue::from_str(&hex::encode(Md5Hasher::digest(&data))).ok()
        } else {
            None
        };

        let url = self.account.storage_url(&self.path)?;
        let size = data.len();
        self.account
            .request(Method::PUT, url, move |headers| {
                if let Some(ref etag) = etag {
                    headers.insert(ETAG, etag.clone());
                }
                headers.insert(CONTENT_TYPE, content_type.clone());
            })
            .send(Some(data))
            .await?;

        tracing::debug!(target: TRACING_TARGET, container = %self.container, file = %self.name, size, "file uploaded");
        Ok(self)
    }

    /// `DELETE`. A file that is already gone counts as removed.
    pub async fn remove(&self) -> Result<()> {
        let url = self.account.storage_url(&self.path)?;
        match self.account.request(Method::DELETE, url, |_| {}).send(None).await {
            Ok(_) => Ok(()),
            Err(err) => {
                let err = Error::from(err);
                if err.is_not_found() { Ok(()) } else { Err(err) }
            }
        }
    }

    /// Server-side copy of this file onto `destination`.
    pub async fn copy_to(&self, destination: &ContainerFile<C>) -> Result<&Self> {
        let source = HeaderValue::from_str(&self.copy_source()?)
            .map_err(|_| Error::InvalidMetadata(format!("cannot copy from '{}'", self.name)))?;
        let url = self.account.storage_url(&destination.path)?;
        self.account
            .request(Method::PUT, url, move |headers| {
                headers.insert(X_COPY_FROM, source.clone());
            })
            .send(None)
            .await?;
        Ok(self)
    }

    /// Copies onto `destination`, then removes this file.
    pub async fn move_to(&self, destination: &ContainerFile<C>) -> Result<()> {
        self.copy_to(destination).await?;
        self.remove().await
    }

    pub async fn metadata(&self) -> Result<Metadata> {
        let url = self.account.storage_url(&self.path)?;
        let response = self.account.request(Method::HEAD, url, |_| {}).send(None).await?;
        Ok(metadata::extract(response.headers(), X_OBJECT_META_PREFIX))
    }

    /// Replaces the file's custom metadata with `entries`.
    pub async fn set_metadata<'a>(&self, entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<&Self> {
        let pairs = metadata::encode(X_OBJECT_META_PREFIX, entries)?;
        let url = self.account.storage_url(&self.path)?;
        self.account
            .request(Method::POST, url, metadata::apply(pairs))
            .send(None)
            .await?;
        Ok(self)
    }

    /// `/<container>/<file>`, percent-encoded the way the store addresses it.
    fn copy_source(&self) -> Result<String> {
        let root = self.account.storage_url(&ResourcePath::root())?;
        let full = self.account.storage_url(&self.path)?;
        let prefix = root.path().trim_end_matches('/');
        Ok(full.path().strip_prefix(prefix).unwrap_or(full.path()).to_owned())
    }
}
