//! Container operations.

use std::fmt;

use cloudfiles_http::headers::{
    X_CDN_ENABLED, X_CDN_IOS_URI, X_CDN_SSL_URI, X_CDN_STREAMING_URI, X_CDN_URI, X_CONTAINER_BYTES_USED,
    X_CONTAINER_META_PREFIX, X_CONTAINER_OBJECT_COUNT, X_REMOVE_CONTAINER_META_PREFIX,
};
use cloudfiles_http::{Cursor, HttpClient, ResourcePath, Response, status};
use http::{HeaderValue, Method};

use crate::account::{Account, counter};
use crate::error::{Error, Result};
use crate::file::ContainerFile;
use crate::listing::{FileList, FileListExt};
use crate::metadata::{self, Metadata};

/// Tracing target for container operations.
pub const TRACING_TARGET: &str = "cloudfiles::container";

/// What [`Container::remove`] does with a container that still has files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteOption {
    /// Fail with [`Error::ContainerNotEmpty`].
    #[default]
    OnlyIfEmpty,
    /// Delete every file first, then the container.
    Force,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerInfo {
    pub file_count: u64,
    pub bytes_used: u64,
}

/// Public URLs of a CDN-enabled container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CdnUris {
    pub uri:           Option<String>,
    pub ssl_uri:       Option<String>,
    pub streaming_uri: Option<String>,
    pub ios_uri:       Option<String>,
}

impl CdnUris {
    fn from_response(response: &Response) -> Self {
        let text = |name: &http::HeaderName| response.header(name).filter(|v| !v.is_empty()).map(str::to_owned);
        Self {
            uri:           text(&X_CDN_URI),
            ssl_uri:       text(&X_CDN_SSL_URI),
            streaming_uri: text(&X_CDN_STREAMING_URI),
            ios_uri:       text(&X_CDN_IOS_URI),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.uri.is_none() && self.ssl_uri.is_none() && self.streaming_uri.is_none() && self.ios_uri.is_none()
    }
}

/// A container of an [`Account`].
///
/// Creating the handle sends nothing; the container may not exist yet.
#[derive(Clone)]
pub struct Container<C: HttpClient> {
    account: Account<C>,
    name:    String,
    path:    ResourcePath,
    cdn:     Option<CdnUris>,
}

impl<C: HttpClient> fmt::Debug for Container<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .field("cdn", &self.cdn)
            .finish_non_exhaustive()
    }
}

impl<C: HttpClient> Container<C> {
    pub(crate) fn new(account: Account<C>, name: String) -> Result<Self> {
        if name.contains('/') {
            return Err(Error::InvalidContainerName(name));
        }
        Ok(Self {
            account,
            path: ResourcePath::container(name.clone()),
            name,
            cdn: None,
        })
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn account(&self) -> &Account<C> { &self.account }

    pub fn path(&self) -> &ResourcePath { &self.path }

    /// `PUT`; creating an existing container succeeds.
    pub async fn create(&self) -> Result<&Self> {
        let url = self.account.storage_url(&self.path)?;
        self.account.request(Method::PUT, url, |_| {}).send(None).await?;
        tracing::debug!(target: TRACING_TARGET, container = %self.name, "container created");
        Ok(self)
    }

    pub async fn info(&self) -> Result<ContainerInfo> {
        let response = self.head().await?;
        Ok(ContainerInfo {
            file_count: counter(&response, &X_CONTAINER_OBJECT_COUNT)?,
            bytes_used: counter(&response, &X_CONTAINER_BYTES_USED)?,
        })
    }

    pub async fn metadata(&self) -> Result<Metadata> {
        let response = self.head().await?;
        Ok(metadata::extract(response.headers(), X_CONTAINER_META_PREFIX))
    }

    /// Adds or overwrites the given entries; others are kept.
    pub async fn set_metadata<'a>(&self, entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<&Self> {
        let pairs = metadata::encode(X_CONTAINER_META_PREFIX, entries)?;
        self.post(pairs).await
    }

    pub async fn remove_metadata<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Result<&Self> {
        let pairs = metadata::encode(X_REMOVE_CONTAINER_META_PREFIX, keys.into_iter().map(|key| (key, "remove")))?;
        self.post(pairs).await
    }

    /// `DELETE`. A container that is already gone counts as removed.
    pub async fn remove(&self, option: DeleteOption) -> Result<()> {
        let err = match self.delete().await {
            Ok(()) => return Ok(()),
            Err(err) if err.is_not_found() => return Ok(()),
            Err(err) => err,
        };

        if err.status() != Some(status::CONFLICT) {
            return Err(err);
        }

        match option {
            DeleteOption::OnlyIfEmpty => Err(Error::ContainerNotEmpty(self.name.clone())),
            DeleteOption::Force => {
                let removed = self.remove_all_files().await?;
                tracing::info!(target: TRACING_TARGET, container = %self.name, removed, "emptied container before removal");
                match self.delete().await {
                    Err(err) if err.is_not_found() => Ok(()),
                    other => other,
                }
            }
        }
    }

    /// A handle on the file `name`; nothing is sent.
    pub fn file(&self, name: impl Into<String>) -> ContainerFile<C> {
        ContainerFile::new(self.account.clone(), self.name.clone(), name.into())
    }

    /// Lists the container's files, fetching the first page.
    pub async fn file_list(&self, batch_limit: Option<i64>) -> Result<FileList<C>> {
        let cursor = Cursor::open(
            self.account.client().clone(),
            self.path.clone(),
            self.account.authentication().clone(),
            batch_limit.or(self.account.settings().batch_limit),
        )
        .await?;
        Ok(cursor)
    }

    /// Publishes the container on the CDN and records its public URLs.
    pub async fn enable_cdn(&mut self) -> Result<&CdnUris> {
        let response = self.set_cdn(true).await?;
        Ok(self.cdn.insert(CdnUris::from_response(&response)))
    }

    pub async fn disable_cdn(&mut self) -> Result<&Self> {
        self.set_cdn(false).await?;
        self.cdn = None;
        Ok(self)
    }

    /// Public CDN URLs, fetched on first use and cached until the CDN is
    /// toggled through this handle.
    pub async fn cdn_uris(&mut self) -> Result<&CdnUris> {
        let cached = self.cdn.as_ref().is_some_and(|uris| !uris.is_empty());
        if !cached {
            let url = self.account.cdn_url(&self.path)?;
            let response = self.account.request(Method::HEAD, url, |_| {}).send(None).await?;
            self.cdn = Some(CdnUris::from_response(&response));
        }
        Ok(self.cdn.get_or_insert_default())
    }

    async fn head(&self) -> Result<Response> {
        let url = self.account.storage_url(&self.path)?;
        Ok(self.account.request(Method::HEAD, url, |_| {}).send(None).await?)
    }

    async fn post(&self, pairs: Vec<(http::HeaderName, HeaderValue)>) -> Result<&Self> {
        let url = self.account.storage_url(&self.path)?;
        self.account
            .request(Method::POST, url, metadata::apply(pairs))
            .send(None)
            .await?;
        Ok(self)
    }

    async fn delete(&self) -> Result<()> {
        let url = self.account.storage_url(&self.path)?;
        self.account.request(Method::DELETE, url, |_| {}).send(None).await?;
        Ok(())
    }

    async fn set_cdn(&self, enabled: bool) -> Result<Response> {
        let url = self.account.cdn_url(&self.path)?;
        let flag = HeaderValue::from_static(if enabled { "True" } else { "False" });
        let response = self
            .account
            .request(Method::PUT, url, move |headers| {
                headers.insert(X_CDN_ENABLED, flag.clone());
            })
            .send(None)
            .await?;
        tracing::debug!(target: TRACING_TARGET, container = %self.name, enabled, "CDN toggled");
        Ok(response)
    }

    async fn remove_all_files(&self) -> Result<u64> {
        let mut files = self.file_list(None).await?;
        let mut removed = 0;
        while files.is_not_at_end()? {
            if let Some(file) = files.current_file(self)? {
                file.remove().await?;
                removed += 1;
            }
            files.advance().await?;
        }
        Ok(removed)
    }
}
