//! Typed listing entries.

use cloudfiles_http::{Cursor, HttpClient, ListingEntry};
use serde::Deserialize;

use crate::account::Account;
use crate::container::Container;
use crate::error::Result;
use crate::file::ContainerFile;

/// One container of an account listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContainerEntry {
    pub name:  String,
    /// Number of files in the container.
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub bytes: u64,
}

impl ListingEntry for ContainerEntry {
    fn name(&self) -> &str { &self.name }
}

/// One file of a container listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileEntry {
    pub name:          String,
    /// MD5 of the content, as the store reports it.
    #[serde(default)]
    pub hash:          String,
    #[serde(default)]
    pub bytes:         u64,
    #[serde(default)]
    pub content_type:  String,
    #[serde(default)]
    pub last_modified: String,
}

impl ListingEntry for FileEntry {
    fn name(&self) -> &str { &self.name }
}

pub type ContainerList<C> = Cursor<C, ContainerEntry>;

pub type FileList<C> = Cursor<C, FileEntry>;

/// Handles for the container under a [`ContainerList`] cursor.
pub trait ContainerListExt<C: HttpClient> {
    /// The container under the cursor, or `None` at either end.
    fn current_container(&self, account: &Account<C>) -> Result<Option<Container<C>>>;
}

impl<C: HttpClient> ContainerListExt<C> for ContainerList<C> {
    fn current_container(&self, account: &Account<C>) -> Result<Option<Container<C>>> {
        self.current()?
            .map(|entry| account.container(entry.name.clone()))
            .transpose()
    }
}

/// Handles for the file under a [`FileList`] cursor.
pub trait FileListExt<C: HttpClient> {
    /// The file under the cursor, or `None` at either end.
    fn current_file(&self, container: &Container<C>) -> Result<Option<ContainerFile<C>>>;
}

impl<C: HttpClient> FileListExt<C> for FileList<C> {
    fn current_file(&self, container: &Container<C>) -> Result<Option<ContainerFile<C>>> {
        Ok(self.current()?.map(|entry| container.file(entry.name.clone())))
    }
}
