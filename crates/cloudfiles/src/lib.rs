//! Rackspace Cloud Files client.
//!
//! Log in with [`login`] (or [`Account::connect`] from a [`ClientConfig`]),
//! then work through [`Account`], [`Container`] and [`ContainerFile`]
//! handles. Every call is authenticated with the account's token; when the
//! token expires mid-session the client logs in again and replays the call
//! once.
//!
//! ```no_run
//! # async fn example() -> cloudfiles::Result<()> {
//! use cloudfiles::{Account, ClientConfig};
//!
//! let config = ClientConfig::from_env()?;
//! let account = Account::connect(&config).await?;
//!
//! let photos = account.container("photos")?;
//! photos.create().await?;
//! photos.file("cat.jpg").upload("cat.jpg".as_ref(), Some("image/jpeg")).await?;
//!
//! let mut files = photos.file_list(None).await?;
//! while files.is_not_at_end()? {
//!     if let Some(entry) = files.current()? {
//!         println!("{} ({} bytes)", entry.name, entry.bytes);
//!     }
//!     files.advance().await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod config;
pub mod container;
mod error;
pub mod file;
pub mod listing;
pub mod metadata;

pub use account::{Account, AccountInfo, AccountLocation, AccountSettings, Credentials, IdentityAuthenticator, login};
pub use config::ClientConfig;
pub use container::{CdnUris, Container, ContainerInfo, DeleteOption};
pub use error::{Error, Result};
pub use file::ContainerFile;
pub use listing::{ContainerEntry, ContainerList, ContainerListExt, FileEntry, FileList, FileListExt};
pub use metadata::Metadata;

pub use cloudfiles_http::{DownloadOptions, DownloadPhase, DownloadSummary, Progress};
