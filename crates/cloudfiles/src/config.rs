//! Client configuration.
//!
//! Settings come from a TOML document or from `CLOUDFILES_*` environment
//! variables; every field is optional until [`ClientConfig::validate`] runs.
//!
//! ```toml
//! username = "alice"
//! api_key = "0123456789abcdef"
//! location = "UK"
//! chunk_size = 1048576
//! batch_limit = 500
//! timeout_secs = 60
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use cloudfiles_http::ReqwestClientConfig;
use serde::Deserialize;

use crate::account::{AccountLocation, AccountSettings, Credentials};
use crate::error::{Error, Result};

const ENV_PREFIX: &str = "CLOUDFILES_";

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub username:         Option<String>,
    pub api_key:          Option<String>,
    pub location:         AccountLocation,
    /// Overrides the identity endpoint chosen by `location`.
    pub identity_url:     Option<String>,
    /// Bytes per ranged download request.
    pub chunk_size:       Option<u64>,
    /// Entries per listing page.
    pub batch_limit:      Option<i64>,
    pub timeout_secs:     Option<u64>,
    /// Check downloads against their `ETag` and send an `ETag` on upload.
    pub verify_downloads: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            username:         None,
            api_key:          None,
            location:         AccountLocation::default(),
            identity_url:     None,
            chunk_size:       None,
            batch_limit:      None,
            timeout_secs:     None,
            verify_downloads: true,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("username", &self.username)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("location", &self.location)
            .field("identity_url", &self.identity_url)
            .field("chunk_size", &self.chunk_size)
            .field("batch_limit", &self.batch_limit)
            .field("timeout_secs", &self.timeout_secs)
            .field("verify_downloads", &self.verify_downloads)
            .finish()
    }
}

impl ClientConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> { Ok(toml::from_str(source)?) }

    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Reads `CLOUDFILES_USERNAME`, `CLOUDFILES_API_KEY`,
    /// `CLOUDFILES_LOCATION`, `CLOUDFILES_IDENTITY_URL`,
    /// `CLOUDFILES_CHUNK_SIZE`, `CLOUDFILES_BATCH_LIMIT`,
    /// `CLOUDFILES_TIMEOUT_SECS` and `CLOUDFILES_VERIFY_DOWNLOADS`.
    pub fn from_env() -> Result<Self> { Self::from_lookup(|name| std::env::var(name).ok()) }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |suffix: &str| lookup(&format!("{ENV_PREFIX}{suffix}")).filter(|value| !value.is_empty());

        let mut config = Self {
            username: var("USERNAME"),
            api_key: var("API_KEY"),
            identity_url: var("IDENTITY_URL"),
            chunk_size: parse_var("CHUNK_SIZE", var("CHUNK_SIZE"))?,
            batch_limit: parse_var("BATCH_LIMIT", var("BATCH_LIMIT"))?,
            timeout_secs: parse_var("TIMEOUT_SECS", var("TIMEOUT_SECS"))?,
            ..Self::default()
        };

        if let Some(location) = var("LOCATION") {
            config.location = location.parse()?;
        }
        if let Some(verify) = parse_var("VERIFY_DOWNLOADS", var("VERIFY_DOWNLOADS"))? {
            config.verify_downloads = verify;
        }

        Ok(config)
    }

    /// Fails unless both credentials are present and the identity URL, if
    /// given, parses.
    pub fn validate(&self) -> Result<()> {
        self.credentials().map(|_| ())
    }

    pub fn credentials(&self) -> Result<Credentials> {
        let username = self
            .username
            .as_deref()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::Config("username is required".into()))?;
        let api_key = self
            .api_key
            .as_deref()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::Config("api_key is required".into()))?;

        let mut credentials = Credentials::new(username, api_key).location(self.location);
        if let Some(ref identity_url) = self.identity_url {
            let url = identity_url
                .parse()
                .map_err(|e| Error::Config(format!("identity_url '{identity_url}' is not a URL: {e}")))?;
            credentials = credentials.identity_url(url);
        }

        Ok(credentials)
    }

    pub fn settings(&self) -> AccountSettings {
        AccountSettings {
            chunk_size:       self.chunk_size,
            batch_limit:      self.batch_limit,
            verify_downloads: self.verify_downloads,
        }
    }

    pub fn transport(&self) -> ReqwestClientConfig {
        let config = ReqwestClientConfig::default();
        match self.timeout_secs {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}

fn parse_var<T>(name: &str, value: Option<String>) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value
        .map(|value| {
            value
                .parse()
                .map_err(|e| Error::Config(format!("{ENV_PREFIX}{name}='{value}': {e}")))
        })
        .transpose()
}
