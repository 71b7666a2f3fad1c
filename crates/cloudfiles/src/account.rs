//! Login and account-level operations.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use cloudfiles_http::headers::{
    X_ACCOUNT_BYTES_USED, X_ACCOUNT_CONTAINER_COUNT, X_ACCOUNT_OBJECT_COUNT, X_AUTH_KEY, X_AUTH_USER,
};
use cloudfiles_http::{
    AuthState, Authentication, Authenticator, Cursor, HttpClient, ReqwestClient, Request, ResourcePath, Response,
    SessionHandle,
};
use http::{HeaderMap, HeaderValue, Method};
use serde::Deserialize;
use url::Url;

use crate::config::ClientConfig;
use crate::container::Container;
use crate::error::{Error, Result};
use crate::listing::ContainerList;

/// Tracing target for login and account operations.
pub const TRACING_TARGET: &str = "cloudfiles::account";

const UK_IDENTITY_URL: &str = "https://lon.identity.api.rackspacecloud.com/v1.0";
const US_IDENTITY_URL: &str = "https://identity.api.rackspacecloud.com/v1.0";

/// Region of the identity service an account belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum AccountLocation {
    #[serde(rename = "UK", alias = "uk")]
    Uk,
    #[default]
    #[serde(rename = "US", alias = "us")]
    Us,
}

impl AccountLocation {
    pub fn identity_url(self) -> &'static str {
        match self {
            AccountLocation::Uk => UK_IDENTITY_URL,
            AccountLocation::Us => US_IDENTITY_URL,
        }
    }
}

impl fmt::Display for AccountLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountLocation::Uk => write!(f, "UK"),
            AccountLocation::Us => write!(f, "US"),
        }
    }
}

impl FromStr for AccountLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "UK" => Ok(AccountLocation::Uk),
            "US" => Ok(AccountLocation::Us),
            _ => Err(Error::Config(format!("unknown account location '{s}', expected UK or US"))),
        }
    }
}

/// Username and API key for the identity service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username:     String,
    api_key:      String,
    location:     AccountLocation,
    identity_url: Option<Url>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .field("location", &self.location)
            .field("identity_url", &self.identity_url.as_ref().map(Url::as_str))
            .finish()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username:     username.into(),
            api_key:      api_key.into(),
            location:     AccountLocation::default(),
            identity_url: None,
        }
    }

    #[must_use]
    pub fn location(mut self, location: AccountLocation) -> Self {
        self.location = location;
        self
    }

    /// Sends logins to `url` instead of the location's identity service.
    #[must_use]
    pub fn identity_url(mut self, url: Url) -> Self {
        self.identity_url = Some(url);
        self
    }

    pub fn username(&self) -> &str { &self.username }

    pub fn endpoint(&self) -> Result<Url> {
        match self.identity_url {
            Some(ref url) => Ok(url.clone()),
            None => Url::parse(self.location.identity_url())
                .map_err(|e| Error::Config(format!("identity URL for {}: {e}", self.location))),
        }
    }
}

/// Transfer settings shared by every container and file of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSettings {
    pub chunk_size:       Option<u64>,
    pub batch_limit:      Option<i64>,
    pub verify_downloads: bool,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            chunk_size:       None,
            batch_limit:      None,
            verify_downloads: true,
        }
    }
}

/// Logs in against the identity service.
///
/// Used both for the first login and as the reauthentication hook of every
/// request the account makes.
pub struct IdentityAuthenticator<C: HttpClient> {
    client:      C,
    credentials: Credentials,
}

impl<C: HttpClient> IdentityAuthenticator<C> {
    pub fn new(client: C, credentials: Credentials) -> Self { Self { client, credentials } }

    /// `GET` on the identity endpoint with `X-Auth-User` and `X-Auth-Key`.
    ///
    /// The login request itself carries no reauthentication hook.
    pub async fn authenticate(&self) -> cloudfiles_http::Result<AuthState> {
        let endpoint = self
            .credentials
            .endpoint()
            .map_err(|e| cloudfiles_http::Error::Authentication(e.to_string()))?;
        let user = header_value(&self.credentials.username)?;
        let key = header_value(&self.credentials.api_key)?;

        tracing::debug!(
            target: TRACING_TARGET,
            username = %self.credentials.username,
            endpoint = %endpoint,
            "logging in"
        );

        let response = Request::get(self.client.clone(), endpoint)
            .headers(move |headers| {
                headers.insert(X_AUTH_USER, user.clone());
                headers.insert(X_AUTH_KEY, key.clone());
            })
            .send(None)
            .await
            .map_err(|e| match e {
                cloudfiles_http::Error::Request(err) => {
                    cloudfiles_http::Error::Authentication(format!("identity service answered {}", err.message()))
                }
                other => other,
            })?;

        AuthState::from_headers(response.headers())
    }
}

fn header_value(value: &str) -> cloudfiles_http::Result<HeaderValue> {
    let mut value = HeaderValue::from_str(value)
        .map_err(|_| cloudfiles_http::Error::Authentication("credentials contain invalid characters".into()))?;
    value.set_sensitive(true);
    Ok(value)
}

#[async_trait]
impl<C: HttpClient> Authenticator for IdentityAuthenticator<C> {
    async fn reauthenticate(&self, session: &SessionHandle) -> cloudfiles_http::Result<()> {
        let auth = self.authenticate().await?;
        session.replace(auth);
        tracing::info!(target: TRACING_TARGET, username = %self.credentials.username, "session refreshed");
        Ok(())
    }
}

/// Usage counters of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountInfo {
    pub bytes_used:      u64,
    pub container_count: u64,
    pub file_count:      u64,
}

/// A logged-in account.
///
/// Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct Account<C: HttpClient> {
    client:         C,
    authentication: Authentication,
    settings:       AccountSettings,
    username:       String,
}

impl<C: HttpClient> fmt::Debug for Account<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("session", self.authentication.session())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Authenticates `credentials` and returns the account.
pub async fn login<C: HttpClient>(client: C, credentials: Credentials, settings: AccountSettings) -> Result<Account<C>> {
    let username = credentials.username.clone();
    let authenticator = Arc::new(IdentityAuthenticator::new(client.clone(), credentials));
    let session = SessionHandle::default();
    authenticator.reauthenticate(&session).await?;

    Ok(Account {
        client,
        authentication: Authentication::new(authenticator, session),
        settings,
        username,
    })
}

impl Account<ReqwestClient> {
    /// Builds a reqwest transport from `config` and logs in.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let credentials = config.credentials()?;
        let client = ReqwestClient::new(&config.transport())?;
        login(client, credentials, config.settings()).await
    }
}

impl<C: HttpClient> Account<C> {
    pub fn username(&self) -> &str { &self.username }

    pub fn session(&self) -> &SessionHandle { self.authentication.session() }

    pub fn settings(&self) -> &AccountSettings { &self.settings }

    pub fn client(&self) -> &C { &self.client }

    /// `HEAD` on the storage endpoint.
    pub async fn info(&self) -> Result<AccountInfo> {
        let url = self.storage_url(&ResourcePath::root())?;
        let response = self.request(Method::HEAD, url, |_| {}).send(None).await?;

        Ok(AccountInfo {
            bytes_used:      counter(&response, &X_ACCOUNT_BYTES_USED)?,
            container_count: counter(&response, &X_ACCOUNT_CONTAINER_COUNT)?,
            file_count:      counter(&response, &X_ACCOUNT_OBJECT_COUNT)?,
        })
    }

    /// A handle on the container `name`; nothing is sent.
    pub fn container(&self, name: impl Into<String>) -> Result<Container<C>> { Container::new(self.clone(), name.into()) }

    /// Lists the account's containers, fetching the first page.
    ///
    /// `batch_limit` falls back to the account settings, then to 10,000.
    pub async fn container_list(&self, batch_limit: Option<i64>) -> Result<ContainerList<C>> {
        let cursor = Cursor::open(
            self.client.clone(),
            ResourcePath::root(),
            self.authentication.clone(),
            batch_limit.or(self.settings.batch_limit),
        )
        .await?;
        Ok(cursor)
    }

    pub(crate) fn authentication(&self) -> &Authentication { &self.authentication }

    pub(crate) fn storage_url(&self, path: &ResourcePath) -> Result<Url> {
        Ok(path.resolve(&self.session().storage_url()?)?)
    }

    pub(crate) fn cdn_url(&self, path: &ResourcePath) -> Result<Url> {
        Ok(path.resolve(&self.session().cdn_management_url()?)?)
    }

    /// An authenticated request: sends the current token and carries the
    /// account's reauthentication hook.
    pub(crate) fn request(
        &self,
        method: Method,
        url: Url,
        headers: impl Fn(&mut HeaderMap) + Send + Sync + 'static,
    ) -> Request<C> {
        let session = self.session().clone();
        Request::new(self.client.clone(), method, url)
            .headers(move |map| {
                session.apply_auth_token(map);
                headers(map);
            })
            .authentication(self.authentication.clone())
    }
}

/// Numeric header; absent counts as zero.
pub(crate) fn counter(response: &Response, name: &http::HeaderName) -> Result<u64> {
    match response.header(name) {
        None => Ok(0),
        Some(value) => value.trim().parse().map_err(|_| {
            Error::Http(cloudfiles_http::Error::InvalidResponse(format!("{name} is not a number: '{value}'")))
        }),
    }
}
