use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use http::header::{HeaderMap, HeaderValue};
use url::Url;

use crate::error::{Error, Result};
use crate::headers::{X_AUTH_TOKEN, X_CDN_MANAGEMENT_URL, X_STORAGE_TOKEN, X_STORAGE_URL};

/// Credentials and endpoints issued by the identity service.
///
/// The four fields are captured together or not at all.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthState {
    pub auth_token:         String,
    pub storage_url:        Url,
    pub cdn_management_url: Url,
    pub storage_token:      String,
}

impl fmt::Debug for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthState")
            .field("auth_token", &"<redacted>")
            .field("storage_url", &self.storage_url.as_str())
            .field("cdn_management_url", &self.cdn_management_url.as_str())
            .field("storage_token", &"<redacted>")
            .finish()
    }
}

impl AuthState {
    /// Reads the identity response headers.
    ///
    /// Fails unless every one of `X-Auth-Token`, `X-Storage-Url`,
    /// `X-CDN-Management-Url` and `X-Storage-Token` is present and valid.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self> {
        let text = |name: &http::HeaderName| -> Result<String> {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
                .ok_or_else(|| Error::Authentication(format!("identity response is missing {name}")))
        };
        let url = |name: &http::HeaderName| -> Result<Url> {
            let value = text(name)?;
            Url::parse(&value).map_err(|e| Error::Authentication(format!("{name} is not a URL: {e}")))
        };

        Ok(Self {
            auth_token:         text(&X_AUTH_TOKEN)?,
            storage_url:        url(&X_STORAGE_URL)?,
            cdn_management_url: url(&X_CDN_MANAGEMENT_URL)?,
            storage_token:      text(&X_STORAGE_TOKEN)?,
        })
    }
}

/// Authentication state of one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    auth: Option<AuthState>,
}

impl Session {
    pub fn new() -> Self { Self::default() }

    pub fn authenticated(auth: AuthState) -> Self { Self { auth: Some(auth) } }

    pub fn auth(&self) -> Option<&AuthState> { self.auth.as_ref() }

    pub fn is_authenticated(&self) -> bool { self.auth.is_some() }
}

/// Shared handle to a [`Session`].
///
/// Every request that authenticates holds a clone. Reauthentication replaces
/// the whole [`AuthState`] in place, so later reads observe the new token and
/// endpoints. The handle assumes a single writer per account.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
}

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    pub fn snapshot(&self) -> Session { self.inner.read().unwrap_or_else(PoisonError::into_inner).clone() }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).is_authenticated()
    }

    pub fn replace(&self, auth: AuthState) {
        self.inner.write().unwrap_or_else(PoisonError::into_inner).auth = Some(auth);
    }

    pub fn clear(&self) { self.inner.write().unwrap_or_else(PoisonError::into_inner).auth = None; }

    fn read_auth<T>(&self, f: impl FnOnce(&AuthState) -> T) -> Result<T> {
        let session = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        session.auth.as_ref().map(f).ok_or(Error::NotAuthenticated)
    }

    pub fn auth_token(&self) -> Result<String> { self.read_auth(|auth| auth.auth_token.clone()) }

    pub fn storage_url(&self) -> Result<Url> { self.read_auth(|auth| auth.storage_url.clone()) }

    pub fn cdn_management_url(&self) -> Result<Url> { self.read_auth(|auth| auth.cdn_management_url.clone()) }

    pub fn storage_token(&self) -> Result<String> { self.read_auth(|auth| auth.storage_token.clone()) }

    /// Sets `X-Auth-Token` from the current token, if there is one.
    ///
    /// An unauthenticated session sends no token; the store answers `401`
    /// and the reauthentication hook takes over.
    pub fn apply_auth_token(&self, headers: &mut HeaderMap) {
        let token = self.auth_token().ok();
        if let Some(value) = token.and_then(|token| HeaderValue::from_str(&token).ok()) {
            headers.insert(X_AUTH_TOKEN, value);
        }
    }
}

/// Reauthentication hook.
///
/// Implementations obtain fresh credentials and store them with
/// [`SessionHandle::replace`].
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn reauthenticate(&self, session: &SessionHandle) -> Result<()>;
}

/// A reauthentication hook paired with the session it refreshes.
#[derive(Clone)]
pub struct Authentication {
    authenticator: Arc<dyn Authenticator>,
    session:       SessionHandle,
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authentication")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Authentication {
    pub fn new(authenticator: Arc<dyn Authenticator>, session: SessionHandle) -> Self {
        Self {
            authenticator,
            session,
        }
    }

    pub fn session(&self) -> &SessionHandle { &self.session }

    pub async fn reauthenticate(&self) -> Result<()> { self.authenticator.reauthenticate(&self.session).await }
}
