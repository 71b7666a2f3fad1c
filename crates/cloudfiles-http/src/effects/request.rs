use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method};
use tokio::task::JoinHandle;
use url::Url;

use crate::data::{Authentication, HttpRequest, Response};
use crate::effects::HttpClient;
use crate::error::{RequestError, Result};

/// Tracing target for request engine operations.
pub const TRACING_TARGET: &str = "cloudfiles_http::request";

/// Configures the outgoing headers; runs immediately before every
/// transmission, including a replay after reauthentication.
pub type HeaderSetter = Arc<dyn Fn(&mut HeaderMap) + Send + Sync>;

/// One logical HTTP call.
///
/// A `Request` is an immutable value: the builder methods return a new one,
/// and [`send`](Self::send) / [`spawn`](Self::spawn) consume it. When the
/// exchange is rejected with `401` and an [`Authentication`] is attached, the
/// session is refreshed and a *new* request with the same method, URL and
/// header setter (but no authentication) is sent once. The retry can
/// therefore never trigger another retry.
///
/// # Examples
///
/// ```no_run
/// # async fn example(client: cloudfiles_http::ReqwestClient, auth: cloudfiles_http::Authentication) -> cloudfiles_http::Result<()> {
/// use cloudfiles_http::Request;
///
/// let url = auth.session().storage_url()?;
/// let session = auth.session().clone();
/// let _response = Request::head(client, url)
///     .headers(move |headers| session.apply_auth_token(headers))
///     .authentication(auth)
///     .send(None)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Request<C: HttpClient> {
    client:         C,
    method:         Method,
    url:            Url,
    header_setter:  Option<HeaderSetter>,
    authentication: Option<Authentication>,
}

impl<C: HttpClient> fmt::Debug for Request<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("header_setter", &self.header_setter.as_ref().map(|_| "{ ... }"))
            .field("authentication", &self.authentication.is_some())
            .finish()
    }
}

impl<C: HttpClient> Request<C> {
    pub fn new(client: C, method: Method, url: Url) -> Self {
        Self {
            client,
            method,
            url,
            header_setter: None,
            authentication: None,
        }
    }

    pub fn get(client: C, url: Url) -> Self { Self::new(client, Method::GET, url) }

    pub fn head(client: C, url: Url) -> Self { Self::new(client, Method::HEAD, url) }

    pub fn put(client: C, url: Url) -> Self { Self::new(client, Method::PUT, url) }

    pub fn post(client: C, url: Url) -> Self { Self::new(client, Method::POST, url) }

    pub fn delete(client: C, url: Url) -> Self { Self::new(client, Method::DELETE, url) }

    #[must_use]
    pub fn headers(mut self, setter: impl Fn(&mut HeaderMap) + Send + Sync + 'static) -> Self {
        self.header_setter = Some(Arc::new(setter));
        self
    }

    #[must_use]
    pub fn authentication(mut self, authentication: Authentication) -> Self {
        self.authentication = Some(authentication);
        self
    }

    pub fn method(&self) -> &Method { &self.method }

    pub fn url(&self) -> &Url { &self.url }

    pub fn can_reauthenticate(&self) -> bool { self.authentication.is_some() }

    /// Sends the request and waits for the final response.
    ///
    /// Fails with [`RequestError`] when the final status is outside
    /// `200..=299`, and with the hook's error when reauthentication fails.
    pub async fn send(self, body: Option<Bytes>) -> Result<Response> {
        let response = self.exchange(body.clone()).await;

        let response = match &self.authentication {
            Some(authentication) if response.is_auth_error() => {
                tracing::info!(
                    target: TRACING_TARGET,
                    method = %self.method,
                    url = %self.url,
                    "authentication expired, reauthenticating before replay"
                );
                authentication.reauthenticate().await?;
                self.replay().exchange(body).await
            }
            _ => response,
        };

        if response.is_error() {
            return Err(RequestError::new(response).into());
        }

        Ok(response)
    }

    /// Sends the request on a background task and hands the final response
    /// to `callback`.
    ///
    /// Returns as soon as the task is spawned. Any reauthentication retry
    /// completes before `callback` runs. The callback always receives a
    /// response, never an error: it must inspect the status itself. If the
    /// hook fails, the original `401` response is delivered.
    pub fn spawn<F>(self, body: Option<Bytes>, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Response) + Send + 'static,
    {
        tokio::spawn(async move {
            let response = self.exchange(body.clone()).await;

            let response = match &self.authentication {
                Some(authentication) if response.is_auth_error() => {
                    match authentication.reauthenticate().await {
                        Ok(()) => self.replay().exchange(body).await,
                        Err(err) => {
                            tracing::warn!(
                                target: TRACING_TARGET,
                                method = %self.method,
                                url = %self.url,
                                error = %err,
                                "reauthentication failed, delivering original response"
                            );
                            response
                        }
                    }
                }
                _ => response,
            };

            callback(response);
        })
    }

    /// A fresh request for the same call, without the reauthentication hook.
    fn replay(&self) -> Self {
        Self {
            client:         self.client.clone(),
            method:         self.method.clone(),
            url:            self.url.clone(),
            header_setter:  self.header_setter.clone(),
            authentication: None,
        }
    }

    /// One transmission. Transport failures become a status-0 response.
    async fn exchange(&self, body: Option<Bytes>) -> Response {
        let mut headers = HeaderMap::new();
        if let Some(ref setter) = self.header_setter {
            setter(&mut headers);
        }

        let request = HttpRequest {
            method: self.method.clone(),
            url: self.url.clone(),
            headers,
            body,
        };

        match self.client.execute(request).await {
            Ok(response) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    method = %self.method,
                    url = %self.url,
                    status = response.status(),
                    "exchange completed"
                );
                response
            }
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    method = %self.method,
                    url = %self.url,
                    error = %err,
                    "transport failure"
                );
                Response::communication_failure()
            }
        }
    }
}
