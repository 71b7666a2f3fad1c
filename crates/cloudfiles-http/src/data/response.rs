use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::core::status;

/// One outgoing exchange, fully prepared for the transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method:  Method,
    pub url:     Url,
    pub headers: HeaderMap,
    pub body:    Option<Bytes>,
}

/// The result of a single transport exchange.
///
/// A response belongs to exactly one attempt; a replayed request produces a
/// new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status:      u16,
    status_text: String,
    headers:     HeaderMap,
    body:        Bytes,
}

impl Response {
    pub fn new(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Stand-in for an exchange that never reached the server.
    pub fn communication_failure() -> Self { Self::new(status::COMMUNICATION_ERROR, "") }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn status(&self) -> u16 { self.status }

    /// Reason phrase as reported by the transport.
    pub fn status_text(&self) -> &str { &self.status_text }

    pub fn headers(&self) -> &HeaderMap { &self.headers }

    pub fn body(&self) -> &Bytes { &self.body }

    pub fn into_body(self) -> Bytes { self.body }

    /// Header value as text; `None` when absent or not visible ASCII.
    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn is_error(&self) -> bool { status::is_error(self.status) }

    pub fn is_auth_error(&self) -> bool { status::is_auth_error(self.status) }

    /// Status line used as the message of a [`crate::RequestError`].
    pub fn describe(&self) -> String { status::status_text(self.status, &self.status_text) }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> { serde_json::from_slice(&self.body) }
}
