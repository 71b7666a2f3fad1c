//! Scripted in-process transport.
//!
//! [`MockHttpClient`] answers every exchange with a handler closure and keeps
//! a log of what was sent, so engines can be driven without a network.

use std::sync::{Arc, Mutex, PoisonError};

use crate::data::{HttpRequest, Response};
use crate::effects::HttpClient;

/// Transport-level failure produced by a [`MockHttpClient`] handler.
#[derive(Debug, Clone, thiserror::Error)]
#[error("mock transport error: {0}")]
pub struct MockError(pub String);

type Handler = dyn Fn(&HttpRequest) -> Result<Response, MockError> + Send + Sync;

/// An [`HttpClient`] whose responses come from a closure.
///
/// Clones share the handler and the request log.
#[derive(Clone)]
pub struct MockHttpClient {
    inner: Arc<Inner>,
}

struct Inner {
    handler:  Box<Handler>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockHttpClient {
    pub fn new(handler: impl Fn(&HttpRequest) -> Result<Response, MockError> + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                handler:  Box::new(handler),
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.inner.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn request_count(&self) -> usize { self.inner.requests.lock().unwrap_or_else(PoisonError::into_inner).len() }
}

impl HttpClient for MockHttpClient {
    type Error = MockError;

    async fn execute(&self, request: HttpRequest) -> Result<Response, Self::Error> {
        self.inner
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        (self.inner.handler)(&request)
    }
}
