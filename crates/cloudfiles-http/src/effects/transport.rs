use std::future::Future;

use crate::data::{HttpRequest, Response};

/// Asynchronous HTTP transport.
///
/// Implementations perform exactly one exchange per call and report any
/// status the server sends as a [`Response`]; only failures that produce no
/// response at all (DNS, connect, timeout, broken body) are errors. They must
/// not follow redirects.
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest`
/// - `testing::MockHttpClient`: scripted in-process transport
pub trait HttpClient: Clone + Send + Sync + 'static {
    /// Error type for transport failures.
    type Error: std::error::Error + Send + 'static;

    fn execute(&self, request: HttpRequest) -> impl Future<Output = Result<Response, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use crate::data::ReqwestClientConfig;

    /// Production transport using reqwest.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new(config: &ReqwestClientConfig) -> Result<Self, reqwest::Error> {
            let client = reqwest::Client::builder()
                .timeout(config.effective_timeout())
                .user_agent(config.effective_user_agent())
                .redirect(reqwest::redirect::Policy::none())
                .build()?;
            Ok(Self { client })
        }

        pub fn with_defaults() -> Result<Self, reqwest::Error> { Self::new(&ReqwestClientConfig::default()) }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn execute(&self, request: HttpRequest) -> Result<Response, Self::Error> {
            let mut builder = self
                .client
                .request(request.method, request.url)
                .headers(request.headers);

            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;

            Ok(Response::new(status.as_u16(), status.canonical_reason().unwrap_or_default())
                .with_headers(headers)
                .with_body(body))
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
