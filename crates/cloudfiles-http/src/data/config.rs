//! Configuration for the reqwest transport.

use std::time::Duration;

/// Default timeout for one HTTP exchange: 30 seconds.
///
/// A timed-out exchange surfaces as status `0`, like any other transport
/// failure.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ReqwestClientConfig {
    pub timeout:    Duration,
    pub user_agent: String,
}

impl Default for ReqwestClientConfig {
    fn default() -> Self {
        Self {
            timeout:    DEFAULT_TIMEOUT,
            user_agent: Self::default_user_agent(),
        }
    }
}

impl ReqwestClientConfig {
    fn default_user_agent() -> String { format!("cloudfiles/{}", env!("CARGO_PKG_VERSION")) }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the timeout, using the default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout.is_zero() { DEFAULT_TIMEOUT } else { self.timeout }
    }

    /// Returns the user agent, using the default if empty.
    pub fn effective_user_agent(&self) -> String {
        if self.user_agent.is_empty() {
            Self::default_user_agent()
        } else {
            self.user_agent.clone()
        }
    }
}
