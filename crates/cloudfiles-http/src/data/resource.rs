use url::Url;

use crate::error::{Error, Result};

/// A location relative to one of the session's endpoints.
///
/// Storage endpoints can move when the session reauthenticates, so paths are
/// kept relative and resolved against the current endpoint right before each
/// request is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResourcePath {
    segments: Vec<String>,
}

impl ResourcePath {
    /// The endpoint itself (an account listing).
    pub fn root() -> Self { Self::default() }

    pub fn container(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    pub fn object(container: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            segments: vec![container.into(), name.into()],
        }
    }

    pub fn segments(&self) -> &[String] { &self.segments }

    /// Appends each segment to `base`, percent-encoding it as one path segment.
    pub fn resolve(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(format!("{base} cannot be a base URL")))?
            .pop_if_empty()
            .extend(&self.segments);
        Ok(url)
    }
}
