//! Custom metadata carried in prefixed headers.
//!
//! Keys are returned lowercase: header names are case-insensitive and the
//! transport normalises them.

use std::collections::BTreeMap;

use http::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{Error, Result};

pub type Metadata = BTreeMap<String, String>;

/// Entries of `headers` whose name starts with `prefix`, keyed by the rest
/// of the name. Values that are not visible ASCII are skipped.
pub fn extract(headers: &HeaderMap, prefix: &str) -> Metadata {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let key = name.as_str().strip_prefix(prefix)?;
            let value = value.to_str().ok()?;
            Some((key.to_owned(), value.to_owned()))
        })
        .collect()
}

/// Header pairs `<prefix><key>: <value>` for each entry.
pub fn encode<'a, I>(prefix: &str, entries: I) -> Result<Vec<(HeaderName, HeaderValue)>>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    entries
        .into_iter()
        .map(|(key, value)| {
            let name = HeaderName::from_bytes(format!("{prefix}{key}").as_bytes())
                .map_err(|_| Error::InvalidMetadata(format!("'{key}' is not a valid header name")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| Error::InvalidMetadata(format!("value of '{key}' is not a valid header value")))?;
            Ok((name, value))
        })
        .collect()
}

/// A header setter that appends `pairs` to the outgoing headers.
pub(crate) fn apply(pairs: Vec<(HeaderName, HeaderValue)>) -> impl Fn(&mut HeaderMap) + Send + Sync + 'static {
    move |headers| {
        for (name, value) in &pairs {
            headers.insert(name.clone(), value.clone());
        }
    }
}
