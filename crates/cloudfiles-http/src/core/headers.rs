//! Header names of the storage and identity protocols.
//!
//! Names are lowercase so they can be built at compile time; header lookups
//! are case-insensitive.

use http::HeaderName;

pub use http::header::{CONTENT_TYPE, ETAG, RANGE};

pub const X_AUTH_USER: HeaderName = HeaderName::from_static("x-auth-user");
pub const X_AUTH_KEY: HeaderName = HeaderName::from_static("x-auth-key");
pub const X_AUTH_TOKEN: HeaderName = HeaderName::from_static("x-auth-token");
pub const X_STORAGE_URL: HeaderName = HeaderName::from_static("x-storage-url");
pub const X_STORAGE_TOKEN: HeaderName = HeaderName::from_static("x-storage-token");
pub const X_CDN_MANAGEMENT_URL: HeaderName = HeaderName::from_static("x-cdn-management-url");

pub const X_ACCOUNT_BYTES_USED: HeaderName = HeaderName::from_static("x-account-bytes-used");
pub const X_ACCOUNT_CONTAINER_COUNT: HeaderName = HeaderName::from_static("x-account-container-count");
pub const X_ACCOUNT_OBJECT_COUNT: HeaderName = HeaderName::from_static("x-account-object-count");

pub const X_CONTAINER_BYTES_USED: HeaderName = HeaderName::from_static("x-container-bytes-used");
pub const X_CONTAINER_OBJECT_COUNT: HeaderName = HeaderName::from_static("x-container-object-count");

pub const X_CDN_ENABLED: HeaderName = HeaderName::from_static("x-cdn-enabled");
pub const X_CDN_URI: HeaderName = HeaderName::from_static("x-cdn-uri");
pub const X_CDN_SSL_URI: HeaderName = HeaderName::from_static("x-cdn-ssl-uri");
pub const X_CDN_STREAMING_URI: HeaderName = HeaderName::from_static("x-cdn-streaming-uri");
pub const X_CDN_IOS_URI: HeaderName = HeaderName::from_static("x-cdn-ios-uri");

pub const X_COPY_FROM: HeaderName = HeaderName::from_static("x-copy-from");

/// Prefixes of user metadata headers.
pub const X_CONTAINER_META_PREFIX: &str = "x-container-meta-";
pub const X_REMOVE_CONTAINER_META_PREFIX: &str = "x-remove-container-meta-";
pub const X_OBJECT_META_PREFIX: &str = "x-object-meta-";
