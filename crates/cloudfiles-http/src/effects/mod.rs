//! Network I/O: the transport seam, the request engine and the loops built
//! on top of it.

mod cursor;
mod download;
mod request;
mod transport;

pub use cursor::{Cursor, ListingEntry};
pub use download::{download_range, download_to_file};
pub use request::{HeaderSetter, Request};
pub use transport::HttpClient;
#[cfg(feature = "reqwest")]
pub use transport::ReqwestClient;
