//! Data types shared by the engines.

mod config;
mod options;
mod resource;
mod response;
mod session;

pub use config::{DEFAULT_TIMEOUT, ReqwestClientConfig};
pub use options::{DownloadOptions, DownloadPhase, DownloadSummary, Progress};
pub use resource::ResourcePath;
pub use response::{HttpRequest, Response};
pub use session::{AuthState, Authentication, Authenticator, Session, SessionHandle};
