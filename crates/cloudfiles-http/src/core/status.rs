//! Status classification.
//!
//! The success boundary is deliberately `200..=299`: informational and
//! redirect statuses are errors here, and redirects are never followed.

/// Pseudo-status for an exchange that never reached the server.
pub const COMMUNICATION_ERROR: u16 = 0;
pub const OK: u16 = 200;
pub const NO_CONTENT: u16 = 204;
pub const PARTIAL_CONTENT: u16 = 206;
pub const UNAUTHORIZED: u16 = 401;
pub const NOT_FOUND: u16 = 404;
pub const CONFLICT: u16 = 409;
pub const RANGE_NOT_SATISFIABLE: u16 = 416;

const COMMUNICATION_ERROR_TEXT: &str = "A communication error occurred.";

/// Whether the status signals an expired or rejected credential.
pub fn is_auth_error(status: u16) -> bool { status == UNAUTHORIZED }

/// Whether the status falls outside the success range.
pub fn is_error(status: u16) -> bool { !(200..=299).contains(&status) }

/// Human-readable status line, e.g. `"404 Not Found"`.
///
/// Status `0` has no server-provided reason and yields a fixed
/// communication-error message instead.
pub fn status_text(status: u16, reason: &str) -> String {
    if status == COMMUNICATION_ERROR {
        return COMMUNICATION_ERROR_TEXT.to_string();
    }

    if reason.is_empty() {
        status.to_string()
    } else {
        format!("{status} {reason}")
    }
}
