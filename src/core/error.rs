// Centralized error handling for the console

use thiserror::Error;

/// Errors from the session store and token codec
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Stored token is not valid base64 or not UTF-8")]
    Decode,

    #[error("Decoded token does not contain the credential separator")]
    Malformed,

    #[error("Failed to access session store: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from calls against the user directory API.
///
/// Transport-level failures (connection refused, timeout, malformed body)
/// surface as `Network`; a reachable server answering negatively surfaces as
/// `Rejected` or `LoginRejected`. Both are terminal for that one attempt;
/// every retry is a fresh operator action.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Network error talking to the directory API: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Directory API rejected the request with status {status}")]
    Rejected { status: u16 },

    #[error("Login rejected: {message}")]
    LoginRejected { message: String },

    #[error("No session credential is stored")]
    NoSession,
}

impl DirectoryError {
    /// True for transport-level failures, false for application-level
    /// rejections. Only affects operator-facing message text.
    pub fn is_network(&self) -> bool {
        matches!(self, DirectoryError::Network(_))
    }
}
