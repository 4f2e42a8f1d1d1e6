//! Error types for the protocol session.
//!
//! Zero results is never an error anywhere in this crate; the variants
//! here cover rejected logins, failed handshakes, and transport faults.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`crate::protocol::ProtocolSession`] operations.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The server rejected the supplied credentials. The session is left
    /// in the cleared (anonymous-equivalent) state, never with the prior
    /// identity's secrets.
    #[error("authentication failed for '{username}' (status {status})")]
    AuthenticationFailed { username: String, status: u16 },

    /// Authentication succeeded but the session-data handshake did not;
    /// the login attempt as a whole is void.
    #[error("session bootstrap failed (status {status})")]
    BootstrapFailed { status: u16 },

    /// The server answered a query or commit with a non-success status.
    #[error("'{action}' request rejected by server (status {status})")]
    Rejected { action: &'static str, status: u16 },

    /// Network or HTTP-layer failure. Recoverable; session state is
    /// unchanged.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response was missing fields the handshake requires.
    #[error("malformed server response: {reason}")]
    MalformedResponse { reason: String },

    /// Local filesystem failure while persisting a download.
    #[error("file write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a file download.
///
/// An ordinary HTTP failure is a value, not an error: the guid may be
/// wrong or the object may carry no file content.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// A file with the target name already exists; no request was issued.
    AlreadyPresent { path: PathBuf },
    /// The full content was fetched and persisted.
    Saved { path: PathBuf },
    /// The server answered with a non-success status; nothing was written.
    Unavailable { status: u16 },
}

impl DownloadOutcome {
    /// Whether the file is on disk after the call.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            DownloadOutcome::AlreadyPresent { .. } | DownloadOutcome::Saved { .. }
        )
    }
}
