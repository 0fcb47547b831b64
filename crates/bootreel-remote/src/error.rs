//! Remote deployment error types.

use std::path::PathBuf;

use crate::manifest::Manifest;

/// Result type alias using [`RemoteError`].
pub type Result<T> = std::result::Result<T, RemoteError>;

/// Errors produced while connecting to or writing to a device.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("invalid connection string: {0}")]
    InvalidConnection(String),

    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("SSH handshake with {address} failed: {source}")]
    Handshake {
        address: String,
        #[source]
        source: ssh2::Error,
    },

    #[error("authentication failed for {user}@{address}")]
    Auth { user: String, address: String },

    #[error("remote command `{command}` exited with status {status}: {stderr}")]
    Command {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("failed to transfer {path}: {message}")]
    Transfer { path: String, message: String },

    #[error("local directory not found: {}", .0.display())]
    LocalNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SSH error: {0}")]
    Ssh(#[from] ssh2::Error),
}

impl RemoteError {
    pub fn transfer(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Transfer {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// A failed deployment together with everything written before the failure.
#[derive(Debug, thiserror::Error)]
#[error("deployment failed after {} entries: {error}", .manifest.len())]
pub struct DeployFailure {
    #[source]
    pub error: RemoteError,
    pub manifest: Manifest,
}

impl DeployFailure {
    /// A failure that happened before anything was written.
    pub fn new(error: RemoteError) -> Self {
        Self {
            error,
            manifest: Manifest::default(),
        }
    }

    pub fn with_manifest(error: RemoteError, manifest: Manifest) -> Self {
        Self { error, manifest }
    }
}

impl From<RemoteError> for DeployFailure {
    fn from(error: RemoteError) -> Self {
        Self::new(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_reports_partial_count() {
        let mut manifest = Manifest::default();
        manifest.push_dir("part0");
        manifest.push_file("part0/pic_000.jpg");

        let failure = DeployFailure::with_manifest(
            RemoteError::transfer("part0/pic_001.jpg", "disk full"),
            manifest,
        );
        assert_eq!(
            failure.to_string(),
            "deployment failed after 2 entries: failed to transfer part0/pic_001.jpg: disk full"
        );
    }
}
