//! Uniform remote filesystem contract and transport negotiation.

use std::fmt;
use std::path::Path;

use crate::error::Result;

/// How files reach the device. Chosen once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Dedicated SFTP subsystem.
    Sftp,
    /// Bytes streamed through `cat > path` on an exec channel.
    ExecFallback,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Sftp => f.write_str("sftp"),
            TransportMode::ExecFallback => f.write_str("exec fallback"),
        }
    }
}

/// Operations a deployment needs from the device, independent of transport.
///
/// Paths are absolute POSIX paths on the device.
pub trait RemoteFs {
    /// Transport in use for file and directory creation.
    fn mode(&self) -> TransportMode;

    fn dir_exists(&mut self, path: &str) -> Result<bool>;

    fn rename(&mut self, from: &str, to: &str) -> Result<()>;

    /// Create `path` and any missing parents.
    fn create_dir_all(&mut self, path: &str) -> Result<()>;

    /// Create one directory. An existing directory is not an error.
    fn create_dir(&mut self, path: &str) -> Result<()>;

    /// Copy the local file to `remote`, replacing it. Returns bytes written.
    fn put_file(&mut self, local: &Path, remote: &str) -> Result<u64>;
}

/// Result of the one-shot primary capability attempt.
pub(crate) enum Negotiated<T> {
    Primary(T),
    Fallback { reason: String },
}

/// Try to open the primary capability once; any failure commits to fallback.
pub(crate) fn negotiate<T, E, F>(skip_primary: bool, open: F) -> Negotiated<T>
where
    E: fmt::Display,
    F: FnOnce() -> std::result::Result<T, E>,
{
    if skip_primary {
        return Negotiated::Fallback {
            reason: "SFTP disabled by configuration".to_string(),
        };
    }

    match open() {
        Ok(handle) => Negotiated::Primary(handle),
        Err(e) => Negotiated::Fallback {
            reason: e.to_string(),
        },
    }
}
