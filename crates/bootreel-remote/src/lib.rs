//! SSH deployment of boot display exports.
//!
//! A deployment connects to one device, moves any existing target directory
//! aside under a timestamped backup name, and mirrors a local export tree
//! into a fresh target. Files travel over SFTP when the device offers it and
//! through `cat > path` exec channels otherwise.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use bootreel_remote::{upload, Connection, SessionOptions};
//!
//! let conn: Connection = "root:secret@192.168.1.50".parse()?;
//! let report = upload(
//!     &conn,
//!     &SessionOptions::default(),
//!     Path::new("export"),
//!     "/etc/boot-display",
//!     None,
//! )?;
//! println!("{}", report.manifest.summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod connection;
pub mod deploy;
mod error;
pub mod manifest;
pub mod session;
pub mod shell;
pub mod transport;

#[cfg(test)]
mod memory;

use std::path::Path;

use tracing::warn;

pub use connection::{Connection, DEFAULT_SSH_PORT};
pub use deploy::{backup_dir_name, DeployCallback, DeployEvent, DeployReport, Deployer};
pub use error::{DeployFailure, RemoteError, Result};
pub use manifest::{EntryKind, Manifest, ManifestEntry};
pub use session::{CommandOutput, SessionOptions, SshSession, DEFAULT_CONNECT_TIMEOUT};
pub use transport::{RemoteFs, TransportMode};

/// Default directory on the device that receives the export.
pub const DEFAULT_REMOTE_DIR: &str = "/etc/boot-display";

/// Connect to `conn`, back up `target` and upload `local` into it.
///
/// The local directory is checked before any network activity. The session
/// is closed whether or not the deployment succeeds.
pub fn upload(
    conn: &Connection,
    options: &SessionOptions,
    local: &Path,
    target: &str,
    progress: Option<DeployCallback>,
) -> std::result::Result<DeployReport, DeployFailure> {
    if !local.is_dir() {
        return Err(RemoteError::LocalNotFound(local.to_path_buf()).into());
    }

    let mut session = SshSession::connect(conn, options)?;

    let result = {
        let mut deployer = Deployer::new(&mut session);
        if let Some(cb) = progress {
            deployer = deployer.with_progress_callback(cb);
        }
        deployer.deploy(local, target)
    };

    if let Err(e) = session.close() {
        warn!("Failed to close session with {}: {}", conn, e);
    }

    result
}
