//! Backup-then-replace deployment of a local export tree.

use std::path::Path;

use chrono::{DateTime, Local};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{DeployFailure, RemoteError, Result};
use crate::manifest::Manifest;
use crate::shell;
use crate::transport::{RemoteFs, TransportMode};

/// Separator between the target directory and the backup timestamp.
pub const BACKUP_MARKER: &str = "-BACK-";

/// Progress notifications emitted during a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    Started { total_files: usize },
    BackedUp { backup: String },
    FileTransferred { path: String, done: usize, total: usize },
    Finished { entries: usize },
}

/// Progress callback type
pub type DeployCallback = Box<dyn FnMut(&DeployEvent) + Send>;

/// Outcome of a successful deployment.
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub manifest: Manifest,
    /// Name the previous target directory was moved to, if there was one.
    pub backup: Option<String>,
    pub mode: TransportMode,
}

/// Name of the backup sibling for `target` at `at` (second resolution).
pub fn backup_dir_name(target: &str, at: &DateTime<Local>) -> String {
    format!(
        "{}{}{}",
        target.trim_end_matches('/'),
        BACKUP_MARKER,
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Mirrors a local directory onto a device through any [`RemoteFs`].
pub struct Deployer<'a, R: RemoteFs + ?Sized> {
    remote: &'a mut R,
    progress: Option<DeployCallback>,
    clock: fn() -> DateTime<Local>,
}

impl<'a, R: RemoteFs + ?Sized> Deployer<'a, R> {
    pub fn new(remote: &'a mut R) -> Self {
        Self {
            remote,
            progress: None,
            clock: Local::now,
        }
    }

    pub fn with_progress_callback(mut self, callback: DeployCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Override the clock used for backup names.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    fn emit(&mut self, event: DeployEvent) {
        if let Some(ref mut cb) = self.progress {
            cb(&event);
        }
    }

    /// Replace `target` on the device with the contents of `local`.
    ///
    /// On failure the returned [`DeployFailure`] carries every entry that
    /// was written before the error. Nothing is rolled back.
    pub fn deploy(
        &mut self,
        local: &Path,
        target: &str,
    ) -> std::result::Result<DeployReport, DeployFailure> {
        if !local.is_dir() {
            return Err(RemoteError::LocalNotFound(local.to_path_buf()).into());
        }

        let total_files = count_files(local).map_err(DeployFailure::new)?;
        self.emit(DeployEvent::Started { total_files });

        let backup = self.backup_and_prepare(target).map_err(DeployFailure::new)?;

        let mut manifest = Manifest::new();
        if let Err(error) = self.mirror(local, target, total_files, &mut manifest) {
            return Err(DeployFailure::with_manifest(error, manifest));
        }

        self.emit(DeployEvent::Finished {
            entries: manifest.len(),
        });
        info!("{} to {} via {}", manifest.summary(), target, self.remote.mode());

        Ok(DeployReport {
            manifest,
            backup,
            mode: self.remote.mode(),
        })
    }

    /// Move an existing `target` aside and leave an empty `target` behind.
    ///
    /// Returns the backup name when a previous directory existed.
    pub fn backup_and_prepare(&mut self, target: &str) -> Result<Option<String>> {
        let backup = if self.remote.dir_exists(target)? {
            let backup = backup_dir_name(target, &(self.clock)());
            self.remote.rename(target, &backup)?;
            info!("Moved previous {} to {}", target, backup);
            self.emit(DeployEvent::BackedUp {
                backup: backup.clone(),
            });
            Some(backup)
        } else {
            debug!("{} does not exist yet, nothing to back up", target);
            None
        };

        self.remote.create_dir_all(target)?;
        Ok(backup)
    }

    /// Walk `local` depth-first. Each directory is created before its files
    /// are sent; files of a directory go before its subdirectories, both in
    /// name order.
    fn mirror(
        &mut self,
        local: &Path,
        target: &str,
        total: usize,
        manifest: &mut Manifest,
    ) -> Result<()> {
        let mut done = 0;

        for entry in walk(local) {
            let entry = entry.map_err(walk_error)?;
            let rel = relative(local, entry.path())?;
            let remote_path = shell::join(target, &rel);

            if entry.file_type().is_dir() {
                self.remote.create_dir(&remote_path)?;
                manifest.push_dir(rel);
            } else if entry.file_type().is_file() {
                let bytes = self.remote.put_file(entry.path(), &remote_path)?;
                debug!("Sent {} ({} bytes)", rel, bytes);
                done += 1;
                manifest.push_file(rel.clone());
                self.emit(DeployEvent::FileTransferred {
                    path: rel,
                    done,
                    total,
                });
            }
        }

        Ok(())
    }
}

/// Number of regular files below `local`.
pub fn count_files(local: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in walk(local) {
        if entry.map_err(walk_error)?.file_type().is_file() {
            count += 1;
        }
    }
    Ok(count)
}

fn walk(local: &Path) -> walkdir::IntoIter {
    WalkDir::new(local)
        .min_depth(1)
        .follow_links(true)
        .sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
}

fn walk_error(err: walkdir::Error) -> RemoteError {
    RemoteError::Io(err.into())
}

/// `/`-separated path of `path` below `root`.
fn relative(root: &Path, path: &Path) -> Result<String> {
    let rel = path.strip_prefix(root).map_err(std::io::Error::other)?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
