use crate::config::DeviceConfig;
use anyhow::{Context, Result};
use bootreel_remote::{Connection, DeployCallback, DeployReport, SessionOptions};
use std::path::Path;

/// Parse a `user:password@host[:port]` upload target.
pub fn parse_connection(target: &str) -> Result<Connection> {
    target
        .parse::<Connection>()
        .context("Invalid upload target")
}

/// Where and how an export is pushed to a device.
#[derive(Debug, Clone)]
pub struct UploadPlan {
    pub connection: Connection,
    pub remote_dir: String,
    pub options: SessionOptions,
}

impl UploadPlan {
    pub fn new(connection: Connection, device: &DeviceConfig) -> Self {
        Self {
            connection,
            remote_dir: device.remote_dir.clone(),
            options: SessionOptions {
                connect_timeout: device.connect_timeout(),
                force_exec_fallback: device.force_exec_fallback,
            },
        }
    }

    pub fn remote_dir(mut self, dir: impl Into<String>) -> Self {
        self.remote_dir = dir.into();
        self
    }

    pub fn force_exec_fallback(mut self, force: bool) -> Self {
        self.options.force_exec_fallback |= force;
        self
    }

    /// Back up the device's current directory and upload `export_dir`.
    pub fn run(&self, export_dir: &Path, progress: Option<DeployCallback>) -> Result<DeployReport> {
        tracing::info!(
            "Uploading {:?} to {}:{}",
            export_dir,
            self.connection,
            self.remote_dir
        );

        match bootreel_remote::upload(
            &self.connection,
            &self.options,
            export_dir,
            &self.remote_dir,
            progress,
        ) {
            Ok(report) => {
                if let Some(ref backup) = report.backup {
                    tracing::info!("Previous contents kept in {}", backup);
                }
                tracing::info!("{} via {}", report.manifest.summary(), report.mode);
                Ok(report)
            }
            Err(failure) => {
                if !failure.manifest.is_empty() {
                    tracing::warn!(
                        "{} entries were written before the failure; {} may be incomplete",
                        failure.manifest.len(),
                        self.remote_dir
                    );
                    for entry in &failure.manifest {
                        tracing::debug!("  written: {}", entry);
                    }
                }
                Err(anyhow::Error::new(failure))
                    .with_context(|| format!("Upload to {} failed", self.connection))
            }
        }
    }
}
