// Re-export duration probing from bootreel-av
pub use bootreel_av::probe::*;
pub use bootreel_av::{check_tool, check_tools, ProbeBackend, ToolInfo};

use crate::config::ToolsConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolved ffmpeg and ffprobe executables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Toolchain {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Use `ffmpeg` and the ffprobe installed next to it.
    pub fn from_ffmpeg(ffmpeg: impl Into<PathBuf>) -> Self {
        let ffmpeg = ffmpeg.into();
        let ffprobe = bootreel_av::sibling_probe(&ffmpeg);
        Self { ffmpeg, ffprobe }
    }

    /// Locate the tools: configured path, then `PATH`, then the directory
    /// holding the running executable.
    pub fn resolve(config: &ToolsConfig) -> Result<Self> {
        let ffmpeg = match bootreel_av::get_tool_path("ffmpeg", config.ffmpeg_path.as_deref()) {
            Ok(path) => path,
            Err(e) => bundled_tool("ffmpeg").ok_or(e).context(
                "ffmpeg is required; install it, add it to PATH or set tools.ffmpeg_path",
            )?,
        };

        let tools = match &config.ffprobe_path {
            Some(path) => Self::new(ffmpeg, path.clone()),
            None => Self::from_ffmpeg(ffmpeg),
        };

        tracing::debug!("Using ffmpeg {:?}, ffprobe {:?}", tools.ffmpeg, tools.ffprobe);
        Ok(tools)
    }

    /// Best-effort variant for diagnostics: unresolved tools keep their bare name.
    pub fn resolve_or_bare(config: &ToolsConfig) -> Self {
        Self::resolve(config).unwrap_or_else(|_| Self::new("ffmpeg", "ffprobe"))
    }

    pub fn probe_tools(&self) -> ProbeTools<'_> {
        ProbeTools {
            ffmpeg: &self.ffmpeg,
            ffprobe: &self.ffprobe,
        }
    }
}

/// `name` shipped alongside the running executable.
fn bundled_tool(name: &str) -> Option<PathBuf> {
    let dir = std::env::current_exe().ok()?.parent()?.to_path_buf();
    let candidate = dir.join(format!("{}{}", name, std::env::consts::EXE_SUFFIX));
    candidate.is_file().then_some(candidate)
}

/// Resolve the duration of a video with `backend`.
pub fn probe_file(tools: &Toolchain, path: &Path, backend: ProbeBackend) -> Result<Duration> {
    bootreel_av::probe::probe_duration_with(tools.probe_tools(), path, backend)
        .with_context(|| format!("Failed to probe {:?}", path))
}
