//! Frame output directory management.

use crate::plan::ExportPlan;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

const FRAME_PREFIX: &str = "pic_";
const FRAME_EXTENSION: &str = ".jpg";

/// Directory holding one numbered frame sequence (`pic_000.jpg`, ...).
///
/// Only files following the frame naming convention are ever removed or
/// counted; anything else in the directory is left alone.
///
/// # Example
///
/// ```no_run
/// use bootreel_av::FrameDir;
///
/// let frames = FrameDir::create("export/part0")?;
/// frames.clear()?;
/// // ... run ffmpeg with frames.pattern() ...
/// println!("{} frames", frames.count()?);
/// # Ok::<(), bootreel_av::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct FrameDir {
    path: PathBuf,
}

impl FrameDir {
    /// Create the directory (and parents) if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::invalid_input("output directory path is empty"));
        }
        std::fs::create_dir_all(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Get the directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory the device config is written to (the frame directory's parent).
    pub fn export_root(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// The ffmpeg output pattern inside this directory.
    pub fn pattern(&self) -> PathBuf {
        self.path.join(ExportPlan::OUTPUT_PATTERN)
    }

    /// Remove every frame left by a previous export. Returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let frames = self.frames()?;
        for frame in &frames {
            std::fs::remove_file(frame)?;
        }

        #[cfg(feature = "tracing")]
        {
            if !frames.is_empty() {
                tracing::debug!("Removed {} stale frames from {:?}", frames.len(), self.path);
            }
        }

        Ok(frames.len())
    }

    /// Count the frames currently on disk.
    pub fn count(&self) -> Result<usize> {
        Ok(self.frames()?.len())
    }

    /// Frame files in name order.
    pub fn frames(&self) -> Result<Vec<PathBuf>> {
        let mut frames = Vec::new();
        for entry in std::fs::read_dir(&self.path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if is_frame_name(&entry.file_name().to_string_lossy()) {
                frames.push(entry.path());
            }
        }
        frames.sort();
        Ok(frames)
    }
}

fn is_frame_name(name: &str) -> bool {
    name.starts_with(FRAME_PREFIX) && name.ends_with(FRAME_EXTENSION)
}
