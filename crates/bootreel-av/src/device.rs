//! Boot display configuration file.

use crate::plan::{FRAME_HEIGHT, FRAME_WIDTH};
use crate::template::TemplateContext;
use crate::Result;
use std::path::{Path, PathBuf};

/// File name of the device configuration, written next to the frame directory.
pub const CONFIG_FILE_NAME: &str = "boot-display.conf";

/// Layout template. `{ part0 }` is a device-side marker, not a variable.
const CONFIG_TEMPLATE: &str = "\
width: {width}
height: {height}
fps: {fps}
parts: 1
{ part0 }
";

/// Device configuration describing one single-part frame sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl DeviceConfig {
    /// Configuration for the fixed device frame at `fps`.
    pub fn new(fps: u32) -> Self {
        Self {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            fps,
        }
    }

    /// Render the configuration text.
    pub fn render(&self) -> String {
        TemplateContext::new()
            .with_var("width", self.width)
            .with_var("height", self.height)
            .with_var("fps", self.fps)
            .substitute(CONFIG_TEMPLATE)
    }

    /// Write the configuration into `export_root`, replacing any previous file.
    pub fn write(&self, export_root: &Path) -> Result<PathBuf> {
        let path = export_root.join(CONFIG_FILE_NAME);
        std::fs::write(&path, self.render())?;

        #[cfg(feature = "tracing")]
        tracing::debug!("Wrote device config {:?}", path);

        Ok(path)
    }
}
