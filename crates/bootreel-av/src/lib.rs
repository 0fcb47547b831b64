//! # bootreel-av
//!
//! Frame-sequence export for boot display animations.
//!
//! This crate provides functionality for:
//! - Probing a video's duration (ffprobe, with the ffmpeg banner as fallback)
//! - Planning an export: timing, frame count and ffmpeg filter chain
//! - Running ffmpeg to write a zero-based `pic_NNN.jpg` sequence
//! - Emitting the device configuration that describes the sequence
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use bootreel_av::{DeviceConfig, ExportPlanner, ExportRequest, FrameDir, Transcode};
//! use std::path::Path;
//!
//! let request = ExportRequest::builder("intro.mp4").fps(12).build()?;
//! let plan = ExportPlanner::new("ffmpeg", "ffprobe").plan(&request)?;
//!
//! let frames = FrameDir::create("export/part0")?;
//! frames.clear()?;
//! let written = Transcode::new(Path::new("ffmpeg"), request.video(), &plan, &frames).run()?;
//! DeviceConfig::new(plan.fps).write(frames.export_root())?;
//! println!("{} frames", written);
//! # Ok::<(), bootreel_av::Error>(())
//! ```

pub mod device;
mod error;
pub mod frames;
pub mod plan;
pub mod probe;
pub mod template;
pub mod tools;
pub mod transcode;

// Re-exports
pub use device::{DeviceConfig, CONFIG_FILE_NAME};
pub use error::{Error, Result};
pub use frames::FrameDir;
pub use plan::{ExportPlan, ExportPlanner, ExportRequest, ExportRequestBuilder, ScaleMode};
pub use probe::ProbeTools;
pub use template::TemplateContext;
pub use tools::{check_tool, check_tools, get_tool_path, require_tool, sibling_probe, ToolInfo};
pub use transcode::Transcode;

/// Backend to use for determining a video's duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeBackend {
    /// ffprobe first, then the ffmpeg banner
    #[default]
    Auto,
    /// Use ffprobe CLI (parses JSON output)
    Ffprobe,
    /// Parse the `Duration:` line ffmpeg prints for its input
    Banner,
}
