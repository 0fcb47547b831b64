//! Export planning: timing, frame count and filter chain.
//!
//! Planning is pure apart from the optional duration probe, so every value an
//! export uses is fixed before the output directory is touched.

use crate::probe::{probe_duration, ProbeTools};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Width of the device frame in pixels.
pub const FRAME_WIDTH: u32 = 480;
/// Height of the device frame in pixels.
pub const FRAME_HEIGHT: u32 = 800;
/// Length of the fade-in and fade-out in seconds.
pub const FADE_DURATION: f64 = 1.0;
/// ffmpeg `-q:v` value for the JPEG frames (1 is best).
pub const JPEG_QUALITY: u32 = 1;
/// Frame rate used when none is requested.
pub const DEFAULT_FPS: u32 = 12;

/// How the source picture is fitted into the device frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    /// Scale straight to the frame size, ignoring the aspect ratio.
    #[default]
    Stretch,
    /// Scale to cover the frame, then center-crop the overflow.
    Crop,
}

impl ScaleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleMode::Stretch => "stretch",
            ScaleMode::Crop => "crop",
        }
    }
}

impl fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScaleMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stretch" => Ok(ScaleMode::Stretch),
            "crop" => Ok(ScaleMode::Crop),
            _ => Err(format!("Unknown scale mode: {} (expected stretch or crop)", s)),
        }
    }
}

/// Parameters of one export. Validated on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    video: PathBuf,
    start: f64,
    end: Option<f64>,
    fps: u32,
    fade: bool,
    scale_mode: ScaleMode,
}

impl ExportRequest {
    /// Start building a request for `video` with default settings.
    pub fn builder(video: impl Into<PathBuf>) -> ExportRequestBuilder {
        ExportRequestBuilder {
            video: video.into(),
            start: 0.0,
            end: None,
            fps: DEFAULT_FPS,
            fade: false,
            scale_mode: ScaleMode::default(),
        }
    }

    pub fn video(&self) -> &Path {
        &self.video
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> Option<f64> {
        self.end
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn fade(&self) -> bool {
        self.fade
    }

    pub fn scale_mode(&self) -> ScaleMode {
        self.scale_mode
    }
}

/// Builder for [`ExportRequest`].
#[derive(Debug, Clone)]
pub struct ExportRequestBuilder {
    video: PathBuf,
    start: f64,
    end: Option<f64>,
    fps: u32,
    fade: bool,
    scale_mode: ScaleMode,
}

impl ExportRequestBuilder {
    pub fn start(mut self, seconds: f64) -> Self {
        self.start = seconds;
        self
    }

    pub fn end(mut self, seconds: Option<f64>) -> Self {
        self.end = seconds;
        self
    }

    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn fade(mut self, fade: bool) -> Self {
        self.fade = fade;
        self
    }

    pub fn scale_mode(mut self, mode: ScaleMode) -> Self {
        self.scale_mode = mode;
        self
    }

    /// Validate the parameters and produce the request.
    ///
    /// The video file itself is checked by the planner, not here.
    pub fn build(self) -> Result<ExportRequest> {
        if !self.start.is_finite() || self.start < 0.0 {
            return Err(Error::invalid_input(format!(
                "start time must be a non-negative number of seconds, got {}",
                self.start
            )));
        }
        if let Some(end) = self.end {
            if !end.is_finite() || end <= self.start {
                return Err(Error::invalid_input(format!(
                    "end time ({}) must be after start time ({})",
                    end, self.start
                )));
            }
        }
        if self.fps == 0 {
            return Err(Error::invalid_input("frame rate must be positive"));
        }

        Ok(ExportRequest {
            video: self.video,
            start: self.start,
            end: self.end,
            fps: self.fps,
            fade: self.fade,
            scale_mode: self.scale_mode,
        })
    }
}

/// Everything the transcoder needs, derived once from a request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    pub fps: u32,
    pub frame_count: u64,
    pub filter_chain: String,
    pub fade_out_start: Option<f64>,
}

impl ExportPlan {
    /// Frame file name pattern handed to ffmpeg (zero-based numbering).
    pub const OUTPUT_PATTERN: &'static str = "pic_%03d.jpg";

    /// Build the plan for `request` once its end time is known.
    pub fn new(request: &ExportRequest, end: f64) -> Result<Self> {
        let duration = end - request.start();
        if !duration.is_finite() || duration <= 0.0 {
            return Err(Error::invalid_input(format!(
                "export duration must be positive (start {:.2}s, end {:.2}s)",
                request.start(),
                end
            )));
        }

        let fps = request.fps();
        let fade_out_start = request.fade().then(|| fade_out_start(duration, fps));

        Ok(Self {
            start: request.start(),
            end,
            duration,
            fps,
            frame_count: frame_count(duration, fps),
            filter_chain: build_filter_chain(request.scale_mode(), fade_out_start),
            fade_out_start,
        })
    }
}

/// Number of frames in `duration` seconds at `fps`, rounded down.
pub fn frame_count(duration: f64, fps: u32) -> u64 {
    if !duration.is_finite() || duration <= 0.0 {
        return 0;
    }
    (duration * f64::from(fps)).floor() as u64
}

/// Start of the fade-out so it completes two frames before the last one.
///
/// Clips shorter than the fade itself would yield a negative offset; the
/// value is clamped to zero so the fade-out simply starts immediately.
pub fn fade_out_start(duration: f64, fps: u32) -> f64 {
    let guard = 2.0 / f64::from(fps.max(1));
    (duration - FADE_DURATION - guard).max(0.0)
}

/// Build the ffmpeg `-vf` chain for the device frame.
///
/// The display is mounted rotated, so the picture is scaled to the
/// landscape size (height × width) and then turned with `transpose=1`.
pub fn build_filter_chain(scale_mode: ScaleMode, fade_out_start: Option<f64>) -> String {
    let (w, h) = (FRAME_HEIGHT, FRAME_WIDTH);

    let mut filters = match scale_mode {
        ScaleMode::Crop => vec![
            format!("scale={w}:{h}:force_original_aspect_ratio=increase"),
            format!("crop={w}:{h}"),
        ],
        ScaleMode::Stretch => vec![format!("scale={w}:{h}")],
    };
    filters.push("transpose=1".to_string());

    if let Some(out_start) = fade_out_start {
        filters.push(format!("fade=t=in:st=0:d={}", FADE_DURATION));
        filters.push(format!("fade=t=out:st={:.3}:d={}", out_start, FADE_DURATION));
    }

    filters.join(",")
}

/// Resolves request timing and builds export plans.
#[derive(Debug, Clone)]
pub struct ExportPlanner {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl ExportPlanner {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Plan an export, probing the video when no end time was given.
    pub fn plan(&self, request: &ExportRequest) -> Result<ExportPlan> {
        if !request.video().is_file() {
            return Err(Error::file_not_found(request.video()));
        }

        let end = match request.end() {
            Some(end) => end,
            None => {
                let tools = ProbeTools {
                    ffmpeg: &self.ffmpeg,
                    ffprobe: &self.ffprobe,
                };
                let duration = probe_duration(tools, request.video())?;

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "Probed duration of {:?}: {:.3}s",
                    request.video(),
                    duration.as_secs_f64()
                );

                duration.as_secs_f64()
            }
        };

        ExportPlan::new(request, end)
    }
}
