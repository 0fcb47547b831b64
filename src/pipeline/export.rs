use crate::probe::Toolchain;
use anyhow::{Context, Result};
use bootreel_av::{DeviceConfig, ExportPlan, ExportPlanner, ExportRequest, FrameDir, Transcode};
use std::path::{Path, PathBuf};

/// Steps of an export, reported to an optional observer.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    Planned { duration: f64, frame_count: u64 },
    Cleared { removed: usize },
    Transcoding { video: PathBuf },
    FramesWritten { count: usize },
    ConfigWritten { path: PathBuf },
}

/// Progress callback type
pub type ExportCallback = Box<dyn Fn(&ExportEvent) + Send + Sync>;

/// Result of a completed export.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub plan: ExportPlan,
    pub frames_dir: PathBuf,
    /// Frames found on disk after ffmpeg exited.
    pub frames_written: usize,
    pub config_path: PathBuf,
}

impl ExportOutcome {
    /// Directory holding the config file and the frame directory.
    pub fn export_root(&self) -> &Path {
        self.config_path.parent().unwrap_or(Path::new("."))
    }
}

/// Plan, transcode and describe one frame-sequence export.
pub struct ExportPipeline {
    tools: Toolchain,
    output_dir: PathBuf,
    progress_callback: Option<ExportCallback>,
}

impl ExportPipeline {
    pub fn new(tools: Toolchain, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            tools,
            output_dir: output_dir.into(),
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ExportCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn report(&self, event: ExportEvent) {
        if let Some(ref cb) = self.progress_callback {
            cb(&event);
        }
    }

    /// Run the export.
    ///
    /// Nothing on disk changes until the plan is known, and the device
    /// config is only rewritten after ffmpeg succeeds.
    pub fn run(&self, request: &ExportRequest) -> Result<ExportOutcome> {
        let planner = ExportPlanner::new(&self.tools.ffmpeg, &self.tools.ffprobe);
        let plan = planner
            .plan(request)
            .with_context(|| format!("Failed to plan export of {:?}", request.video()))?;

        tracing::info!(
            "Exporting {:.2}s-{:.2}s at {} fps ({} frames, {})",
            plan.start,
            plan.end,
            plan.fps,
            plan.frame_count,
            request.scale_mode()
        );
        self.report(ExportEvent::Planned {
            duration: plan.duration,
            frame_count: plan.frame_count,
        });

        let frames = FrameDir::create(&self.output_dir)
            .with_context(|| format!("Failed to create output directory {:?}", self.output_dir))?;
        let removed = frames
            .clear()
            .with_context(|| format!("Failed to clear old frames in {:?}", frames.path()))?;
        self.report(ExportEvent::Cleared { removed });

        self.report(ExportEvent::Transcoding {
            video: request.video().to_path_buf(),
        });
        let frames_written = Transcode::new(&self.tools.ffmpeg, request.video(), &plan, &frames)
            .run()
            .context("Frame extraction failed")?;
        tracing::info!("Wrote {} frames to {:?}", frames_written, frames.path());
        self.report(ExportEvent::FramesWritten {
            count: frames_written,
        });

        let config_path = DeviceConfig::new(plan.fps)
            .write(frames.export_root())
            .context("Failed to write device config")?;
        tracing::info!("Device config written to {:?}", config_path);
        self.report(ExportEvent::ConfigWritten {
            path: config_path.clone(),
        });

        Ok(ExportOutcome {
            plan,
            frames_dir: frames.path().to_path_buf(),
            frames_written,
            config_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_video_touches_nothing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("export").join("part0");
        let request = ExportRequest::builder(dir.path().join("missing.mp4"))
            .end(Some(2.0))
            .build()
            .unwrap();

        let err = ExportPipeline::new(Toolchain::new("ffmpeg", "ffprobe"), &output)
            .run(&request)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<bootreel_av::Error>(),
            Some(bootreel_av::Error::FileNotFound { .. })
        ));
        assert!(!output.exists());
    }

    #[test]
    fn missing_ffmpeg_keeps_previous_config() {
        let dir = tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"not really a video").unwrap();
        let root = dir.path().join("export");
        std::fs::create_dir_all(root.join("part0")).unwrap();
        std::fs::write(root.join("boot-display.conf"), "fps: 99\n").unwrap();

        let request = ExportRequest::builder(&video).end(Some(1.0)).build().unwrap();
        let tools = Toolchain::new(
            dir.path().join("no-such-ffmpeg"),
            dir.path().join("no-such-ffprobe"),
        );
        let err = ExportPipeline::new(tools, root.join("part0"))
            .run(&request)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<bootreel_av::Error>(),
            Some(bootreel_av::Error::ToolNotFound { .. })
        ));
        assert_eq!(
            std::fs::read_to_string(root.join("boot-display.conf")).unwrap(),
            "fps: 99\n"
        );
    }
}
