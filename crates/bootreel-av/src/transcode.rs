//! ffmpeg invocation for frame extraction.

use crate::frames::FrameDir;
use crate::plan::{ExportPlan, JPEG_QUALITY};
use crate::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Longest stderr excerpt carried in a [`Error::ToolFailed`].
pub const MAX_STDERR_CHARS: usize = 500;

/// One ffmpeg run extracting the planned frames of a video.
#[derive(Debug, Clone)]
pub struct Transcode<'a> {
    ffmpeg: &'a Path,
    video: &'a Path,
    plan: &'a ExportPlan,
    frames: &'a FrameDir,
}

impl<'a> Transcode<'a> {
    pub fn new(
        ffmpeg: &'a Path,
        video: &'a Path,
        plan: &'a ExportPlan,
        frames: &'a FrameDir,
    ) -> Self {
        Self {
            ffmpeg,
            video,
            plan,
            frames,
        }
    }

    /// Arguments passed to ffmpeg, in order.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(18);
        args.push("-ss".into());
        args.push(format!("{}", self.plan.start).into());
        args.push("-i".into());
        args.push(self.video.as_os_str().to_owned());
        args.push("-vf".into());
        args.push(self.plan.filter_chain.clone().into());
        args.push("-r".into());
        args.push(self.plan.fps.to_string().into());
        args.push("-frames:v".into());
        args.push(self.plan.frame_count.to_string().into());
        args.push("-q:v".into());
        args.push(JPEG_QUALITY.to_string().into());
        args.push("-start_number".into());
        args.push("0".into());
        args.push(self.output_pattern().into_os_string());
        args.push("-y".into());
        args
    }

    fn output_pattern(&self) -> PathBuf {
        self.frames.pattern()
    }

    /// Run ffmpeg and return the number of frames actually written.
    ///
    /// ffmpeg may legitimately write fewer frames than planned near the end
    /// of a clip, so the count comes from the directory, not the plan.
    pub fn run(&self) -> Result<usize> {
        #[cfg(feature = "tracing")]
        tracing::debug!("Running {:?} {:?}", self.ffmpeg, self.args());

        let output = Command::new(self.ffmpeg)
            .args(self.args())
            .output()
            .map_err(|e| Error::from_spawn("ffmpeg", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::tool_failed(
                "ffmpeg",
                format!(
                    "exit code {:?}: {}",
                    output.status.code(),
                    truncate_chars(stderr.trim(), MAX_STDERR_CHARS)
                ),
            ));
        }

        self.frames.count()
    }
}

/// Cut `text` to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{ExportRequest, ScaleMode};
    use tempfile::TempDir;

    fn plan(fade: bool) -> ExportPlan {
        let req = ExportRequest::builder("/videos/intro.mp4")
            .start(1.5)
            .end(Some(4.0))
            .fps(12)
            .fade(fade)
            .scale_mode(ScaleMode::Crop)
            .build()
            .unwrap();
        ExportPlan::new(&req, 4.0).unwrap()
    }

    #[test]
    fn test_args_shape() {
        let temp = TempDir::new().unwrap();
        let frames = FrameDir::create(temp.path()).unwrap();
        let plan = plan(false);
        let transcode = Transcode::new(
            Path::new("ffmpeg"),
            Path::new("/videos/intro.mp4"),
            &plan,
            &frames,
        );

        let args: Vec<String> = transcode
            .args()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        let pattern = temp.path().join("pic_%03d.jpg").to_string_lossy().into_owned();

        assert_eq!(
            args,
            vec![
                "-ss",
                "1.5",
                "-i",
                "/videos/intro.mp4",
                "-vf",
                "scale=800:480:force_original_aspect_ratio=increase,crop=800:480,transpose=1",
                "-r",
                "12",
                "-frames:v",
                "30",
                "-q:v",
                "1",
                "-start_number",
                "0",
                pattern.as_str(),
                "-y",
            ]
        );
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("ошибка", 3), "оши");
    }

    #[test]
    fn test_missing_ffmpeg() {
        let temp = TempDir::new().unwrap();
        let frames = FrameDir::create(temp.path()).unwrap();
        let plan = plan(false);
        let transcode = Transcode::new(
            Path::new("/nonexistent/bin/ffmpeg"),
            Path::new("/videos/intro.mp4"),
            &plan,
            &frames,
        );
        assert!(matches!(
            transcode.run(),
            Err(Error::ToolNotFound { ref tool }) if tool == "ffmpeg"
        ));
    }

    #[cfg(unix)]
    mod scripted {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        fn script(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("ffmpeg");
            fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn test_failure_truncates_stderr() {
            let bin = TempDir::new().unwrap();
            let out = TempDir::new().unwrap();
            let ffmpeg = script(
                bin.path(),
                "i=0; while [ $i -lt 200 ]; do printf 'error line %s\\n' $i >&2; i=$((i+1)); done; exit 1",
            );
            let frames = FrameDir::create(out.path()).unwrap();
            let plan = plan(false);

            let err = Transcode::new(&ffmpeg, Path::new("/videos/intro.mp4"), &plan, &frames)
                .run()
                .unwrap_err();
            match err {
                Error::ToolFailed { tool, message } => {
                    assert_eq!(tool, "ffmpeg");
                    assert!(message.contains("error line 0"));
                    assert!(!message.contains("error line 199"));
                    assert!(message.chars().count() <= MAX_STDERR_CHARS + 32);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[test]
        fn test_success_counts_frames_on_disk() {
            let bin = TempDir::new().unwrap();
            let out = TempDir::new().unwrap();
            // Writes two frames regardless of the requested count.
            let ffmpeg = script(
                bin.path(),
                r#"for a in "$@"; do case "$a" in *pic_%03d.jpg) d=$(dirname "$a");; esac; done
touch "$d/pic_000.jpg" "$d/pic_001.jpg""#,
            );
            let frames = FrameDir::create(out.path()).unwrap();
            let plan = plan(false);

            let written = Transcode::new(&ffmpeg, Path::new("/videos/intro.mp4"), &plan, &frames)
                .run()
                .unwrap();
            assert_eq!(written, 2);
            assert!(plan.frame_count > 2);
        }
    }
}
