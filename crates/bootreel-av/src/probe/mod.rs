//! Video duration probing.
//!
//! Two backends are available:
//!
//! - **ffprobe** (preferred): structured JSON output from `ffprobe -show_format`
//! - **banner**: the `Duration:` line ffmpeg prints when opening an input

mod banner;
mod ffprobe;

pub use banner::probe_with_banner;
pub use ffprobe::probe_with_ffprobe;

use crate::{Error, ProbeBackend, Result};
use std::path::Path;
use std::time::Duration;

/// Executables used for probing.
#[derive(Debug, Clone, Copy)]
pub struct ProbeTools<'a> {
    pub ffmpeg: &'a Path,
    pub ffprobe: &'a Path,
}

/// Determine the duration of `video` using the best available backend.
///
/// ffprobe is tried first; any failure there (tool missing, non-zero exit,
/// unusable value) falls back to the ffmpeg banner. When both fail the
/// result is [`Error::DurationUndeterminable`], unless ffmpeg itself is
/// missing, which is reported as [`Error::ToolNotFound`].
pub fn probe_duration(tools: ProbeTools<'_>, video: &Path) -> Result<Duration> {
    probe_duration_with(tools, video, ProbeBackend::Auto)
}

/// Determine the duration of `video` using a specific backend.
pub fn probe_duration_with(
    tools: ProbeTools<'_>,
    video: &Path,
    backend: ProbeBackend,
) -> Result<Duration> {
    if !video.exists() {
        return Err(Error::file_not_found(video));
    }

    match backend {
        ProbeBackend::Auto => match probe_with_ffprobe(tools.ffprobe, video) {
            Ok(duration) => Ok(duration),
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("ffprobe failed, reading ffmpeg banner instead: {}", e);
                let _ = e;

                match probe_with_banner(tools.ffmpeg, video) {
                    Ok(duration) => Ok(duration),
                    Err(err @ Error::ToolNotFound { .. }) => Err(err),
                    Err(_) => Err(Error::DurationUndeterminable {
                        path: video.to_path_buf(),
                    }),
                }
            }
        },
        ProbeBackend::Ffprobe => probe_with_ffprobe(tools.ffprobe, video),
        ProbeBackend::Banner => probe_with_banner(tools.ffmpeg, video),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_video() {
        let tools = ProbeTools {
            ffmpeg: Path::new("ffmpeg"),
            ffprobe: Path::new("ffprobe"),
        };
        let err = probe_duration(tools, &PathBuf::from("/nonexistent/clip.mp4")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_missing_tools_report_tool_not_found() {
        let video = tempfile::NamedTempFile::new().unwrap();
        let tools = ProbeTools {
            ffmpeg: Path::new("/nonexistent/bin/ffmpeg"),
            ffprobe: Path::new("/nonexistent/bin/ffprobe"),
        };
        let err = probe_duration(tools, video.path()).unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { ref tool } if tool == "ffmpeg"));
    }

    #[cfg(unix)]
    mod scripted {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        fn script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
            let path = dir.path().join(name);
            fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn test_ffprobe_preferred() {
            let dir = TempDir::new().unwrap();
            let video = dir.path().join("clip.mp4");
            fs::write(&video, b"").unwrap();
            let ffprobe = script(&dir, "ffprobe", r#"echo '{"format":{"duration":"4.5"}}'"#);
            let ffmpeg = script(&dir, "ffmpeg", "echo '  Duration: 00:00:09.00,' >&2; exit 1");

            let tools = ProbeTools {
                ffmpeg: &ffmpeg,
                ffprobe: &ffprobe,
            };
            let duration = probe_duration(tools, &video).unwrap();
            assert_eq!(duration, Duration::from_secs_f64(4.5));
        }

        #[test]
        fn test_falls_back_to_banner() {
            let dir = TempDir::new().unwrap();
            let video = dir.path().join("clip.mp4");
            fs::write(&video, b"").unwrap();
            let ffprobe = script(&dir, "ffprobe", r#"echo '{"format":{"duration":"N/A"}}'"#);
            let ffmpeg = script(
                &dir,
                "ffmpeg",
                "echo '  Duration: 00:00:09.00, start: 0.0' >&2; exit 1",
            );

            let tools = ProbeTools {
                ffmpeg: &ffmpeg,
                ffprobe: &ffprobe,
            };
            let duration = probe_duration(tools, &video).unwrap();
            assert_eq!(duration, Duration::from_secs(9));
        }

        #[test]
        fn test_both_fail() {
            let dir = TempDir::new().unwrap();
            let video = dir.path().join("clip.mp4");
            fs::write(&video, b"").unwrap();
            let ffprobe = script(&dir, "ffprobe", "exit 1");
            let ffmpeg = script(&dir, "ffmpeg", "echo 'Invalid data found' >&2; exit 1");

            let tools = ProbeTools {
                ffmpeg: &ffmpeg,
                ffprobe: &ffprobe,
            };
            let err = probe_duration(tools, &video).unwrap_err();
            assert!(matches!(err, Error::DurationUndeterminable { .. }));
        }

        #[test]
        fn test_single_backends_do_not_fall_back() {
            let dir = TempDir::new().unwrap();
            let video = dir.path().join("clip.mp4");
            fs::write(&video, b"").unwrap();
            let ffprobe = script(&dir, "ffprobe", "exit 1");
            let ffmpeg = script(&dir, "ffmpeg", "echo '  Duration: 00:00:09.00,' >&2; exit 1");

            let tools = ProbeTools {
                ffmpeg: &ffmpeg,
                ffprobe: &ffprobe,
            };
            let err = probe_duration_with(tools, &video, ProbeBackend::Ffprobe).unwrap_err();
            assert!(matches!(err, Error::ToolFailed { ref tool, .. } if tool == "ffprobe"));

            let duration = probe_duration_with(tools, &video, ProbeBackend::Banner).unwrap();
            assert_eq!(duration, Duration::from_secs(9));
        }
    }
}
