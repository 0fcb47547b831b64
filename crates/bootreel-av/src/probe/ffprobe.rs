//! FFprobe-based duration probing.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    #[allow(dead_code)]
    filename: Option<String>,
    duration: Option<String>,
}

/// Query the container duration of `video` with ffprobe.
pub fn probe_with_ffprobe(ffprobe: &Path, video: &Path) -> Result<Duration> {
    let output = Command::new(ffprobe)
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(video)
        .output()
        .map_err(|e| Error::from_spawn("ffprobe", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool_failed("ffprobe", stderr.to_string()));
    }

    let json_str = String::from_utf8(output.stdout)
        .map_err(|e| Error::parse_error("ffprobe", format!("Invalid UTF-8: {}", e)))?;

    parse_ffprobe_duration(&json_str)
}

/// Extract `format.duration` from ffprobe JSON output.
///
/// A missing, non-numeric, non-finite or non-positive duration is an error so
/// the caller can fall back to another source.
pub(crate) fn parse_ffprobe_duration(json: &str) -> Result<Duration> {
    let output: FfprobeOutput = serde_json::from_str(json)?;

    let raw = output
        .format
        .duration
        .ok_or_else(|| Error::parse_error("ffprobe", "no duration in format section"))?;

    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::parse_error("ffprobe", format!("invalid duration: {}", raw)))?;

    if !secs.is_finite() || secs <= 0.0 {
        return Err(Error::parse_error(
            "ffprobe",
            format!("unusable duration: {}", raw),
        ));
    }

    Duration::try_from_secs_f64(secs)
        .map_err(|_| Error::parse_error("ffprobe", format!("duration out of range: {}", raw)))
}
