//! Duration recovery from the ffmpeg input banner.
//!
//! `ffmpeg -i <file>` without an output always exits with an error, but it
//! prints the input description to stderr first, including a line such as
//! `  Duration: 00:01:23.45, start: 0.000000, bitrate: 1205 kb/s`.

use crate::{Error, Result};
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Read the duration of `video` from the banner ffmpeg prints for it.
pub fn probe_with_banner(ffmpeg: &Path, video: &Path) -> Result<Duration> {
    let output = Command::new(ffmpeg)
        .arg("-hide_banner")
        .arg("-i")
        .arg(video)
        .output()
        .map_err(|e| Error::from_spawn("ffmpeg", e))?;

    // The exit status is meaningless here, only the text matters.
    let stderr = String::from_utf8_lossy(&output.stderr);

    parse_banner_duration(&stderr)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| Error::parse_error("ffmpeg", "no Duration line in input banner"))
}

/// Find the first `Duration: H:MM:SS.ss` field and convert it to seconds.
pub(crate) fn parse_banner_duration(text: &str) -> Option<f64> {
    text.lines()
        .filter_map(|line| line.split_once("Duration:"))
        .find_map(|(_, rest)| {
            let field = rest.split(',').next()?.trim();
            parse_clock(field)
        })
}

fn parse_clock(field: &str) -> Option<f64> {
    let mut parts = field.split(':');
    let hours: u64 = parts.next()?.trim().parse().ok()?;
    let minutes: u64 = parts.next()?.trim().parse().ok()?;
    let seconds: f64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() || !seconds.is_finite() || seconds < 0.0 {
        return None;
    }

    let whole = hours.checked_mul(3600)?.checked_add(minutes.checked_mul(60)?)?;
    let total = whole as f64 + seconds;
    (total > 0.0 && Duration::try_from_secs_f64(total).is_ok()).then_some(total)
}
