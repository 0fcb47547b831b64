//! Shared helpers for integration tests.
//!
//! Stand-in `ffmpeg`/`ffprobe` executables are small POSIX shell scripts.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// An ffmpeg that honours `-frames:v N` and the output pattern, writing N
/// zero-based frames. Without an output pattern it behaves like
/// `ffmpeg -i <file>`: prints a banner with a duration and exits 1.
pub const FAKE_FFMPEG: &str = r#"
count=""
out=""
prev=""
for arg in "$@"; do
  case "$prev" in -frames:v) count="$arg" ;; esac
  case "$arg" in *pic_%03d.jpg) out="$arg" ;; esac
  prev="$arg"
done
if [ -z "$out" ]; then
  echo "  Duration: 00:00:02.00, start: 0.000000, bitrate: 1000 kb/s" >&2
  echo "At least one output file must be specified" >&2
  exit 1
fi
i=0
while [ "$i" -lt "$count" ]; do
  printf 'jpeg' > "$(printf "$out" "$i")"
  i=$((i + 1))
done
"#;

/// An ffmpeg that rejects its input.
pub const FAILING_FFMPEG: &str = r#"
echo "clip.mp4: Invalid data found when processing input" >&2
exit 1
"#;

/// An ffprobe reporting a 3.5 second video.
pub const FAKE_FFPROBE: &str = r#"echo '{"format":{"duration":"3.500000"}}'"#;

/// An ffprobe that cannot read anything.
pub const BROKEN_FFPROBE: &str = "exit 1";

/// Write an executable shell script named `name` into `dir`.
pub fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A placeholder video file; the fake tools never read it.
pub fn video(dir: &Path) -> PathBuf {
    let path = dir.join("clip.mp4");
    fs::write(&path, b"\x00\x00\x00\x18ftypmp42").unwrap();
    path
}

/// Frame file names in `dir`, sorted.
pub fn frame_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("pic_") && n.ends_with(".jpg"))
        .collect();
    names.sort();
    names
}
