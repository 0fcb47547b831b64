use bootreel_av::plan::DEFAULT_FPS;
use bootreel_av::ScaleMode;
use bootreel_remote::DEFAULT_REMOTE_DIR;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Directory receiving the `pic_NNN.jpg` frames. The device config is
    /// written to its parent.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_fps")]
    pub fps: u32,

    #[serde(default)]
    pub scale_mode: ScaleMode,

    #[serde(default)]
    pub fade: bool,
}

pub const DEFAULT_OUTPUT_DIR: &str = "export/part0";

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_fps() -> u32 {
    DEFAULT_FPS
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            fps: default_fps(),
            scale_mode: ScaleMode::default(),
            fade: false,
        }
    }
}

/// Settings for the target device.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    #[serde(default = "default_remote_dir")]
    pub remote_dir: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Never try SFTP; stream every file through an exec channel
    #[serde(default)]
    pub force_exec_fallback: bool,
}

fn default_remote_dir() -> String {
    DEFAULT_REMOTE_DIR.to_string()
}

fn default_connect_timeout() -> u64 {
    bootreel_remote::DEFAULT_CONNECT_TIMEOUT.as_secs()
}

impl DeviceConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            remote_dir: default_remote_dir(),
            connect_timeout_secs: default_connect_timeout(),
            force_exec_fallback: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Derived from the ffmpeg location when unset
    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}
