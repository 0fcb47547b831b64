use bootreel_av::{ProbeBackend, ScaleMode};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bootreel")]
#[command(author, version, about = "Turn a video into a printer boot animation")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export a video as a boot animation frame sequence
    Export {
        /// Video to export (asks for one when omitted)
        video: Option<PathBuf>,

        /// Start time in seconds
        #[arg(short, long, default_value_t = 0.0)]
        start: f64,

        /// End time in seconds (defaults to the end of the video)
        #[arg(short, long)]
        end: Option<f64>,

        /// Frames per second
        #[arg(short, long)]
        fps: Option<u32>,

        /// Fade in from and out to black
        #[arg(long)]
        fade: bool,

        /// How the picture is fitted to the display
        #[arg(long, value_enum)]
        scale_mode: Option<ScaleModeArg>,

        /// Frame output directory; the config goes to its parent
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Upload the export afterwards
        #[arg(long, value_name = "USER:PASS@HOST[:PORT]")]
        upload: Option<String>,

        /// Directory on the device that receives the export
        #[arg(long)]
        remote_dir: Option<String>,

        /// Skip SFTP and stream files over exec channels
        #[arg(long)]
        no_sftp: bool,
    },

    /// Upload an existing export to a device
    Upload {
        /// Device to upload to
        #[arg(value_name = "USER:PASS@HOST[:PORT]")]
        connection: String,

        /// Local export directory (defaults to the parent of the output dir)
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Directory on the device that receives the export
        #[arg(long)]
        remote_dir: Option<String>,

        /// Skip SFTP and stream files over exec channels
        #[arg(long)]
        no_sftp: bool,
    },

    /// Show the duration of a video
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Duration source
        #[arg(long, value_enum, default_value_t = ProbeBackendArg::Auto)]
        backend: ProbeBackendArg,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ScaleModeArg {
    Stretch,
    Crop,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ProbeBackendArg {
    /// ffprobe, then the ffmpeg banner
    Auto,
    Ffprobe,
    Banner,
}

impl From<ProbeBackendArg> for ProbeBackend {
    fn from(arg: ProbeBackendArg) -> Self {
        match arg {
            ProbeBackendArg::Auto => ProbeBackend::Auto,
            ProbeBackendArg::Ffprobe => ProbeBackend::Ffprobe,
            ProbeBackendArg::Banner => ProbeBackend::Banner,
        }
    }
}

impl From<ScaleModeArg> for ScaleMode {
    fn from(arg: ScaleModeArg) -> Self {
        match arg {
            ScaleModeArg::Stretch => ScaleMode::Stretch,
            ScaleModeArg::Crop => ScaleMode::Crop,
        }
    }
}
