mod cli;

use bootreel::{
    config,
    pipeline::{self, ExportEvent, ExportPipeline, UploadPlan},
    probe::{self, ProbeBackend, Toolchain},
};
use bootreel_av::ExportRequest;
use bootreel_remote::{DeployCallback, DeployEvent};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

/// Extensions offered when asking for a video.
const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "avi", "mkv", "mov"];

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "bootreel=debug,bootreel_av=debug,bootreel_remote=debug".to_string()
        } else {
            "bootreel=info,bootreel_av=info,bootreel_remote=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Export {
            video,
            start,
            end,
            fps,
            fade,
            scale_mode,
            output,
            upload,
            remote_dir,
            no_sftp,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let args = ExportArgs {
                video,
                start,
                end,
                fps: fps.unwrap_or(config.export.fps),
                fade: fade || config.export.fade,
                scale_mode: scale_mode.map(Into::into).unwrap_or(config.export.scale_mode),
                output: output.unwrap_or_else(|| config.export.output_dir.clone()),
            };
            let upload = match upload {
                Some(target) => Some(
                    UploadPlan::new(pipeline::parse_connection(&target)?, &config.device)
                        .remote_dir(remote_dir.unwrap_or_else(|| config.device.remote_dir.clone()))
                        .force_exec_fallback(no_sftp),
                ),
                None => None,
            };
            export_video(args, &config, upload)
        }
        Commands::Upload {
            connection,
            export_dir,
            remote_dir,
            no_sftp,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let plan = UploadPlan::new(pipeline::parse_connection(&connection)?, &config.device)
                .remote_dir(remote_dir.unwrap_or_else(|| config.device.remote_dir.clone()))
                .force_exec_fallback(no_sftp);
            let export_dir = export_dir.unwrap_or_else(|| default_export_root(&config));
            upload_export(&plan, &export_dir)
        }
        Commands::Probe {
            file,
            json,
            backend,
        } => probe_file(&file, cli.config.as_deref(), json, backend.into()),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("bootreel {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

struct ExportArgs {
    video: Option<PathBuf>,
    start: f64,
    end: Option<f64>,
    fps: u32,
    fade: bool,
    scale_mode: bootreel_av::ScaleMode,
    output: PathBuf,
}

fn export_video(args: ExportArgs, config: &config::Config, upload: Option<UploadPlan>) -> Result<()> {
    let video = match args.video {
        Some(video) => video,
        None => prompt_for_video()?,
    };

    let request = ExportRequest::builder(&video)
        .start(args.start)
        .end(args.end)
        .fps(args.fps)
        .fade(args.fade)
        .scale_mode(args.scale_mode)
        .build()
        .context("Invalid export parameters")?;

    if !video.is_file() {
        anyhow::bail!("Video file does not exist: {:?}", video);
    }

    let tools = Toolchain::resolve(&config.tools)?;

    println!("Exporting {}", video.display());
    let outcome = ExportPipeline::new(tools, &args.output)
        .with_progress_callback(Box::new(|event: &ExportEvent| match event {
            ExportEvent::Planned {
                duration,
                frame_count,
            } => println!("  {:.2}s of video, {} frames planned", duration, frame_count),
            ExportEvent::Cleared { removed } if *removed > 0 => {
                println!("  Removed {} frames from a previous export", removed)
            }
            ExportEvent::Transcoding { .. } => println!("  Extracting frames..."),
            _ => {}
        }))
        .run(&request)?;

    println!("\nExport complete!");
    println!(
        "  Frames: {} in {}",
        outcome.frames_written,
        outcome.frames_dir.display()
    );
    println!("  Config: {}", outcome.config_path.display());

    if let Some(plan) = upload {
        upload_export(&plan, outcome.export_root())?;
    }

    Ok(())
}

fn upload_export(plan: &UploadPlan, export_dir: &Path) -> Result<()> {
    println!(
        "Uploading {} to {}:{}",
        export_dir.display(),
        plan.connection,
        plan.remote_dir
    );

    let progress: DeployCallback = Box::new(|event: &DeployEvent| match event {
        DeployEvent::BackedUp { backup } => println!("  Previous files moved to {}", backup),
        DeployEvent::FileTransferred { path, done, total } => {
            println!("  [{}/{}] {}", done, total, path)
        }
        _ => {}
    });
    let report = plan.run(export_dir, Some(progress))?;

    println!("\n✓ {}", report.manifest.summary());
    Ok(())
}

/// Export root implied by the configured frame directory.
fn default_export_root(config: &config::Config) -> PathBuf {
    match config.export.output_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(feature = "dialog")]
fn prompt_for_video() -> Result<PathBuf> {
    println!("Select a video file...");
    rfd::FileDialog::new()
        .set_title("Select a video file")
        .add_filter("Video", &VIDEO_EXTENSIONS)
        .add_filter("All files", &["*"])
        .pick_file()
        .context("No video selected")
}

#[cfg(not(feature = "dialog"))]
fn prompt_for_video() -> Result<PathBuf> {
    use std::io::{BufRead, Write};

    print!("Video file ({}): ", VIDEO_EXTENSIONS.join(", "));
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let path = line.trim().trim_matches(|c: char| c == '"' || c == '\'');
    if path.is_empty() {
        anyhow::bail!("No video selected");
    }
    Ok(PathBuf::from(path))
}

fn probe_file(
    file: &Path,
    config_path: Option<&Path>,
    json: bool,
    backend: ProbeBackend,
) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let tools = Toolchain::resolve_or_bare(&config.tools);
    let duration = probe::probe_file(&tools, file, backend)?;
    let secs = duration.as_secs_f64();

    if json {
        let value = serde_json::json!({
            "file": file,
            "duration": secs,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        let whole = duration.as_secs();
        println!("File: {}", file.display());
        println!(
            "Duration: {:02}:{:02}:{:02}.{:03} ({:.3}s)",
            whole / 3600,
            (whole / 60) % 60,
            whole % 60,
            duration.subsec_millis(),
            secs
        );
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let toolchain = Toolchain::resolve_or_bare(&config.tools);
    let tools = probe::check_tools(&toolchain.ffmpeg, &toolchain.ffprobe);
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg (it ships ffprobe) to export videos.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => match config::find_default_config() {
            Some(p) => {
                println!("Validating config: {:?}", p);
                let config = config::load_config(&p)?;
                println!("✓ Configuration is valid");
                config
            }
            None => {
                println!("No config file found, using defaults");
                config::Config::default()
            }
        },
    };

    println!("  Output dir: {}", config.export.output_dir.display());
    println!("  FPS: {}", config.export.fps);
    println!("  Scale mode: {}", config.export.scale_mode);
    println!("  Fade: {}", config.export.fade);
    println!("  Remote dir: {}", config.device.remote_dir);
    println!("  Connect timeout: {}s", config.device.connect_timeout_secs);
    println!("  Force exec fallback: {}", config.device.force_exec_fallback);

    Ok(())
}
