use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use serde_json::Value;
use vidinspect::{
    ChannelReply, FfmpegDecoder, FfmpegLogLevel, FrameOutcome, FrameRequest, InspectorOptions,
    MediaInspector, MethodCall,
};

const CLI_AFTER_HELP: &str = "Examples:\n  vidinspect info clip.mp4 --json\n  vidinspect frame clip.mp4 --out thumb.jpg --position 00:00:05.000 --max-width 320\n  vidinspect gif-name /videos/clip.mp4\n  vidinspect purge-cache --cache-root ~/.cache/app\n  vidinspect call getMediaInfo --args '{\"path\":\"clip.mp4\"}'\n  vidinspect completions zsh > _vidinspect";

#[derive(Debug, Parser)]
#[command(
    name = "vidinspect",
    version,
    about = "Read video metadata and extract thumbnail frames",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional diagnostic output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Allow overwriting existing output files.
    #[arg(long, global = true)]
    overwrite: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Always decode at native size and resample afterwards.
    #[arg(long, global = true)]
    no_scaled_frames: bool,

    /// Channel label attached to reported errors.
    #[arg(long, global = true)]
    channel: Option<String>,

    /// Directory containing the `video_compress` cache directory.
    #[arg(long, global = true)]
    cache_root: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print media info for a video (alias: probe).
    #[command(
        about = "Print media info",
        visible_alias = "probe",
        after_help = "Examples:\n  vidinspect info clip.mp4\n  vidinspect info file:///tmp/x.mov --json"
    )]
    Info {
        /// Input path or URI.
        input: String,

        /// Output the info record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Extract one thumbnail frame.
    #[command(
        about = "Extract a thumbnail frame",
        after_help = "Examples:\n  vidinspect frame clip.mp4 --out thumb.png\n  vidinspect frame clip.mp4 --out thumb.jpg --position 1500 --max-width 320 --max-height 240"
    )]
    Frame {
        /// Input path or URI.
        input: String,
        /// Output image path; the format follows the extension.
        #[arg(long)]
        out: PathBuf,
        /// Position in milliseconds or as HH:MM:SS.mmm.
        #[arg(long, default_value = "0")]
        position: String,
        /// Maximum width; 0 leaves the width unconstrained.
        #[arg(long, default_value_t = 0)]
        max_width: i32,
        /// Maximum height; 0 leaves the height unconstrained.
        #[arg(long, default_value_t = 0)]
        max_height: i32,
        /// JPEG quality (1-100) for .jpg/.jpeg outputs.
        #[arg(long, default_value_t = vidinspect::frame::DEFAULT_JPEG_QUALITY)]
        quality: u8,
    },

    /// Print the GIF file name derived from a video path.
    #[command(about = "Derive a GIF file name")]
    GifName {
        /// Input file path.
        input: String,
    },

    /// Delete the cache directory under --cache-root.
    #[command(about = "Purge the cache directory")]
    PurgeCache,

    /// Send a raw channel call and print the reply.
    #[command(
        about = "Invoke a channel method",
        after_help = "Examples:\n  vidinspect call getFrame --args '{\"path\":\"clip.mp4\",\"position\":1000,\"maxWidth\":320}'"
    )]
    Call {
        /// Method name (getMediaInfo, getFrame, deriveGifName, purgeCache).
        method: String,
        /// Arguments as a JSON object.
        #[arg(long, default_value = "{}")]
        args: String,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_position(value: &str) -> Result<i64, Box<dyn std::error::Error>> {
    let trimmed = value.trim();
    if let Ok(milliseconds) = trimmed.parse::<i64>() {
        return Ok(milliseconds);
    }
    let milliseconds = vidinspect::parse_timestamp(trimmed)?;
    i64::try_from(milliseconds)
        .map_err(|_| format!("position out of range: {trimmed}").into())
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Ok(());
    }
    if !overwrite {
        return Err(format!(
            "output already exists: {} (use --overwrite to replace)",
            path.display()
        )
        .into());
    }
    eprintln!(
        "{} {}",
        "warning:".yellow().bold(),
        format!("overwriting {}", path.display()).yellow()
    );
    vidinspect::delete_file(path)?;
    Ok(())
}

fn is_jpeg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            extension.eq_ignore_ascii_case("jpg") || extension.eq_ignore_ascii_case("jpeg")
        })
}

fn build_inspector(global: &GlobalOptions) -> MediaInspector<FfmpegDecoder> {
    let mut options = InspectorOptions::new();
    if let Some(channel) = &global.channel {
        options = options.with_channel_name(channel.clone());
    }
    if let Some(root) = &global.cache_root {
        options = options.with_cache_root(root.clone());
    }
    let decoder = FfmpegDecoder::new().with_scaled_frames(!global.no_scaled_frames);
    MediaInspector::new(decoder, options)
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = &global.log_level {
        let parsed: FfmpegLogLevel = level.parse()?;
        vidinspect::set_ffmpeg_log_level(parsed);
    }
    Ok(())
}

fn print_reply(reply: &ChannelReply) -> Result<(), Box<dyn std::error::Error>> {
    match reply {
        ChannelReply::Success(value) => println!("{}", serde_json::to_string_pretty(value)?),
        ChannelReply::Bytes(bytes) => println!("<{} bytes of image data>", bytes.len()),
        ChannelReply::Empty => println!("{}", "<empty>".dimmed()),
        ChannelReply::Error(error) => return Err(error.to_string().into()),
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;
    let inspector = build_inspector(&cli.global);

    match cli.command {
        Commands::Info { input, json } => {
            let info = inspector.get_media_info(&input)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info.to_json())?);
            } else {
                println!("{} {}", "Path:".bold(), info.path);
                println!("{} {}", "Title:".bold(), info.title);
                println!("{} {}", "Author:".bold(), info.author);
                println!("{} {}x{}", "Size:".bold(), info.width, info.height);
                println!("{} {} ms", "Duration:".bold(), info.duration);
                println!("{} {} bytes", "File size:".bold(), info.filesize);
                if let Some(orientation) = info.orientation {
                    println!("{} {orientation}°", "Orientation:".bold());
                }
            }
        }
        Commands::Frame {
            input,
            out,
            position,
            max_width,
            max_height,
            quality,
        } => {
            ensure_writable_path(&out, cli.global.overwrite)?;
            let request =
                FrameRequest::at(parse_position(&position)?).with_bounds(max_width, max_height);
            let report = inspector.frame_report(&input, &request);
            if let Err(error) = &report.release {
                eprintln!("{} {error}", "warning:".yellow().bold());
            }
            match report.decode? {
                FrameOutcome::Decoded(image) => {
                    if is_jpeg_path(&out) {
                        fs::write(&out, vidinspect::frame::encode_jpeg(&image, quality)?)?;
                    } else {
                        image.save(&out)?;
                    }
                    if cli.global.verbose {
                        eprintln!(
                            "{} {}x{} -> {}",
                            "wrote".green().bold(),
                            image.width(),
                            image.height(),
                            out.display()
                        );
                    }
                }
                FrameOutcome::Empty => {
                    return Err(format!(
                        "no frame decoded from {input} at {} ms",
                        request.position_ms
                    )
                    .into());
                }
            }
        }
        Commands::GifName { input } => {
            let name = inspector.derive_gif_name(&input);
            if name.is_empty() {
                return Err(format!("no such file: {input}").into());
            }
            println!("{name}");
        }
        Commands::PurgeCache => match inspector.purge_cache() {
            Some(true) => println!("{}", "cache purged".green()),
            Some(false) => return Err("cache could only be partially purged".into()),
            None => return Err("no cache root configured (use --cache-root)".into()),
        },
        Commands::Call { method, args } => {
            let arguments: Value = serde_json::from_str(&args)?;
            let response = inspector.handle_call(&MethodCall::new(method, arguments));
            if let Some(cleanup) = &response.cleanup {
                eprintln!("{} {cleanup}", "warning:".yellow().bold());
            }
            print_reply(&response.reply)?;
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "vidinspect", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
