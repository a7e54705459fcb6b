use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use audiolift::{
    AudioFormat, ConvertOptions, Converter, FfmpegLogLevel, InputSource, ProgressInfo,
    utilities::{format_size, format_time},
    validation::{ensure_video_media_type, guess_media_type},
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  audiolift convert input.mp4 --format mp3 --out audio.mp3\n  audiolift convert input.mkv --format wav --out clip.wav --progress --json\n  audiolift completions zsh > _audiolift";

#[derive(Debug, Parser)]
#[command(
    name = "audiolift",
    version,
    about = "Extract the audio track of a video file as WAV or MP3",
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
    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar.
    #[arg(long)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long)]
    overwrite: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert the audio track of a video file.
    #[command(
        about = "Extract and re-encode the audio track",
        visible_alias = "extract",
        after_help = "Examples:\n  audiolift convert input.mp4 --format mp3 --out audio.mp3\n  audiolift convert input.webm --format wav"
    )]
    Convert {
        /// Input video path.
        input: PathBuf,
        /// Output format: wav | mp3.
        #[arg(long, default_value = "wav")]
        format: String,
        /// Output file path. Defaults to the input name with the format's extension.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print a machine-readable JSON summary.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn default_output_path(input: &Path, format: AudioFormat) -> PathBuf {
    input.with_extension(format.extension())
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn ensure_video_input(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let media_type = guess_media_type(input)
        .ok_or_else(|| format!("cannot determine a video type for {}", input.display()))?;
    ensure_video_media_type(media_type)?;
    Ok(())
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let default_filter = if global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    if let Some(level) = &global.log_level {
        audiolift::set_ffmpeg_log_level(level.parse::<FfmpegLogLevel>()?);
    } else if !global.verbose {
        audiolift::set_ffmpeg_log_level(FfmpegLogLevel::Error);
    }

    Ok(())
}

fn progress_bar() -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let bar = ProgressBar::new(100);
    let style = ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos:>3}% {msg}")?;
    bar.set_style(style.progress_chars("##-"));
    Ok(bar)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            format,
            out,
            json,
        } => {
            apply_global_options(&cli.global)?;
            let audio_format: AudioFormat = format.parse()?;
            ensure_video_input(&input)?;
            if !input.is_file() {
                return Err(format!("input not found: {}", input.display()).into());
            }

            let out = out.unwrap_or_else(|| default_output_path(&input, audio_format));
            ensure_writable_path(&out, cli.global.overwrite)?;

            let mut options = ConvertOptions::new();
            let bar = if cli.global.progress {
                let bar = progress_bar()?;
                let sink = bar.clone();
                options = options.with_progress(Arc::new(move |info: &ProgressInfo| {
                    sink.set_position(u64::from(info.percent));
                    sink.set_message(info.label.clone());
                }));
                Some(bar)
            } else {
                None
            };

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let converter = Converter::ffmpeg();
            let outcome = runtime.block_on(converter.convert(
                InputSource::path(&input),
                audio_format,
                &options,
            ));

            let result = match outcome {
                Ok(result) => result,
                Err(error) => {
                    if let Some(bar) = &bar {
                        bar.abandon_with_message("failed");
                    }
                    return Err(error.into());
                }
            };
            if let Some(bar) = bar {
                bar.finish_with_message("done");
            }

            fs::write(&out, result.bytes())?;

            if json {
                let payload = json!({
                    "input": input.display().to_string(),
                    "output": out.display().to_string(),
                    "format": audio_format.extension(),
                    "mime_type": result.mime_type(),
                    "bytes": result.byte_length(),
                    "size": format_size(result.byte_length() as u64),
                    "duration_seconds": result.duration_seconds(),
                    "duration": format_time(result.duration_seconds()),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "{} {}",
                    "saved".green().bold(),
                    format!(
                        "{} ({} {}, {})",
                        out.display(),
                        format_time(result.duration_seconds()),
                        audio_format,
                        format_size(result.byte_length() as u64)
                    )
                    .green()
                );
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "audiolift", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{AudioFormat, default_output_path, ensure_video_input, ensure_writable_path};

    #[test]
    fn default_output_swaps_extension() {
        let out = default_output_path(Path::new("clips/holiday.mkv"), AudioFormat::Mp3);
        assert_eq!(out, Path::new("clips/holiday.mp3"));

        let out = default_output_path(Path::new("talk"), AudioFormat::Wav);
        assert_eq!(out, Path::new("talk.wav"));
    }

    #[test]
    fn video_inputs_only() {
        assert!(ensure_video_input(Path::new("movie.MP4")).is_ok());
        assert!(ensure_video_input(Path::new("song.mp3")).is_err());
        assert!(ensure_video_input(Path::new("no_extension")).is_err());
    }

    #[test]
    fn existing_output_needs_overwrite() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(ensure_writable_path(file.path(), false).is_err());
        assert!(ensure_writable_path(file.path(), true).is_ok());
        assert!(ensure_writable_path(Path::new("definitely/not/here.wav"), false).is_ok());
    }
}
