//! FFmpeg-backed decoder and MP3 codec.
//!
//! Available with the `ffmpeg` feature. [`FfmpegDecoder`] implements
//! [`AudioDecoder`](crate::AudioDecoder) and [`FfmpegMp3Factory`] implements
//! [`CodecFactory`](crate::CodecFactory) on top of libmp3lame.
//!
//! FFmpeg has its own internal logging, separate from the Rust
//! [`log`](https://crates.io/crates/log) crate, which prints warnings and
//! errors to stderr by default. [`set_ffmpeg_log_level`] tunes it.
//!
//! # Example
//!
//! ```no_run
//! use audiolift::FfmpegLogLevel;
//!
//! // Silence all FFmpeg output except fatal errors.
//! audiolift::set_ffmpeg_log_level(FfmpegLogLevel::Fatal);
//! ```

mod decoder;
mod mp3;

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use ffmpeg_next::util::log::Level;

use crate::error::AudioLiftError;

pub use decoder::FfmpegDecoder;
pub use mp3::{FfmpegMp3Codec, FfmpegMp3Factory, is_mp3_encoder_available};

/// How much FFmpeg prints to stderr while decoding and encoding.
///
/// Variants run from silent to chattiest. The CLI accepts the lowercase
/// names through [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    Quiet,
    Panic,
    Fatal,
    Error,
    /// FFmpeg's own default.
    Warning,
    Info,
    Verbose,
    Debug,
    Trace,
}

impl FfmpegLogLevel {
    const ALL: [FfmpegLogLevel; 9] = [
        FfmpegLogLevel::Quiet,
        FfmpegLogLevel::Panic,
        FfmpegLogLevel::Fatal,
        FfmpegLogLevel::Error,
        FfmpegLogLevel::Warning,
        FfmpegLogLevel::Info,
        FfmpegLogLevel::Verbose,
        FfmpegLogLevel::Debug,
        FfmpegLogLevel::Trace,
    ];

    /// Lowercase name as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            FfmpegLogLevel::Quiet => "quiet",
            FfmpegLogLevel::Panic => "panic",
            FfmpegLogLevel::Fatal => "fatal",
            FfmpegLogLevel::Error => "error",
            FfmpegLogLevel::Warning => "warning",
            FfmpegLogLevel::Info => "info",
            FfmpegLogLevel::Verbose => "verbose",
            FfmpegLogLevel::Debug => "debug",
            FfmpegLogLevel::Trace => "trace",
        }
    }
}

impl From<FfmpegLogLevel> for Level {
    fn from(level: FfmpegLogLevel) -> Self {
        match level {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

impl TryFrom<Level> for FfmpegLogLevel {
    type Error = Level;

    fn try_from(level: Level) -> Result<Self, Level> {
        Self::ALL
            .into_iter()
            .find(|candidate| Level::from(*candidate) == level)
            .ok_or(level)
    }
}

impl Display for FfmpegLogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = AudioLiftError;

    /// Parse a level name case-insensitively. `warn` is accepted for
    /// `warning`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        let wanted = if wanted == "warn" { "warning" } else { wanted.as_str() };
        Self::ALL
            .into_iter()
            .find(|level| level.name() == wanted)
            .ok_or_else(|| AudioLiftError::InvalidInput(format!("unsupported log level: {value}")))
    }
}

/// Set FFmpeg's stderr verbosity. Rust-side `log` output is unaffected.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.into());
}

/// Current FFmpeg verbosity, or `None` if FFmpeg reports a level outside
/// the named set.
pub fn get_ffmpeg_log_level() -> Option<FfmpegLogLevel> {
    ffmpeg_next::util::log::get_level()
        .ok()
        .and_then(|level| FfmpegLogLevel::try_from(level).ok())
}
