//! # audiolift
//!
//! Lift the audio track out of a video file and re-encode it as WAV or MP3.
//!
//! `audiolift` decodes the audio of a media file into planar `f32` samples,
//! then either writes a 16-bit PCM WAV file in one pass or compresses it to
//! MP3 window by window, yielding to the Tokio scheduler between windows so
//! a long encode never monopolises the runtime. Progress is reported as a
//! single monotonic percentage, and every failure surfaces as one fixed,
//! user-safe message.
//!
//! ## Quick Start
//!
//! ### Extract Audio as MP3
//!
//! ```no_run
//! # #[cfg(feature = "ffmpeg")]
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use audiolift::{AudioFormat, ConvertOptions, Converter, InputSource};
//!
//! let converter = Converter::ffmpeg();
//! let result = converter
//!     .convert(InputSource::path("input.mp4"), AudioFormat::Mp3, &ConvertOptions::new())
//!     .await?;
//! std::fs::write("input.mp3", result.bytes())?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Track Progress
//!
//! ```no_run
//! # #[cfg(feature = "ffmpeg")]
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//!
//! use audiolift::{AudioFormat, ConvertOptions, Converter, InputSource, ProgressInfo};
//!
//! let options = ConvertOptions::new().with_progress(Arc::new(|info: &ProgressInfo| {
//!     println!("{:>3}% {}", info.percent, info.label);
//! }));
//! let result = Converter::ffmpeg()
//!     .convert(InputSource::path("input.mp4"), AudioFormat::Wav, &options)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Bring Your Own Decoder
//!
//! ```
//! use std::sync::Arc;
//!
//! use audiolift::{AudioDecoder, AudioLiftError, Converter, SampleBuffer};
//!
//! struct Silence;
//!
//! impl AudioDecoder for Silence {
//!     fn decode(&self, _bytes: &[u8]) -> Result<SampleBuffer, AudioLiftError> {
//!         SampleBuffer::new(vec![vec![0.0; 44100]], 44100)
//!     }
//! }
//!
//! let converter = Converter::wav_only(Arc::new(Silence));
//! ```
//!
//! ## Features
//!
//! - **WAV output**: canonical 44-byte RIFF header followed by interleaved
//!   16-bit little-endian PCM
//! - **MP3 output**: 192 kbit/s, encoded in windows of ten codec frames
//! - **Cooperative scheduling**: the encoder yields between windows
//! - **Progress & cancellation**: monotonic 0 – 100 callbacks and a
//!   `CancellationToken` checked between steps and windows
//! - **Pluggable backends**: any [`AudioDecoder`] and [`CodecFactory`]
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ffmpeg` | FFmpeg decoder and libmp3lame codec, plus the `audiolift-cli` binary |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! The `ffmpeg` feature needs the FFmpeg development libraries installed on
//! your system.

mod chunked;
mod codec;
pub mod configuration;
mod convert;
mod decode;
pub mod error;
#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;
mod format;
pub mod progress;
mod quantize;
mod sample_buffer;
mod source;
pub mod utilities;
pub mod validation;
mod wav;

pub use chunked::{ChunkedEncoder, Step, encode_chunked};
pub use codec::{CODEC_FRAME_LEN, CodecFactory, CompressedCodec, TARGET_BITRATE_KBPS, UnavailableCodec};
pub use configuration::{ConvertOptions, DEFAULT_WINDOW_FRAMES};
pub use convert::{Converter, EncodeResult};
pub use decode::AudioDecoder;
pub use error::{
    AudioLiftError, CANCELLED_MESSAGE, ConversionError, FailureKind, GENERIC_FAILURE_MESSAGE,
};
#[cfg(feature = "ffmpeg")]
pub use ffmpeg::{
    FfmpegDecoder, FfmpegLogLevel, FfmpegMp3Codec, FfmpegMp3Factory, get_ffmpeg_log_level,
    is_mp3_encoder_available, set_ffmpeg_log_level,
};
pub use format::AudioFormat;
pub use progress::{CancellationToken, Phase, ProgressCallback, ProgressInfo, ProgressReporter};
pub use quantize::{quantize, quantize_into};
pub use sample_buffer::SampleBuffer;
pub use source::InputSource;
pub use wav::{WAV_HEADER_LEN, encode_wav};
