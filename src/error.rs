//! Error types for the `audiolift` crate.
//!
//! [`AudioLiftError`] is the internal error type returned by every fallible
//! pipeline step. It carries the upstream detail needed for diagnostics.
//! [`ConversionError`] is what [`Converter::convert`](crate::Converter::convert)
//! hands back to callers: a classification plus a fixed, non-technical
//! message, so decoder and codec internals never reach an end user.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::Error as IoError;

#[cfg(feature = "ffmpeg")]
use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

/// Message shown for every failed conversion except cancellation.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Failed to extract audio. The file might be corrupt or the format unsupported.";

/// Message shown when a conversion was cancelled by the caller.
pub const CANCELLED_MESSAGE: &str = "Audio extraction was cancelled.";

/// The unified error type for all pipeline steps.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AudioLiftError {
    /// The input is not a recognised video file.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The decoder rejected the input as corrupt or unsupported.
    #[error("Failed to decode audio: {0}")]
    DecodeError(String),

    /// The input contains no audio stream.
    #[error("No audio stream found in file")]
    NoAudioStream,

    /// A sample buffer violated its shape invariants.
    #[error("Invalid sample buffer: {0}")]
    InvalidSampleBuffer(String),

    /// The compressed codec is unavailable at encode time.
    #[error("Codec unavailable: {0}")]
    ConfigurationError(String),

    /// The compressed codec failed while encoding or flushing.
    #[error("Failed to encode audio: {0}")]
    EncodingError(String),

    /// The output buffer could not be allocated or addressed.
    #[error("Resource exhausted: {0}")]
    ResourceError(String),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// An I/O error occurred while reading the input.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error originating from the FFmpeg libraries.
    #[cfg(feature = "ffmpeg")]
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),
}

#[cfg(feature = "ffmpeg")]
impl From<FfmpegError> for AudioLiftError {
    fn from(error: FfmpegError) -> Self {
        AudioLiftError::FfmpegError(error.to_string())
    }
}

impl AudioLiftError {
    /// Classify this error for the user-facing [`ConversionError`].
    pub fn kind(&self) -> FailureKind {
        match self {
            AudioLiftError::InvalidInput(_) => FailureKind::Input,
            AudioLiftError::DecodeError(_)
            | AudioLiftError::NoAudioStream
            | AudioLiftError::InvalidSampleBuffer(_)
            | AudioLiftError::IoError(_) => FailureKind::Decode,
            #[cfg(feature = "ffmpeg")]
            AudioLiftError::FfmpegError(_) => FailureKind::Decode,
            AudioLiftError::ConfigurationError(_) => FailureKind::Configuration,
            AudioLiftError::EncodingError(_) => FailureKind::Encoding,
            AudioLiftError::ResourceError(_) => FailureKind::Resource,
            AudioLiftError::Cancelled => FailureKind::Cancelled,
        }
    }
}

/// Coarse classification of a failed conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FailureKind {
    /// The input was rejected before decoding.
    Input,
    /// Reading or decoding the input failed.
    Decode,
    /// The compressed codec was unavailable.
    Configuration,
    /// The compressed codec failed mid-stream.
    Encoding,
    /// The output could not be allocated.
    Resource,
    /// The caller cancelled the conversion.
    Cancelled,
}

/// The single error surfaced by [`Converter::convert`](crate::Converter::convert).
///
/// Its `Display` output is one of two fixed messages; the internal detail is
/// logged when the error is created and is not retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionError {
    kind: FailureKind,
}

impl ConversionError {
    pub(crate) fn new(kind: FailureKind) -> Self {
        Self { kind }
    }

    /// What class of failure ended the conversion.
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Returns `true` if the conversion ended because it was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.kind == FailureKind::Cancelled
    }
}

impl Display for ConversionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.kind {
            FailureKind::Cancelled => f.write_str(CANCELLED_MESSAGE),
            _ => f.write_str(GENERIC_FAILURE_MESSAGE),
        }
    }
}

impl std::error::Error for ConversionError {}

impl From<AudioLiftError> for ConversionError {
    fn from(error: AudioLiftError) -> Self {
        ConversionError::new(error.kind())
    }
}
