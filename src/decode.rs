//! Decode capability.
//!
//! The container/video demux and audio decode step lives behind
//! [`AudioDecoder`]. The pipeline hands it the complete input bytes and gets
//! back a [`SampleBuffer`]. With the `ffmpeg` feature,
//! [`FfmpegDecoder`](crate::FfmpegDecoder) provides an implementation.

use crate::error::AudioLiftError;
use crate::sample_buffer::SampleBuffer;

/// Turns an encoded media file into decoded samples.
///
/// Called on a blocking thread, so implementations may do CPU-heavy work.
pub trait AudioDecoder: Send + Sync {
    /// Decode the primary audio track of `bytes`.
    ///
    /// # Errors
    ///
    /// [`AudioLiftError::DecodeError`] or [`AudioLiftError::NoAudioStream`]
    /// if the input is corrupt, unsupported, or has no audio track.
    fn decode(&self, bytes: &[u8]) -> Result<SampleBuffer, AudioLiftError>;
}
