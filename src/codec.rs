//! Compressed codec capability.
//!
//! The perceptual codec is a black box to the pipeline. A [`CodecFactory`] is
//! injected into the [`Converter`](crate::Converter) and asked for a fresh
//! [`CompressedCodec`] once per conversion, so no codec state is ever shared
//! between two in-flight encodes.

use crate::error::AudioLiftError;

/// Fixed target bitrate for compressed output, in kbit/s.
pub const TARGET_BITRATE_KBPS: u32 = 192;

/// Native frame granularity of the compressed codec, in frames.
pub const CODEC_FRAME_LEN: usize = 1152;

/// One codec instance, owned by a single encode.
///
/// Implementations receive equal-length left/right windows of quantized
/// samples and return whatever compressed bytes became available. Returning
/// an empty vector is normal while the codec buffers input.
pub trait CompressedCodec: Send {
    /// Encode one window. For mono sources `left` and `right` are the same
    /// samples.
    fn encode_window(&mut self, left: &[i16], right: &[i16]) -> Result<Vec<u8>, AudioLiftError>;

    /// Drain any buffered audio. Called exactly once, after the last window.
    fn flush(&mut self) -> Result<Vec<u8>, AudioLiftError>;
}

/// Constructs codec instances.
///
/// Returns [`AudioLiftError::ConfigurationError`] when the codec cannot be
/// provided at all (missing library, unsupported parameters).
pub trait CodecFactory: Send + Sync {
    /// Create a codec for the given stream parameters.
    fn create(
        &self,
        channel_count: usize,
        sample_rate: u32,
        bitrate_kbps: u32,
    ) -> Result<Box<dyn CompressedCodec>, AudioLiftError>;
}

/// A factory for builds without a compressed codec.
///
/// Every call fails with a configuration error, so WAV conversions still
/// work while MP3 requests fail cleanly.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableCodec;

impl CodecFactory for UnavailableCodec {
    fn create(
        &self,
        _channel_count: usize,
        _sample_rate: u32,
        _bitrate_kbps: u32,
    ) -> Result<Box<dyn CompressedCodec>, AudioLiftError> {
        Err(AudioLiftError::ConfigurationError(
            "no compressed codec is available in this build".to_string(),
        ))
    }
}
