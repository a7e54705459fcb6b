//! Decoded audio held in memory.
//!
//! A [`SampleBuffer`] is what a decoder hands to the encoders: one `f32`
//! array per channel, all the same length, plus the sample rate. The array
//! length is the authoritative frame count; the duration is informational.

use crate::error::AudioLiftError;

/// Decoded multichannel audio as planar `f32` samples in `[-1.0, 1.0]`.
///
/// Read-only once built. Construction checks that there is at least one
/// channel, that the sample rate is non-zero, and that every channel has
/// the same number of frames.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
    duration_seconds: f64,
}

impl SampleBuffer {
    /// Build a buffer whose duration is derived from the frame count.
    ///
    /// # Errors
    ///
    /// [`AudioLiftError::InvalidSampleBuffer`] if `channels` is empty,
    /// `sample_rate` is zero, or the channel lengths differ.
    ///
    /// # Example
    ///
    /// ```
    /// use audiolift::SampleBuffer;
    ///
    /// let buffer = SampleBuffer::new(vec![vec![0.0; 8000]], 8000)?;
    /// assert_eq!(buffer.frame_count(), 8000);
    /// assert_eq!(buffer.duration_seconds(), 1.0);
    /// # Ok::<(), audiolift::AudioLiftError>(())
    /// ```
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, AudioLiftError> {
        validate_shape(&channels, sample_rate)?;
        let frames = channels[0].len();
        Ok(Self {
            channels,
            sample_rate,
            duration_seconds: frames as f64 / sample_rate as f64,
        })
    }

    /// Build a buffer with a duration reported by the decoder.
    ///
    /// The duration is kept as-is even when it disagrees slightly with
    /// `frame_count / sample_rate`. Negative or non-finite values fall back
    /// to the derived duration.
    pub fn with_duration(
        channels: Vec<Vec<f32>>,
        sample_rate: u32,
        duration_seconds: f64,
    ) -> Result<Self, AudioLiftError> {
        let mut buffer = Self::new(channels, sample_rate)?;
        if duration_seconds.is_finite() && duration_seconds >= 0.0 {
            buffer.duration_seconds = duration_seconds;
        }
        Ok(buffer)
    }

    /// Number of channels (at least 1).
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames, i.e. samples per channel.
    pub fn frame_count(&self) -> usize {
        self.channels[0].len()
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Samples of one channel, or `None` if `index` is out of range.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// All channels, in order.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Returns `true` if the buffer holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }
}

fn validate_shape(channels: &[Vec<f32>], sample_rate: u32) -> Result<(), AudioLiftError> {
    if channels.is_empty() {
        return Err(AudioLiftError::InvalidSampleBuffer(
            "at least one channel is required".to_string(),
        ));
    }
    if channels.len() > u16::MAX as usize {
        return Err(AudioLiftError::InvalidSampleBuffer(format!(
            "{} channels exceed the supported maximum",
            channels.len()
        )));
    }
    if sample_rate == 0 {
        return Err(AudioLiftError::InvalidSampleBuffer(
            "sample rate must be greater than zero".to_string(),
        ));
    }
    let frames = channels[0].len();
    if let Some((index, channel)) = channels
        .iter()
        .enumerate()
        .find(|(_, channel)| channel.len() != frames)
    {
        return Err(AudioLiftError::InvalidSampleBuffer(format!(
            "channel {index} has {} frames, channel 0 has {frames}",
            channel.len()
        )));
    }
    Ok(())
}
