//! Incremental compressed encoding.
//!
//! [`ChunkedEncoder`] feeds a [`SampleBuffer`] to a [`CompressedCodec`] one
//! window at a time. Each call to [`step`](ChunkedEncoder::step) quantizes
//! the next window (11,520 frames by default, ten codec frames), hands it to
//! the codec and keeps whatever bytes come back. Once every frame has been
//! consumed the next step flushes the codec, exactly once.
//!
//! [`encode_chunked`] drives the steps on a Tokio runtime and yields back
//! to the scheduler between windows, so a long encode never holds the
//! runtime for more than one window at a time.
//!
//! Progress for the encode phase runs from 80 to 95:
//! `80 + round(15 × cursor / frame_count)`.
//!
//! # Example
//!
//! ```no_run
//! use audiolift::{ChunkedEncoder, SampleBuffer, Step, UnavailableCodec};
//!
//! let buffer = SampleBuffer::new(vec![vec![0.0; 48000]], 48000)?;
//! let factory = UnavailableCodec;
//! let mut encoder = ChunkedEncoder::new(&buffer, &factory, 11520)?;
//! while let Step::Progress(percent) = encoder.step()? {
//!     println!("{percent}%");
//! }
//! let mp3 = encoder.into_bytes()?;
//! # Ok::<(), audiolift::AudioLiftError>(())
//! ```

use crate::codec::{CodecFactory, CompressedCodec, TARGET_BITRATE_KBPS};
use crate::configuration::ConvertOptions;
use crate::error::AudioLiftError;
use crate::quantize::quantize_into;
use crate::sample_buffer::SampleBuffer;

/// First percentage of the compressed encode band.
const ENCODE_PROGRESS_START: u8 = 80;
/// Width of the compressed encode band before the final 100.
const ENCODE_PROGRESS_SPAN: f64 = 15.0;
/// Highest percentage reported while windows are still being encoded.
const ENCODE_PROGRESS_CAP: u8 = 95;

/// Outcome of one [`ChunkedEncoder::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A window was encoded; carries the encode-phase percentage.
    Progress(u8),
    /// The codec has been flushed and the output is ready.
    Finished,
}

/// Per-encode state, owned by exactly one [`ChunkedEncoder`].
#[derive(Debug, Default)]
struct ChunkedEncodeState {
    /// Frames already handed to the codec.
    cursor: usize,
    /// Non-empty codec output, in processing order.
    fragments: Vec<Vec<u8>>,
    /// Set once the flush has run.
    done: bool,
    /// Set when the codec failed; no output may be produced afterwards.
    failed: bool,
}

/// Stateful window-by-window driver around one codec instance.
pub struct ChunkedEncoder<'a> {
    buffer: &'a SampleBuffer,
    codec: Box<dyn CompressedCodec>,
    window_frames: usize,
    state: ChunkedEncodeState,
    left: Vec<i16>,
    right: Vec<i16>,
}

impl<'a> ChunkedEncoder<'a> {
    /// Create an encoder, asking `factory` for a fresh codec instance.
    ///
    /// Only the first two channels are encoded; the codec is created with
    /// one channel for mono sources and two otherwise.
    ///
    /// # Errors
    ///
    /// [`AudioLiftError::ConfigurationError`] if the factory cannot provide
    /// a codec.
    pub fn new(
        buffer: &'a SampleBuffer,
        factory: &dyn CodecFactory,
        window_frames: usize,
    ) -> Result<Self, AudioLiftError> {
        let codec_channels = buffer.channel_count().min(2);
        let codec = factory
            .create(codec_channels, buffer.sample_rate(), TARGET_BITRATE_KBPS)
            .map_err(|error| match error {
                AudioLiftError::ConfigurationError(_) => error,
                other => AudioLiftError::ConfigurationError(other.to_string()),
            })?;
        Ok(Self::with_codec(buffer, codec, window_frames))
    }

    /// Create an encoder around an existing codec instance.
    pub fn with_codec(
        buffer: &'a SampleBuffer,
        codec: Box<dyn CompressedCodec>,
        window_frames: usize,
    ) -> Self {
        let window_frames = window_frames.max(1);
        let capacity = window_frames.min(buffer.frame_count());
        Self {
            buffer,
            codec,
            window_frames,
            state: ChunkedEncodeState::default(),
            left: Vec::with_capacity(capacity),
            right: Vec::with_capacity(capacity),
        }
    }

    /// Frames consumed so far.
    pub fn cursor(&self) -> usize {
        self.state.cursor
    }

    /// Returns `true` if frames remain to be encoded.
    pub fn has_remaining(&self) -> bool {
        self.state.cursor < self.buffer.frame_count()
    }

    /// Returns `true` once the codec has been flushed.
    pub fn is_done(&self) -> bool {
        self.state.done
    }

    /// Advance the encode by one window, or flush if every frame is consumed.
    ///
    /// Calling `step` after [`Step::Finished`] keeps returning
    /// [`Step::Finished`] without touching the codec.
    ///
    /// # Errors
    ///
    /// [`AudioLiftError::EncodingError`] if the codec fails. The encoder is
    /// unusable afterwards.
    pub fn step(&mut self) -> Result<Step, AudioLiftError> {
        if self.state.failed {
            return Err(AudioLiftError::EncodingError(
                "encoder already failed".to_string(),
            ));
        }
        if self.state.done {
            return Ok(Step::Finished);
        }

        let result = if self.has_remaining() {
            self.encode_next_window().map(Step::Progress)
        } else {
            self.flush().map(|()| Step::Finished)
        };

        if result.is_err() {
            self.state.failed = true;
            self.state.fragments.clear();
        }
        result
    }

    /// Concatenate the emitted fragments into the final bitstream.
    ///
    /// # Errors
    ///
    /// [`AudioLiftError::EncodingError`] if the encode has not finished or
    /// has failed.
    pub fn into_bytes(self) -> Result<Vec<u8>, AudioLiftError> {
        if self.state.failed || !self.state.done {
            return Err(AudioLiftError::EncodingError(
                "encode did not run to completion".to_string(),
            ));
        }
        Ok(self.state.fragments.concat())
    }

    fn encode_next_window(&mut self) -> Result<u8, AudioLiftError> {
        let frame_count = self.buffer.frame_count();
        let start = self.state.cursor;
        let end = start.saturating_add(self.window_frames).min(frame_count);

        if let Some(left) = self.buffer.channel(0) {
            quantize_into(&left[start..end], &mut self.left);
        }
        let stereo = match self.buffer.channel(1) {
            Some(right) => {
                quantize_into(&right[start..end], &mut self.right);
                true
            }
            None => false,
        };

        let right = if stereo { &self.right } else { &self.left };
        let fragment = self
            .codec
            .encode_window(&self.left, right)
            .map_err(into_encoding_error)?;
        if !fragment.is_empty() {
            self.state.fragments.push(fragment);
        }

        self.state.cursor = end;
        Ok(encode_percent(end, frame_count))
    }

    fn flush(&mut self) -> Result<(), AudioLiftError> {
        let fragment = self.codec.flush().map_err(into_encoding_error)?;
        if !fragment.is_empty() {
            self.state.fragments.push(fragment);
        }
        self.state.done = true;
        Ok(())
    }
}

/// Encode-phase percentage after `cursor` of `frame_count` frames.
pub(crate) fn encode_percent(cursor: usize, frame_count: usize) -> u8 {
    if frame_count == 0 {
        return ENCODE_PROGRESS_CAP;
    }
    let fraction = cursor as f64 / frame_count as f64;
    let percent = ENCODE_PROGRESS_START as f64 + (ENCODE_PROGRESS_SPAN * fraction).round();
    (percent as u8).min(ENCODE_PROGRESS_CAP)
}

fn into_encoding_error(error: AudioLiftError) -> AudioLiftError {
    match error {
        AudioLiftError::EncodingError(_) => error,
        other => AudioLiftError::EncodingError(other.to_string()),
    }
}

/// Encode `buffer` with a fresh codec from `factory`, yielding between
/// windows.
///
/// `on_progress` receives each encode-phase percentage (80 – 95) in order.
/// The cancellation token in `options` is checked before the first window
/// and at every yield point.
///
/// # Errors
///
/// - [`AudioLiftError::ConfigurationError`] if no codec can be created; no
///   progress is reported in that case.
/// - [`AudioLiftError::EncodingError`] if the codec fails mid-stream.
/// - [`AudioLiftError::Cancelled`] if the token is cancelled.
pub async fn encode_chunked<F>(
    buffer: &SampleBuffer,
    factory: &dyn CodecFactory,
    options: &ConvertOptions,
    mut on_progress: F,
) -> Result<Vec<u8>, AudioLiftError>
where
    F: FnMut(u8),
{
    let mut encoder = ChunkedEncoder::new(buffer, factory, options.window_frames())?;
    log::debug!(
        "Encoding {} frames ({} channels, {} Hz) in windows of {}",
        buffer.frame_count(),
        buffer.channel_count(),
        buffer.sample_rate(),
        options.window_frames()
    );

    if options.is_cancelled() {
        return Err(AudioLiftError::Cancelled);
    }

    let mut windows = 0usize;
    loop {
        match encoder.step()? {
            Step::Progress(percent) => {
                windows += 1;
                on_progress(percent);
                if encoder.has_remaining() {
                    tokio::task::yield_now().await;
                    if options.is_cancelled() {
                        log::debug!("Encode cancelled at frame {}", encoder.cursor());
                        return Err(AudioLiftError::Cancelled);
                    }
                }
            }
            Step::Finished => break,
        }
    }

    let bytes = encoder.into_bytes()?;
    log::debug!("Encoded {} windows into {} bytes", windows, bytes.len());
    Ok(bytes)
}
