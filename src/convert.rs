//! End-to-end conversion.
//!
//! [`Converter`] is the entry point of the crate. It is built once with a
//! decoder and a codec factory and then runs any number of independent
//! conversions:
//!
//! 1. report 5 %, read the input into memory, report 30 %;
//! 2. decode on a blocking thread, report 70 %;
//! 3. report 80 %, then write WAV in one pass or encode MP3 window by
//!    window, relaying the encoder's 80 – 95 % progress;
//! 4. report 100 % and package an [`EncodeResult`].
//!
//! Every failure along the way is logged with its full detail and returned
//! as a [`ConversionError`] that carries only a classification and a fixed
//! message.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "ffmpeg")]
//! # async fn example() -> Result<(), audiolift::ConversionError> {
//! use audiolift::{AudioFormat, ConvertOptions, Converter, InputSource};
//!
//! let converter = Converter::ffmpeg();
//! let result = converter
//!     .convert(InputSource::path("input.mp4"), AudioFormat::Mp3, &ConvertOptions::new())
//!     .await?;
//! std::fs::write(result.suggested_file_name("input"), result.bytes()).unwrap();
//! # Ok(())
//! # }
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::chunked::encode_chunked;
use crate::codec::{CodecFactory, UnavailableCodec};
use crate::configuration::ConvertOptions;
use crate::decode::AudioDecoder;
use crate::error::{AudioLiftError, ConversionError};
use crate::format::AudioFormat;
use crate::progress::{Phase, ProgressReporter};
use crate::sample_buffer::SampleBuffer;
use crate::source::InputSource;
use crate::wav::encode_wav;

/// Progress reported when a conversion starts.
const STARTED_PERCENT: u8 = 5;

/// The output of a successful conversion.
///
/// Owns its bytes; nothing is shared with the decoded samples.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeResult {
    bytes: Vec<u8>,
    format: AudioFormat,
    duration_seconds: f64,
}

impl EncodeResult {
    /// The encoded file contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take ownership of the encoded file contents.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Size of the encoded file in bytes.
    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }

    /// The format the audio was encoded to.
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Duration of the source audio, in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// MIME type of the encoded file.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// `stem` with the format's extension appended, e.g. `clip.mp3`.
    pub fn suggested_file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.format.extension())
    }
}

/// Runs conversions against an injected decoder and codec.
///
/// Holds no per-conversion state, so one instance can serve concurrent
/// conversions; each call gets its own sample buffer, codec instance and
/// output.
#[derive(Clone)]
pub struct Converter {
    decoder: Arc<dyn AudioDecoder>,
    codec_factory: Arc<dyn CodecFactory>,
}

impl Debug for Converter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Converter").finish_non_exhaustive()
    }
}

impl Converter {
    /// Create a converter from a decoder and a compressed codec factory.
    pub fn new(decoder: Arc<dyn AudioDecoder>, codec_factory: Arc<dyn CodecFactory>) -> Self {
        Self {
            decoder,
            codec_factory,
        }
    }

    /// Create a converter that can only produce WAV.
    ///
    /// MP3 requests fail with a configuration error.
    pub fn wav_only(decoder: Arc<dyn AudioDecoder>) -> Self {
        Self::new(decoder, Arc::new(UnavailableCodec))
    }

    /// Create a converter backed by FFmpeg for both decoding and MP3.
    #[cfg(feature = "ffmpeg")]
    pub fn ffmpeg() -> Self {
        Self::new(
            Arc::new(crate::ffmpeg::FfmpegDecoder::new()),
            Arc::new(crate::ffmpeg::FfmpegMp3Factory::new()),
        )
    }

    /// Convert the audio track of `source` to `format`.
    ///
    /// # Errors
    ///
    /// A [`ConversionError`] whose [`kind`](ConversionError::kind) says
    /// which step failed. No partial output is ever returned.
    pub async fn convert(
        &self,
        source: InputSource,
        format: AudioFormat,
        options: &ConvertOptions,
    ) -> Result<EncodeResult, ConversionError> {
        let mut reporter = ProgressReporter::new(options.progress.clone(), format);
        match self.run(source, format, options, &mut reporter).await {
            Ok(result) => {
                log::info!(
                    "Extracted {:.2}s of audio as {} ({} bytes)",
                    result.duration_seconds,
                    format,
                    result.byte_length()
                );
                Ok(result)
            }
            Err(error) => {
                log::error!("Audio extraction failed: {error}");
                Err(ConversionError::from(error))
            }
        }
    }

    /// Encode an already decoded buffer, skipping the read and decode steps.
    ///
    /// Progress starts at 80 %.
    pub async fn encode(
        &self,
        buffer: &SampleBuffer,
        format: AudioFormat,
        options: &ConvertOptions,
    ) -> Result<EncodeResult, ConversionError> {
        let mut reporter = ProgressReporter::new(options.progress.clone(), format);
        self.encode_buffer(buffer, format, options, &mut reporter)
            .await
            .map_err(|error| {
                log::error!("Audio encoding failed: {error}");
                ConversionError::from(error)
            })
    }

    async fn run(
        &self,
        source: InputSource,
        format: AudioFormat,
        options: &ConvertOptions,
        reporter: &mut ProgressReporter,
    ) -> Result<EncodeResult, AudioLiftError> {
        reporter.report(Phase::Reading, STARTED_PERCENT);
        let bytes = source.read().await?;
        log::debug!("Read {} input bytes", bytes.len());
        reporter.report_fraction(Phase::Reading, 1.0);
        ensure_not_cancelled(options)?;

        let buffer = self.decode(bytes).await?;
        log::debug!(
            "Decoded {} frames, {} channels at {} Hz",
            buffer.frame_count(),
            buffer.channel_count(),
            buffer.sample_rate()
        );
        reporter.report_fraction(Phase::Decoding, 1.0);
        ensure_not_cancelled(options)?;

        self.encode_buffer(&buffer, format, options, reporter).await
    }

    async fn decode(&self, bytes: Vec<u8>) -> Result<SampleBuffer, AudioLiftError> {
        let decoder = Arc::clone(&self.decoder);
        tokio::task::spawn_blocking(move || decoder.decode(&bytes))
            .await
            .map_err(|error| AudioLiftError::DecodeError(format!("decode task failed: {error}")))?
    }

    async fn encode_buffer(
        &self,
        buffer: &SampleBuffer,
        format: AudioFormat,
        options: &ConvertOptions,
        reporter: &mut ProgressReporter,
    ) -> Result<EncodeResult, AudioLiftError> {
        reporter.report_fraction(Phase::Preparing, 1.0);

        let bytes = match format {
            AudioFormat::Wav => encode_wav(buffer)?,
            AudioFormat::Mp3 => {
                encode_chunked(buffer, self.codec_factory.as_ref(), options, |percent| {
                    reporter.report(Phase::Encoding, percent);
                })
                .await?
            }
        };
        reporter.report_fraction(Phase::Encoding, 1.0);

        Ok(EncodeResult {
            bytes,
            format,
            duration_seconds: buffer.duration_seconds(),
        })
    }
}

fn ensure_not_cancelled(options: &ConvertOptions) -> Result<(), AudioLiftError> {
    if options.is_cancelled() {
        Err(AudioLiftError::Cancelled)
    } else {
        Ok(())
    }
}
