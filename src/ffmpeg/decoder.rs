//! FFmpeg audio decoding to planar `f32`.

use std::io::Write;

use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::decoder::Audio as FfmpegAudioDecoder;
use ffmpeg_next::format::{Sample, sample::Type as SampleType};
use ffmpeg_next::frame::Audio as AudioFrame;
use ffmpeg_next::media::Type;
use ffmpeg_next::software::resampling::Context as ResamplingContext;
use ffmpeg_next::ChannelLayout;

use crate::decode::AudioDecoder;
use crate::error::AudioLiftError;
use crate::sample_buffer::SampleBuffer;

const BYTES_PER_F32: usize = 4;

/// Decodes the best audio stream of a media file with FFmpeg.
///
/// Samples are converted to planar `f32` at the stream's own sample rate
/// and channel layout; nothing is resampled or downmixed. FFmpeg needs a
/// seekable input, so the bytes are spilled to a temporary file first.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegDecoder;

impl FfmpegDecoder {
    /// Create a decoder.
    pub fn new() -> Self {
        Self
    }
}

impl AudioDecoder for FfmpegDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<SampleBuffer, AudioLiftError> {
        ffmpeg_next::init().map_err(|error| {
            AudioLiftError::DecodeError(format!("FFmpeg initialisation failed: {error}"))
        })?;

        let mut spill = tempfile::NamedTempFile::new()?;
        spill.write_all(bytes)?;
        spill.flush()?;
        log::debug!("Spilled {} bytes to {:?}", bytes.len(), spill.path());

        let mut input_context = ffmpeg_next::format::input(spill.path())
            .map_err(|error| AudioLiftError::DecodeError(error.to_string()))?;

        let (audio_stream_index, codec_parameters) = {
            let stream = input_context
                .streams()
                .best(Type::Audio)
                .ok_or(AudioLiftError::NoAudioStream)?;
            (stream.index(), stream.parameters())
        };

        let decoder_context = CodecContext::from_parameters(codec_parameters)?;
        let mut decoder = decoder_context
            .decoder()
            .audio()
            .map_err(|error| AudioLiftError::DecodeError(error.to_string()))?;

        let sample_rate = decoder.rate();
        let channel_layout = if decoder.channel_layout().bits() == 0 {
            match decoder.channels() {
                1 => ChannelLayout::MONO,
                _ => ChannelLayout::STEREO,
            }
        } else {
            decoder.channel_layout()
        };
        log::debug!(
            "Decoding audio stream {} ({} Hz, format {:?})",
            audio_stream_index,
            sample_rate,
            decoder.format()
        );

        let mut resampler = ResamplingContext::get(
            decoder.format(),
            channel_layout,
            sample_rate,
            Sample::F32(SampleType::Planar),
            channel_layout,
            sample_rate,
        )
        .map_err(|error| {
            AudioLiftError::DecodeError(format!("Failed to create resampler: {error}"))
        })?;

        let mut collector = PlanarCollector::default();
        let mut decoded_frame = AudioFrame::empty();

        for (stream, packet) in input_context.packets() {
            if stream.index() != audio_stream_index {
                continue;
            }
            decoder.send_packet(&packet).map_err(|error| {
                log::warn!(
                    "Rejected audio packet at pts {:?} on stream {}: {}",
                    packet.pts(),
                    audio_stream_index,
                    error
                );
                AudioLiftError::DecodeError(error.to_string())
            })?;
            drain_decoder(
                &mut decoder,
                &mut resampler,
                &mut decoded_frame,
                channel_layout,
                &mut collector,
            )?;
        }

        decoder
            .send_eof()
            .map_err(|error| AudioLiftError::DecodeError(error.to_string()))?;
        drain_decoder(
            &mut decoder,
            &mut resampler,
            &mut decoded_frame,
            channel_layout,
            &mut collector,
        )?;

        let fallback_channels = usize::from(decoder.channels()).max(1);
        let channels = collector.into_channels(fallback_channels);
        SampleBuffer::new(channels, sample_rate)
    }
}

fn drain_decoder(
    decoder: &mut FfmpegAudioDecoder,
    resampler: &mut ResamplingContext,
    decoded_frame: &mut AudioFrame,
    channel_layout: ChannelLayout,
    collector: &mut PlanarCollector,
) -> Result<(), AudioLiftError> {
    while decoder.receive_frame(decoded_frame).is_ok() {
        if decoded_frame.channel_layout().bits() == 0 {
            decoded_frame.set_channel_layout(channel_layout);
        }
        let mut converted = AudioFrame::empty();
        resampler
            .run(decoded_frame, &mut converted)
            .map_err(|error| AudioLiftError::DecodeError(format!("Resample error: {error}")))?;
        collector.push(&converted);
    }
    Ok(())
}

/// Accumulates planar `f32` frames into one vector per channel.
#[derive(Default)]
struct PlanarCollector {
    channels: Vec<Vec<f32>>,
}

impl PlanarCollector {
    fn push(&mut self, frame: &AudioFrame) {
        let samples = frame.samples();
        let planes = frame.planes();
        if self.channels.len() < planes {
            self.channels.resize_with(planes, Vec::new);
        }
        for (plane, channel) in self.channels.iter_mut().enumerate().take(planes) {
            let data = frame.data(plane);
            let byte_len = (samples * BYTES_PER_F32).min(data.len());
            channel.extend(
                data[..byte_len]
                    .chunks_exact(BYTES_PER_F32)
                    .map(|bytes| f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
            );
        }
    }

    fn into_channels(self, fallback_channels: usize) -> Vec<Vec<f32>> {
        if self.channels.is_empty() {
            vec![Vec::new(); fallback_channels]
        } else {
            self.channels
        }
    }
}
