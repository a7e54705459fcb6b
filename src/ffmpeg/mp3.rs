//! MP3 encoding through FFmpeg's libmp3lame wrapper.

use ffmpeg_next::ChannelLayout;
use ffmpeg_next::codec::{self, Id};
use ffmpeg_next::format::{Sample, sample::Type as SampleType};
use ffmpeg_next::frame::Audio as AudioFrame;
use ffmpeg_next::{Packet, Rational};

use crate::codec::{CODEC_FRAME_LEN, CodecFactory, CompressedCodec};
use crate::error::AudioLiftError;

const ENCODER_SAMPLE_FORMAT: Sample = Sample::I16(SampleType::Planar);

/// Check whether the linked FFmpeg build includes an MP3 encoder.
pub fn is_mp3_encoder_available() -> bool {
    ffmpeg_next::init().is_ok() && ffmpeg_next::encoder::find(Id::MP3).is_some()
}

/// Creates [`FfmpegMp3Codec`] instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegMp3Factory;

impl FfmpegMp3Factory {
    /// Create a factory.
    pub fn new() -> Self {
        Self
    }
}

impl CodecFactory for FfmpegMp3Factory {
    fn create(
        &self,
        channel_count: usize,
        sample_rate: u32,
        bitrate_kbps: u32,
    ) -> Result<Box<dyn CompressedCodec>, AudioLiftError> {
        Ok(Box::new(FfmpegMp3Codec::open(
            channel_count,
            sample_rate,
            bitrate_kbps,
        )?))
    }
}

/// An opened libmp3lame encoder.
///
/// Input windows of any length are buffered and handed to the encoder in
/// whole codec frames; the remainder goes out as a short final frame on
/// [`flush`](CompressedCodec::flush).
pub struct FfmpegMp3Codec {
    encoder: ffmpeg_next::encoder::Audio,
    channel_layout: ChannelLayout,
    stereo: bool,
    sample_rate: u32,
    frame_len: usize,
    pending_left: Vec<i16>,
    pending_right: Vec<i16>,
    pts: i64,
}

impl FfmpegMp3Codec {
    /// Open an encoder. One channel opens a mono encoder, anything else
    /// opens a stereo one.
    ///
    /// # Errors
    ///
    /// [`AudioLiftError::ConfigurationError`] if FFmpeg has no MP3 encoder
    /// or rejects the parameters.
    pub fn open(
        channel_count: usize,
        sample_rate: u32,
        bitrate_kbps: u32,
    ) -> Result<Self, AudioLiftError> {
        ffmpeg_next::init().map_err(|error| {
            AudioLiftError::ConfigurationError(format!("FFmpeg initialisation failed: {error}"))
        })?;
        let mp3 = ffmpeg_next::encoder::find(Id::MP3).ok_or_else(|| {
            AudioLiftError::ConfigurationError(
                "MP3 encoder not found in this FFmpeg build".to_string(),
            )
        })?;

        let stereo = channel_count != 1;
        let channel_layout = if stereo {
            ChannelLayout::STEREO
        } else {
            ChannelLayout::MONO
        };

        let mut context = codec::Context::new_with_codec(mp3);
        context.set_time_base(Rational::new(1, sample_rate as i32));
        let mut audio_encoder = context.encoder().audio().map_err(|error| {
            AudioLiftError::ConfigurationError(format!("Cannot get audio encoder handle: {error}"))
        })?;
        audio_encoder.set_rate(sample_rate as i32);
        audio_encoder.set_format(ENCODER_SAMPLE_FORMAT);
        audio_encoder.set_channel_layout(channel_layout);
        audio_encoder.set_bit_rate(bitrate_kbps as usize * 1000);

        let encoder = audio_encoder.open_as(mp3).map_err(|error| {
            AudioLiftError::ConfigurationError(format!("Failed to open MP3 encoder: {error}"))
        })?;

        let frame_len = match encoder.frame_size() as usize {
            0 => CODEC_FRAME_LEN,
            size => size,
        };
        log::debug!(
            "Opened MP3 encoder ({} Hz, stereo={}, {} kbit/s, frame {})",
            sample_rate,
            stereo,
            bitrate_kbps,
            frame_len
        );

        Ok(Self {
            encoder,
            channel_layout,
            stereo,
            sample_rate,
            frame_len,
            pending_left: Vec::new(),
            pending_right: Vec::new(),
            pts: 0,
        })
    }

    fn send_pending(&mut self, count: usize) -> Result<(), AudioLiftError> {
        let mut frame = AudioFrame::new(ENCODER_SAMPLE_FORMAT, count, self.channel_layout);
        frame.set_rate(self.sample_rate);
        frame.set_pts(Some(self.pts));
        write_plane(&mut frame, 0, &self.pending_left[..count]);
        if self.stereo {
            write_plane(&mut frame, 1, &self.pending_right[..count]);
        }

        self.encoder
            .send_frame(&frame)
            .map_err(|error| AudioLiftError::EncodingError(error.to_string()))?;

        self.pts += count as i64;
        self.pending_left.drain(..count);
        self.pending_right.drain(..count.min(self.pending_right.len()));
        Ok(())
    }

    fn receive_packets(&mut self, output: &mut Vec<u8>) -> Result<(), AudioLiftError> {
        loop {
            let mut packet = Packet::empty();
            match self.encoder.receive_packet(&mut packet) {
                Ok(()) => {
                    if let Some(data) = packet.data() {
                        output.extend_from_slice(data);
                    }
                }
                Err(ffmpeg_next::Error::Other { errno }) if errno == ffmpeg_next::error::EAGAIN => {
                    return Ok(());
                }
                Err(ffmpeg_next::Error::Eof) => return Ok(()),
                Err(error) => return Err(AudioLiftError::EncodingError(error.to_string())),
            }
        }
    }
}

impl CompressedCodec for FfmpegMp3Codec {
    fn encode_window(&mut self, left: &[i16], right: &[i16]) -> Result<Vec<u8>, AudioLiftError> {
        if left.len() != right.len() {
            return Err(AudioLiftError::EncodingError(format!(
                "window length mismatch: left {} right {}",
                left.len(),
                right.len()
            )));
        }

        self.pending_left.extend_from_slice(left);
        if self.stereo {
            self.pending_right.extend_from_slice(right);
        }

        let mut output = Vec::new();
        while self.pending_left.len() >= self.frame_len {
            self.send_pending(self.frame_len)?;
            self.receive_packets(&mut output)?;
        }
        Ok(output)
    }

    fn flush(&mut self) -> Result<Vec<u8>, AudioLiftError> {
        let mut output = Vec::new();
        let remaining = self.pending_left.len();
        if remaining > 0 {
            self.send_pending(remaining)?;
            self.receive_packets(&mut output)?;
        }
        self.encoder
            .send_eof()
            .map_err(|error| AudioLiftError::EncodingError(error.to_string()))?;
        self.receive_packets(&mut output)?;
        Ok(output)
    }
}

fn write_plane(frame: &mut AudioFrame, plane: usize, samples: &[i16]) {
    let data = frame.data_mut(plane);
    for (slot, sample) in data.chunks_exact_mut(2).zip(samples) {
        slot.copy_from_slice(&sample.to_ne_bytes());
    }
}
