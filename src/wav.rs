//! RIFF/WAVE container encoding.
//!
//! [`encode_wav`] serializes a whole [`SampleBuffer`] in one synchronous
//! pass: a 44-byte header followed by interleaved, quantized 16-bit
//! little-endian samples. The output depends only on the buffer, so encoding
//! the same buffer twice yields identical bytes.
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0  | 4 | `"RIFF"` |
//! | 4  | 4 | total length − 8 |
//! | 8  | 4 | `"WAVE"` |
//! | 12 | 4 | `"fmt "` |
//! | 16 | 4 | 16 (format chunk size) |
//! | 20 | 2 | 1 (linear PCM) |
//! | 22 | 2 | channel count |
//! | 24 | 4 | sample rate |
//! | 28 | 4 | byte rate |
//! | 32 | 2 | block align |
//! | 34 | 2 | 16 (bits per sample) |
//! | 36 | 4 | `"data"` |
//! | 40 | 4 | data length |

use crate::error::AudioLiftError;
use crate::quantize::quantize;
use crate::sample_buffer::SampleBuffer;

/// Length of the canonical WAV header written by [`encode_wav`].
pub const WAV_HEADER_LEN: usize = 44;

const BYTES_PER_SAMPLE: u16 = 2;
const BITS_PER_SAMPLE: u16 = 16;
const FORMAT_CHUNK_LEN: u32 = 16;
const LINEAR_PCM: u16 = 1;

/// Encode a sample buffer as a complete 16-bit PCM WAV file.
///
/// Samples are interleaved frame-major (every channel's sample for frame 0,
/// then frame 1, ...), each quantized with [`quantize`].
///
/// # Errors
///
/// [`AudioLiftError::ResourceError`] if the output does not fit the 32-bit
/// RIFF size fields or cannot be allocated.
///
/// # Example
///
/// ```
/// use audiolift::{SampleBuffer, encode_wav};
///
/// let buffer = SampleBuffer::new(vec![vec![0.0; 8000]], 8000)?;
/// let bytes = encode_wav(&buffer)?;
/// assert_eq!(bytes.len(), 16044);
/// assert_eq!(&bytes[..4], b"RIFF");
/// # Ok::<(), audiolift::AudioLiftError>(())
/// ```
pub fn encode_wav(buffer: &SampleBuffer) -> Result<Vec<u8>, AudioLiftError> {
    let channel_count = buffer.channel_count();
    let frame_count = buffer.frame_count();
    let sample_rate = buffer.sample_rate();

    let data_len = (frame_count as u64)
        .checked_mul(channel_count as u64)
        .and_then(|samples| samples.checked_mul(BYTES_PER_SAMPLE as u64))
        .filter(|&len| len + (WAV_HEADER_LEN as u64 - 8) <= u32::MAX as u64)
        .ok_or_else(|| {
            AudioLiftError::ResourceError(format!(
                "{frame_count} frames x {channel_count} channels exceed the 4 GiB WAV limit"
            ))
        })?;
    let data_len_u32 = data_len as u32;
    let byte_rate = (sample_rate as u64) * (BYTES_PER_SAMPLE as u64) * (channel_count as u64);
    let byte_rate = u32::try_from(byte_rate).map_err(|_| {
        AudioLiftError::ResourceError(format!(
            "byte rate for {channel_count} channels at {sample_rate} Hz overflows"
        ))
    })?;
    // Guarded by SampleBuffer's channel limit.
    let channels_u16 = channel_count as u16;
    let block_align = channels_u16.checked_mul(BYTES_PER_SAMPLE).ok_or_else(|| {
        AudioLiftError::ResourceError(format!(
            "block align for {channel_count} channels overflows"
        ))
    })?;

    let total_len = WAV_HEADER_LEN + data_len as usize;
    let mut output = Vec::new();
    output.try_reserve_exact(total_len).map_err(|error| {
        AudioLiftError::ResourceError(format!("cannot allocate {total_len} bytes: {error}"))
    })?;

    log::debug!(
        "Writing WAV ({} frames, {} channels, {} Hz, {} bytes)",
        frame_count,
        channel_count,
        sample_rate,
        total_len
    );

    output.extend_from_slice(b"RIFF");
    output.extend_from_slice(&(data_len_u32 + (WAV_HEADER_LEN as u32 - 8)).to_le_bytes());
    output.extend_from_slice(b"WAVE");

    output.extend_from_slice(b"fmt ");
    output.extend_from_slice(&FORMAT_CHUNK_LEN.to_le_bytes());
    output.extend_from_slice(&LINEAR_PCM.to_le_bytes());
    output.extend_from_slice(&channels_u16.to_le_bytes());
    output.extend_from_slice(&sample_rate.to_le_bytes());
    output.extend_from_slice(&byte_rate.to_le_bytes());
    output.extend_from_slice(&block_align.to_le_bytes());
    output.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    output.extend_from_slice(b"data");
    output.extend_from_slice(&data_len_u32.to_le_bytes());

    let channels = buffer.channels();
    for frame in 0..frame_count {
        for channel in channels {
            output.extend_from_slice(&quantize(channel[frame]).to_le_bytes());
        }
    }

    debug_assert_eq!(output.len(), total_len);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_u16(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn read_u32(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    #[test]
    fn header_fields_for_stereo() {
        let buffer = SampleBuffer::new(vec![vec![0.0; 10], vec![0.0; 10]], 48000).unwrap();
        let bytes = encode_wav(&buffer).unwrap();

        assert_eq!(bytes.len(), 44 + 10 * 2 * 2);
        assert_eq!(read_u32(&bytes, 4) as usize, bytes.len() - 8);
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(read_u32(&bytes, 16), 16);
        assert_eq!(read_u16(&bytes, 20), 1);
        assert_eq!(read_u16(&bytes, 22), 2);
        assert_eq!(read_u32(&bytes, 24), 48000);
        assert_eq!(read_u32(&bytes, 28), 48000 * 4);
        assert_eq!(read_u16(&bytes, 32), 4);
        assert_eq!(read_u16(&bytes, 34), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(read_u32(&bytes, 40), 40);
    }

    #[test]
    fn samples_are_interleaved_frame_major() {
        let left = vec![1.0, 0.0];
        let right = vec![-1.0, 0.5];
        let buffer = SampleBuffer::new(vec![left, right], 8000).unwrap();
        let bytes = encode_wav(&buffer).unwrap();

        let data: Vec<i16> = bytes[44..]
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        assert_eq!(data, vec![32767, -32768, 0, 16383]);
    }

    #[test]
    fn oversized_block_align_is_a_resource_error() {
        let buffer = SampleBuffer::new(vec![Vec::new(); 40_000], 1).unwrap();
        assert!(matches!(
            encode_wav(&buffer),
            Err(AudioLiftError::ResourceError(_))
        ));
    }
}
