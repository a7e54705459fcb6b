//! Output audio formats.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::AudioLiftError;

/// Audio output format.
///
/// Determines which encoder a conversion is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioFormat {
    /// WAV (PCM signed 16-bit little-endian). Uncompressed, written in a
    /// single synchronous pass.
    #[default]
    Wav,
    /// MP3 at a fixed 192 kbit/s. Compressed incrementally, yielding to the
    /// runtime between windows.
    Mp3,
}

impl AudioFormat {
    /// File extension for this format, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
        }
    }

    /// MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Mp3 => "audio/mpeg",
        }
    }

    /// Returns `true` for the compressed format.
    pub fn is_compressed(&self) -> bool {
        matches!(self, AudioFormat::Mp3)
    }
}

impl Display for AudioFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AudioFormat::Wav => write!(f, "WAV"),
            AudioFormat::Mp3 => write!(f, "MP3"),
        }
    }
}

impl FromStr for AudioFormat {
    type Err = AudioLiftError;

    /// Parse a format name. Accepts `wav`/`pcm` and `mp3`/`compressed`,
    /// case-insensitively.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wav" | "wave" | "pcm" => Ok(AudioFormat::Wav),
            "mp3" | "compressed" => Ok(AudioFormat::Mp3),
            other => Err(AudioLiftError::InvalidInput(format!(
                "unsupported output format: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_format_aliases() {
        assert_eq!("wav".parse::<AudioFormat>().unwrap(), AudioFormat::Wav);
        assert_eq!("PCM".parse::<AudioFormat>().unwrap(), AudioFormat::Wav);
        assert_eq!(" mp3 ".parse::<AudioFormat>().unwrap(), AudioFormat::Mp3);
        assert_eq!("compressed".parse::<AudioFormat>().unwrap(), AudioFormat::Mp3);
        assert!("flac".parse::<AudioFormat>().is_err());
    }

    #[test]
    fn extensions_and_mime_types() {
        assert_eq!(AudioFormat::Wav.extension(), "wav");
        assert_eq!(AudioFormat::Mp3.extension(), "mp3");
        assert_eq!(AudioFormat::Wav.mime_type(), "audio/wav");
        assert_eq!(AudioFormat::Mp3.mime_type(), "audio/mpeg");
        assert!(AudioFormat::Mp3.is_compressed());
        assert!(!AudioFormat::Wav.is_compressed());
    }

    #[test]
    fn display_is_uppercase() {
        assert_eq!(AudioFormat::Wav.to_string(), "WAV");
        assert_eq!(AudioFormat::Mp3.to_string(), "MP3");
    }
}
