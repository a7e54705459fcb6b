//! Conversion configuration.
//!
//! [`ConvertOptions`] is a builder that threads progress callbacks,
//! cancellation tokens, and encoder tuning through a conversion without
//! polluting every function signature.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use audiolift::{CancellationToken, ConvertOptions, ProgressInfo};
//!
//! let token = CancellationToken::new();
//! let options = ConvertOptions::new()
//!     .with_progress(Arc::new(|info: &ProgressInfo| println!("{}%", info.percent)))
//!     .with_cancellation(token.clone())
//!     .with_window_frames(4608);
//! assert_eq!(options.window_frames(), 4608);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::codec::CODEC_FRAME_LEN;
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// Default compressed-encode window: ten codec frames.
pub const DEFAULT_WINDOW_FRAMES: usize = CODEC_FRAME_LEN * 10;

/// Options for one conversion.
///
/// All fields have sensible defaults; a default-constructed value reports
/// nothing, never cancels, and encodes MP3 in 11,520-frame windows.
#[derive(Clone)]
pub struct ConvertOptions {
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    pub(crate) window_frames: usize,
}

impl Debug for ConvertOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ConvertOptions")
            .field("has_cancellation", &self.cancellation.is_some())
            .field("window_frames", &self.window_frames)
            .finish()
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvertOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            window_frames: DEFAULT_WINDOW_FRAMES,
        }
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled the conversion stops at its next check
    /// and fails with a cancelled [`ConversionError`](crate::ConversionError).
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how many frames the compressed encoder processes per turn.
    ///
    /// Rounded up to a multiple of the codec's 1,152-frame granularity, with
    /// a minimum of one codec frame. Requests too large to round up saturate
    /// at the largest representable multiple, which encodes in one window.
    #[must_use]
    pub fn with_window_frames(mut self, frames: usize) -> Self {
        self.window_frames = frames
            .max(1)
            .checked_next_multiple_of(CODEC_FRAME_LEN)
            .unwrap_or(usize::MAX / CODEC_FRAME_LEN * CODEC_FRAME_LEN);
        self
    }

    /// Frames per compressed-encode window.
    pub fn window_frames(&self) -> usize {
        self.window_frames
    }

    /// Returns `true` if cancellation has been requested.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_rounds_up_to_codec_frames() {
        assert_eq!(ConvertOptions::new().window_frames(), 11520);
        assert_eq!(ConvertOptions::new().with_window_frames(0).window_frames(), 1152);
        assert_eq!(ConvertOptions::new().with_window_frames(1153).window_frames(), 2304);
        assert_eq!(ConvertOptions::new().with_window_frames(2304).window_frames(), 2304);

        let huge = ConvertOptions::new().with_window_frames(usize::MAX).window_frames();
        assert_eq!(huge % CODEC_FRAME_LEN, 0);
        assert!(huge > usize::MAX - CODEC_FRAME_LEN);
    }

    #[test]
    fn cancellation_is_observed() {
        let token = CancellationToken::new();
        let options = ConvertOptions::new().with_cancellation(token.clone());
        assert!(!options.is_cancelled());
        token.cancel();
        assert!(options.is_cancelled());
        assert!(!ConvertOptions::new().is_cancelled());
    }
}
