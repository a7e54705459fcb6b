//! Progress reporting and cancellation support.
//!
//! This module provides [`ProgressCallback`] for monitoring a conversion,
//! [`CancellationToken`] for cooperative cancellation, and [`ProgressInfo`]
//! for progress snapshots.
//!
//! A conversion walks through four fixed [`Phase`] bands of the 0–100 scale:
//!
//! | Phase | Band |
//! |-------|------|
//! | [`Phase::Reading`] | 0 – 30 |
//! | [`Phase::Decoding`] | 30 – 70 |
//! | [`Phase::Preparing`] | 70 – 80 |
//! | [`Phase::Encoding`] | 80 – 100 |
//!
//! Callbacks observe a non-decreasing percentage within one conversion.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use audiolift::{ConvertOptions, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{:>3}% {}", info.percent, info.label);
//!     }
//! }
//!
//! let options = ConvertOptions::new().with_progress(Arc::new(PrintProgress));
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

use crate::format::AudioFormat;

/// The pipeline phase a progress value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Reading the input into memory.
    Reading,
    /// Decoding the audio track.
    Decoding,
    /// Setting up the encoder.
    Preparing,
    /// Writing or compressing the output.
    Encoding,
}

impl Phase {
    /// The `[start, end]` percentage band of this phase.
    pub fn band(self) -> (u8, u8) {
        match self {
            Phase::Reading => (0, 30),
            Phase::Decoding => (30, 70),
            Phase::Preparing => (70, 80),
            Phase::Encoding => (80, 100),
        }
    }

    /// Map a completion fraction within this phase to an overall percentage.
    ///
    /// `fraction` is clamped to `[0.0, 1.0]`.
    pub fn percent_at(self, fraction: f64) -> u8 {
        let (start, end) = self.band();
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        start + (f64::from(end - start) * fraction).round() as u8
    }

    /// The phase whose band contains `percent`.
    pub fn containing(percent: u8) -> Phase {
        match percent {
            0..30 => Phase::Reading,
            30..70 => Phase::Decoding,
            70..80 => Phase::Preparing,
            _ => Phase::Encoding,
        }
    }

    /// Human-readable label for this phase.
    pub fn label(self, format: AudioFormat) -> &'static str {
        match self {
            Phase::Reading => "Loading video file...",
            Phase::Decoding => "Decoding audio stream...",
            Phase::Preparing => "Preparing encoder...",
            Phase::Encoding => match format {
                AudioFormat::Mp3 => "Encoding MP3...",
                AudioFormat::Wav => "Writing WAV file...",
            },
        }
    }
}

/// A snapshot of conversion progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Overall completion, 0 – 100.
    pub percent: u8,
    /// The phase this value belongs to.
    pub phase: Phase,
    /// Human-readable description of the phase.
    pub label: String,
    /// Wall-clock time since the conversion started.
    pub elapsed: Duration,
}

/// Trait for receiving progress updates during a conversion.
///
/// Implementations must be [`Send`] and [`Sync`]; callbacks are invoked
/// from the task driving the conversion, which may move between runtime
/// worker threads.
///
/// Progress callbacks are **infallible**: they observe but cannot halt the
/// operation. Use [`CancellationToken`] for cooperative cancellation.
pub trait ProgressCallback: Send + Sync {
    /// Called at each progress step.
    fn on_progress(&self, info: &ProgressInfo);
}

impl<F> ProgressCallback for F
where
    F: Fn(&ProgressInfo) + Send + Sync,
{
    fn on_progress(&self, info: &ProgressInfo) {
        self(info)
    }
}

/// A no-op implementation that discards all progress notifications.
///
/// This is the default when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone this token and share it; call [`cancel`](CancellationToken::cancel)
/// from anywhere to stop the associated conversion. The pipeline checks
/// [`is_cancelled`](CancellationToken::is_cancelled) between steps and
/// between encode windows.
///
/// # Example
///
/// ```
/// use audiolift::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation.
    ///
    /// All clones of this token will observe the cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Monotonic progress gate in front of a [`ProgressCallback`].
///
/// One reporter lives for one conversion. Any value lower than the last
/// delivered one is dropped, values above 100 are clamped, and each
/// delivered value carries the label for its phase and the output format.
pub struct ProgressReporter {
    callback: Arc<dyn ProgressCallback>,
    format: AudioFormat,
    last_percent: Option<u8>,
    start_time: Instant,
}

impl ProgressReporter {
    /// Create a reporter for one conversion to `format`.
    pub fn new(callback: Arc<dyn ProgressCallback>, format: AudioFormat) -> Self {
        Self {
            callback,
            format,
            last_percent: None,
            start_time: Instant::now(),
        }
    }

    /// Report an absolute percentage within `phase`.
    ///
    /// Returns `true` if the value was delivered, `false` if it was
    /// discarded as a regression.
    pub fn report(&mut self, phase: Phase, percent: u8) -> bool {
        let percent = percent.min(100);
        if self.last_percent.is_some_and(|last| percent < last) {
            log::debug!(
                "Dropping regressing progress value {} (last {:?})",
                percent,
                self.last_percent
            );
            return false;
        }
        self.last_percent = Some(percent);

        let info = ProgressInfo {
            percent,
            phase,
            label: phase.label(self.format).to_string(),
            elapsed: self.start_time.elapsed(),
        };
        self.callback.on_progress(&info);
        true
    }

    /// Report a completion fraction within `phase`.
    pub fn report_fraction(&mut self, phase: Phase, fraction: f64) -> bool {
        self.report(phase, phase.percent_at(fraction))
    }

    /// Report a raw percentage, deriving the phase from its band.
    pub fn report_percent(&mut self, percent: u8) -> bool {
        self.report(Phase::containing(percent.min(100)), percent)
    }

    /// The last delivered percentage, if any.
    pub fn last_percent(&self) -> Option<u8> {
        self.last_percent
    }
}
