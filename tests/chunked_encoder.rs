//! Windowed compressed encoding tests, driven by scripted in-memory codecs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use audiolift::{
    AudioLiftError, CODEC_FRAME_LEN, CancellationToken, ChunkedEncoder, CodecFactory,
    CompressedCodec, ConvertOptions, DEFAULT_WINDOW_FRAMES, SampleBuffer, Step,
    TARGET_BITRATE_KBPS, UnavailableCodec, encode_chunked, quantize,
};

/// Everything a scripted codec saw.
#[derive(Debug, Default)]
struct CodecLog {
    created_with: Vec<(usize, u32, u32)>,
    windows: Vec<(Vec<i16>, Vec<i16>)>,
    flushes: usize,
}

/// Codec that emits `[window index]` per window and `[0xFF]` on flush.
struct ScriptedCodec {
    log: Arc<Mutex<CodecLog>>,
    fail_on_window: Option<usize>,
    fail_on_flush: bool,
}

impl CompressedCodec for ScriptedCodec {
    fn encode_window(&mut self, left: &[i16], right: &[i16]) -> Result<Vec<u8>, AudioLiftError> {
        let mut log = self.log.lock().unwrap();
        let index = log.windows.len();
        log.windows.push((left.to_vec(), right.to_vec()));
        if self.fail_on_window == Some(index) {
            return Err(AudioLiftError::EncodingError("scripted failure".to_string()));
        }
        Ok(vec![index as u8])
    }

    fn flush(&mut self) -> Result<Vec<u8>, AudioLiftError> {
        self.log.lock().unwrap().flushes += 1;
        if self.fail_on_flush {
            return Err(AudioLiftError::ResourceError("scripted flush failure".to_string()));
        }
        Ok(vec![0xFF])
    }
}

#[derive(Default)]
struct ScriptedFactory {
    log: Arc<Mutex<CodecLog>>,
    fail_on_window: Option<usize>,
    fail_on_flush: bool,
}

impl ScriptedFactory {
    fn log(&self) -> std::sync::MutexGuard<'_, CodecLog> {
        self.log.lock().unwrap()
    }
}

impl CodecFactory for ScriptedFactory {
    fn create(
        &self,
        channel_count: usize,
        sample_rate: u32,
        bitrate_kbps: u32,
    ) -> Result<Box<dyn CompressedCodec>, AudioLiftError> {
        self.log
            .lock()
            .unwrap()
            .created_with
            .push((channel_count, sample_rate, bitrate_kbps));
        Ok(Box::new(ScriptedCodec {
            log: Arc::clone(&self.log),
            fail_on_window: self.fail_on_window,
            fail_on_flush: self.fail_on_flush,
        }))
    }
}

fn ramp(frames: usize, offset: f32) -> Vec<f32> {
    (0..frames)
        .map(|index| ((index as f32 / frames.max(1) as f32) * 2.0 - 1.0 + offset).clamp(-1.0, 1.0))
        .collect()
}

// ── Window sequencing ──────────────────────────────────────────────

#[tokio::test]
async fn fragments_follow_window_order() {
    let buffer = SampleBuffer::new(vec![ramp(48000, 0.0)], 48000).unwrap();
    let factory = ScriptedFactory::default();

    let bytes = encode_chunked(&buffer, &factory, &ConvertOptions::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(bytes, vec![0, 1, 2, 3, 4, 0xFF]);
    let log = factory.log();
    assert_eq!(log.windows.len(), 5, "48000 frames in windows of 11520");
    assert_eq!(log.flushes, 1);
    let lengths = log.windows.iter().map(|(left, _)| left.len()).collect::<Vec<_>>();
    assert_eq!(lengths, vec![11520, 11520, 11520, 11520, 1920]);
}

#[tokio::test]
async fn codec_is_created_at_fixed_bitrate() {
    let buffer = SampleBuffer::new(vec![vec![0.0; 10]; 2], 44100).unwrap();
    let factory = ScriptedFactory::default();

    encode_chunked(&buffer, &factory, &ConvertOptions::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(factory.log().created_with, vec![(2, 44100, TARGET_BITRATE_KBPS)]);
    assert_eq!(TARGET_BITRATE_KBPS, 192);
}

#[tokio::test]
async fn mono_window_is_passed_as_both_inputs() {
    let samples = ramp(3000, 0.0);
    let buffer = SampleBuffer::new(vec![samples.clone()], 8000).unwrap();
    let factory = ScriptedFactory::default();

    encode_chunked(&buffer, &factory, &ConvertOptions::new(), |_| {})
        .await
        .unwrap();

    let log = factory.log();
    assert_eq!(log.created_with[0].0, 1);
    let (left, right) = &log.windows[0];
    assert_eq!(left, right);
    let expected = samples.iter().copied().map(quantize).collect::<Vec<_>>();
    assert_eq!(left, &expected);
}

#[tokio::test]
async fn only_the_first_two_channels_are_encoded() {
    let channels = vec![vec![0.5; 100], vec![-0.5; 100], vec![1.0; 100], vec![-1.0; 100]];
    let buffer = SampleBuffer::new(channels, 48000).unwrap();
    let factory = ScriptedFactory::default();

    encode_chunked(&buffer, &factory, &ConvertOptions::new(), |_| {})
        .await
        .unwrap();

    let log = factory.log();
    assert_eq!(log.created_with[0].0, 2);
    let (left, right) = &log.windows[0];
    assert!(left.iter().all(|&sample| sample == quantize(0.5)));
    assert!(right.iter().all(|&sample| sample == quantize(-0.5)));
}

#[tokio::test]
async fn empty_buffer_only_flushes() {
    let buffer = SampleBuffer::new(vec![Vec::new(), Vec::new()], 44100).unwrap();
    let factory = ScriptedFactory::default();
    let mut progress = Vec::new();

    let bytes = encode_chunked(&buffer, &factory, &ConvertOptions::new(), |percent| {
        progress.push(percent)
    })
    .await
    .unwrap();

    assert_eq!(bytes, vec![0xFF]);
    assert!(progress.is_empty());
    assert!(factory.log().windows.is_empty());
    assert_eq!(factory.log().flushes, 1);
}

#[tokio::test]
async fn custom_window_is_rounded_to_codec_frames() {
    let options = ConvertOptions::new().with_window_frames(1000);
    assert_eq!(options.window_frames(), CODEC_FRAME_LEN);

    let buffer = SampleBuffer::new(vec![vec![0.0; 3000]], 48000).unwrap();
    let factory = ScriptedFactory::default();
    encode_chunked(&buffer, &factory, &options, |_| {}).await.unwrap();

    let lengths = factory
        .log()
        .windows
        .iter()
        .map(|(left, _)| left.len())
        .collect::<Vec<_>>();
    assert_eq!(lengths, vec![1152, 1152, 696]);
}

#[tokio::test]
async fn unbounded_window_encodes_everything_at_once() {
    let options = ConvertOptions::new().with_window_frames(usize::MAX);
    let buffer = SampleBuffer::new(vec![ramp(5000, 0.0); 2], 44100).unwrap();
    let factory = ScriptedFactory::default();
    let mut progress = Vec::new();

    let bytes = encode_chunked(&buffer, &factory, &options, |percent| progress.push(percent))
        .await
        .unwrap();

    assert_eq!(bytes, vec![0, 0xFF]);
    assert_eq!(progress, vec![95]);
    assert_eq!(factory.log().windows.len(), 1);
    assert_eq!(factory.log().windows[0].0.len(), 5000);
}

// ── Progress ───────────────────────────────────────────────────────

#[tokio::test]
async fn progress_is_non_decreasing_within_encode_band() {
    let buffer = SampleBuffer::new(vec![ramp(48000, 0.1); 2], 48000).unwrap();
    let factory = ScriptedFactory::default();
    let mut progress = Vec::new();

    let bytes = encode_chunked(&buffer, &factory, &ConvertOptions::new(), |percent| {
        progress.push(percent)
    })
    .await
    .unwrap();

    assert!(!bytes.is_empty());
    assert_eq!(progress, vec![84, 87, 91, 94, 95]);
    assert!(progress.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(progress.iter().all(|percent| (80..=95).contains(percent)));
}

#[tokio::test]
async fn progress_for_long_buffers_stays_in_band() {
    let frames = DEFAULT_WINDOW_FRAMES * 40 + 17;
    let buffer = SampleBuffer::new(vec![vec![0.0; frames]], 44100).unwrap();
    let factory = ScriptedFactory::default();
    let mut progress = Vec::new();

    encode_chunked(&buffer, &factory, &ConvertOptions::new(), |percent| {
        progress.push(percent)
    })
    .await
    .unwrap();

    assert_eq!(progress.len(), 41);
    assert!(progress.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(progress.first(), Some(&80));
    assert_eq!(progress.last(), Some(&95));
}

#[tokio::test]
async fn other_tasks_run_between_windows() {
    let buffer = SampleBuffer::new(vec![vec![0.0; DEFAULT_WINDOW_FRAMES * 3]], 48000).unwrap();
    let factory = ScriptedFactory::default();
    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);
    let _other = tokio::spawn(async move { flag.store(true, Ordering::SeqCst) });

    let mut observed = Vec::new();
    encode_chunked(&buffer, &factory, &ConvertOptions::new(), |_| {
        observed.push(ran.load(Ordering::SeqCst))
    })
    .await
    .unwrap();

    assert_eq!(observed.len(), 3);
    assert!(
        observed[1..].iter().all(|&seen| seen),
        "spawned task should run at the first yield: {observed:?}"
    );
}

// ── Failures ───────────────────────────────────────────────────────

#[tokio::test]
async fn missing_codec_is_a_configuration_error() {
    let buffer = SampleBuffer::new(vec![vec![0.0; 100]], 8000).unwrap();
    let mut progress = Vec::new();

    let result = encode_chunked(&buffer, &UnavailableCodec, &ConvertOptions::new(), |percent| {
        progress.push(percent)
    })
    .await;

    assert!(matches!(result, Err(AudioLiftError::ConfigurationError(_))));
    assert!(progress.is_empty());
}

#[tokio::test]
async fn window_failure_aborts_without_flush() {
    let buffer = SampleBuffer::new(vec![vec![0.0; DEFAULT_WINDOW_FRAMES * 4]], 48000).unwrap();
    let factory = ScriptedFactory {
        fail_on_window: Some(2),
        ..ScriptedFactory::default()
    };

    let result = encode_chunked(&buffer, &factory, &ConvertOptions::new(), |_| {}).await;

    assert!(matches!(result, Err(AudioLiftError::EncodingError(_))));
    assert_eq!(factory.log().windows.len(), 3);
    assert_eq!(factory.log().flushes, 0);
}

#[tokio::test]
async fn flush_failure_becomes_encoding_error() {
    let buffer = SampleBuffer::new(vec![vec![0.0; 500]], 48000).unwrap();
    let factory = ScriptedFactory {
        fail_on_flush: true,
        ..ScriptedFactory::default()
    };

    let result = encode_chunked(&buffer, &factory, &ConvertOptions::new(), |_| {}).await;

    assert!(
        matches!(result, Err(AudioLiftError::EncodingError(_))),
        "flush errors of any kind surface as encoding errors: {result:?}"
    );
}

#[test]
fn failed_encoder_yields_no_bytes() {
    let buffer = SampleBuffer::new(vec![vec![0.0; DEFAULT_WINDOW_FRAMES * 2]], 48000).unwrap();
    let factory = ScriptedFactory {
        fail_on_window: Some(1),
        ..ScriptedFactory::default()
    };
    let mut encoder = ChunkedEncoder::new(&buffer, &factory, DEFAULT_WINDOW_FRAMES).unwrap();

    assert_eq!(encoder.step().unwrap(), Step::Progress(88));
    assert!(encoder.step().is_err());
    assert!(encoder.step().is_err(), "a failed encoder stays failed");
    assert!(encoder.into_bytes().is_err());
}

// ── Step API ───────────────────────────────────────────────────────

#[test]
fn flush_runs_exactly_once() {
    let buffer = SampleBuffer::new(vec![vec![0.25; 2000]], 16000).unwrap();
    let factory = ScriptedFactory::default();
    let mut encoder = ChunkedEncoder::new(&buffer, &factory, DEFAULT_WINDOW_FRAMES).unwrap();

    assert_eq!(encoder.step().unwrap(), Step::Progress(95));
    assert_eq!(encoder.cursor(), 2000);
    assert!(!encoder.has_remaining());
    assert!(!encoder.is_done());

    assert_eq!(encoder.step().unwrap(), Step::Finished);
    assert_eq!(encoder.step().unwrap(), Step::Finished);
    assert!(encoder.is_done());
    assert_eq!(factory.log().flushes, 1);

    assert_eq!(encoder.into_bytes().unwrap(), vec![0, 0xFF]);
}

#[test]
fn unfinished_encoder_has_no_output() {
    let buffer = SampleBuffer::new(vec![vec![0.0; 100]], 16000).unwrap();
    let factory = ScriptedFactory::default();
    let mut encoder = ChunkedEncoder::new(&buffer, &factory, DEFAULT_WINDOW_FRAMES).unwrap();
    encoder.step().unwrap();

    assert!(encoder.into_bytes().is_err());
}

// ── Cancellation ───────────────────────────────────────────────────

#[tokio::test]
async fn cancelled_before_start_encodes_nothing() {
    let buffer = SampleBuffer::new(vec![vec![0.0; 1000]], 8000).unwrap();
    let factory = ScriptedFactory::default();
    let token = CancellationToken::new();
    token.cancel();
    let options = ConvertOptions::new().with_cancellation(token);

    let result = encode_chunked(&buffer, &factory, &options, |_| {}).await;

    assert!(matches!(result, Err(AudioLiftError::Cancelled)));
    assert!(factory.log().windows.is_empty());
    assert_eq!(factory.log().flushes, 0);
}

#[tokio::test]
async fn cancelled_between_windows_stops_at_next_yield() {
    let buffer = SampleBuffer::new(vec![vec![0.0; DEFAULT_WINDOW_FRAMES * 5]], 48000).unwrap();
    let factory = ScriptedFactory::default();
    let token = CancellationToken::new();
    let options = ConvertOptions::new().with_cancellation(token.clone());

    let result = encode_chunked(&buffer, &factory, &options, |_| token.cancel()).await;

    assert!(matches!(result, Err(AudioLiftError::Cancelled)));
    assert_eq!(factory.log().windows.len(), 1);
    assert_eq!(factory.log().flushes, 0);
}
