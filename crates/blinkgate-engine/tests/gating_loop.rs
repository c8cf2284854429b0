//! End-to-end tests for the detection loop: scripted oracle and synthetic
//! video source, deterministic timing via paused tokio time.

use std::collections::VecDeque;
use std::future::Future;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{ImageFormat, Rgba, RgbaImage};

use blinkgate_core::{BoundingBox, CaptureState, Keypoint, Prediction, LEFT_EYE, RIGHT_EYE};
use blinkgate_engine::scheduler::{self, CaptureError, CaptureOutcome, CaptureSink, SinkError};
use blinkgate_engine::{EngineConfig, FaceOracle, Frame, OracleError, SourceError, VideoSource};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

// ── Prediction builders ──────────────────────────────────────────────────────

/// Face centered and correctly sized on a 640×480 frame, eyes open.
fn centered_face() -> Prediction {
    face_at(250.0, 80.0, &[100.0, 120.0])
}

/// Same face with the eye contours collapsed (blink frame).
fn blinking_face() -> Prediction {
    face_at(250.0, 80.0, &[100.0, 101.0])
}

/// Face far off to the left, same size.
fn off_center_face() -> Prediction {
    face_at(10.0, 80.0, &[100.0, 120.0])
}

fn face_at(x_min: f32, y_min: f32, eye_ys: &[f32]) -> Prediction {
    let mut keypoints = Vec::new();
    for &y in eye_ys {
        keypoints.push(Keypoint::new(LEFT_EYE, x_min + 40.0, y));
        keypoints.push(Keypoint::new(RIGHT_EYE, x_min + 100.0, y));
    }
    Prediction {
        bbox: BoundingBox {
            x_min,
            y_min,
            width: 140.0,
            height: 200.0,
        },
        keypoints,
    }
}

// ── Mock collaborators ───────────────────────────────────────────────────────

struct ScriptedOracle {
    frames: VecDeque<Result<Vec<Prediction>, OracleError>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedOracle {
    fn new(
        frames: Vec<Result<Vec<Prediction>, OracleError>>,
    ) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                frames: frames.into(),
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl FaceOracle for ScriptedOracle {
    fn estimate(
        &mut self,
        _frame: &Frame,
    ) -> impl Future<Output = Result<Vec<Prediction>, OracleError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.frames.pop_front().unwrap_or_else(|| Ok(Vec::new()));
        async move { next }
    }
}

/// Oracle whose estimate never resolves — for cancellation-in-flight tests.
struct StalledOracle {
    calls: Arc<AtomicUsize>,
}

impl FaceOracle for StalledOracle {
    fn estimate(
        &mut self,
        _frame: &Frame,
    ) -> impl Future<Output = Result<Vec<Prediction>, OracleError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending()
    }
}

/// Synthetic source: reports (0, 0) for the first `not_ready_cycles`
/// dimension queries, then 640×480. `dimensions()` takes `&self`, hence the
/// atomic countdown.
struct TestSource {
    not_ready: AtomicUsize,
    still: Vec<u8>,
}

impl TestSource {
    fn ready() -> Self {
        Self::not_ready_for(0)
    }

    fn not_ready_for(cycles: usize) -> Self {
        Self {
            not_ready: AtomicUsize::new(cycles),
            still: sample_png(),
        }
    }
}

impl VideoSource for TestSource {
    fn dimensions(&self) -> (u32, u32) {
        let remaining = self.not_ready.load(Ordering::SeqCst);
        if remaining > 0 {
            self.not_ready.store(remaining - 1, Ordering::SeqCst);
            (0, 0)
        } else {
            (WIDTH, HEIGHT)
        }
    }

    fn grab_frame(&mut self) -> Result<Frame, SourceError> {
        Ok(Frame {
            width: WIDTH,
            height: HEIGHT,
            data: Vec::new(),
        })
    }

    fn take_still(&mut self) -> Result<Vec<u8>, SourceError> {
        Ok(self.still.clone())
    }
}

struct BrokenStillSource;

impl VideoSource for BrokenStillSource {
    fn dimensions(&self) -> (u32, u32) {
        (WIDTH, HEIGHT)
    }

    fn grab_frame(&mut self) -> Result<Frame, SourceError> {
        Ok(Frame {
            width: WIDTH,
            height: HEIGHT,
            data: Vec::new(),
        })
    }

    fn take_still(&mut self) -> Result<Vec<u8>, SourceError> {
        Ok(b"not an image".to_vec())
    }
}

#[derive(Clone)]
struct VecSink {
    delivered: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl VecSink {
    fn new() -> Self {
        Self {
            delivered: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn images(&self) -> Vec<Vec<u8>> {
        self.delivered.lock().unwrap().clone()
    }
}

impl CaptureSink for VecSink {
    fn deliver(&mut self, image: &[u8]) -> Result<(), SinkError> {
        self.delivered.lock().unwrap().push(image.to_vec());
        Ok(())
    }
}

/// Small asymmetric PNG used as the raw still.
fn sample_png() -> Vec<u8> {
    let mut img = RgbaImage::new(4, 2);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgba([x as u8 * 60, y as u8 * 120, 7, 255]);
    }
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn full_gate_ends_captured() {
    let (oracle, calls) = ScriptedOracle::new(vec![
        Ok(vec![]),                  // no face
        Ok(vec![off_center_face()]), // face, wrong place
        Ok(vec![centered_face()]),   // centered, eyes open
        Ok(vec![blinking_face()]),   // blink — latch
    ]);
    let sink = VecSink::new();
    let handle = scheduler::spawn(
        TestSource::ready(),
        oracle,
        sink.clone(),
        EngineConfig::default(),
    );

    let outcome = handle.wait().await.unwrap();
    let CaptureOutcome::Captured(session) = outcome else {
        panic!("expected a capture");
    };

    // Exactly the scripted frames were consumed; the latch stops inference
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(session.countdown_ticks(), None);

    // Sink received exactly one image: the mirror of the raw still
    let images = sink.images();
    assert_eq!(images.len(), 1);
    assert_eq!(session.captured_image(), Some(images[0].as_slice()));

    let raw = image::load_from_memory(&sample_png()).unwrap().to_rgba8();
    let delivered = image::load_from_memory(&images[0]).unwrap().to_rgba8();
    for (x, y, pixel) in raw.enumerate_pixels() {
        assert_eq!(delivered.get_pixel(raw.width() - 1 - x, y), pixel);
    }
}

#[tokio::test(start_paused = true)]
async fn oracle_failure_is_absorbed() {
    let (oracle, calls) = ScriptedOracle::new(vec![
        Ok(vec![centered_face()]),
        Err(OracleError("inference timed out".into())),
        Ok(vec![centered_face()]),
        Ok(vec![blinking_face()]),
    ]);
    let sink = VecSink::new();
    let handle = scheduler::spawn(
        TestSource::ready(),
        oracle,
        sink.clone(),
        EngineConfig::default(),
    );

    let outcome = handle.wait().await.unwrap();
    assert!(matches!(outcome, CaptureOutcome::Captured(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(sink.images().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn not_ready_source_defers_oracle_calls() {
    let (oracle, calls) = ScriptedOracle::new(vec![
        Ok(vec![centered_face()]),
        Ok(vec![blinking_face()]),
    ]);
    let sink = VecSink::new();
    let handle = scheduler::spawn(
        TestSource::not_ready_for(5),
        oracle,
        sink.clone(),
        EngineConfig::default(),
    );

    let outcome = handle.wait().await.unwrap();
    assert!(matches!(outcome, CaptureOutcome::Captured(_)));
    // Five skipped cycles issued no oracle calls
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn cancel_before_first_cycle_issues_no_oracle_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let oracle = StalledOracle {
        calls: calls.clone(),
    };
    let handle = scheduler::spawn(
        TestSource::ready(),
        oracle,
        VecSink::new(),
        EngineConfig::default(),
    );

    // Cancel before the task ever polls; the scheduled first cycle must not
    // reach the oracle.
    handle.cancel();
    let outcome = handle.wait().await.unwrap();
    assert!(matches!(outcome, CaptureOutcome::Cancelled));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn cancel_discards_in_flight_estimate() {
    let calls = Arc::new(AtomicUsize::new(0));
    let oracle = StalledOracle {
        calls: calls.clone(),
    };
    let sink = VecSink::new();
    let handle = scheduler::spawn(
        TestSource::ready(),
        oracle,
        sink.clone(),
        EngineConfig::default(),
    );

    // Let the loop get past pacing and into the (never-resolving) estimate
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    handle.cancel();
    let outcome = handle.wait().await.unwrap();
    assert!(matches!(outcome, CaptureOutcome::Cancelled));
    // No further calls, nothing delivered
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(sink.images().is_empty());
}

#[tokio::test(start_paused = true)]
async fn post_process_failure_hands_back_the_session() {
    let (oracle, _calls) = ScriptedOracle::new(vec![
        Ok(vec![centered_face()]),
        Ok(vec![blinking_face()]),
    ]);
    let sink = VecSink::new();
    let handle = scheduler::spawn(
        BrokenStillSource,
        oracle,
        sink.clone(),
        EngineConfig::default(),
    );

    let outcome = handle.wait().await.unwrap();
    let CaptureOutcome::Failed { session, error } = outcome else {
        panic!("expected a failed capture");
    };
    assert!(matches!(error, CaptureError::PostProcess(_)));

    // The shutter fired, so the session is Captured but holds no image; the
    // caller is free to reset it and try again.
    assert_eq!(session.state(), CaptureState::Captured);
    assert_eq!(session.captured_image(), None);

    // The sink never sees an unflipped or broken image
    assert!(sink.images().is_empty());

    let mut session = session;
    session.reset();
    assert_eq!(session.state(), CaptureState::Searching);
}
