//! Detection loop scheduler: the cancellable task that turns a stream of
//! frames into a capture decision.
//!
//! One logical task drives the whole gate. Each cycle grabs a frame, awaits
//! the oracle's estimate (at most one in flight, so slow inference never
//! queues), computes the per-frame verdict, and feeds the state machine.
//! Once the blink latches, the task stops consuming frames and suspends on
//! the pre-countdown delay and the countdown ticks instead; at zero it takes
//! the still, mirror-corrects it, and delivers it to the sink.
//!
//! Cancellation is observed at every await point: after [`LoopHandle::cancel`]
//! no new cycle starts, no further oracle call is issued, and an in-flight
//! estimate's result is discarded (its future is dropped mid-select).

use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use blinkgate_core::{CaptureSession, CaptureState, FrameVerdict, Prediction, Tick};

use crate::config::EngineConfig;
use crate::oracle::FaceOracle;
use crate::postprocess::{self, PostProcessError};
use crate::video::{SourceError, VideoSource};

/// Capture sink failure — the consumer of the final image rejected it.
#[derive(Error, Debug)]
#[error("capture sink failure: {0}")]
pub struct SinkError(pub String);

/// Consumer of the final mirror-corrected still (an encoded image buffer).
pub trait CaptureSink: Send {
    fn deliver(&mut self, image: &[u8]) -> Result<(), SinkError>;
}

/// Post-shutter failure: the countdown elapsed and the shutter fired, but
/// the final image never reached the caller. Per-frame grab and oracle
/// failures are absorbed inside the loop and never surface here.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("still capture failed: {0}")]
    Still(#[from] SourceError),
    #[error(transparent)]
    PostProcess(#[from] PostProcessError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Infrastructure failure of the loop itself (the task panicked or was
/// aborted). Capture-stage failures travel in [`CaptureOutcome::Failed`]
/// instead, so the session survives them.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("detection loop task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// How a detection loop ended.
#[derive(Debug)]
pub enum CaptureOutcome {
    /// The gate ran to completion; the session is `Captured` and holds the
    /// final mirror-corrected image.
    Captured(CaptureSession),
    /// The shutter fired but the still could not be captured, corrected, or
    /// delivered. The session remains `Captured` with no usable image; the
    /// caller decides whether to `reset()` it for another attempt.
    Failed {
        session: CaptureSession,
        error: CaptureError,
    },
    /// The loop was cancelled before a capture.
    Cancelled,
}

/// Handle to a running detection loop.
///
/// Dropping the handle also cancels the loop (the task notices the closed
/// cancellation channel at its next await point).
pub struct LoopHandle {
    cancel: watch::Sender<bool>,
    join: JoinHandle<CaptureOutcome>,
}

impl LoopHandle {
    /// Stop the loop. Effective at the task's next await point; no further
    /// oracle calls or state transitions occur afterwards.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Wait for the loop to finish and return its outcome.
    pub async fn wait(self) -> Result<CaptureOutcome, EngineError> {
        Ok(self.join.await?)
    }
}

/// Spawn the detection loop on the current tokio runtime.
pub fn spawn<S, O, K>(source: S, oracle: O, sink: K, config: EngineConfig) -> LoopHandle
where
    S: VideoSource + 'static,
    O: FaceOracle + 'static,
    K: CaptureSink + 'static,
{
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let join = tokio::spawn(run_loop(source, oracle, sink, config, cancel_rx));
    LoopHandle {
        cancel: cancel_tx,
        join,
    }
}

async fn run_loop<S, O, K>(
    mut source: S,
    mut oracle: O,
    mut sink: K,
    config: EngineConfig,
    mut cancel: watch::Receiver<bool>,
) -> CaptureOutcome
where
    S: VideoSource,
    O: FaceOracle,
    K: CaptureSink,
{
    let mut session = CaptureSession::new();
    tracing::debug!(?config, "detection loop started");

    loop {
        if sleep_or_cancel(&mut cancel, config.frame_interval).await {
            tracing::debug!("detection loop cancelled");
            return CaptureOutcome::Cancelled;
        }

        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            // Source not ready yet — skip the cycle without touching the oracle
            tracing::trace!("video source not ready; skipping cycle");
            continue;
        }

        let frame = match source.grab_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "frame grab failed; skipping cycle");
                continue;
            }
        };

        let verdict = tokio::select! {
            result = oracle.estimate(&frame) => match result {
                Ok(predictions) => verdict_for(&predictions, width, height, &config),
                Err(e) => {
                    // A single bad frame fails toward Searching, never toward Captured
                    tracing::warn!(error = %e, "oracle failed; treating frame as not centered");
                    FrameVerdict::default()
                }
            },
            _ = cancel.changed() => {
                tracing::debug!("detection loop cancelled during inference");
                return CaptureOutcome::Cancelled;
            }
        };

        // Cancellation wins any race with a resolving estimate: a result
        // that arrived alongside the cancel signal is discarded unseen.
        if *cancel.borrow() {
            tracing::debug!("detection loop cancelled; discarding frame result");
            return CaptureOutcome::Cancelled;
        }

        let previous = session.state();
        let state = session.observe_frame(verdict);
        if state != previous {
            tracing::debug!(from = ?previous, to = ?state, "state transition");
        }

        if state != CaptureState::BlinkLatched {
            continue;
        }

        // Blink latched: frames stop mattering from here on. Suspend through
        // the pre-countdown delay and the ticks, then fire the shutter.
        tracing::info!(delay = ?config.blink_delay, "blink latched");
        if sleep_or_cancel(&mut cancel, config.blink_delay).await {
            tracing::debug!("detection loop cancelled before countdown");
            return CaptureOutcome::Cancelled;
        }

        session.begin_countdown(config.countdown_ticks);
        tracing::info!(ticks = config.countdown_ticks, "countdown started");

        loop {
            if sleep_or_cancel(&mut cancel, config.tick_interval).await {
                tracing::debug!("detection loop cancelled during countdown");
                return CaptureOutcome::Cancelled;
            }
            match session.tick() {
                Some(Tick::Counting(remaining)) => {
                    tracing::info!(remaining, "countdown tick");
                }
                Some(Tick::Shutter) | None => break,
            }
        }

        // The shutter has fired: the session is Captured either way. A
        // failure here hands the session back alongside the error so the
        // caller can reset it for another attempt.
        return match finish_capture(&mut source, &mut sink, &mut session) {
            Ok(()) => {
                tracing::info!("capture complete");
                CaptureOutcome::Captured(session)
            }
            Err(error) => {
                tracing::error!(error = %error, "capture failed after shutter");
                CaptureOutcome::Failed { session, error }
            }
        };
    }
}

/// Take the still, mirror-correct it, and hand it to the sink. The image is
/// attached to the session only once the sink has accepted it.
fn finish_capture<S, K>(
    source: &mut S,
    sink: &mut K,
    session: &mut CaptureSession,
) -> Result<(), CaptureError>
where
    S: VideoSource,
    K: CaptureSink,
{
    let raw = source.take_still()?;
    let image = postprocess::mirror_correct(&raw)?;
    sink.deliver(&image)?;
    session.attach_image(image);
    Ok(())
}

/// Compute the per-frame verdict from the oracle's predictions.
///
/// Only the first prediction is considered; blink evaluation runs only once
/// the face is centered. No predictions means "no face", which is a normal
/// not-centered verdict.
fn verdict_for(
    predictions: &[Prediction],
    width: u32,
    height: u32,
    config: &EngineConfig,
) -> FrameVerdict {
    let Some(prediction) = predictions.first() else {
        tracing::trace!("no face detected");
        return FrameVerdict::default();
    };

    let centered = config.geometry.evaluate(
        &prediction.bbox,
        width as f32,
        height as f32,
        config.mirror,
    );
    let eyes_closed = centered
        && config
            .blink
            .evaluate(&prediction.keypoints, prediction.bbox.height);

    FrameVerdict {
        centered,
        eyes_closed,
    }
}

/// Sleep for `duration`, returning `true` if the loop was cancelled first.
/// A closed cancellation channel (dropped handle) counts as cancelled.
async fn sleep_or_cancel(cancel: &mut watch::Receiver<bool>, duration: Duration) -> bool {
    if *cancel.borrow() {
        return true;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = cancel.changed() => true,
    }
}
