//! `blinkgate simulate` — drive the gating loop from a prediction script.
//!
//! The script carries the oracle's wire shape directly:
//!
//! ```json
//! {
//!   "width": 640,
//!   "height": 480,
//!   "frames": [
//!     [],
//!     [ { "box": { "xMin": 250.0, "yMin": 80.0, "width": 140.0, "height": 200.0 },
//!         "keypoints": [ { "name": "leftEye", "x": 290.0, "y": 100.0 },
//!                        { "name": "leftEye", "x": 290.0, "y": 101.0 },
//!                        { "name": "rightEye", "x": 350.0, "y": 100.0 },
//!                        { "name": "rightEye", "x": 350.0, "y": 101.0 } ] } ]
//!   ]
//! }
//! ```
//!
//! Each entry in `frames` is the full prediction list for one detection
//! cycle; an empty list is a no-face frame. Once the script is exhausted the
//! oracle reports no face until the timeout cancels the loop.

use std::collections::VecDeque;
use std::fs;
use std::future::Future;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use image::{ImageFormat, Rgba, RgbaImage};
use serde::Deserialize;

use blinkgate_core::Prediction;
use blinkgate_engine::scheduler::{self, CaptureOutcome, CaptureSink, SinkError};
use blinkgate_engine::{EngineConfig, FaceOracle, Frame, OracleError, SourceError, VideoSource};

#[derive(Debug, Deserialize)]
struct Script {
    width: u32,
    height: u32,
    frames: Vec<Vec<Prediction>>,
}

/// Oracle that replays the scripted prediction lists in order.
struct ScriptedOracle {
    frames: VecDeque<Vec<Prediction>>,
}

impl FaceOracle for ScriptedOracle {
    fn estimate(
        &mut self,
        _frame: &Frame,
    ) -> impl Future<Output = Result<Vec<Prediction>, OracleError>> + Send {
        let predictions = self.frames.pop_front().unwrap_or_default();
        async move { Ok(predictions) }
    }
}

/// Fixed-size synthetic feed; the still is a generated gradient so the
/// mirror correction is visible in the output.
struct SyntheticSource {
    width: u32,
    height: u32,
    still: Vec<u8>,
}

impl SyntheticSource {
    fn new(width: u32, height: u32) -> Result<Self> {
        let mut img = RgbaImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            *pixel = Rgba([r, g, 128, 255]);
        }
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png)
            .context("failed to encode synthetic still")?;
        Ok(Self {
            width,
            height,
            still: out.into_inner(),
        })
    }
}

impl VideoSource for SyntheticSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn grab_frame(&mut self) -> Result<Frame, SourceError> {
        Ok(Frame {
            width: self.width,
            height: self.height,
            data: Vec::new(),
        })
    }

    fn take_still(&mut self) -> Result<Vec<u8>, SourceError> {
        Ok(self.still.clone())
    }
}

/// Writes the delivered capture to a file.
struct FileSink {
    path: PathBuf,
}

impl CaptureSink for FileSink {
    fn deliver(&mut self, image: &[u8]) -> Result<(), SinkError> {
        fs::write(&self.path, image)
            .map_err(|e| SinkError(format!("{}: {e}", self.path.display())))
    }
}

pub async fn run(script_path: &Path, output: &Path, timeout_secs: u64) -> Result<()> {
    let contents = fs::read_to_string(script_path)
        .with_context(|| format!("failed to read {}", script_path.display()))?;
    let script: Script = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse {}", script_path.display()))?;

    if script.width == 0 || script.height == 0 {
        bail!("script frame dimensions must be non-zero");
    }

    tracing::info!(
        width = script.width,
        height = script.height,
        frames = script.frames.len(),
        "starting simulation"
    );

    let source = SyntheticSource::new(script.width, script.height)?;
    let oracle = ScriptedOracle {
        frames: script.frames.into(),
    };
    let sink = FileSink {
        path: output.to_path_buf(),
    };

    let handle = scheduler::spawn(source, oracle, sink, EngineConfig::from_env());

    // The timeout drops the handle, which cancels the loop.
    let outcome = tokio::time::timeout(Duration::from_secs(timeout_secs), handle.wait())
        .await
        .map_err(|_| anyhow::anyhow!("no capture within {timeout_secs}s — script never satisfied the gate"))?
        .context("detection loop failed")?;

    match outcome {
        CaptureOutcome::Captured(_) => {
            println!("capture written to {}", output.display());
            Ok(())
        }
        CaptureOutcome::Failed { error, .. } => {
            Err(error).context("shutter fired but the capture could not be delivered")
        }
        CaptureOutcome::Cancelled => bail!("detection loop was cancelled before a capture"),
    }
}
