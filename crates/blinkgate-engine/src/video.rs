//! Video source seam: where frames and stills come from.

use thiserror::Error;

/// One video frame handed to the prediction oracle.
///
/// `data` is packed RGB24, row-major. The engine never inspects the pixels
/// itself — they exist for the oracle's benefit — so a synthetic source may
/// leave `data` empty when its oracle ignores it.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to grab video frame: {0}")]
    Grab(String),
    #[error("failed to take still capture: {0}")]
    Still(String),
}

/// A live video feed: current dimensions, per-frame images for inference,
/// and a one-shot still capture for the final artifact.
///
/// Dimensions of `(0, 0)` mean the feed is not yet initialized; the
/// scheduler skips those cycles without touching the oracle.
pub trait VideoSource: Send {
    /// Current frame dimensions, `(0, 0)` until the feed is ready.
    fn dimensions(&self) -> (u32, u32);

    /// Grab the current frame for inference.
    fn grab_frame(&mut self) -> Result<Frame, SourceError>;

    /// Take a raw still capture as an encoded image buffer (e.g. PNG), in
    /// the same mirrored orientation as the preview. Mirror correction is
    /// the post-processor's job.
    fn take_still(&mut self) -> Result<Vec<u8>, SourceError>;
}
