//! Prediction oracle seam: the face-landmark model as an opaque capability.

use std::future::Future;

use blinkgate_core::Prediction;
use thiserror::Error;

use crate::video::Frame;

/// Inference failure for a single frame. The scheduler absorbs these — one
/// bad frame is logged and treated as "no face", never as fatal.
#[derive(Error, Debug)]
#[error("oracle failure: {0}")]
pub struct OracleError(pub String);

/// A face-landmark model: give it a frame, get zero or more predictions.
///
/// The real backing is some ML runtime; tests and simulations use scripted
/// implementations. An empty result means no face was detected and is a
/// normal verdict, not an error. The scheduler guarantees at most one
/// `estimate` call is in flight at a time.
pub trait FaceOracle: Send {
    fn estimate(
        &mut self,
        frame: &Frame,
    ) -> impl Future<Output = Result<Vec<Prediction>, OracleError>> + Send;
}
