//! Single-frame blink detection from eye-contour landmarks.
//!
//! The eye contour spans the eyelids, so its vertical spread is a cheap
//! proxy for eye openness: an open eye has landmarks at the top and bottom
//! of the eye, a closed eye collapses to a near-flat line. Normalizing the
//! spread by the face-box height makes the ratio distance-invariant.
//!
//! The detector decides "eyes closed" for exactly one frame; turning that
//! into a liveness blink (debounce, latch) is the state machine's job.

use crate::types::{Keypoint, LEFT_EYE, RIGHT_EYE};

/// Default aperture ratio below which an eye counts as closed.
/// Empirically tuned against MediaPipe FaceMesh eye contours.
const DEFAULT_RATIO_THRESHOLD: f32 = 0.035;

/// Blink detector configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BlinkConfig {
    /// Aperture ratio (eye vertical spread / face-box height) below which
    /// an eye is considered closed. Both eyes must be under the threshold.
    pub ratio_threshold: f32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            ratio_threshold: DEFAULT_RATIO_THRESHOLD,
        }
    }
}

impl BlinkConfig {
    /// Decide whether both eyes are closed in this frame.
    ///
    /// Keypoints are partitioned by label equality on [`LEFT_EYE`] and
    /// [`RIGHT_EYE`]; other labels are ignored. If either eye cluster is
    /// empty, or `box_height` is non-positive, the verdict is `false` —
    /// absence of data must never fire the shutter.
    pub fn evaluate(&self, keypoints: &[Keypoint], box_height: f32) -> bool {
        if box_height <= 0.0 {
            return false;
        }

        let left = aperture(keypoints, LEFT_EYE);
        let right = aperture(keypoints, RIGHT_EYE);

        match (left, right) {
            (Some(left), Some(right)) => {
                left / box_height < self.ratio_threshold
                    && right / box_height < self.ratio_threshold
            }
            _ => false,
        }
    }
}

/// Vertical spread (`max y − min y`) of the keypoints carrying `label`.
/// `None` when no keypoint matches.
fn aperture(keypoints: &[Keypoint], label: &str) -> Option<f32> {
    let mut min_y = f32::INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    let mut matched = false;

    for point in keypoints.iter().filter(|p| p.name == label) {
        matched = true;
        min_y = min_y.min(point.y);
        max_y = max_y.max(point.y);
    }

    matched.then_some(max_y - min_y)
}
