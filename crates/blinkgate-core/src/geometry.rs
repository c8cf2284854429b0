//! Face placement gate: is the detected face centered and correctly sized?
//!
//! The subject must hold their face inside a fractional window of the frame
//! (a narrower horizontal band than vertical, since faces drift more
//! laterally) and within size bounds that reject faces too close to or too
//! far from the camera. Both gates must pass before blink detection runs.

use crate::types::BoundingBox;

/// Orientation of the coordinate space the oracle reports in, relative to
/// the frame the centered window is defined on.
///
/// Live previews are usually mirrored for the subject. When the oracle sees
/// that mirrored image, `Mirrored` reflects the face center back across the
/// frame midline before comparing against the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorScale {
    Normal,
    Mirrored,
}

/// Centered-region and size-constraint bounds, all as fractions of the
/// frame dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryConfig {
    /// Horizontal band the face center must fall in (fraction of width).
    pub window_x_min: f32,
    pub window_x_max: f32,
    /// Vertical band the face center must fall in (fraction of height).
    pub window_y_min: f32,
    pub window_y_max: f32,
    /// Acceptable face width (fraction of frame width).
    pub face_width_min: f32,
    pub face_width_max: f32,
    /// Acceptable face height (fraction of frame height).
    pub face_height_min: f32,
    pub face_height_max: f32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            window_x_min: 0.45,
            window_x_max: 0.55,
            window_y_min: 0.25,
            window_y_max: 0.55,
            // W/5 .. W/2.5
            face_width_min: 0.2,
            face_width_max: 0.4,
            // H/4 .. H/2
            face_height_min: 0.25,
            face_height_max: 0.5,
        }
    }
}

impl GeometryConfig {
    /// Evaluate whether a face bounding box is centered and correctly sized
    /// within a `frame_width` × `frame_height` frame.
    ///
    /// Pure and deterministic. Returns `false` for frames with non-positive
    /// dimensions (the scheduler skips those before calling the oracle, but
    /// the gate must never pass on degenerate input).
    pub fn evaluate(
        &self,
        bbox: &BoundingBox,
        frame_width: f32,
        frame_height: f32,
        mirror: MirrorScale,
    ) -> bool {
        if frame_width <= 0.0 || frame_height <= 0.0 {
            return false;
        }

        let (center_x, center_y) = bbox.center();
        let center_x = match mirror {
            MirrorScale::Normal => center_x,
            MirrorScale::Mirrored => frame_width - center_x,
        };

        let in_window = center_x >= self.window_x_min * frame_width
            && center_x <= self.window_x_max * frame_width
            && center_y >= self.window_y_min * frame_height
            && center_y <= self.window_y_max * frame_height;

        let size_ok = bbox.width >= self.face_width_min * frame_width
            && bbox.width <= self.face_width_max * frame_width
            && bbox.height >= self.face_height_min * frame_height
            && bbox.height <= self.face_height_max * frame_height;

        in_window && size_ok
    }
}
