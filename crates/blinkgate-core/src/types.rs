use serde::{Deserialize, Serialize};

/// Label the oracle attaches to left-eye contour keypoints.
pub const LEFT_EYE: &str = "leftEye";
/// Label the oracle attaches to right-eye contour keypoints.
pub const RIGHT_EYE: &str = "rightEye";

/// A named facial landmark in frame pixel coordinates.
///
/// Produced fresh each frame by the prediction oracle; the engine never
/// mutates keypoints. Labels other than [`LEFT_EYE`] / [`RIGHT_EYE`] are
/// carried through but ignored by the blink detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub name: String,
    pub x: f32,
    pub y: f32,
}

impl Keypoint {
    pub fn new(name: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
        }
    }
}

/// Axis-aligned face bounding box in frame pixel coordinates.
///
/// Coordinates are in the (possibly mirrored) video space the oracle saw;
/// see [`crate::geometry::MirrorScale`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub x_min: f32,
    pub y_min: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Center point of the box.
    pub fn center(&self) -> (f32, f32) {
        (self.x_min + self.width / 2.0, self.y_min + self.height / 2.0)
    }
}

/// One detected face: bounding box plus the ordered landmark sequence.
///
/// When the oracle reports multiple faces, only the first entry is
/// considered (first-match policy; which face *should* win under multiple
/// detections is deliberately left open).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
    pub keypoints: Vec<Keypoint>,
}

/// Per-frame evaluation result fed into the capture state machine.
///
/// Computed fresh every frame and never carried across frames. The default
/// verdict (not centered, eyes open) is also the fail-safe verdict for
/// frames where the oracle failed or saw no face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameVerdict {
    pub centered: bool,
    pub eyes_closed: bool,
}
