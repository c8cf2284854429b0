//! Core of the liveness capture gate: pure per-frame evaluators and the
//! one-shot capture state machine.
//!
//! A capture attempt walks a fixed sequence: search for a face, hold it
//! centered and correctly sized, detect an eye blink, count down, fire the
//! shutter. This crate owns the decision logic only — frames, the landmark
//! model, and the clock live in `blinkgate-engine`, which feeds verdicts and
//! timer ticks into [`CaptureSession`].
//!
//! Everything here is synchronous and deterministic, so the whole gate is
//! unit-testable with hand-written predictions.

pub mod blink;
pub mod geometry;
pub mod session;
pub mod types;

pub use blink::BlinkConfig;
pub use geometry::{GeometryConfig, MirrorScale};
pub use session::{CaptureSession, CaptureState, Tick};
pub use types::{BoundingBox, FrameVerdict, Keypoint, Prediction, LEFT_EYE, RIGHT_EYE};
