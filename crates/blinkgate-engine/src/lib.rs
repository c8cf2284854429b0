//! Asynchronous runtime around the capture gate: the detection loop
//! scheduler, the collaborator traits it talks through (video source,
//! prediction oracle, capture sink), and the mirror-correcting capture
//! post-processor.
//!
//! The engine deliberately knows nothing about cameras or ML backends. It
//! pulls frames from a [`VideoSource`], asks a [`FaceOracle`] for landmark
//! predictions, feeds the pure evaluators from `blinkgate-core`, and hands
//! the finished still to a [`CaptureSink`] — so the whole pipeline runs
//! against synthetic collaborators in tests.

pub mod config;
pub mod oracle;
pub mod postprocess;
pub mod scheduler;
pub mod video;

pub use config::EngineConfig;
pub use oracle::{FaceOracle, OracleError};
pub use postprocess::{mirror_correct, PostProcessError};
pub use scheduler::{CaptureError, CaptureOutcome, CaptureSink, EngineError, LoopHandle, SinkError};
pub use video::{Frame, SourceError, VideoSource};
