//! Capture post-processing: undo the preview's horizontal mirror.
//!
//! The live preview is mirrored so the subject sees themselves as in a
//! mirror, but the stored artifact must reflect true left/right orientation
//! for downstream identity verification.

use std::io::Cursor;

use image::ImageFormat;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostProcessError {
    #[error("failed to decode captured image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode mirrored image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Horizontally flip an encoded still and re-encode it as PNG.
///
/// Deterministic, and never falls back to the unflipped image — a decode or
/// encode failure surfaces as a distinct [`PostProcessError`]. Since PNG is
/// lossless, applying the correction twice yields an image pixel-identical
/// to the input.
pub fn mirror_correct(raw: &[u8]) -> Result<Vec<u8>, PostProcessError> {
    let decoded = image::load_from_memory(raw).map_err(PostProcessError::Decode)?;
    let flipped = decoded.fliph();

    let mut out = Cursor::new(Vec::new());
    flipped
        .write_to(&mut out, ImageFormat::Png)
        .map_err(PostProcessError::Encode)?;
    Ok(out.into_inner())
}
