//! `blinkgate mirror` — run the capture post-processor on a file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub fn run(input: &Path, output: &Path) -> Result<()> {
    let raw = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;

    let corrected = blinkgate_engine::mirror_correct(&raw)
        .with_context(|| format!("failed to mirror-correct {}", input.display()))?;

    fs::write(output, corrected)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("mirror-corrected image written to {}", output.display());
    Ok(())
}
