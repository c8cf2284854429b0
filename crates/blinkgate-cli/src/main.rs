use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod mirror;
mod simulate;

#[derive(Parser)]
#[command(name = "blinkgate", about = "Liveness capture gating engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a JSON prediction script through the full gating loop and
    /// write the mirror-corrected capture.
    Simulate {
        /// Path to the prediction script (JSON).
        script: PathBuf,
        /// Where to write the captured PNG.
        #[arg(long, default_value = "capture.png")]
        output: PathBuf,
        /// Abort if no capture happened within this many seconds.
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
    /// Mirror-correct a single still image.
    Mirror {
        /// Input image (any format the decoder recognizes).
        input: PathBuf,
        /// Output path (PNG).
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Simulate {
            script,
            output,
            timeout_secs,
        } => simulate::run(&script, &output, timeout_secs).await,
        Command::Mirror { input, output } => mirror::run(&input, &output),
    }
}
