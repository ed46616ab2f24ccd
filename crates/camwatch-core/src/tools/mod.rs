//! External collaborators: frame distance, timestamp overlay, video assembly.
//!
//! Every external program is run with an explicit argument vector; nothing
//! passes through a shell.

pub mod ffmpeg;
pub mod gm;
pub mod pixel;

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::error::{CamwatchError, Result};

pub use ffmpeg::VideoAssembler;
pub use gm::GraphicsMagick;
pub use pixel::PixelDistance;

/// Scalar distance between two equally sized frames, roughly in [0, 1].
pub trait ImageDistance {
    fn compare(&self, a: &Path, b: &Path) -> Result<f64>;
}

/// Burns a timestamp into a frame.
pub trait Annotator {
    /// Write `src` with `at` overlaid to `dest`. `src` is left in place.
    fn overlay_timestamp(&self, src: &Path, dest: &Path, at: DateTime<Local>) -> Result<()>;
}

/// Run `program` with `args` and capture its output.
///
/// Fails on spawn errors and non-zero exit. With `strict_stderr`, any stderr
/// output is also a failure.
pub(crate) fn run_tool<I, S>(program: &Path, args: I, strict_stderr: bool) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let tool = program.display().to_string();
    let mut cmd = Command::new(program);
    cmd.args(args);
    debug!(command = ?cmd, "Running tool");

    let output = cmd.output().map_err(|e| CamwatchError::Tool {
        tool: tool.clone(),
        message: e.to_string(),
    })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !output.status.success() || (strict_stderr && !stderr.is_empty()) {
        return Err(CamwatchError::Tool {
            tool,
            message: format!("{}: {}", output.status, stderr),
        });
    }
    Ok(output)
}
