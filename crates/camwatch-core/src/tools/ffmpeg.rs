use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::consts::VIDEO_FRAMERATE;
use crate::error::{CamwatchError, Result};

use super::run_tool;

/// Assembles saved frames into an MP4 with `ffmpeg`.
#[derive(Clone, Debug)]
pub struct VideoAssembler {
    binary: PathBuf,
}

impl VideoAssembler {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Encode the frames matched by `globs`, in order, into `output`.
    pub fn assemble(&self, globs: &[PathBuf], output: &Path) -> Result<()> {
        if globs.is_empty() {
            return Err(CamwatchError::Tool {
                tool: self.binary.display().to_string(),
                message: "no input frames".to_string(),
            });
        }
        let args = assemble_args(globs, output);
        run_tool(&self.binary, &args, false)?;
        info!(output = %output.display(), inputs = globs.len(), "Video assembled");
        Ok(())
    }
}

/// Argument vector for [`VideoAssembler::assemble`].
pub fn assemble_args(globs: &[PathBuf], output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into()];
    let framerate = VIDEO_FRAMERATE.to_string();
    for glob in globs {
        args.extend(
            ["-f", "image2", "-framerate", framerate.as_str(), "-pattern_type", "glob", "-i"]
                .iter()
                .map(OsString::from),
        );
        args.push(glob.clone().into_os_string());
    }
    if globs.len() > 1 {
        let inputs: String = (0..globs.len()).map(|i| format!("[{i}:0]")).collect();
        args.push("-filter_complex".into());
        args.push(format!("{inputs}concat=n={}:v=1:a=0[v]", globs.len()).into());
        args.push("-map".into());
        args.push("[v]".into());
    }
    args.push("-pix_fmt".into());
    args.push("yuv420p".into());
    args.push(output.as_os_str().to_os_string());
    args
}
