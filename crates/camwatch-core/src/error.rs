use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CamwatchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    #[error("Malformed output from {tool}: {output}")]
    MalformedToolOutput { tool: String, output: String },

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Image dimensions differ: {left:?} vs {right:?}")]
    DimensionMismatch { left: (u32, u32), right: (u32, u32) },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unrecognized camera: {name}, please choose from {known:?}")]
    UnknownCamera { name: String, known: Vec<String> },

    #[error("Invalid PID file {path}: {reason}")]
    InvalidPidFile { path: PathBuf, reason: String },

    #[error("Failed to stop process {pid} after {waited_secs}s")]
    HandoverFailed { pid: i32, waited_secs: u64 },

    #[error("System error: {0}")]
    Errno(#[from] nix::errno::Errno),
}

impl From<ureq::Error> for CamwatchError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, resp) => {
                Self::Http(format!("{} {}", code, resp.status_text()))
            }
            ureq::Error::Transport(t) => Self::Http(t.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CamwatchError>;
