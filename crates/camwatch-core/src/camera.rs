use std::io::Read;

use tracing::debug;

use crate::config::CameraConfig;
use crate::consts::{
    DECODER_CONTROL_PATH, HTTP_TIMEOUT, IR_OFF_COMMAND, IR_ON_COMMAND, MAX_SNAPSHOT_BYTES,
    SNAPSHOT_PATH,
};
use crate::daynight::Illumination;
use crate::error::{CamwatchError, Result};

/// A camera that serves still frames and accepts illumination commands.
pub trait FrameSource {
    /// Fetch one encoded still frame.
    fn fetch_snapshot(&mut self) -> Result<Vec<u8>>;

    /// Switch the IR illuminator. `Ok` means the camera acknowledged it.
    fn set_illumination(&mut self, mode: Illumination) -> Result<()>;
}

/// CGI-style network camera reached over HTTP.
///
/// The agent pools connections, so consecutive requests reuse one keep-alive
/// connection.
pub struct HttpCamera {
    agent: ureq::Agent,
    base_url: String,
    user: String,
    password: String,
}

impl HttpCamera {
    pub fn new(config: &CameraConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("camwatch/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            base_url: config.url.trim_end_matches('/').to_string(),
            user: config.user.clone(),
            password: config.password.clone(),
        }
    }

    fn request(&self, path: &str) -> ureq::Request {
        self.agent
            .get(&format!("{}{}", self.base_url, path))
            .query("user", &self.user)
            .query("pwd", &self.password)
    }
}

impl FrameSource for HttpCamera {
    fn fetch_snapshot(&mut self) -> Result<Vec<u8>> {
        let resp = self.request(SNAPSHOT_PATH).call()?;
        let bytes = read_bounded(resp.into_reader(), MAX_SNAPSHOT_BYTES)?;
        debug!(bytes = bytes.len(), "Snapshot received");
        Ok(bytes)
    }

    fn set_illumination(&mut self, mode: Illumination) -> Result<()> {
        let command = match mode {
            Illumination::On => IR_ON_COMMAND,
            Illumination::Off => IR_OFF_COMMAND,
        };
        self.request(DECODER_CONTROL_PATH)
            .query("command", command)
            .call()?;
        Ok(())
    }
}

/// Read a response body, failing rather than truncating past `limit` bytes.
fn read_bounded(reader: impl Read, limit: u64) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;
    if bytes.len() as u64 > limit {
        return Err(CamwatchError::Http(format!(
            "snapshot exceeds {limit} bytes"
        )));
    }
    Ok(bytes)
}
