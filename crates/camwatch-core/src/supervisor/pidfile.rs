use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::daynight::DeviceMode;
use crate::error::{CamwatchError, Result};

/// Contents of a PID file: the owning process plus optional metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct DaemonRecord {
    pub pid: i32,
    pub started: Option<DateTime<Local>>,
    /// Last illumination mode the owner confirmed.
    pub mode: Option<DeviceMode>,
}

impl DaemonRecord {
    /// Record for the calling process.
    pub fn current() -> Self {
        Self {
            pid: std::process::id() as i32,
            started: Some(Local::now()),
            mode: None,
        }
    }

    /// First line is the PID; `key=value` lines follow. Unknown keys and
    /// unparsable metadata are ignored, a bad PID line is not.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let first = lines.next().unwrap_or("").trim();
        let pid: i32 = first.parse().map_err(|_| CamwatchError::InvalidPidFile {
            path: path.to_path_buf(),
            reason: format!("expected a PID, found {first:?}"),
        })?;

        let mut record = Self {
            pid,
            started: None,
            mode: None,
        };
        for line in lines {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            match key.trim() {
                "started" => {
                    record.started = DateTime::parse_from_rfc3339(value.trim())
                        .ok()
                        .map(|t| t.with_timezone(&Local));
                }
                "mode" => record.mode = value.trim().parse().ok(),
                _ => {}
            }
        }
        Ok(record)
    }

    pub fn render(&self) -> String {
        let mut out = format!("{}\n", self.pid);
        if let Some(started) = self.started {
            out.push_str(&format!("started={}\n", started.to_rfc3339()));
        }
        if let Some(mode) = self.mode {
            out.push_str(&format!("mode={mode}\n"));
        }
        out
    }
}

/// PID file whose presence marks a live instance for one camera.
#[derive(Clone, Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when no PID file exists.
    pub fn read(&self) -> Result<Option<DaemonRecord>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => DaemonRecord::parse(&self.path, &text).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the file contents atomically.
    pub fn write(&self, record: &DaemonRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, record.render())?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), pid = record.pid, "PID file written");
        Ok(())
    }

    /// Best-effort delete; an absent file is fine.
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Owns the PID file for the lifetime of a daemon and removes it on drop,
/// unless another process has since claimed it.
#[derive(Debug)]
pub struct PidFileGuard {
    file: PidFile,
    record: DaemonRecord,
}

impl PidFileGuard {
    pub fn acquire(file: PidFile, record: DaemonRecord) -> Result<Self> {
        file.write(&record)?;
        Ok(Self { file, record })
    }

    /// Persist the latest confirmed illumination mode.
    pub fn set_mode(&mut self, mode: DeviceMode) -> Result<()> {
        self.record.mode = Some(mode);
        self.file.write(&self.record)
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl Drop for PidFileGuard {
    fn drop(&mut self) {
        match self.file.read() {
            Ok(Some(on_disk)) if on_disk.pid != self.record.pid => {
                warn!(
                    owner = on_disk.pid,
                    "PID file now belongs to another process, leaving it"
                );
            }
            _ => {
                if let Err(e) = self.file.remove() {
                    warn!("Failed to remove PID file {}: {e}", self.file.path().display());
                }
            }
        }
    }
}
