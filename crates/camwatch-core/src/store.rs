use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{error, info};

use crate::consts::FRAME_NAME_TIME_FORMAT;
use crate::error::Result;
use crate::tools::Annotator;

/// Where a frame is in its life cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    /// In the work directory, awaiting a decision.
    Candidate,
    /// Annotated and moved to the save directory.
    Promoted,
    /// Deleted.
    Discarded,
}

/// A fetched frame on disk.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRecord {
    pub path: PathBuf,
    pub captured_at: DateTime<Local>,
    pub state: FrameState,
}

impl FrameRecord {
    /// File name without extension, for log lines.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Work and save directories for one camera.
#[derive(Clone, Debug)]
pub struct FrameStore {
    camera: String,
    work_dir: PathBuf,
    save_dir: PathBuf,
}

impl FrameStore {
    /// Create the directories if needed.
    pub fn open(camera: &str, work_dir: PathBuf, save_dir: PathBuf) -> Result<Self> {
        make_path(&work_dir)?;
        make_path(&save_dir)?;
        Ok(Self {
            camera: camera.to_string(),
            work_dir,
            save_dir,
        })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// `<camera>-<YYYYmmdd>-<HHMMSS>_<mmm>.jpg`
    pub fn frame_name(&self, at: DateTime<Local>) -> String {
        format!("{}-{}.jpg", self.camera, at.format(FRAME_NAME_TIME_FORMAT))
    }

    /// Write fetched bytes as a new candidate.
    pub fn write_candidate(&self, bytes: &[u8], at: DateTime<Local>) -> Result<FrameRecord> {
        let path = self.work_dir.join(self.frame_name(at));
        fs::write(&path, bytes)?;
        Ok(FrameRecord {
            path,
            captured_at: at,
            state: FrameState::Candidate,
        })
    }

    /// Stamp the capture time onto the frame and move it to the save
    /// directory.
    ///
    /// If annotation fails the frame is moved unannotated, so it is never
    /// lost. The work-directory copy is always removed.
    pub fn promote<A>(&self, record: FrameRecord, annotator: &A) -> Result<FrameRecord>
    where
        A: Annotator + ?Sized,
    {
        let name = record
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| self.frame_name(record.captured_at).into());
        let dest = self.save_dir.join(name);

        if let Err(e) = annotator.overlay_timestamp(&record.path, &dest, record.captured_at) {
            error!(frame = %record.stem(), "Timestamp overlay failed: {e}");
            if !has_content(&dest) {
                move_file(&record.path, &dest)?;
            }
        }
        remove_if_present(&record.path)?;

        Ok(FrameRecord {
            path: dest,
            captured_at: record.captured_at,
            state: FrameState::Promoted,
        })
    }

    /// Delete a candidate that will not be kept.
    pub fn discard(&self, record: FrameRecord) -> Result<FrameRecord> {
        remove_if_present(&record.path)?;
        Ok(FrameRecord {
            state: FrameState::Discarded,
            ..record
        })
    }
}

fn make_path(path: &Path) -> Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path)?;
        info!("Created directory {}", path.display());
    }
    Ok(())
}

fn has_content(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

/// Rename, falling back to copy + delete across filesystems.
fn move_file(src: &Path, dest: &Path) -> Result<()> {
    if fs::rename(src, dest).is_err() {
        fs::copy(src, dest)?;
        remove_if_present(src)?;
    }
    Ok(())
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}
