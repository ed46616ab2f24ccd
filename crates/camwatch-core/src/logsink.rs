use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

enum Target {
    Stderr,
    File { path: PathBuf, file: File },
}

/// Shared, redirectable log destination.
///
/// Starts on stderr. Once pointed at a file it can be closed and reopened in
/// place, so external log rotation works with a plain SIGHUP. Writes go
/// straight to the descriptor under a lock; nothing is buffered here.
#[derive(Clone)]
pub struct LogSink {
    target: Arc<Mutex<Target>>,
}

impl Default for LogSink {
    fn default() -> Self {
        Self::stderr()
    }
}

impl LogSink {
    pub fn stderr() -> Self {
        Self {
            target: Arc::new(Mutex::new(Target::Stderr)),
        }
    }

    /// Send all further output to `path`, opened for append.
    pub fn redirect_to(&self, path: &Path) -> io::Result<()> {
        let file = open_append(path)?;
        *self.lock() = Target::File {
            path: path.to_path_buf(),
            file,
        };
        Ok(())
    }

    /// Close and reopen the log file. Returns `false` when logging to stderr.
    pub fn reopen(&self) -> io::Result<bool> {
        let mut target = self.lock();
        let path = match &*target {
            Target::Stderr => return Ok(false),
            Target::File { path, .. } => path.clone(),
        };
        let file = open_append(&path)?;
        *target = Target::File { path, file };
        Ok(true)
    }

    pub fn path(&self) -> Option<PathBuf> {
        match &*self.lock() {
            Target::Stderr => None,
            Target::File { path, .. } => Some(path.clone()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Target> {
        self.target.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut *self.lock() {
            Target::Stderr => io::stderr().write(buf),
            Target::File { file, .. } => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut *self.lock() {
            Target::Stderr => io::stderr().flush(),
            Target::File { file, .. } => file.flush(),
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
