use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signal_hook::consts::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};

use crate::error::Result;

/// Flags set from signal handlers and consumed at loop checkpoints.
///
/// Handlers only flip atomics; all work happens on the main flow.
#[derive(Clone, Debug, Default)]
pub struct ControlSignals {
    quit: Arc<AtomicBool>,
    reopen: Arc<AtomicBool>,
}

impl ControlSignals {
    /// Flags with no handlers attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// SIGINT, SIGQUIT and SIGTERM request quit; SIGHUP requests a log reopen.
    pub fn register(&self) -> Result<()> {
        for signal in [SIGINT, SIGQUIT, SIGTERM] {
            signal_hook::flag::register(signal, Arc::clone(&self.quit))?;
        }
        signal_hook::flag::register(SIGHUP, Arc::clone(&self.reopen))?;
        Ok(())
    }

    pub fn request_quit(&self) {
        self.quit.store(true, Ordering::SeqCst);
    }

    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
    }

    pub fn request_reopen(&self) {
        self.reopen.store(true, Ordering::SeqCst);
    }

    /// Consume a pending reopen request.
    pub fn take_reopen(&self) -> bool {
        self.reopen.swap(false, Ordering::SeqCst)
    }
}
