use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::{info, warn};

use crate::consts::{
    HANDOVER_GIVE_UP_POLLS, HANDOVER_KILL_AFTER_POLLS, HANDOVER_POLL_INTERVAL,
    HANDOVER_RESEND_EVERY_POLLS,
};
use crate::error::{CamwatchError, Result};

use super::pidfile::PidFile;

/// Signals used to stop a previous instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopSignal {
    /// SIGINT: the instance finishes its current frame and exits cleanly.
    Graceful,
    /// SIGKILL.
    Kill,
}

/// Liveness probing and signal delivery.
pub trait ProcessControl {
    /// `Ok(false)` when no such process exists.
    fn is_alive(&self, pid: i32) -> Result<bool>;

    /// Deliver `signal`. `Ok(false)` when no such process exists.
    fn signal(&self, pid: i32, signal: StopSignal) -> Result<bool>;
}

/// Real processes via `kill(2)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemProcesses;

impl SystemProcesses {
    fn send(pid: i32, signal: Option<Signal>) -> Result<bool> {
        match kill(Pid::from_raw(pid), signal) {
            Ok(()) => Ok(true),
            Err(Errno::ESRCH) => Ok(false),
            // Exists, but owned by another user.
            Err(Errno::EPERM) if signal.is_none() => Ok(true),
            Err(e) => Err(e.into()),
        }
    }
}

impl ProcessControl for SystemProcesses {
    fn is_alive(&self, pid: i32) -> Result<bool> {
        Self::send(pid, None)
    }

    fn signal(&self, pid: i32, signal: StopSignal) -> Result<bool> {
        let sig = match signal {
            StopSignal::Graceful => Signal::SIGINT,
            StopSignal::Kill => Signal::SIGKILL,
        };
        Self::send(pid, Some(sig))
    }
}

/// Timing of the stop protocol, counted in polls.
#[derive(Clone, Debug)]
pub struct HandoverPolicy {
    pub poll_interval: Duration,
    /// From this poll on, SIGKILL is sent on every poll.
    pub kill_after: u32,
    /// Before `kill_after`, the graceful signal is re-sent this often.
    pub resend_every: u32,
    /// At this poll the handover fails.
    pub give_up_after: u32,
}

impl Default for HandoverPolicy {
    fn default() -> Self {
        Self {
            poll_interval: HANDOVER_POLL_INTERVAL,
            kill_after: HANDOVER_KILL_AFTER_POLLS,
            resend_every: HANDOVER_RESEND_EVERY_POLLS,
            give_up_after: HANDOVER_GIVE_UP_POLLS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandoverOutcome {
    /// No PID file, or it named an unusable PID.
    NoPrevious,
    /// The recorded process was already gone.
    AlreadyStopped { pid: i32 },
    /// The recorded process exited after `polls` polls.
    Stopped { pid: i32, polls: u32 },
}

/// Stop `pid`, escalating from SIGINT to SIGKILL, and wait for it to exit.
///
/// Fails with [`CamwatchError::HandoverFailed`] if it is still alive after
/// `policy.give_up_after` polls.
pub fn stop_process(
    pid: i32,
    control: &dyn ProcessControl,
    policy: &HandoverPolicy,
    sleep: &dyn Fn(Duration),
) -> Result<HandoverOutcome> {
    if !control.signal(pid, StopSignal::Graceful)? {
        info!(pid, "Process {pid} not found, continuing");
        return Ok(HandoverOutcome::AlreadyStopped { pid });
    }

    let mut polls: u32 = 0;
    loop {
        if polls % 10 == 0 {
            info!(pid, "Waiting for {pid} to exit");
        }
        sleep(policy.poll_interval);
        polls += 1;

        if polls >= policy.give_up_after {
            return Err(CamwatchError::HandoverFailed {
                pid,
                waited_secs: (policy.poll_interval * polls).as_secs(),
            });
        }

        let alive = if polls >= policy.kill_after {
            warn!(pid, "Killing {pid} with SIGKILL");
            control.signal(pid, StopSignal::Kill)?
        } else if policy.resend_every > 0 && polls % policy.resend_every == 0 {
            warn!(pid, "Sending SIGINT to {pid} again");
            control.signal(pid, StopSignal::Graceful)?
        } else {
            control.is_alive(pid)?
        };

        if !alive {
            info!(pid, polls, "Process {pid} exited");
            return Ok(HandoverOutcome::Stopped { pid, polls });
        }
    }
}

/// Displace whichever instance the PID file names, so the caller can own it.
pub fn displace_previous(
    pid_file: &PidFile,
    control: &dyn ProcessControl,
    policy: &HandoverPolicy,
    sleep: &dyn Fn(Duration),
) -> Result<HandoverOutcome> {
    let Some(record) = pid_file.read()? else {
        return Ok(HandoverOutcome::NoPrevious);
    };
    let own_pid = std::process::id() as i32;
    if record.pid <= 1 || record.pid == own_pid {
        warn!(
            pid = record.pid,
            "Ignoring unusable PID in {}",
            pid_file.path().display()
        );
        return Ok(HandoverOutcome::NoPrevious);
    }
    stop_process(record.pid, control, policy, sleep)
}
