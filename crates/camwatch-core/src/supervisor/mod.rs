//! Single-instance daemon supervision: PID file ownership, handover from a
//! previous instance, detaching, and signal flags.

pub mod daemon;
pub mod handover;
pub mod pidfile;
pub mod signals;

pub use daemon::detach;
pub use handover::{
    displace_previous, stop_process, HandoverOutcome, HandoverPolicy, ProcessControl,
    StopSignal, SystemProcesses,
};
pub use pidfile::{DaemonRecord, PidFile, PidFileGuard};
pub use signals::ControlSignals;
