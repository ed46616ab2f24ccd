use std::fs::OpenOptions;
use std::os::unix::io::AsRawFd;

use nix::unistd::{chdir, dup2, fork, setsid, ForkResult};

use crate::error::Result;

/// Detach from the controlling terminal: double fork, new session, cwd `/`,
/// stdio on `/dev/null`. Only the grandchild returns.
///
/// Call before any threads are spawned.
pub fn detach() -> Result<()> {
    // SAFETY: single-threaded at this point; the parent exits immediately.
    if let ForkResult::Parent { .. } = unsafe { fork() }? {
        std::process::exit(0);
    }
    setsid()?;
    // SAFETY: as above.
    if let ForkResult::Parent { .. } = unsafe { fork() }? {
        std::process::exit(0);
    }
    chdir("/")?;

    let devnull = OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/null")?;
    for fd in 0..=2 {
        dup2(devnull.as_raw_fd(), fd)?;
    }
    Ok(())
}
