//! SIGINT handling and process-group signalling.
//!
//! Simulators run in their own session, so a terminal interrupt only reaches
//! the wrapper. The handler records it; the executor then forwards SIGINT to
//! the child's whole process group.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::common::{Error, Result};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_interrupt(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Installs a SIGINT handler that only records the interrupt.
///
/// # Errors
///
/// Returns `SignalHandler` if the kernel rejects the handler.
pub fn install_interrupt_handler() -> Result<()> {
    let handler = on_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t;
    // SAFETY: the handler only performs an atomic store, which is async-signal-safe.
    let previous = unsafe { libc::signal(libc::SIGINT, handler) };
    if previous == libc::SIG_ERR {
        return Err(Error::SignalHandler(io::Error::last_os_error()));
    }
    Ok(())
}

/// Returns `true` once SIGINT was received.
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Sends `signal` to every process in the group led by `pid`.
///
/// # Errors
///
/// Returns the OS error, e.g. `ESRCH` once the group is gone.
pub fn signal_group(pid: u32, signal: libc::c_int) -> io::Result<()> {
    let pgid = libc::pid_t::try_from(pid).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;
    // SAFETY: killpg has no memory-safety preconditions.
    if unsafe { libc::killpg(pgid, signal) } == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
