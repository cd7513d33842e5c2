//! Subprocess execution.
//!
//! This module runs `CommandSpec`s. It provides:
//! 1. **Isolation:** Each child starts a new session so it and its descendants form one process group.
//! 2. **Limits:** The soft stack limit is applied between fork and exec.
//! 3. **Bounding:** A timeout or a fired cancel token sends SIGINT to the group, then SIGKILL after a grace period.
//! 4. **Reporting:** The command line and elapsed time are logged; the outcome keeps signal/timeout apart from exit codes.
//! 5. **Capture:** Standard output goes to a log file, optionally copied to the console as it arrives.

use std::fs::File;
use std::io::{self, Write};
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::command::CommandSpec;
use super::signal;
use crate::common::constants::{INTERRUPTED_EXIT_CODE, POLL_SLICE};
use crate::common::{CancelToken, Error, Result};

/// Time a signalled process group gets to exit before it is killed.
const KILL_GRACE: Duration = Duration::from_secs(10);

/// How a subprocess ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Exited normally with a code.
    Exited(i32),
    /// Terminated by a signal it did not handle.
    Signaled(i32),
    /// Stopped because the timeout expired.
    TimedOut,
    /// Stopped because the cancel token fired (usually SIGINT).
    Interrupted,
}

impl ExitOutcome {
    /// Exit code the wrapper reports for this outcome.
    ///
    /// A timeout reports success: long CI workloads are allowed to be cut
    /// short. Signals map to `128 + signal`, interrupts to 130.
    pub const fn code(self) -> i32 {
        match self {
            Self::Exited(code) => code,
            Self::Signaled(signal) => 128 + signal,
            Self::TimedOut => 0,
            Self::Interrupted => INTERRUPTED_EXIT_CODE,
        }
    }

    /// Returns `true` if the reported code is zero.
    pub const fn is_success(self) -> bool {
        self.code() == 0
    }

    fn from_status(status: ExitStatus) -> Self {
        status
            .code()
            .map_or_else(|| Self::Signaled(status.signal().unwrap_or(0)), Self::Exited)
    }
}

/// Runs commands to completion.
pub trait Executor {
    /// Runs `command` and reports how it ended.
    ///
    /// # Errors
    ///
    /// Returns an error only if the command could not be started or waited on.
    fn execute(&mut self, command: &CommandSpec) -> Result<ExitOutcome>;
}

/// Executor spawning real processes.
#[derive(Debug, Clone)]
pub struct SubprocessExecutor {
    timeout: Option<Duration>,
    cancel: CancelToken,
}

impl Default for SubprocessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SubprocessExecutor {
    /// Executor without timeout that stops children on SIGINT.
    pub fn new() -> Self {
        Self {
            timeout: None,
            cancel: CancelToken::new().observing_interrupts(),
        }
    }

    /// Sets the per-command timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the cancel token.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Builds the process; returns the log file when the caller has to copy
    /// standard output into it.
    fn build(command: &CommandSpec) -> Result<(Command, Option<File>)> {
        let mut cmd = Command::new(&command.program);
        let _ = cmd.args(&command.args).envs(&command.env);
        if let Some(dir) = &command.cwd {
            let _ = cmd.current_dir(dir);
        }
        let mut tee_log = None;
        if let Some(path) = &command.stdout_log {
            let log = File::create(path).map_err(|e| Error::io(path, e))?;
            if command.echo_stdout {
                let _ = cmd.stdout(Stdio::piped());
                tee_log = Some(log);
            } else {
                let _ = cmd.stdout(Stdio::from(log));
            }
        }
        let stack_limit = command.stack_limit;
        // SAFETY: the hook only calls async-signal-safe libc functions and
        // allocates nothing.
        let _ = unsafe {
            cmd.pre_exec(move || {
                if libc::setsid() == -1 {
                    return Err(io::Error::last_os_error());
                }
                if let Some(limit) = stack_limit {
                    set_stack_limit(limit)?;
                }
                Ok(())
            })
        };
        Ok((cmd, tee_log))
    }

    fn stop(child: &mut Child, reason: ExitOutcome) -> io::Result<()> {
        warn!(pid = child.id(), ?reason, "stopping subprocess group");
        if let Err(e) = signal::signal_group(child.id(), libc::SIGINT) {
            warn!("SIGINT to process group failed: {e}");
        }
        let grace = Instant::now() + KILL_GRACE;
        while child.try_wait()?.is_none() {
            if Instant::now() >= grace {
                let _ = signal::signal_group(child.id(), libc::SIGKILL);
                let _ = child.wait()?;
                break;
            }
            thread::sleep(POLL_SLICE);
        }
        Ok(())
    }
}

/// Writer duplicating everything into a log file and the console.
struct Tee<W> {
    log: File,
    console: W,
}

impl<W: Write> Write for Tee<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.log.write_all(buf)?;
        self.console.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.log.flush()?;
        self.console.flush()
    }
}

/// Copies the child's piped stdout into `log` and the console until EOF.
fn spawn_tee(child: &mut Child, log: File) -> Option<JoinHandle<io::Result<u64>>> {
    let mut stdout = child.stdout.take()?;
    Some(thread::spawn(move || {
        let mut tee = Tee {
            log,
            console: io::stdout(),
        };
        io::copy(&mut stdout, &mut tee)
    }))
}

fn set_stack_limit(limit: u64) -> io::Result<()> {
    let mut current = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: `current` is a valid, writable rlimit.
    if unsafe { libc::getrlimit(libc::RLIMIT_STACK, &raw mut current) } == -1 {
        return Err(io::Error::last_os_error());
    }
    let wanted = limit as libc::rlim_t;
    let updated = libc::rlimit {
        rlim_cur: if current.rlim_max == libc::RLIM_INFINITY {
            wanted
        } else {
            wanted.min(current.rlim_max)
        },
        rlim_max: current.rlim_max,
    };
    // SAFETY: `updated` is a valid rlimit that does not raise the hard limit.
    if unsafe { libc::setrlimit(libc::RLIMIT_STACK, &raw const updated) } == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

impl Executor for SubprocessExecutor {
    fn execute(&mut self, command: &CommandSpec) -> Result<ExitOutcome> {
        info!("subprocess call cmd: {command}");
        let spawn_error = |source| Error::Spawn {
            program: command.program.clone(),
            source,
        };

        let started = Instant::now();
        let (mut cmd, tee_log) = Self::build(command)?;
        let mut child = cmd.spawn().map_err(spawn_error)?;
        let tee = tee_log.and_then(|log| spawn_tee(&mut child, log));
        let deadline = self.timeout.map(|t| started + t);

        let outcome = loop {
            if let Some(status) = child.try_wait().map_err(spawn_error)? {
                break ExitOutcome::from_status(status);
            }
            let stop = if self.cancel.is_cancelled() {
                Some(ExitOutcome::Interrupted)
            } else if deadline.is_some_and(|d| Instant::now() >= d) {
                Some(ExitOutcome::TimedOut)
            } else {
                None
            };
            if let Some(reason) = stop {
                Self::stop(&mut child, reason).map_err(spawn_error)?;
                break reason;
            }
            thread::sleep(POLL_SLICE);
        };

        if let Some(tee) = tee {
            match tee.join() {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!("copying subprocess output failed: {e}"),
                Err(_) => warn!("subprocess output copier panicked"),
            }
        }

        info!(
            "Elapsed time: {:.3} seconds",
            started.elapsed().as_secs_f64()
        );
        Ok(outcome)
    }
}
