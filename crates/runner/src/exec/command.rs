//! Structured subprocess descriptions.
//!
//! A `CommandSpec` is built up by the launchers and handed to an
//! [`Executor`](super::executor::Executor). Commands are spawned directly
//! unless [`CommandSpec::in_shell`] wraps them, which is the only place the
//! quoting feeds a real shell.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Program, arguments and process attributes of one subprocess.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandSpec {
    /// Program to execute, looked up in `PATH` if not a path.
    pub program: String,
    /// Arguments after the program.
    pub args: Vec<String>,
    /// Variables set on top of the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Working directory; inherited if `None`.
    pub cwd: Option<PathBuf>,
    /// Soft stack limit in bytes (`ulimit -s`).
    pub stack_limit: Option<u64>,
    /// File receiving standard output; inherited if `None`.
    pub stdout_log: Option<PathBuf>,
    /// Also copy standard output to the wrapper's own stdout (`| tee`).
    pub echo_stdout: bool,
}

impl CommandSpec {
    /// Command running `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Adds environment variables.
    #[must_use]
    pub fn envs(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env.extend(vars);
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Sets the soft stack limit.
    #[must_use]
    pub const fn stack_limit(mut self, bytes: u64) -> Self {
        self.stack_limit = Some(bytes);
        self
    }

    /// Redirects standard output to a file.
    #[must_use]
    pub fn stdout_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout_log = Some(path.into());
        self
    }

    /// Copies standard output to a file and to the console.
    #[must_use]
    pub fn tee_stdout(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout_log = Some(path.into());
        self.echo_stdout = true;
        self
    }

    /// Runs the command under `sh -c '<command>; exit $?'`.
    ///
    /// The trailing `exit` keeps the shell from exec'ing into the command, so
    /// the shell and its full command line stay in the process table until
    /// the command ends. Environment, working directory, limits and output
    /// redirection apply to the shell and are inherited by the command.
    #[must_use]
    pub fn in_shell(self) -> Self {
        let script = {
            let argv: Vec<Cow<'_, str>> = self.argv().into_iter().map(shell_quote).collect();
            format!("{}; exit $?", argv.join(" "))
        };
        Self {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script],
            ..self
        }
    }

    /// Runs the command behind a wrapper such as `numactl ...`.
    ///
    /// The first prefix element becomes the program; the wrapped program
    /// moves into the argument list after the rest of the prefix.
    #[must_use]
    pub fn prefixed(mut self, prefix: Vec<String>) -> Self {
        let mut prefix = prefix.into_iter();
        let Some(wrapper) = prefix.next() else {
            return self;
        };
        let mut args: Vec<String> = prefix.collect();
        args.push(std::mem::replace(&mut self.program, wrapper));
        args.append(&mut self.args);
        self.args = args;
        self
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    /// Working directory, if set.
    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dir) = &self.cwd {
            write!(f, "cd {} && ", shell_quote(&dir.display().to_string()))?;
        }
        let argv: Vec<Cow<'_, str>> = self.argv().into_iter().map(shell_quote).collect();
        write!(f, "{}", argv.join(" "))?;
        if let Some(log) = &self.stdout_log {
            let redirect = if self.echo_stdout { "| tee" } else { ">" };
            write!(f, " {redirect} {}", shell_quote(&log.display().to_string()))?;
        }
        Ok(())
    }
}

/// Quotes `arg` for POSIX shells when it contains anything but safe characters.
pub fn shell_quote(arg: &str) -> Cow<'_, str> {
    let safe = |c: char| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c);
    if !arg.is_empty() && arg.chars().all(safe) {
        Cow::Borrowed(arg)
    } else {
        Cow::Owned(format!("'{}'", arg.replace('\'', r"'\''")))
    }
}
