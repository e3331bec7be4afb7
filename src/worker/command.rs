//! Launch configuration for worker processes.
//!
//! A [`WorkerCommand`] describes how to start one worker. The pool keeps a
//! copy and reuses it for every replacement spawn.
//!
//! # Example
//!
//! ```no_run
//! use procpool::WorkerCommand;
//!
//! let command = WorkerCommand::new("python")
//!     .arg("scripts/worker.py")
//!     .env("PYTHONPATH", ".");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;

// ============================================================================
// WorkerCommand
// ============================================================================

/// How to start a worker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    /// Program to execute.
    program: OsString,
    /// Arguments passed to the program.
    args: Vec<OsString>,
    /// Environment variables added to the inherited environment.
    envs: Vec<(OsString, OsString)>,
    /// Working directory, if not the current one.
    current_dir: Option<PathBuf>,
    /// Whether the worker's stderr is passed through.
    inherit_stderr: bool,
}

impl WorkerCommand {
    /// Creates a command for the given program.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            current_dir: None,
            inherit_stderr: false,
        }
    }

    /// Appends one argument.
    #[inline]
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[inline]
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets an environment variable for the worker.
    #[inline]
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Sets the worker's working directory.
    #[inline]
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Passes the worker's stderr through instead of discarding it.
    #[inline]
    #[must_use]
    pub fn inherit_stderr(mut self, inherit: bool) -> Self {
        self.inherit_stderr = inherit;
        self
    }

    /// Returns the program.
    #[inline]
    #[must_use]
    pub fn program(&self) -> &OsString {
        &self.program
    }

    /// Builds the process command with stdin and stdout piped.
    pub(crate) fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);

        cmd.args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)));

        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }

        let stderr = if self.inherit_stderr {
            Stdio::inherit()
        } else {
            Stdio::null()
        };

        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(stderr)
            .kill_on_drop(true);

        cmd
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_no_args() {
        let command = WorkerCommand::new("python");
        assert_eq!(command.program(), "python");
        assert!(command.args.is_empty());
        assert!(command.envs.is_empty());
        assert!(!command.inherit_stderr);
    }

    #[test]
    fn test_builder_accumulates() {
        let command = WorkerCommand::new("sh")
            .arg("-c")
            .args(["cat", "--"])
            .env("A", "1")
            .current_dir("/tmp")
            .inherit_stderr(true);

        assert_eq!(command.args, vec!["-c", "cat", "--"]);
        assert_eq!(command.envs, vec![("A".into(), "1".into())]);
        assert_eq!(command.current_dir, Some(PathBuf::from("/tmp")));
        assert!(command.inherit_stderr);
    }

    /// True while the process exists and is not a zombie.
    fn is_running(pid: u32) -> bool {
        std::fs::read_to_string(format!("/proc/{pid}/stat"))
            .map(|stat| {
                stat.rsplit(')')
                    .next()
                    .is_some_and(|rest| !rest.trim_start().starts_with('Z'))
            })
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn test_dropped_child_is_killed() {
        if !cfg!(target_os = "linux") {
            return;
        }

        let child = WorkerCommand::new("sh")
            .arg("-c")
            .arg("sleep 30")
            .to_command()
            .spawn()
            .expect("spawn");
        let pid = child.id().expect("pid");
        assert!(is_running(pid));

        drop(child);

        let give_up = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
        while is_running(pid) && tokio::time::Instant::now() < give_up {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert!(!is_running(pid));
    }

    #[test]
    fn test_command_is_clone() {
        let command = WorkerCommand::new("sh").arg("-c");
        assert_eq!(command.clone(), command);
    }
}
