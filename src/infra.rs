//! Infrastructure traits for abstracting I/O operations.
//!
//! Subprocesses, file access and the process environment all go through the
//! traits below so that the run orchestration can be exercised without cargo,
//! a GitHub runner or a real workspace.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::process::{Command, Output};

/// Trait for abstracting filesystem operations.
pub trait FileSystem {
    /// Read the entire contents of a file into a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Real filesystem implementation that delegates to std::fs.
#[derive(Debug, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Trait for abstracting command execution.
///
/// Every external tool (cargo, rustup, rustc, git) is invoked through this
/// trait.
pub trait CommandExecutor {
    /// Execute a command and return its output (stdout, stderr, status).
    fn output(&self, cmd: &mut Command) -> io::Result<Output>;

    /// Execute a command built with a closure and return its output.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bloat_ci::infra::{CommandExecutor, RealCommandExecutor};
    ///
    /// let executor = RealCommandExecutor;
    /// let output = executor.execute(|cmd| cmd.arg("--version"), "cargo")?;
    /// # Ok::<(), std::io::Error>(())
    /// ```
    fn execute<F>(&self, builder: F, program: &str) -> io::Result<Output>
    where
        F: FnOnce(&mut Command) -> &mut Command,
    {
        let mut cmd = Command::new(program);
        builder(&mut cmd);
        self.output(&mut cmd)
    }
}

/// Real command executor that delegates to std::process::Command.
#[derive(Debug, Clone, Copy)]
pub struct RealCommandExecutor;

impl CommandExecutor for RealCommandExecutor {
    fn output(&self, cmd: &mut Command) -> io::Result<Output> {
        cmd.output()
    }
}

impl<CE: CommandExecutor + ?Sized> CommandExecutor for &CE {
    fn output(&self, cmd: &mut Command) -> io::Result<Output> {
        (**self).output(cmd)
    }
}

/// Read-only view of the process environment.
pub trait EnvSource {
    /// Look up a variable, treating empty values as unset.
    fn var(&self, name: &str) -> Option<String>;
}

/// Environment backed by `std::env`.
#[derive(Debug, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

/// Fixed environment, used by tests and by callers that assemble their own.
#[derive(Debug, Clone, Default)]
pub struct MapEnv(pub HashMap<String, String>);

impl MapEnv {
    /// Build from `(name, value)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl EnvSource for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.0.get(name).filter(|v| !v.is_empty()).cloned()
    }
}

/// Create an ExitStatus with the given exit code for use in test mocks.
#[cfg(all(test, unix))]
pub fn mock_exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code << 8)
}

#[cfg(all(test, windows))]
pub fn mock_exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code as u32)
}
