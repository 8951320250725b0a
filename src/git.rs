//! Git metadata used when the CI environment does not provide it

use crate::infra::{CommandExecutor, RealCommandExecutor};
use thiserror::Error;

/// Git operation errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Git command failed with an error message
    #[error("Git command failed: {0}")]
    CommandFailed(String),

    /// Git output contained invalid UTF-8
    #[error("Invalid UTF-8 in git output")]
    InvalidUtf8,

    /// IO error occurred while executing git command
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Git repository interface with dependency injection for testability
pub struct GitRepository<CE: CommandExecutor = RealCommandExecutor> {
    cmd_executor: CE,
}

impl GitRepository<RealCommandExecutor> {
    /// Create a new GitRepository with real command execution
    pub fn new() -> Self {
        Self {
            cmd_executor: RealCommandExecutor,
        }
    }
}

impl Default for GitRepository<RealCommandExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<CE: CommandExecutor> GitRepository<CE> {
    /// Create a GitRepository with a custom command executor (for testing)
    pub fn with_executor(cmd_executor: CE) -> Self {
        Self { cmd_executor }
    }

    /// Full hash of the checked-out commit
    ///
    /// Returns `Ok(None)` outside a repository or when git is not installed.
    pub fn head_commit(&self) -> Result<Option<String>, GitError> {
        self.rev_parse(&["rev-parse", "HEAD"])
    }

    /// Symbolic name of HEAD, e.g. `refs/heads/main`
    ///
    /// A detached HEAD yields `Ok(None)`.
    pub fn head_ref(&self) -> Result<Option<String>, GitError> {
        Ok(self
            .rev_parse(&["rev-parse", "--symbolic-full-name", "HEAD"])?
            .filter(|r| r.starts_with("refs/")))
    }

    fn rev_parse(&self, args: &[&str]) -> Result<Option<String>, GitError> {
        let output = match self.cmd_executor.execute(|cmd| cmd.args(args), "git") {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(GitError::Io(e)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("not a git repository") {
                return Ok(None);
            }
            return Err(GitError::CommandFailed(stderr.trim().to_string()));
        }

        let value = String::from_utf8(output.stdout)
            .map_err(|_| GitError::InvalidUtf8)?
            .trim()
            .to_string();

        Ok(Some(value).filter(|v| !v.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::mock_exit_status;
    use std::process::{Command, Output};

    struct MockCommandExecutor {
        stdout: &'static [u8],
        stderr: &'static [u8],
        code: i32,
    }

    impl CommandExecutor for MockCommandExecutor {
        fn output(&self, _cmd: &mut Command) -> std::io::Result<Output> {
            Ok(Output {
                status: mock_exit_status(self.code),
                stdout: self.stdout.to_vec(),
                stderr: self.stderr.to_vec(),
            })
        }
    }

    struct MissingGit;

    impl CommandExecutor for MissingGit {
        fn output(&self, _cmd: &mut Command) -> std::io::Result<Output> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "git"))
        }
    }

    #[test]
    fn test_head_commit_success() {
        let repo = GitRepository::with_executor(MockCommandExecutor {
            stdout: b"0123456789abcdef0123456789abcdef01234567\n",
            stderr: b"",
            code: 0,
        });

        assert_eq!(
            repo.head_commit().unwrap().as_deref(),
            Some("0123456789abcdef0123456789abcdef01234567")
        );
    }

    #[test]
    fn test_head_commit_outside_repository_is_none() {
        let repo = GitRepository::with_executor(MockCommandExecutor {
            stdout: b"",
            stderr: b"fatal: not a git repository (or any of the parent directories): .git",
            code: 128,
        });

        assert_eq!(repo.head_commit().unwrap(), None);
    }

    #[test]
    fn test_head_commit_without_git_is_none() {
        let repo = GitRepository::with_executor(MissingGit);
        assert_eq!(repo.head_commit().unwrap(), None);
    }

    #[test]
    fn test_unexpected_failure_is_error() {
        let repo = GitRepository::with_executor(MockCommandExecutor {
            stdout: b"",
            stderr: b"fatal: ambiguous argument 'HEAD'",
            code: 128,
        });

        assert!(matches!(
            repo.head_commit(),
            Err(GitError::CommandFailed(msg)) if msg.contains("ambiguous")
        ));
    }

    #[test]
    fn test_head_ref_on_branch() {
        let repo = GitRepository::with_executor(MockCommandExecutor {
            stdout: b"refs/heads/feature/issue-123\n",
            stderr: b"",
            code: 0,
        });

        assert_eq!(
            repo.head_ref().unwrap().as_deref(),
            Some("refs/heads/feature/issue-123")
        );
    }

    #[test]
    fn test_head_ref_detached_is_none() {
        let repo = GitRepository::with_executor(MockCommandExecutor {
            stdout: b"HEAD\n",
            stderr: b"",
            code: 0,
        });

        assert_eq!(repo.head_ref().unwrap(), None);
    }
}
