//! Git command-line collaborators
//!
//! Every operation shells out to the `git` binary and blocks until it
//! finishes. Calls either succeed with the captured stdout (kept for
//! diagnostics) or fail with the command's stderr; nothing is retried.

use std::path::PathBuf;
use std::process::{Command, Output};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("git binary not found on PATH")]
    MissingBinary,

    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("{command} exited with code {code}: {stderr}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("could not determine working directory: {0}")]
    WorkingDir(std::io::Error),
}

/// Handle over a git working tree. Commands run in the process working
/// directory unless an explicit directory is set.
pub struct Git {
    workdir: Option<PathBuf>,
}

impl Git {
    pub fn new() -> Self {
        Git { workdir: None }
    }

    /// A handle bound to an explicit working tree, used by tests to drive
    /// a scratch repository
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Git {
            workdir: Some(dir.into()),
        }
    }

    /// Confirm the `git` binary is reachable before starting a workflow
    pub fn ensure_available() -> Result<(), GitError> {
        which::which("git").map_err(|_| GitError::MissingBinary)?;
        Ok(())
    }

    /// Whether the working directory is the root of a git repository
    pub fn is_repository_root(&self) -> Result<bool, GitError> {
        let toplevel = self.run(&["rev-parse", "--show-toplevel"])?;

        let cwd = match &self.workdir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(GitError::WorkingDir)?,
        };

        let cwd = cwd.canonicalize().map_err(GitError::WorkingDir)?;
        let toplevel = PathBuf::from(toplevel.trim())
            .canonicalize()
            .map_err(GitError::WorkingDir)?;

        Ok(cwd == toplevel)
    }

    /// Whether the working tree has no uncommitted changes
    pub fn is_clean(&self) -> Result<bool, GitError> {
        let status = self.run(&["status", "--porcelain"])?;
        Ok(status.trim().is_empty())
    }

    /// Name of the currently checked-out branch
    pub fn current_branch(&self) -> Result<String, GitError> {
        let branch = self.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(branch.trim().to_string())
    }

    /// Whether a local branch with this name exists
    pub fn branch_exists(&self, name: &str) -> Result<bool, GitError> {
        let reference = format!("refs/heads/{name}");
        let args = ["show-ref", "--verify", "--quiet", reference.as_str()];
        let output = self.output(&args)?;

        if output.status.success() {
            return Ok(true);
        }
        // Exit code 1 means the reference does not exist
        if output.status.code() == Some(1) {
            return Ok(false);
        }

        Err(Self::failure(&args, &output))
    }

    /// Create a new branch and switch to it
    pub fn create_and_switch_branch(&self, name: &str) -> Result<String, GitError> {
        self.run(&["checkout", "-b", name])
    }

    /// Switch to an existing branch
    pub fn switch_branch(&self, name: &str) -> Result<String, GitError> {
        self.run(&["checkout", name])
    }

    /// Stage the named files and commit them with the given message
    pub fn add_and_commit(&self, files: &[String], message: &str) -> Result<String, GitError> {
        let mut combined = String::new();

        for file in files {
            combined.push_str(&self.run(&["add", file])?);
        }
        combined.push_str(&self.run(&["commit", "-m", message])?);

        Ok(combined)
    }

    /// Push a branch to the named remote
    pub fn push(&self, remote: &str, branch: &str) -> Result<String, GitError> {
        self.run(&["push", remote, branch])
    }

    /// Delete a local branch
    pub fn delete_local_branch(&self, name: &str) -> Result<String, GitError> {
        self.run(&["branch", "-D", name])
    }

    /// Run git with the given arguments, requiring success
    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let output = self.output(args)?;

        if !output.status.success() {
            return Err(Self::failure(args, &output));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run git and hand back the raw output, success or not
    fn output(&self, args: &[&str]) -> Result<Output, GitError> {
        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        cmd.output().map_err(|e| GitError::Spawn {
            command: format!("git {}", args.join(" ")),
            source: e,
        })
    }

    fn failure(args: &[&str], output: &Output) -> GitError {
        GitError::Failed {
            command: format!("git {}", args.join(" ")),
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

impl Default for Git {
    fn default() -> Self {
        Git::new()
    }
}
