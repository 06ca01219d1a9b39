//! GitHub command-line collaborator

use std::process::Command;

use crate::git::GitError;

/// Open a pull request from the current branch using the GitHub CLI,
/// auto-filling the title and description from the commits
pub fn create_pull_request() -> Result<String, GitError> {
    let args = ["pr", "create", "--fill"];

    let output = Command::new("gh")
        .args(args)
        .output()
        .map_err(|e| GitError::Spawn {
            command: format!("gh {}", args.join(" ")),
            source: e,
        })?;

    if !output.status.success() {
        return Err(GitError::Failed {
            command: format!("gh {}", args.join(" ")),
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
