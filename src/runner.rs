//! Command orchestration
//!
//! Resolves one command, assembles its parameter values, drives the
//! executor over every target in declaration order, and wraps the whole
//! thing in the optional git workflow. Steps run strictly in sequence; a
//! git failure aborts the run, and files already written stay written.

use std::collections::BTreeMap;
use tracing::debug;

use crate::cli;
use crate::config::{Config, PULL_REQUEST_GITHUB_CLI};
use crate::diff_formatter::DiffFormatter;
use crate::error::{RepverError, Result};
use crate::executor::{self, ExecutionContext};
use crate::git::Git;
use crate::github;
use crate::params;

#[derive(Debug)]
pub struct RunOptions {
    pub command: String,
    pub params: BTreeMap<String, String>,
    pub dry_run: bool,
}

pub fn run(config: &Config, options: &RunOptions) -> Result<()> {
    let command = config
        .command(&options.command)
        .ok_or_else(|| RepverError::CommandNotFound(options.command.clone()))?;

    // Validation already compiled every pattern, so a failure here is a
    // logic defect, not user input.
    let required = command.parameter_names().map_err(|e| {
        RepverError::internal(
            502,
            format!("failed to enumerate parameters of validated command: {e}"),
        )
    })?;

    let mut values = BTreeMap::new();
    let mut missing = Vec::new();
    for name in &required {
        match options.params.get(name) {
            Some(value) if !value.is_empty() => {
                values.insert(name.clone(), value.clone());
            }
            _ => missing.push(name.clone()),
        }
    }
    if !missing.is_empty() {
        return Err(RepverError::MissingParameters {
            help: cli::missing_parameters_help(&command.name, &missing, &required),
        });
    }

    // Validate declared params against their patterns and merge the
    // extracted groups into one map for the transforms.
    let mut extracted = BTreeMap::new();
    for param in &command.params {
        if let Some(value) = values.get(&param.name) {
            params::validate_value(param, value)?;
            let groups = params::extract_named_groups(param, value)?;
            debug!(param = %param.name, count = groups.len(), "extracted parameter groups");
            extracted.extend(groups);
        }
    }

    let use_git = command.git.specified();
    let git = Git::new();

    if use_git && !options.dry_run {
        Git::ensure_available()
            .map_err(|e| RepverError::internal(503, e.to_string()))?;

        let at_root = git.is_repository_root().map_err(|e| {
            RepverError::internal(503, format!("failed to determine git repository root: {e}"))
        })?;
        if !at_root {
            return Err(RepverError::NotRepositoryRoot);
        }

        let clean = git.is_clean().map_err(|e| {
            RepverError::internal(503, format!("failed to check git workspace state: {e}"))
        })?;
        if !clean {
            return Err(RepverError::WorkspaceDirty);
        }
    } else if use_git && options.dry_run {
        println!(
            "{}",
            DiffFormatter::format_dry_run_note(
                "Git operations would be performed but are disabled in dry run mode"
            )
        );
    }

    let mut original_branch = String::new();
    let mut new_branch = String::new();

    if use_git && !options.dry_run {
        original_branch = git.current_branch().map_err(|e| {
            RepverError::internal(504, format!("could not get current branch name: {e}"))
        })?;
        new_branch = original_branch.clone();

        if command.git.create_branch {
            new_branch = command.git.build_branch_name(&values);

            let exists = git.branch_exists(&new_branch).map_err(|e| {
                RepverError::internal(503, format!("failed to check if branch exists: {e}"))
            })?;
            if exists {
                return Err(RepverError::BranchExists(new_branch));
            }

            let output = git
                .create_and_switch_branch(&new_branch)
                .map_err(|e| RepverError::BranchCreate(e.to_string()))?;
            debug!(branch = %new_branch, output = %output.trim(), "created and switched to new branch");
        }
    } else if use_git && options.dry_run && command.git.create_branch {
        original_branch = git.current_branch().map_err(|e| {
            RepverError::internal(504, format!("could not get current branch name: {e}"))
        })?;
        new_branch = command.git.build_branch_name(&values);
        println!(
            "{}",
            DiffFormatter::format_dry_run_note(&format!(
                "Would create and switch to branch: {new_branch}"
            ))
        );
    }

    let ctx = ExecutionContext {
        dry_run: options.dry_run,
    };
    let mut commit_files = Vec::new();
    for target in &command.targets {
        let modified = executor::execute(target, &values, &extracted, &ctx)?;
        if modified {
            commit_files.push(target.path.clone());
        }
    }
    let any_modified = !commit_files.is_empty();

    if !any_modified {
        debug!("no files modified, skipping commit");
    } else if command.git.commit && !options.dry_run {
        let message = command.git.build_commit_message(&values);
        let output = git.add_and_commit(&commit_files, &message).map_err(|e| {
            RepverError::internal(505, format!("could not add and commit files: {e}"))
        })?;
        debug!(output = %output.trim(), "changes committed");

        if command.git.push && !new_branch.is_empty() {
            let remote = effective_remote(&command.git.remote);
            let output = git.push(remote, &new_branch).map_err(|e| {
                RepverError::internal(506, format!("failed to push changes: {e}"))
            })?;
            debug!(remote, branch = %new_branch, output = %output.trim(), "changes pushed");

            if command.git.pull_request == PULL_REQUEST_GITHUB_CLI {
                let output = github::create_pull_request()
                    .map_err(|e| RepverError::PullRequest(e.to_string()))?;
                debug!(output = %output.trim(), "created GitHub pull request");
            }
        }
    } else if command.git.commit && options.dry_run {
        let message = command.git.build_commit_message(&values);
        println!(
            "{}",
            DiffFormatter::format_dry_run_note(&format!(
                "Would commit changes with message: \"{message}\""
            ))
        );
        println!(
            "{}",
            DiffFormatter::format_dry_run_note("Files that would be added to the commit:")
        );
        for file in &commit_files {
            println!("  - {file}");
        }

        if command.git.push {
            let remote = effective_remote(&command.git.remote);
            println!(
                "{}",
                DiffFormatter::format_dry_run_note(&format!(
                    "Would push changes to remote '{remote}' branch '{new_branch}'"
                ))
            );
        }

        if command.git.pull_request == PULL_REQUEST_GITHUB_CLI {
            println!(
                "{}",
                DiffFormatter::format_dry_run_note("Would create GitHub pull request")
            );
        }
    }

    if command.git.return_to_original_branch && !options.dry_run && any_modified {
        let output = git.switch_branch(&original_branch).map_err(|e| {
            RepverError::internal(507, format!("failed to switch back to original branch: {e}"))
        })?;
        debug!(branch = %original_branch, output = %output.trim(), "returned to original branch");

        if command.git.delete_branch && command.git.create_branch {
            let output = git.delete_local_branch(&new_branch).map_err(|e| {
                RepverError::internal(509, format!("failed to delete new branch: {e}"))
            })?;
            debug!(branch = %new_branch, output = %output.trim(), "deleted branch");
        }
    } else if command.git.return_to_original_branch && options.dry_run {
        println!(
            "{}",
            DiffFormatter::format_dry_run_note(&format!(
                "Would switch back to original branch '{original_branch}'"
            ))
        );

        if command.git.delete_branch && command.git.create_branch {
            println!(
                "{}",
                DiffFormatter::format_dry_run_note(&format!("Would delete branch '{new_branch}'"))
            );
        }
    }

    Ok(())
}

fn effective_remote(remote: &str) -> &str {
    if remote.is_empty() { "origin" } else { remote }
}
