//! Pre-execution validation of a loaded configuration
//!
//! Runs once after load, before any filesystem or git work touches
//! anything. The first violation aborts validation; there is no
//! multi-error aggregation.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::fs::File;
use std::path::{Component, Path};

use crate::config::{
    Command, Config, GitOptions, Param, Target, PULL_REQUEST_GITHUB_CLI, PULL_REQUEST_NO,
};
use crate::error::{RepverError, Result};
use crate::params;

/// Validate a configuration against the current working directory
pub fn validate(config: &Config) -> Result<()> {
    let root = std::env::current_dir()
        .map_err(|e| RepverError::validation(format!("failed to resolve working directory: {e}")))?;
    validate_in(config, &root)
}

/// Validate a configuration with target paths confined to `root`
pub fn validate_in(config: &Config, root: &Path) -> Result<()> {
    for command in &config.commands {
        validate_command(command, root)?;
    }

    let mut seen = HashSet::new();
    for command in &config.commands {
        if !seen.insert(command.name.as_str()) {
            return Err(RepverError::validation(format!(
                "duplicate command name found: {}",
                command.name
            )));
        }
    }

    Ok(())
}

fn validate_command(command: &Command, root: &Path) -> Result<()> {
    if command.name.is_empty() {
        return Err(RepverError::validation("command name cannot be empty"));
    }
    if !is_valid_name(&command.name) {
        return Err(RepverError::validation(format!(
            "command name '{}' must be 1-30 alphanumeric characters",
            command.name
        )));
    }

    let mut param_names = HashSet::new();
    // Which param produced each named group; collisions across params would
    // make the merged extraction map nondeterministic, so they are rejected.
    let mut group_owners: BTreeMap<String, String> = BTreeMap::new();

    for param in &command.params {
        let re = validate_param(param)?;

        if !param_names.insert(param.name.as_str()) {
            return Err(RepverError::validation(format!(
                "duplicate param name '{}' in command '{}'",
                param.name, command.name
            )));
        }

        for group in re.capture_names().flatten() {
            if let Some(owner) = group_owners.get(group) {
                return Err(RepverError::validation(format!(
                    "named group '{}' is defined by both param '{}' and param '{}' in command '{}'",
                    group, owner, param.name, command.name
                )));
            }
            group_owners.insert(group.to_string(), param.name.clone());
        }
    }

    let param_groups: BTreeSet<String> = group_owners.into_keys().collect();

    for target in &command.targets {
        validate_target(command, target, &param_groups, root)?;
    }

    if command.git.specified() {
        validate_git(&command.git)?;
    }

    Ok(())
}

fn validate_param(param: &Param) -> Result<Regex> {
    if param.name.is_empty() {
        return Err(RepverError::validation("param name cannot be empty"));
    }
    if !is_valid_name(&param.name) {
        return Err(RepverError::validation(format!(
            "param name '{}' must be 1-30 alphanumeric characters",
            param.name
        )));
    }
    if param.pattern.is_empty() {
        return Err(RepverError::validation(format!(
            "param '{}' pattern cannot be empty",
            param.name
        )));
    }

    compile_pattern(&param.pattern, "param")
}

fn validate_target(
    command: &Command,
    target: &Target,
    param_groups: &BTreeSet<String>,
    root: &Path,
) -> Result<()> {
    if target.path.is_empty() {
        return Err(RepverError::validation("target path cannot be empty"));
    }

    check_target_path(root, &target.path)?;

    if target.pattern.is_empty() {
        return Err(RepverError::validation("target pattern cannot be empty"));
    }

    let re = compile_pattern(&target.pattern, "target")?;

    for (i, name) in re.capture_names().enumerate() {
        if i == 0 {
            continue;
        }
        if name.is_none() {
            return Err(RepverError::validation(format!(
                "unnamed capturing group at index {i} in target pattern: {}",
                target.pattern
            )));
        }
    }

    check_no_nested_named_groups(&target.pattern)?;

    if !target.transform.is_empty() {
        if command.params.is_empty() {
            return Err(RepverError::validation(format!(
                "target transform requires at least one param in command '{}'",
                command.name
            )));
        }

        let placeholders = params::placeholder_names(&target.transform);
        if placeholders.is_empty() {
            return Err(RepverError::validation(format!(
                "target transform must reference at least one {{{{name}}}} placeholder: {}",
                target.transform
            )));
        }

        for name in &placeholders {
            if !param_groups.contains(name) {
                return Err(RepverError::validation(format!(
                    "transform placeholder '{{{{{name}}}}}' does not match any named group produced by the params of command '{}'",
                    command.name
                )));
            }
        }
    }

    Ok(())
}

fn validate_git(git: &GitOptions) -> Result<()> {
    if git.delete_branch && !git.create_branch {
        return Err(RepverError::validation(
            "delete_branch can only be set if create_branch is set",
        ));
    }
    if git.create_branch && git.branch_name.is_empty() {
        return Err(RepverError::validation(
            "branch_name must be set if create_branch is set",
        ));
    }
    if git.commit && git.commit_message.is_empty() {
        return Err(RepverError::validation(
            "commit_message must be set if commit is set",
        ));
    }
    if git.push && git.remote.is_empty() {
        return Err(RepverError::validation(
            "remote must be set if push is set",
        ));
    }
    if git.return_to_original_branch && !git.create_branch {
        return Err(RepverError::validation(
            "return_to_original_branch can only be set if create_branch is set",
        ));
    }
    if git.pull_request != PULL_REQUEST_NO && git.pull_request != PULL_REQUEST_GITHUB_CLI {
        return Err(RepverError::validation(format!(
            "pull_request must be {PULL_REQUEST_NO} or {PULL_REQUEST_GITHUB_CLI}, got '{}'",
            git.pull_request
        )));
    }

    Ok(())
}

fn is_valid_name(name: &str) -> bool {
    (1..=30).contains(&name.len()) && name.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Shared pattern checks for params and targets: canonical named-group
/// syntax, full anchoring, and a clean compile.
fn compile_pattern(pattern: &str, what: &str) -> Result<Regex> {
    check_canonical_group_syntax(pattern)?;

    if !pattern.starts_with('^') {
        return Err(RepverError::validation(format!(
            "{what} pattern must be anchored with a leading ^: {pattern}"
        )));
    }
    if !has_trailing_anchor(pattern) {
        return Err(RepverError::validation(format!(
            "{what} pattern must be anchored with a trailing $: {pattern}"
        )));
    }

    Regex::new(pattern).map_err(|e| {
        RepverError::validation(format!("{what} pattern is not a valid regex: {e}"))
    })
}

/// Reject the `(?<name>...)` capture syntax in favor of the canonical
/// `(?P<name>...)` form, suggesting the corrected pattern.
fn check_canonical_group_syntax(pattern: &str) -> Result<()> {
    let mut search = pattern;
    while let Some(pos) = search.find("(?<") {
        // (?<= and (?<! are look-behind syntax, left for the regex
        // compiler to report on its own terms
        match search.as_bytes().get(pos + 3) {
            Some(b'=') | Some(b'!') => {
                search = &search[pos + 3..];
            }
            _ => {
                let corrected = pattern.replace("(?<", "(?P<");
                return Err(RepverError::validation(format!(
                    "named capture groups use (?P<name>...) syntax, not (?<name>...). Try: {corrected}"
                )));
            }
        }
    }
    Ok(())
}

/// True when the pattern ends with a `$` that is not escaped (an even
/// number of preceding backslashes).
fn has_trailing_anchor(pattern: &str) -> bool {
    if !pattern.ends_with('$') {
        return false;
    }
    let mut backslashes = 0;
    for b in pattern[..pattern.len() - 1].bytes().rev() {
        if b == b'\\' {
            backslashes += 1;
        } else {
            break;
        }
    }
    backslashes % 2 == 0
}

/// Walk the pattern tracking parenthesis depth and reject a named group
/// whose span opens strictly inside another named group's span. Escapes
/// and character classes are skipped so their parentheses do not count.
fn check_no_nested_named_groups(pattern: &str) -> Result<()> {
    let bytes = pattern.as_bytes();
    let mut stack: Vec<Option<String>> = Vec::new();
    let mut in_class = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'[' if !in_class => in_class = true,
            b']' if in_class => in_class = false,
            b'(' if !in_class => {
                let name = named_group_at(&pattern[i..]);
                if let Some(name) = &name {
                    if let Some(outer) = stack.iter().rev().flatten().next() {
                        return Err(RepverError::validation(format!(
                            "named group '{name}' is nested inside named group '{outer}': {pattern}"
                        )));
                    }
                }
                stack.push(name);
            }
            b')' if !in_class => {
                stack.pop();
            }
            _ => {}
        }
        i += 1;
    }

    Ok(())
}

/// The group name if `rest` starts a named capture group
fn named_group_at(rest: &str) -> Option<String> {
    let after = rest.strip_prefix("(?P<")?;
    let end = after.find('>')?;
    Some(after[..end].to_string())
}

/// Confined stat/open of a target path: relative only, no `..`, and the
/// resolved file (symlinks followed) must still sit under `root`.
fn check_target_path(root: &Path, path_str: &str) -> Result<()> {
    let path = Path::new(path_str);

    if path.is_absolute() {
        return Err(RepverError::validation(format!(
            "target path must be relative to the working directory: {path_str}"
        )));
    }
    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(RepverError::validation(format!(
            "target path may not traverse outside the working directory: {path_str}"
        )));
    }

    let root = root.canonicalize().map_err(|e| {
        RepverError::validation(format!("failed to resolve working directory: {e}"))
    })?;

    let resolved = root.join(path).canonicalize().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RepverError::validation(format!("target file does not exist: {path_str}"))
        } else {
            RepverError::validation(format!("could not stat target file {path_str}: {e}"))
        }
    })?;

    if !resolved.starts_with(&root) {
        return Err(RepverError::validation(format!(
            "target path escapes the working directory: {path_str}"
        )));
    }

    let metadata = fs::metadata(&resolved).map_err(|e| {
        RepverError::validation(format!("could not stat target file {path_str}: {e}"))
    })?;
    if !metadata.is_file() {
        return Err(RepverError::validation(format!(
            "target path is not a regular file: {path_str}"
        )));
    }

    File::open(&resolved).map_err(|e| {
        RepverError::validation(format!("target file is not readable: {e}"))
    })?;

    Ok(())
}
