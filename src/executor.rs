//! Target execution: line-oriented named-group substitution
//!
//! A target's pattern is applied to every physical line of the file. On a
//! matching line each named capture group is replaced by its supplied
//! value, left to right; offsets are recomputed against the current line
//! after every splice because a replacement can shift everything behind
//! it. Non-group text, including whitespace, is left untouched.

use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use tracing::debug;

use crate::config::Target;
use crate::diff_formatter::DiffFormatter;
use crate::error::{RepverError, Result};
use crate::params;

/// Run-scoped execution settings, threaded explicitly instead of living
/// in global state
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionContext {
    pub dry_run: bool,
}

/// One rewritten line: number (1-based), previous content, new content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChange {
    pub line_number: usize,
    pub old: String,
    pub new: String,
}

/// Result of rewriting file content in memory
#[derive(Debug)]
pub struct Rewrite {
    pub content: String,
    pub changes: Vec<LineChange>,
}

/// Apply a target to its file. Returns whether the file content changed.
///
/// The diff is rendered whenever content changed, dry run included; the
/// write itself is skipped in dry run mode.
pub fn execute(
    target: &Target,
    values: &BTreeMap<String, String>,
    extracted_groups: &BTreeMap<String, String>,
    ctx: &ExecutionContext,
) -> Result<bool> {
    debug!(path = %target.path, pattern = %target.pattern, "executing target");

    let content = fs::read_to_string(&target.path)
        .map_err(|e| RepverError::Execution(format!("failed to read {}: {e}", target.path)))?;
    debug!(bytes = content.len(), "read target file");

    let re = Regex::new(&target.pattern).map_err(|e| {
        RepverError::Execution(format!("pattern '{}' failed to compile: {e}", target.pattern))
    })?;

    // A transform produces one scalar that replaces every named group in
    // this target; without one, the raw parameter values are used per group.
    let mut effective = values.clone();
    if !target.transform.is_empty() {
        let rendered = params::apply_transform(&target.transform, extracted_groups);
        debug!(transform = %target.transform, rendered = %rendered, "applied transform");
        for name in re.capture_names().flatten() {
            effective.insert(name.to_string(), rendered.clone());
        }
    }

    let rewrite = rewrite_content(&re, &content, &effective)?;

    if rewrite.content == content {
        debug!(path = %target.path, "content unchanged, skipping write");
        return Ok(false);
    }

    print!(
        "{}",
        DiffFormatter::format_file_diff(&target.path, &rewrite.changes)
    );

    if ctx.dry_run {
        debug!(path = %target.path, "dry run, skipping write");
        return Ok(true);
    }

    // Plain write to the same path keeps the inode, and with it the file's
    // permissions.
    fs::write(&target.path, &rewrite.content)
        .map_err(|e| RepverError::Execution(format!("failed to write {}: {e}", target.path)))?;
    debug!(path = %target.path, bytes = rewrite.content.len(), "wrote target file");

    Ok(true)
}

/// Rewrite file content in memory, line by line. Pure with respect to the
/// filesystem; the input string is never mutated.
pub fn rewrite_content(
    re: &Regex,
    content: &str,
    values: &BTreeMap<String, String>,
) -> Result<Rewrite> {
    let had_trailing_newline = content.ends_with('\n');
    let body = if had_trailing_newline {
        &content[..content.len() - 1]
    } else {
        content
    };

    let names: Vec<Option<&str>> = re.capture_names().collect();

    let mut out_lines = Vec::new();
    let mut changes = Vec::new();

    for (idx, line) in body.split('\n').enumerate() {
        let line_number = idx + 1;

        if !re.is_match(line) {
            out_lines.push(line.to_string());
            continue;
        }

        if re.captures_len() <= 1 {
            // Pattern is a selector with no capture groups; nothing to
            // substitute.
            out_lines.push(line.to_string());
            continue;
        }

        debug!(line_number, line, "pattern matched line");

        let mut current = line.to_string();
        for group_index in 1..re.captures_len() {
            let Some(name) = names[group_index] else {
                // Unnamed groups are rejected at validation time
                continue;
            };

            let Some(replacement) = values.get(name) else {
                return Err(RepverError::Execution(format!(
                    "no replacement value for named group '{name}'"
                )));
            };

            // Re-match against the current state of the line: the previous
            // splice may have shifted this group's byte offsets.
            let span = re
                .captures(&current)
                .and_then(|caps| caps.get(group_index))
                .map(|m| (m.start(), m.end()));

            if let Some((start, end)) = span {
                debug!(
                    group = name,
                    old = &current[start..end],
                    new = replacement.as_str(),
                    "replacing named group"
                );
                current = format!("{}{}{}", &current[..start], replacement, &current[end..]);
            }
        }

        if current != line {
            changes.push(LineChange {
                line_number,
                old: line.to_string(),
                new: current.clone(),
            });
        }
        out_lines.push(current);
    }

    let mut content = out_lines.join("\n");
    if had_trailing_newline {
        content.push('\n');
    }

    Ok(Rewrite { content, changes })
}
