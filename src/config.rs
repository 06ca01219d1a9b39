//! `.repver` configuration model
//!
//! The configuration is a YAML document with a top-level `commands:`
//! sequence. Everything is deserialized up front, normalized once, and
//! treated as read-only for the rest of the run.

use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::{RepverError, Result};

/// Default configuration file name, resolved against the working directory
pub const CONFIG_FILE: &str = ".repver";

/// Pull request mode: do not open one
pub const PULL_REQUEST_NO: &str = "NO";
/// Pull request mode: open one through the GitHub CLI
pub const PULL_REQUEST_GITHUB_CLI: &str = "GITHUB_CLI";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Command {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub params: Vec<Param>,

    #[serde(default)]
    pub targets: Vec<Target>,

    #[serde(default)]
    pub git: GitOptions,
}

/// A declared, pattern-validated command-line input. The pattern's named
/// capture groups become values a target transform can reference.
#[derive(Debug, Clone, Deserialize)]
pub struct Param {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub pattern: String,
}

/// One file to rewrite: a path, a line-anchored pattern, and an optional
/// transform template. An empty transform means no transform.
#[derive(Debug, Clone, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub pattern: String,

    #[serde(default)]
    pub transform: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitOptions {
    #[serde(default)]
    pub create_branch: bool,

    /// Requires `create_branch`; the branch is removed after returning to
    /// the original branch.
    #[serde(default)]
    pub delete_branch: bool,

    /// Branch name template, may reference `{{name}}` parameter values
    #[serde(default)]
    pub branch_name: String,

    #[serde(default)]
    pub commit: bool,

    /// Commit message template, may reference `{{name}}` parameter values
    #[serde(default)]
    pub commit_message: String,

    #[serde(default)]
    pub push: bool,

    #[serde(default)]
    pub remote: String,

    /// `NO` or `GITHUB_CLI`; empty is normalized to `NO` at load time
    #[serde(default)]
    pub pull_request: String,

    #[serde(default)]
    pub return_to_original_branch: bool,
}

impl Config {
    /// Load a configuration from a file path
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RepverError::ConfigNotFound
            } else {
                RepverError::ConfigLoad(e.to_string())
            }
        })?;

        Config::parse(&data)
    }

    /// Parse YAML content into a configuration and apply load-time
    /// normalization
    pub fn parse(yaml: &str) -> Result<Config> {
        let mut config: Config =
            serde_yaml::from_str(yaml).map_err(|e| RepverError::ConfigLoad(e.to_string()))?;

        for command in &mut config.commands {
            if command.git.pull_request.is_empty() {
                command.git.pull_request = PULL_REQUEST_NO.to_string();
            }
        }

        Ok(config)
    }

    /// Look up a command by name (case-sensitive)
    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Distinct parameter names across every command, sorted
    pub fn parameter_names(&self) -> std::result::Result<Vec<String>, regex::Error> {
        let mut names = BTreeSet::new();
        for command in &self.commands {
            names.extend(command.parameter_names()?);
        }
        Ok(names.into_iter().collect())
    }
}

impl Command {
    /// Distinct named-capture-group names across this command's target
    /// patterns, sorted. These are the parameters a caller must supply.
    pub fn parameter_names(&self) -> std::result::Result<Vec<String>, regex::Error> {
        let mut names = BTreeSet::new();
        for target in &self.targets {
            names.extend(target.parameter_names()?);
        }
        Ok(names.into_iter().collect())
    }
}

impl Target {
    /// Named capture groups of this target's pattern, in group order
    pub fn parameter_names(&self) -> std::result::Result<Vec<String>, regex::Error> {
        let re = Regex::new(&self.pattern)?;
        Ok(re
            .capture_names()
            .flatten()
            .map(|name| name.to_string())
            .collect())
    }
}

impl GitOptions {
    /// Whether any git option is set at all. Cross-field validation and the
    /// git workflow only apply when this is true.
    pub fn specified(&self) -> bool {
        self.create_branch
            || self.delete_branch
            || self.commit
            || self.push
            || self.return_to_original_branch
    }

    /// Render the branch name template against the supplied parameter values
    pub fn build_branch_name(&self, values: &BTreeMap<String, String>) -> String {
        render_template(&self.branch_name, values)
    }

    /// Render the commit message template against the supplied parameter values
    pub fn build_commit_message(&self, values: &BTreeMap<String, String>) -> String {
        render_template(&self.commit_message, values)
    }
}

fn render_template(template: &str, values: &BTreeMap<String, String>) -> String {
    let mut rendered = template.to_string();
    for (key, value) in values {
        rendered = rendered.replace(&format!("{{{{{key}}}}}"), value);
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
commands:
  - name: bump
    params:
      - name: version
        pattern: "^(?P<major>\\d+)\\.(?P<minor>\\d+)\\.(?P<patch>\\d+)$"
    targets:
      - path: "Cargo.toml"
        pattern: "^version = \"(?P<version>.*)\"$"
    git:
      create_branch: true
      branch_name: "bump-{{version}}"
      commit: true
      commit_message: "Bump to {{version}}"
      push: true
      remote: origin
      return_to_original_branch: true
      delete_branch: true
  - name: docs
    targets:
      - path: "README.md"
        pattern: "^repver (?P<version>.*)$"
"#;

    #[test]
    fn test_parse_sample() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.commands.len(), 2);
        assert_eq!(config.commands[0].name, "bump");
        assert_eq!(config.commands[0].params.len(), 1);
        assert_eq!(config.commands[0].targets.len(), 1);
    }

    #[test]
    fn test_parse_rejects_malformed_yaml() {
        let err = Config::parse("commands: [").unwrap_err();
        assert_eq!(err.exit_code(), 101);
    }

    #[test]
    fn test_command_lookup_is_case_sensitive() {
        let config = Config::parse(SAMPLE).unwrap();
        assert!(config.command("bump").is_some());
        assert!(config.command("Bump").is_none());
        assert!(config.command("missing").is_none());
    }

    #[test]
    fn test_pull_request_normalized_to_no() {
        let config = Config::parse(SAMPLE).unwrap();
        for command in &config.commands {
            assert_eq!(command.git.pull_request, PULL_REQUEST_NO);
        }
    }

    #[test]
    fn test_command_parameter_names_sorted_and_distinct() {
        let yaml = r#"
commands:
  - name: multi
    targets:
      - path: "a.txt"
        pattern: "^v=(?P<version>.*) b=(?P<build>.*)$"
      - path: "b.txt"
        pattern: "^v=(?P<version>.*)$"
"#;
        let config = Config::parse(yaml).unwrap();
        let names = config.commands[0].parameter_names().unwrap();
        assert_eq!(names, vec!["build".to_string(), "version".to_string()]);
    }

    #[test]
    fn test_config_parameter_names_spans_commands() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(
            config.parameter_names().unwrap(),
            vec!["version".to_string()]
        );
    }

    #[test]
    fn test_build_branch_name_and_commit_message() {
        let config = Config::parse(SAMPLE).unwrap();
        let git = &config.commands[0].git;

        let mut values = BTreeMap::new();
        values.insert("version".to_string(), "1.26.0".to_string());

        assert_eq!(git.build_branch_name(&values), "bump-1.26.0");
        assert_eq!(git.build_commit_message(&values), "Bump to 1.26.0");
    }

    #[test]
    fn test_template_leaves_unknown_placeholders() {
        let mut values = BTreeMap::new();
        values.insert("version".to_string(), "2.0.0".to_string());
        assert_eq!(
            render_template("{{version}}-{{unknown}}", &values),
            "2.0.0-{{unknown}}"
        );
    }

    #[test]
    fn test_git_options_specified() {
        let config = Config::parse(SAMPLE).unwrap();
        assert!(config.commands[0].git.specified());
        assert!(!config.commands[1].git.specified());
    }

    #[test]
    fn test_missing_file_is_distinct_from_load_failure() {
        let err = Config::load("definitely-not-a-real-file.repver").unwrap_err();
        assert_eq!(err.exit_code(), 100);
    }
}
