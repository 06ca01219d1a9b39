//! Validation tests over full YAML configurations
//!
//! Each case parses a real `.repver` document and runs the validator
//! against a scratch directory holding the target files.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use repver::config::Config;
use repver::validator;

fn scratch_with_target() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("version.txt"), "version: 1.0.0\n").unwrap();
    dir
}

fn validate_yaml(yaml: &str, root: &Path) -> repver::Result<()> {
    let config = Config::parse(yaml)?;
    validator::validate_in(&config, root)
}

#[test]
fn accepts_minimal_command() {
    let dir = scratch_with_target();
    let yaml = r#"
commands:
  - name: bump
    targets:
      - path: "version.txt"
        pattern: "^version: (?P<version>.*)$"
"#;
    assert!(validate_yaml(yaml, dir.path()).is_ok());
}

#[test]
fn accepts_full_command_with_params_transform_and_git() {
    let dir = scratch_with_target();
    let yaml = r#"
commands:
  - name: bump
    params:
      - name: version
        pattern: "^(?P<major>\\d+)\\.(?P<minor>\\d+)\\.(?P<patch>\\d+)$"
    targets:
      - path: "version.txt"
        pattern: "^version: (?P<version>.*)$"
        transform: "{{major}}.{{minor}}"
    git:
      create_branch: true
      branch_name: "bump-{{version}}"
      commit: true
      commit_message: "Bump to {{version}}"
      push: true
      remote: origin
      pull_request: GITHUB_CLI
      return_to_original_branch: true
      delete_branch: true
"#;
    assert!(validate_yaml(yaml, dir.path()).is_ok());
}

#[test]
fn command_name_rules_match_the_contract() {
    let dir = scratch_with_target();

    let valid = ["a", "ab", "AbcDef", "AbcDef123", "abcdefghijklmnopqrstuvwxyz1234"];
    let invalid = [
        "abcdefghijklmnopqrstuvwxyz12345678901",
        "abc def",
        "abc-def",
        "abc_def",
        "abc!@#",
    ];

    for name in valid {
        let yaml = format!(
            r#"
commands:
  - name: "{name}"
    targets:
      - path: "version.txt"
        pattern: "^version: (?P<version>.*)$"
"#
        );
        assert!(
            validate_yaml(&yaml, dir.path()).is_ok(),
            "name '{name}' should be valid"
        );
    }

    for name in invalid {
        let yaml = format!(
            r#"
commands:
  - name: "{name}"
    targets:
      - path: "version.txt"
        pattern: "^version: (?P<version>.*)$"
"#
        );
        assert!(
            validate_yaml(&yaml, dir.path()).is_err(),
            "name '{name}' should be invalid"
        );
    }
}

#[test]
fn target_pattern_rules_match_the_contract() {
    let dir = scratch_with_target();

    // (pattern as it appears in YAML, expected to validate)
    let cases = [
        (r"^abc$", true),
        (r"^(?P<first>\\d+)-(?P<second>\\w+)$", true),
        (r"^(?:\\d+)-(?P<second>\\w+)$", true),
        (r"^(\\d+)-(?P<second>\\w+)$", false),
        (r"^(?P<first>\\d+)-(\\w+)$", false),
        (r"^(?P<first>(?P<inner>\\d+))$", false),
        (r"^(?<first>\\d+)$", false),
        (r"(?P<first>\\d+)$", false),
        (r"^(?P<first>\\d+)", false),
        (r"^(?P<first\\d+$", false),
    ];

    for (pattern, expected_valid) in cases {
        let yaml = format!(
            r#"
commands:
  - name: bump
    targets:
      - path: "version.txt"
        pattern: "{pattern}"
"#
        );
        let result = validate_yaml(&yaml, dir.path());
        assert_eq!(
            result.is_ok(),
            expected_valid,
            "pattern '{pattern}' expected valid={expected_valid}, got {result:?}"
        );
    }
}

#[test]
fn duplicate_command_names_rejected() {
    let dir = scratch_with_target();
    let yaml = r#"
commands:
  - name: bump
    targets:
      - path: "version.txt"
        pattern: "^version: (?P<version>.*)$"
  - name: bump
    targets:
      - path: "version.txt"
        pattern: "^version: (?P<version>.*)$"
"#;
    let err = validate_yaml(yaml, dir.path()).unwrap_err();
    assert!(err.to_string().contains("duplicate command name"));
    assert_eq!(err.exit_code(), 102);
}

#[test]
fn duplicate_param_names_rejected() {
    let dir = scratch_with_target();
    let yaml = r#"
commands:
  - name: bump
    params:
      - name: version
        pattern: "^(?P<major>\\d+)$"
      - name: version
        pattern: "^(?P<minor>\\d+)$"
    targets:
      - path: "version.txt"
        pattern: "^version: (?P<version>.*)$"
"#;
    let err = validate_yaml(yaml, dir.path()).unwrap_err();
    assert!(err.to_string().contains("duplicate param name"));
}

#[test]
fn missing_target_file_rejected() {
    let dir = TempDir::new().unwrap();
    let yaml = r#"
commands:
  - name: bump
    targets:
      - path: "version.txt"
        pattern: "^version: (?P<version>.*)$"
"#;
    let err = validate_yaml(yaml, dir.path()).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn traversal_outside_root_rejected() {
    let dir = scratch_with_target();
    let yaml = r#"
commands:
  - name: bump
    targets:
      - path: "../version.txt"
        pattern: "^version: (?P<version>.*)$"
"#;
    let err = validate_yaml(yaml, dir.path()).unwrap_err();
    assert!(err.to_string().contains("may not traverse"));
}

#[test]
fn wrong_group_syntax_suggests_canonical_form() {
    let dir = scratch_with_target();
    let yaml = r#"
commands:
  - name: bump
    targets:
      - path: "version.txt"
        pattern: "^version: (?<version>.*)$"
"#;
    let err = validate_yaml(yaml, dir.path()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("(?P<name>...)"));
    assert!(msg.contains("(?P<version>"));
}

#[test]
fn git_options_require_their_companions() {
    let dir = scratch_with_target();

    // commit without a message
    let yaml = r#"
commands:
  - name: bump
    targets:
      - path: "version.txt"
        pattern: "^version: (?P<version>.*)$"
    git:
      commit: true
"#;
    let err = validate_yaml(yaml, dir.path()).unwrap_err();
    assert!(err.to_string().contains("commit_message must be set"));

    // delete_branch without create_branch
    let yaml = r#"
commands:
  - name: bump
    targets:
      - path: "version.txt"
        pattern: "^version: (?P<version>.*)$"
    git:
      delete_branch: true
"#;
    let err = validate_yaml(yaml, dir.path()).unwrap_err();
    assert!(err.to_string().contains("delete_branch can only be set"));

    // push without a remote
    let yaml = r#"
commands:
  - name: bump
    targets:
      - path: "version.txt"
        pattern: "^version: (?P<version>.*)$"
    git:
      push: true
"#;
    let err = validate_yaml(yaml, dir.path()).unwrap_err();
    assert!(err.to_string().contains("remote must be set"));
}

#[test]
fn unspecified_git_block_is_not_validated() {
    let dir = scratch_with_target();
    // No boolean option set, so the stray templates are ignored
    let yaml = r#"
commands:
  - name: bump
    targets:
      - path: "version.txt"
        pattern: "^version: (?P<version>.*)$"
    git:
      branch_name: "never-used"
      commit_message: "never used"
"#;
    assert!(validate_yaml(yaml, dir.path()).is_ok());
}

#[test]
fn pull_request_mode_is_constrained() {
    let dir = scratch_with_target();
    let yaml = r#"
commands:
  - name: bump
    targets:
      - path: "version.txt"
        pattern: "^version: (?P<version>.*)$"
    git:
      commit: true
      commit_message: "msg"
      pull_request: "JENKINS"
"#;
    let err = validate_yaml(yaml, dir.path()).unwrap_err();
    assert!(err.to_string().contains("pull_request must be NO or GITHUB_CLI"));
}
