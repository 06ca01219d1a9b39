//! Parameter value validation, named-group extraction, and transform
//! templates
//!
//! A param's pattern is matched against the entire supplied value (the
//! pattern is validated to carry `^...$` anchors), and its named capture
//! groups become the values a target transform can splice together.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::Param;
use crate::error::{RepverError, Result};

/// Confirm a raw value matches the param's pattern in full
pub fn validate_value(param: &Param, value: &str) -> Result<()> {
    let re = compile(param)?;

    if !re.is_match(value) {
        return Err(RepverError::ParameterInvalid {
            name: param.name.clone(),
            reason: format!("value '{}' does not match pattern '{}'", value, param.pattern),
        });
    }

    Ok(())
}

/// Match the value and return each named group's captured substring
pub fn extract_named_groups(param: &Param, value: &str) -> Result<BTreeMap<String, String>> {
    let re = compile(param)?;

    let caps = re.captures(value).ok_or_else(|| RepverError::Extraction {
        name: param.name.clone(),
        reason: format!("value '{}' does not match pattern '{}'", value, param.pattern),
    })?;

    let mut groups = BTreeMap::new();
    for name in re.capture_names().flatten() {
        if let Some(m) = caps.name(name) {
            groups.insert(name.to_string(), m.as_str().to_string());
        }
    }

    Ok(groups)
}

/// Replace every `{{name}}` occurrence in the template with the named
/// group's value. An empty template yields an empty result.
pub fn apply_transform(template: &str, groups: &BTreeMap<String, String>) -> String {
    let mut rendered = template.to_string();
    for (name, value) in groups {
        rendered = rendered.replace(&format!("{{{{{name}}}}}"), value);
    }
    rendered
}

/// The distinct placeholder names referenced by a transform template
pub fn placeholder_names(template: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                names.insert(after[..end].to_string());
                rest = &after[end + 2..];
            }
            None => break,
        }
    }

    names
}

fn compile(param: &Param) -> Result<Regex> {
    Regex::new(&param.pattern).map_err(|e| RepverError::ParameterInvalid {
        name: param.name.clone(),
        reason: format!("pattern '{}' failed to compile: {e}", param.pattern),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn semver_param() -> Param {
        Param {
            name: "version".to_string(),
            pattern: r"^(?P<major>\d+)\.(?P<minor>\d+)\.(?P<patch>\d+)$".to_string(),
        }
    }

    #[test]
    fn test_validate_value_accepts_full_match() {
        assert!(validate_value(&semver_param(), "1.26.0").is_ok());
    }

    #[test]
    fn test_validate_value_rejects_partial_and_invalid() {
        let param = semver_param();
        assert!(validate_value(&param, "1.26").is_err());
        assert!(validate_value(&param, "v1.26.0").is_err());
        assert!(validate_value(&param, "").is_err());
    }

    #[test]
    fn test_validate_value_error_names_the_param() {
        let err = validate_value(&semver_param(), "nope").unwrap_err();
        assert_eq!(err.exit_code(), 108);
        assert!(err.to_string().contains("'version'"));
    }

    #[test]
    fn test_extract_named_groups() {
        let groups = extract_named_groups(&semver_param(), "1.26.0").unwrap();
        assert_eq!(groups.get("major").map(String::as_str), Some("1"));
        assert_eq!(groups.get("minor").map(String::as_str), Some("26"));
        assert_eq!(groups.get("patch").map(String::as_str), Some("0"));
    }

    #[test]
    fn test_extract_non_matching_value_fails() {
        let err = extract_named_groups(&semver_param(), "not-a-version").unwrap_err();
        assert_eq!(err.exit_code(), 109);
    }

    #[test]
    fn test_extract_then_transform_composes() {
        let groups = extract_named_groups(&semver_param(), "1.26.0").unwrap();
        assert_eq!(apply_transform("{{major}}.{{minor}}", &groups), "1.26");
        assert_eq!(
            apply_transform("v{{major}}.{{minor}}.{{patch}}", &groups),
            "v1.26.0"
        );
    }

    #[test]
    fn test_empty_template_yields_empty_result() {
        let groups = extract_named_groups(&semver_param(), "1.26.0").unwrap();
        assert_eq!(apply_transform("", &groups), "");
    }

    #[test]
    fn test_transform_repeats_placeholders() {
        let mut groups = BTreeMap::new();
        groups.insert("v".to_string(), "7".to_string());
        assert_eq!(apply_transform("{{v}}-{{v}}", &groups), "7-7");
    }

    #[test]
    fn test_placeholder_names() {
        let names = placeholder_names("{{major}}.{{minor}}-{{major}}");
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["major".to_string(), "minor".to_string()]
        );
        assert!(placeholder_names("no placeholders here").is_empty());
        assert!(placeholder_names("{{unterminated").is_empty());
    }
}
