//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::HashMap;

/// Render a YAML scalar as a plain string, `None` for lists and maps
fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Tagged(tagged) => scalar_to_string(tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Log a value of the wrong shape; the field falls back to its default
fn ignored(field: &str, value: &Value) {
    tracing::warn!("Ignoring front-matter {}: {:?}", field, value);
}

/// Accepts any YAML scalar and keeps it as text
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match scalar_to_string(value.clone()) {
        Some(s) => Ok(s),
        None => {
            ignored("text field", &value);
            Ok(String::new())
        }
    }
}

/// Custom deserializer that handles both a single value and a list of values
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => Ok(items
            .into_iter()
            .filter_map(|item| match scalar_to_string(item.clone()) {
                Some(tag) => Some(tag),
                None => {
                    ignored("tag", &item);
                    None
                }
            })
            .collect()),
        other => match scalar_to_string(other.clone()) {
            Some(tag) => Ok(vec![tag]),
            None => {
                ignored("tags", &other);
                Ok(Vec::new())
            }
        },
    }
}

/// `featured: true`, `featured: "yes"` and friends
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Null => Ok(false),
        Value::String(s) => Ok(matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "on" | "1"
        )),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|n| n != 0.0)),
        other => {
            ignored("featured", &other);
            Ok(false)
        }
    }
}

/// Dates that cannot be parsed become `None` instead of failing the record
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }

    let Some(raw) = scalar_to_string(value.clone()) else {
        ignored("date", &value);
        return Ok(None);
    };
    let date = parse_date_string(&raw);
    if date.is_none() {
        tracing::warn!("Unrecognized project date {:?}, leaving it unset", raw);
    }
    Ok(date)
}

/// Front-matter data of a project file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectMatter {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    /// Publication date
    #[serde(deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub featured: bool,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl ProjectMatter {
    /// Parse front-matter from file contents.
    /// Returns (front_matter, body).
    ///
    /// The front-matter block must open on the very first line with `---` and
    /// close with another `---` line. The line break after the closing fence
    /// is consumed; the body is returned untouched otherwise. Without a
    /// complete block the whole input is the body.
    pub fn parse(content: &str) -> Result<(Self, &str), serde_yaml::Error> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let Some((yaml, body)) = split_fences(content) else {
            return Ok((ProjectMatter::default(), content));
        };

        if yaml.trim().is_empty() {
            return Ok((ProjectMatter::default(), body));
        }

        let matter = serde_yaml::from_str::<ProjectMatter>(yaml)?;
        Ok((matter, body))
    }
}

/// Locate a `---` fenced block at the top of `content`.
/// Returns (yaml, body).
fn split_fences(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---")?;
    let (opening, yaml_start) = next_line(rest);
    if !opening.trim().is_empty() {
        return None;
    }

    let mut rest = yaml_start;
    let mut offset = 0;
    while !rest.is_empty() {
        let (line, after) = next_line(rest);
        if line.trim_end() == "---" {
            return Some((&yaml_start[..offset], after));
        }
        offset += rest.len() - after.len();
        rest = after;
    }

    None
}

/// Split off the first line (without its terminator) from the rest
fn next_line(s: &str) -> (&str, &str) {
    match s.find('\n') {
        Some(pos) => (s[..pos].trim_end_matches('\r'), &s[pos + 1..]),
        None => (s, ""),
    }
}

/// Parse a date string in various formats
pub(crate) fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y/%m/%d") {
        return Some(d);
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // RFC 3339 / ISO 8601 with offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_project_frontmatter() {
        let content = r#"---
title: Payment Gateway
description: Fintech platform with digital services
date: 2024-01-15
tags:
  - Laravel
  - React
featured: true
---
This is the content.
"#;

        let (fm, body) = ProjectMatter::parse(content).unwrap();
        assert_eq!(fm.title, "Payment Gateway");
        assert_eq!(fm.description, "Fintech platform with digital services");
        assert_eq!(fm.date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(fm.tags, vec!["Laravel", "React"]);
        assert!(fm.featured);
        assert_eq!(body, "This is the content.\n");
    }

    #[test]
    fn test_body_is_kept_verbatim() {
        let body = "\n## Overview\n\nSome text.\n\n---\n\nAfter a rule.\n";
        let content = format!("---\ntitle: X\n---\n{}", body);

        let (_, parsed) = ProjectMatter::parse(&content).unwrap();
        assert_eq!(parsed, body);
    }

    #[test]
    fn test_crlf_fences() {
        let content = "---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let (fm, body) = ProjectMatter::parse(content).unwrap();
        assert_eq!(fm.title, "Windows");
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Just markdown\n\nNo header here.";
        let (fm, body) = ProjectMatter::parse(content).unwrap();
        assert_eq!(fm, ProjectMatter::default());
        assert_eq!(body, content);
    }

    #[test]
    fn test_unclosed_fence_is_body() {
        let content = "---\ntitle: Never closed\n";
        let (fm, body) = ProjectMatter::parse(content).unwrap();
        assert_eq!(fm.title, "");
        assert_eq!(body, content);
    }

    #[test]
    fn test_empty_frontmatter() {
        let (fm, body) = ProjectMatter::parse("---\n---\nBody").unwrap();
        assert_eq!(fm, ProjectMatter::default());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        let content = "---\ntitle: [unclosed\n---\nBody";
        assert!(ProjectMatter::parse(content).is_err());
    }

    #[test]
    fn test_scalars_pass_through() {
        let content = r#"---
title: 2048
description: true
date: not a date
tags: Solo
featured: "yes"
client: ACME
---
"#;

        let (fm, body) = ProjectMatter::parse(content).unwrap();
        assert_eq!(fm.title, "2048");
        assert_eq!(fm.description, "true");
        assert_eq!(fm.date, None);
        assert_eq!(fm.tags, vec!["Solo"]);
        assert!(fm.featured);
        assert_eq!(
            fm.extra.get("client").and_then(|v| v.as_str()),
            Some("ACME")
        );
        assert_eq!(body, "");
    }

    #[test]
    fn test_wrong_shaped_fields_fall_back_to_defaults() {
        let content = r#"---
title: [A, B]
description: {short: x}
date: [2024]
tags:
  - Rust
  - {nested: true}
featured: [x]
client: ACME
---
Still here
"#;

        let (fm, body) = ProjectMatter::parse(content).unwrap();
        assert_eq!(fm.title, "");
        assert_eq!(fm.description, "");
        assert_eq!(fm.date, None);
        assert_eq!(fm.tags, vec!["Rust"]);
        assert!(!fm.featured);
        assert!(fm.extra.contains_key("client"));
        assert_eq!(body, "Still here\n");
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 1);
        assert_eq!(parse_date_string("2024-06-01"), expected);
        assert_eq!(parse_date_string("2024/06/01"), expected);
        assert_eq!(parse_date_string("2024-06-01 10:30:00"), expected);
        assert_eq!(parse_date_string("2024-06-01T10:30:00"), expected);
        assert_eq!(parse_date_string("2024-06-01T10:30:00+02:00"), expected);
        assert_eq!(parse_date_string("June 2024"), None);
    }
}
