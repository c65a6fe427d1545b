//! Frontmatter parsing for post files.

use std::path::Path;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_yaml::{Mapping, Value};

use crate::error::{CoreError, Result};

/// Line delimiting the frontmatter block.
pub const DELIMITER: &str = "---";

/// Naive date-time layouts accepted for `date`, interpreted as local time.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Frontmatter metadata for a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Post title.
    #[serde(default, deserialize_with = "scalar_string")]
    pub title: Option<String>,

    /// Raw publication date, see [`Frontmatter::parsed_date`].
    #[serde(default, deserialize_with = "scalar_string")]
    pub date: Option<String>,

    /// Tags for the post.
    #[serde(default, deserialize_with = "one_or_many")]
    pub tags: Vec<String>,

    /// Categories for the post.
    #[serde(default, deserialize_with = "one_or_many")]
    pub categories: Vec<String>,

    /// Any other keys, whatever their type.
    #[serde(default, flatten)]
    pub extra: Mapping,
}

impl Frontmatter {
    /// Non-empty title, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    /// Parse the `date` field as a local point in time.
    ///
    /// Returns `Ok(None)` when no date is given and an error when the value is
    /// present but not in a recognised layout.
    pub fn parsed_date(&self, path: &Path) -> Result<Option<DateTime<Local>>> {
        match self.date.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_date(raw).map(Some).ok_or_else(|| {
                CoreError::frontmatter(path, format!("unrecognised date format: {raw:?}"))
            }),
        }
    }
}

/// Split content into frontmatter and body.
///
/// The first line must be exactly `---` and the block ends at the next line that
/// is exactly `---`. Trailing whitespace on delimiter lines is ignored.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let (first, rest) = content.split_once('\n')?;
    if first.trim_end() != DELIMITER {
        return None;
    }

    let mut offset = 0;
    while offset < rest.len() {
        let (line, next) = match rest[offset..].find('\n') {
            Some(pos) => (&rest[offset..offset + pos], offset + pos + 1),
            None => (&rest[offset..], rest.len()),
        };

        if line.trim_end() == DELIMITER {
            return Some((&rest[..offset], &rest[next..]));
        }
        offset = next;
    }

    None
}

/// Parse frontmatter from a string.
///
/// Returns `None` for the frontmatter when the content has no frontmatter
/// block, in which case the body is the whole input.
pub fn parse_frontmatter<'a>(
    content: &'a str,
    path: &Path,
) -> Result<(Option<Frontmatter>, &'a str)> {
    let Some((fm_str, body)) = split_frontmatter(content) else {
        return Ok((None, content));
    };

    let value: Value =
        serde_yaml::from_str(fm_str).map_err(|e| CoreError::frontmatter(path, e.to_string()))?;

    let frontmatter = match value {
        Value::Null => Frontmatter::default(),
        Value::Mapping(_) => serde_yaml::from_value(value)
            .map_err(|e| CoreError::frontmatter(path, e.to_string()))?,
        other => {
            return Err(CoreError::frontmatter(
                path,
                format!("expected a mapping, found {}", value_kind(&other)),
            ));
        }
    };

    Ok((Some(frontmatter), body))
}

/// Parse a date string as a local date-time.
///
/// RFC 3339 values keep their offset and are converted to local time; naive
/// values are taken as local time.
pub fn parse_date(raw: &str) -> Option<DateTime<Local>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local));
    }

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    Some(local_from_naive(naive))
}

/// Interpret a naive date-time in the local zone.
///
/// Ambiguous times resolve to the earlier instant. Times skipped by a DST gap
/// are read as UTC.
pub fn local_from_naive(naive: NaiveDateTime) -> DateTime<Local> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| naive.and_utc().with_timezone(&Local))
}

fn scalar_to_string(value: Value) -> std::result::Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(format!("expected a scalar, found {}", value_kind(&other))),
    }
}

pub(crate) fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(value).map_err(D::Error::custom)
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Sequence(items) => items
            .into_iter()
            .filter_map(|item| scalar_to_string(item).transpose())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(D::Error::custom),
        single => scalar_to_string(single)
            .map(|s| s.into_iter().collect())
            .map_err(D::Error::custom),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn test_split_frontmatter() {
        let content = "---\ntitle: Hello\ndate: 2024-01-14\n---\n\nThis is the body.";

        let (fm, body) = split_frontmatter(content).expect("split");
        assert!(fm.contains("title: Hello"));
        assert!(fm.contains("date: 2024-01-14"));
        assert_eq!(body, "\nThis is the body.");
    }

    #[test]
    fn test_split_frontmatter_crlf_and_trailing_spaces() {
        let content = "---  \r\ntitle: Hello\r\n---\r\nBody";

        let (fm, body) = split_frontmatter(content).expect("split");
        assert!(fm.contains("title: Hello"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_split_frontmatter_requires_leading_delimiter() {
        assert!(split_frontmatter("Just some content.").is_none());
        assert!(split_frontmatter("\n---\ntitle: x\n---\nbody").is_none());
        assert!(split_frontmatter("----\ntitle: x\n----\nbody").is_none());
    }

    #[test]
    fn test_split_frontmatter_unclosed() {
        assert!(split_frontmatter("---\ntitle: x\nno closing line").is_none());
    }

    #[test]
    fn test_split_frontmatter_horizontal_rule_in_body() {
        let content = "---\ntitle: x\n---\nabove\n\n---\n\nbelow";
        let (fm, body) = split_frontmatter(content).expect("split");
        assert_eq!(fm, "title: x\n");
        assert!(body.contains("---"));
        assert!(body.ends_with("below"));
    }

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: "Test Post"
date: 2024-01-14 10:30:00
tags:
  - life
  - notes
categories: journal
mood: calm
---

Content here."#;

        let (fm, body) = parse_frontmatter(content, Path::new("test.md")).expect("parse");
        let fm = fm.expect("frontmatter present");

        assert_eq!(fm.title(), Some("Test Post"));
        assert_eq!(fm.tags, vec!["life", "notes"]);
        assert_eq!(fm.categories, vec!["journal"]);
        assert!(fm.extra.contains_key("mood"));
        assert_eq!(body.trim(), "Content here.");

        let date = fm
            .parsed_date(Path::new("test.md"))
            .expect("valid date")
            .expect("date present");
        assert_eq!((date.year(), date.month(), date.day()), (2024, 1, 14));
        assert_eq!((date.hour(), date.minute()), (10, 30));
    }

    #[test]
    fn test_parse_non_string_keys() {
        let content = "---\ntitle: A\ndate: 2024-01-01\n2024: review\ntrue: yes\n---\nbody";

        let (fm, body) = parse_frontmatter(content, Path::new("a.md")).expect("parse");
        let fm = fm.expect("frontmatter present");

        assert_eq!(fm.title(), Some("A"));
        assert_eq!(fm.extra.get(Value::from(2024)), Some(&Value::from("review")));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Just Content\n\nNo frontmatter here.";
        let (fm, body) = parse_frontmatter(content, Path::new("test.md")).expect("parse");

        assert!(fm.is_none());
        assert_eq!(body, content);
    }

    #[test]
    fn test_empty_frontmatter_is_default() {
        let content = "---\n\n---\nBody";
        let (fm, body) = parse_frontmatter(content, Path::new("test.md")).expect("parse");
        let fm = fm.expect("frontmatter present");

        assert!(fm.title().is_none());
        assert!(fm.tags.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_malformed_frontmatter() {
        let content = "---\ntitle: [unclosed\n---\nBody";
        let err = parse_frontmatter(content, Path::new("bad.md")).unwrap_err();
        assert!(err.to_string().contains("Frontmatter error"));
        assert!(err.to_string().contains("bad.md"));
    }

    #[test]
    fn test_scalar_frontmatter_is_error() {
        let content = "---\njust a sentence\n---\nBody";
        let err = parse_frontmatter(content, Path::new("bad.md")).unwrap_err();
        assert!(err.to_string().contains("expected a mapping"));
    }

    #[test]
    fn test_numeric_title_is_stringified() {
        let content = "---\ntitle: 2024\n---\nBody";
        let (fm, _) = parse_frontmatter(content, Path::new("t.md")).expect("parse");
        assert_eq!(fm.expect("frontmatter").title(), Some("2024"));
    }

    #[test]
    fn test_empty_title_falls_through() {
        let content = "---\ntitle: \"\"\n---\nBody";
        let (fm, _) = parse_frontmatter(content, Path::new("t.md")).expect("parse");
        assert!(fm.expect("frontmatter").title().is_none());
    }

    #[test]
    fn test_nested_tag_is_error() {
        let content = "---\ntags:\n  - [a, b]\n---\nBody";
        assert!(parse_frontmatter(content, Path::new("t.md")).is_err());
    }

    #[test]
    fn test_parse_date_layouts() {
        let cases = [
            "2024-03-15",
            "2024-03-15 08:00",
            "2024-03-15 08:00:00",
            "2024-03-15T08:00:00",
            "2024/03/15 08:00:00",
        ];
        for raw in cases {
            let date = parse_date(raw).unwrap_or_else(|| panic!("parse {raw}"));
            assert_eq!((date.year(), date.month(), date.day()), (2024, 3, 15));
        }
    }

    #[test]
    fn test_parse_date_rfc3339() {
        let date = parse_date("2024-03-15T12:00:00Z").expect("rfc3339");
        assert_eq!(date.timestamp(), 1_710_504_000);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("yesterday").is_none());
        assert!(parse_date("2024-13-45").is_none());
    }

    #[test]
    fn test_invalid_date_is_frontmatter_error() {
        let fm = Frontmatter {
            date: Some("not a date".to_string()),
            ..Default::default()
        };
        assert!(fm.parsed_date(Path::new("t.md")).is_err());
    }

    #[test]
    fn test_missing_date_is_none() {
        let fm = Frontmatter::default();
        assert!(fm.parsed_date(Path::new("t.md")).expect("ok").is_none());
    }
}
