//! Frontmatter parsing from markdown files.

use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Invalid YAML in frontmatter: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Frontmatter is not closed (missing second '---' line)")]
    Unclosed,

    #[error("Frontmatter must be a mapping of key: value pairs")]
    NotAMapping,
}

impl FrontmatterError {
    /// 1-based line in the file where the problem was found
    pub fn line(&self) -> usize {
        match self {
            // serde_yaml lines are relative to the YAML block, which starts on line 2
            FrontmatterError::YamlError(e) => e.location().map(|loc| loc.line() + 1).unwrap_or(1),
            FrontmatterError::Unclosed | FrontmatterError::NotAMapping => 1,
        }
    }
}

/// A value in frontmatter had the wrong YAML type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    pub key: String,
    pub expected: &'static str,
    pub found: &'static str,
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?ms)\A---[ \t]*\r?\n(.*?)^---[ \t]*(?:\r?\n|\z)").unwrap()
    })
}

/// Parsed frontmatter: loosely typed YAML with typed accessors
#[derive(Debug, Clone, Default)]
pub struct Frontmatter {
    values: Mapping,
    yaml: String,
}

/// Markdown content with its frontmatter split off
#[derive(Debug, Clone)]
pub struct Parsed<'a> {
    pub frontmatter: Frontmatter,
    pub body: &'a str,
    /// 1-based line number of the first body line
    pub body_line: usize,
}

/// Split frontmatter from markdown content
///
/// If no frontmatter is present, returns empty frontmatter with the full
/// content as body.
///
/// # Example
///
/// ```
/// use coursemark_core::frontmatter::parse_frontmatter;
///
/// let content = "---\nslug: intro\ntitle: Intro\n---\n# Page: Welcome\n";
///
/// let parsed = parse_frontmatter(content).unwrap();
/// assert_eq!(parsed.frontmatter.get_str("slug").unwrap(), Some("intro"));
/// assert_eq!(parsed.body_line, 5);
/// assert!(parsed.body.starts_with("# Page: Welcome"));
/// ```
pub fn parse_frontmatter(content: &str) -> Result<Parsed<'_>, FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    if let Some(captures) = frontmatter_regex().captures(content) {
        let whole = captures.get(0).map(|m| m.end()).unwrap_or(0);
        let yaml = captures.get(1).map(|m| m.as_str()).unwrap_or("");
        let body = &content[whole..];
        let body_line = content[..whole].matches('\n').count() + 1;

        let values = if yaml.trim().is_empty() {
            Mapping::new()
        } else {
            match serde_yaml::from_str::<Value>(yaml)? {
                Value::Mapping(map) => map,
                Value::Null => Mapping::new(),
                _ => return Err(FrontmatterError::NotAMapping),
            }
        };

        Ok(Parsed {
            frontmatter: Frontmatter {
                values,
                yaml: yaml.to_string(),
            },
            body,
            body_line,
        })
    } else if content.starts_with("---\n") || content.starts_with("---\r\n") {
        Err(FrontmatterError::Unclosed)
    } else {
        Ok(Parsed {
            frontmatter: Frontmatter::default(),
            body: content,
            body_line: 1,
        })
    }
}

impl Frontmatter {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// A string field. Missing and `null` are `None`; other types are rejected.
    pub fn get_str(&self, key: &str) -> Result<Option<&str>, TypeMismatch> {
        match self.value(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(TypeMismatch {
                key: key.to_string(),
                expected: "string",
                found: type_name(other),
            }),
        }
    }

    /// A string or list of strings (e.g. `tags`, `author`)
    pub fn get_string_list(&self, key: &str) -> Result<Vec<String>, TypeMismatch> {
        let mismatch = |found| TypeMismatch {
            key: key.to_string(),
            expected: "string or list of strings",
            found,
        };
        match self.value(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(vec![s.clone()]),
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(mismatch(type_name(other))),
                })
                .collect(),
            Some(other) => Err(mismatch(type_name(other))),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, TypeMismatch> {
        match self.value(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(TypeMismatch {
                key: key.to_string(),
                expected: "boolean",
                found: type_name(other),
            }),
        }
    }

    /// Tag list, tolerating a malformed value by treating it as no tags
    pub fn tags(&self) -> Vec<String> {
        self.get_string_list("tags").unwrap_or_default()
    }

    /// 1-based file line on which `key` is defined
    pub fn line_of(&self, key: &str) -> Option<usize> {
        self.yaml.lines().enumerate().find_map(|(idx, line)| {
            let rest = line.strip_prefix(key)?;
            rest.trim_start().starts_with(':').then_some(idx + 2)
        })
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
