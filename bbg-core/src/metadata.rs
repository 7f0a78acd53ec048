//! Typed view of a document's front matter.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// The only accepted shape for `date`: ISO-8601 UTC with a `Z` designator.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Missing `date` in front matter")]
    MissingDate,

    #[error("Invalid `date` {0:?}: expected YYYY-MM-DDTHH:MM:SSZ")]
    InvalidDate(String),
}

/// What to do with a document that has no `date`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePolicy {
    /// Reject the document
    #[default]
    Strict,
    /// Stamp it with the current time
    Now,
}

/// Front matter fields the generator understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub date: DateTime<Utc>,
    pub title: Option<String>,
    pub slug: Option<String>,
}

impl DocumentMetadata {
    /// Parse a front matter block, rejecting documents without a date.
    pub fn parse(text: &str) -> Result<Self, MetadataError> {
        Self::parse_with(text, DatePolicy::Strict)
    }

    pub fn parse_with(text: &str, policy: DatePolicy) -> Result<Self, MetadataError> {
        let fields = parse_fields(text);

        let date = match string_field(&fields, "date") {
            Some(raw) => parse_date(&raw)?,
            None => match policy {
                DatePolicy::Strict => return Err(MetadataError::MissingDate),
                DatePolicy::Now => {
                    tracing::warn!("Front matter has no `date`; using the current time");
                    Utc::now()
                }
            },
        };

        Ok(Self {
            date,
            title: non_blank(string_field(&fields, "title")),
            slug: non_blank(string_field(&fields, "slug")),
        })
    }
}

/// Parse a strict `YYYY-MM-DDTHH:MM:SSZ` timestamp.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, MetadataError> {
    NaiveDateTime::parse_from_str(raw, DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| MetadataError::InvalidDate(raw.to_string()))
}

// Malformed YAML is not fatal: the block is treated as if it were empty.
fn parse_fields(text: &str) -> Mapping {
    if text.trim().is_empty() {
        return Mapping::new();
    }

    match serde_yaml::from_str::<Value>(text) {
        Ok(Value::Mapping(fields)) => fields,
        Ok(Value::Null) => Mapping::new(),
        Ok(_) => {
            tracing::warn!("Front matter is not a key/value mapping; ignoring it");
            Mapping::new()
        }
        Err(e) => {
            tracing::warn!("Ignoring unparseable front matter: {}", e);
            Mapping::new()
        }
    }
}

fn string_field(fields: &Mapping, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
