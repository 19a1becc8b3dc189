//! Key lookup, `--where` filtering and key selection over decoded documents.

use crate::packet::{self, Packet};
use regex::Regex;
use serde_json::Value;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error("--where expects KEY:VALUE or KEY:/REGEX/, got {0:?}")]
    WhereSyntax(String),
    #[error("Invalid --where pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Found(&'a Value),
    Absent,
}

impl<'a> Lookup<'a> {
    pub fn found(self) -> Option<&'a Value> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Absent => None,
        }
    }
}

/// Looks `key` up at the top level of a packet.
///
/// A key written `@name` that is not itself present falls back to the
/// `[name, value]` pairs of the packet's `parameters` list.
pub fn get<'a>(packet: &'a Packet, key: &str, splat: bool) -> Lookup<'a> {
    let value = packet.get(key).or_else(|| {
        let name = key.strip_prefix('@')?;
        packet::parameters(packet)
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, value)| value)
    });

    match value {
        Some(value) if splat => Lookup::Found(packet::splat(value)),
        Some(value) => Lookup::Found(value),
        None => Lookup::Absent,
    }
}

/// Requested keys split into the ones found (in request order) and the
/// ones that were not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub found: Vec<(String, Value)>,
    pub missing: Vec<String>,
}

/// Selects `keys` from a packet. No keys selects every key, in packet order
/// and without splatting, so the packet passes through unchanged.
pub fn select(packet: &Packet, keys: &[&str], splat: bool) -> Selection {
    if keys.is_empty() {
        return Selection {
            found: packet
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            missing: Vec::new(),
        };
    }

    let mut selection = Selection::default();
    for key in keys {
        match get(packet, key, splat) {
            Lookup::Found(value) => selection.found.push((key.to_string(), value.clone())),
            Lookup::Absent => selection.missing.push(key.to_string()),
        }
    }
    selection
}

#[derive(Debug, Clone)]
enum Matcher {
    Literal(String),
    Pattern(Regex),
}

/// A `--where=KEY:VALUE` or `--where=KEY:/REGEX/` record filter.
#[derive(Debug, Clone)]
pub struct WhereFilter {
    field: String,
    matcher: Matcher,
}

impl FromStr for WhereFilter {
    type Err = SelectError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let (field, wanted) = spec
            .split_once(':')
            .filter(|(field, _)| !field.is_empty())
            .ok_or_else(|| SelectError::WhereSyntax(spec.to_string()))?;

        let matcher = match wanted
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
        {
            Some(pattern) => Matcher::Pattern(Regex::new(pattern)?),
            None => Matcher::Literal(wanted.to_string()),
        };

        Ok(WhereFilter {
            field: field.to_string(),
            matcher,
        })
    }
}

impl WhereFilter {
    pub fn matches(&self, record: &Value) -> bool {
        let Some(value) = record
            .as_object()
            .and_then(|packet| get(packet, &self.field, true).found())
        else {
            return false;
        };

        match &self.matcher {
            Matcher::Pattern(pattern) => pattern.is_match(&packet::plain_text(value)),
            Matcher::Literal(wanted) => literal_matches(value, wanted),
        }
    }

    /// Keeps the matching records of a list document. A single packet is
    /// treated as a list of one.
    pub fn apply(&self, document: Value) -> Value {
        let records = match document {
            Value::Array(records) => records,
            other => vec![other],
        };
        Value::Array(
            records
                .into_iter()
                .filter(|record| self.matches(record))
                .collect(),
        )
    }
}

fn literal_matches(value: &Value, wanted: &str) -> bool {
    match value {
        Value::String(text) => text == wanted,
        Value::Number(number) => match (number.as_f64(), wanted.trim().parse::<f64>()) {
            (Some(number), Ok(wanted)) => number == wanted,
            _ => number.to_string() == wanted,
        },
        Value::Bool(flag) => wanted.eq_ignore_ascii_case(if *flag { "true" } else { "false" }),
        Value::Null => wanted.is_empty() || wanted == "null",
        Value::Array(_) | Value::Object(_) => packet::plain_text(value) == wanted,
    }
}
