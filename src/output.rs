//! Rendering selected values for the next pipeline stage or a shell variable.
//!
//! The `--output` switch names a MIME-like format with optional `;param`
//! suffixes (`application/json;indent=2`). It is classified once into an
//! [`OutputFormat`], and each variant renders a [`Table`] into lines.

use crate::packet::{self, Packet};
use crate::switches::Options;
use crate::util::escapes::decode_backslash_escapes;
use crate::util::wire_json;
use serde_json::Value;
use std::io::Write;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Unrecognized output format {0:?}")]
    UnknownFormat(String),
    #[error("Indent must be an integer or 'prettyprint', got {0:?}")]
    Indent(String),
    #[error("Template field %({0}) is not in the row")]
    TemplateField(String),
    #[error("Template error: {0}")]
    Template(String),
    #[error("Could not write output: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    PlainText,
    Json { indent: Option<usize> },
    Tsv,
    UrlEncoded,
    /// Template text with backslash escapes already decoded.
    Templated { template: String },
}

/// What a stage selected, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub enum Table {
    /// One value, selected by a single key.
    Value { key: String, value: Value },
    /// Key/value pairs selected from a packet, in selection order.
    Pairs(Vec<(String, Value)>),
    /// Records of a list document.
    Records(Vec<Value>),
}

impl OutputFormat {
    /// Negotiates the format from `--output`, `--template` and `--indent`.
    pub fn negotiate(options: &Options, key_count: usize) -> Result<Self, OutputError> {
        Self::classify(
            options.text("output"),
            options.text("template"),
            options.text("indent"),
            key_count,
        )
    }

    /// Plain text is implied for exactly one selected key; zero or several
    /// keys imply tab-separated rows.
    pub fn classify(
        output: Option<&str>,
        template: Option<&str>,
        indent: Option<&str>,
        key_count: usize,
    ) -> Result<Self, OutputError> {
        let mut parts = output.unwrap_or_default().split(';');
        let base = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
        let params: Vec<&str> = parts.map(str::trim).filter(|p| !p.is_empty()).collect();

        if is_json(&base) {
            let indent = params
                .iter()
                .find_map(|param| match param.split_once('=') {
                    Some((name, value)) if name.trim() == "indent" => Some(value.trim()),
                    None if *param == "prettyprint" => Some(*param),
                    _ => None,
                })
                .or(indent)
                .map(parse_indent)
                .transpose()?;
            return Ok(OutputFormat::Json { indent });
        }

        match base.as_str() {
            "text/tab-separated-values" | "text/tsv" | "tsv" => Ok(OutputFormat::Tsv),
            "urlencode" | "urlencoded" | "application/x-www-form-urlencoded"
            | "multipart/form-data" => Ok(OutputFormat::UrlEncoded),
            "" | "text" | "text/plain" => Ok(match template {
                Some(template) => OutputFormat::Templated {
                    template: decode_backslash_escapes(template),
                },
                None if key_count == 1 => OutputFormat::PlainText,
                None => OutputFormat::Tsv,
            }),
            _ => Err(OutputError::UnknownFormat(
                output.unwrap_or_default().to_string(),
            )),
        }
    }

    /// Tab-separated formats terminate every line.
    pub fn is_table(&self) -> bool {
        matches!(self, OutputFormat::Tsv | OutputFormat::UrlEncoded)
    }

    pub fn render(&self, table: &Table) -> Result<Vec<String>, OutputError> {
        match self {
            OutputFormat::PlainText => Ok(render_plain(table)),
            OutputFormat::Json { indent } => {
                let value = match table {
                    Table::Value { value, .. } => value.clone(),
                    Table::Pairs(pairs) => Value::Object(pairs.iter().cloned().collect()),
                    Table::Records(records) => Value::Array(records.clone()),
                };
                Ok(vec![wire_json::to_string(&value, *indent)?])
            }
            OutputFormat::Tsv => Ok(render_rows(table, packet::plain_text)),
            OutputFormat::UrlEncoded => Ok(render_rows(table, |value| {
                urlencoding::encode(&packet::plain_text(value)).into_owned()
            })),
            OutputFormat::Templated { template } => template_rows(table)
                .iter()
                .map(|row| fill_template(template, row))
                .collect(),
        }
    }
}

fn is_json(base: &str) -> bool {
    match base.split_once('/') {
        None => base == "json",
        Some((kind, subtype)) => !kind.is_empty() && subtype == "json",
    }
}

fn parse_indent(text: &str) -> Result<usize, OutputError> {
    if text.eq_ignore_ascii_case("prettyprint") {
        return Ok(0);
    }
    text.trim()
        .parse()
        .map_err(|_| OutputError::Indent(text.to_string()))
}

fn render_plain(table: &Table) -> Vec<String> {
    match table {
        Table::Value {
            value: Value::Array(items),
            ..
        } => items.iter().map(packet::plain_text).collect(),
        Table::Value { value, .. } => vec![packet::plain_text(value)],
        Table::Pairs(pairs) => pairs
            .iter()
            .map(|(_, value)| packet::plain_text(value))
            .collect(),
        Table::Records(records) => records.iter().map(packet::plain_text).collect(),
    }
}

fn render_rows(table: &Table, field: impl Fn(&Value) -> String) -> Vec<String> {
    let row = |cells: Vec<String>| cells.join("\t");
    let spread = |value: &Value| match value {
        Value::Array(cells) => row(cells.iter().map(&field).collect()),
        Value::Object(record) => row(record.values().map(&field).collect()),
        scalar => field(scalar),
    };

    match table {
        Table::Value {
            value: Value::Array(items),
            ..
        } => items.iter().map(spread).collect(),
        Table::Value { key, value } => vec![row(vec![field(&Value::String(key.clone())), field(value)])],
        Table::Pairs(pairs) => pairs
            .iter()
            .map(|(key, value)| row(vec![field(&Value::String(key.clone())), field(value)]))
            .collect(),
        Table::Records(records) => records.iter().map(spread).collect(),
    }
}

fn template_rows(table: &Table) -> Vec<Packet> {
    let keyed = |key: Option<&str>, value: &Value| {
        let mut row = Packet::new();
        if let Some(key) = key {
            row.insert("key".to_string(), Value::String(key.to_string()));
        }
        row.insert("value".to_string(), value.clone());
        row
    };

    match table {
        Table::Value {
            value: Value::Object(record),
            ..
        } => vec![record.clone()],
        Table::Value { key, value } => vec![keyed(Some(key), value)],
        Table::Pairs(pairs) => vec![pairs.iter().cloned().collect()],
        Table::Records(records) => records
            .iter()
            .map(|record| match record {
                Value::Object(record) => record.clone(),
                other => keyed(None, other),
            })
            .collect(),
    }
}

/// Substitutes `%(name)s`-style fields from `row`.
///
/// Conversions: `s` plain text, `r` JSON, `d`/`i` integer; an optional `-`
/// flag and width pad the result. `%%` is a literal percent sign. Besides the
/// row's own fields, `$n` is a newline, `$t` a tab and `$json` the row as JSON.
pub fn fill_template(template: &str, row: &Packet) -> Result<String, OutputError> {
    let mut filled = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(at) = rest.find('%') {
        filled.push_str(&rest[..at]);
        let spec = &rest[at + 1..];

        if let Some(after) = spec.strip_prefix('%') {
            filled.push('%');
            rest = after;
            continue;
        }

        let (name, after) = spec
            .strip_prefix('(')
            .and_then(|named| named.split_once(')'))
            .ok_or_else(|| {
                OutputError::Template(format!("expected %(name)s at {:?}", &rest[at..]))
            })?;

        let left_align = after.starts_with('-');
        let after = after.trim_start_matches('-');
        let width_len = after.chars().take_while(char::is_ascii_digit).count();
        let width: usize = after[..width_len].parse().unwrap_or(0);
        let after = &after[width_len..];

        let conversion = after.chars().next().ok_or_else(|| {
            OutputError::Template(format!("missing conversion after %({name})"))
        })?;
        let value = template_field(row, name)?;
        let text = match conversion {
            's' => packet::plain_text(&value),
            'r' => wire_json::to_string(&value, None)?,
            'd' | 'i' => template_integer(name, &value)?.to_string(),
            other => {
                return Err(OutputError::Template(format!(
                    "unsupported conversion %({name}){other}"
                )));
            }
        };

        if left_align {
            filled.push_str(&format!("{text:<width$}"));
        } else {
            filled.push_str(&format!("{text:>width$}"));
        }
        rest = &after[conversion.len_utf8()..];
    }

    filled.push_str(rest);
    Ok(filled)
}

fn template_field(row: &Packet, name: &str) -> Result<Value, OutputError> {
    if let Some(value) = row.get(name) {
        return Ok(value.clone());
    }
    match name {
        "$n" => Ok(Value::String("\n".to_string())),
        "$t" => Ok(Value::String("\t".to_string())),
        "$json" => Ok(Value::String(wire_json::to_string(
            &Value::Object(row.clone()),
            None,
        )?)),
        _ => Err(OutputError::TemplateField(name.to_string())),
    }
}

fn template_integer(name: &str, value: &Value) -> Result<i64, OutputError> {
    let number = match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64)),
        Value::Bool(flag) => Some(i64::from(*flag)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    number.ok_or_else(|| OutputError::Template(format!("%({name})d needs a number")))
}

/// Lines of one formatting pass, emitted together.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    lines: Vec<String>,
    prolog: String,
    epilog: String,
    table_mode: bool,
}

impl LineBuffer {
    pub fn new(table_mode: bool) -> Self {
        LineBuffer {
            table_mode,
            ..Self::default()
        }
    }

    /// Literal text wrapped around every line (`--prolog` / `--epilog`).
    pub fn with_wrapper(mut self, prolog: Option<&str>, epilog: Option<&str>) -> Self {
        self.prolog = prolog.unwrap_or_default().to_string();
        self.epilog = epilog.unwrap_or_default().to_string();
        self
    }

    pub fn push(&mut self, line: &str) {
        self.lines
            .push(format!("{}{}{}", self.prolog, line, self.epilog));
    }

    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.push(line.as_ref());
        }
    }

    /// Joined output. A single plain line gets no terminator, so that
    /// `VAR=$(adpn json --key=...)` captures exactly the value.
    pub fn finish(self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let terminate = self.table_mode || self.lines.len() > 1;
        let mut text = self.lines.join("\n");
        if terminate {
            text.push('\n');
        }
        text
    }

    /// Writes the joined output to stdout in one piece.
    pub fn emit(self) -> Result<(), OutputError> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(self.finish().as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}
