//! `adpn manifest-property`: reads `Name: value` headers out of a JAR manifest.

use super::{JSON_MIME, Script};
use crate::cli::help_text::MANIFEST_PROPERTY_USAGE;
use crate::output::{LineBuffer, OutputFormat, Table};
use crate::packet::Packet;
use crate::stage::{Outcome, StageError, read_input};
use crate::switches::Options;
use serde_json::Value;
use std::process::{Command, ExitCode};
use tracing::{debug, error, warn};

pub const SCRIPT: Script = Script {
    name: "adpn-manifest-property",
    usage: MANIFEST_PROPERTY_USAGE,
    defined: &[("manifest", None), ("key", None), ("output", None)],
    positional: &["manifest"],
    run,
};

/// Printed in place of a property the manifest lacks.
pub const MISSING_PROPERTY: &str = "!!!";

const MANIFEST_ENTRY: &str = "META-INF/MANIFEST.MF";

fn run(options: &Options) -> anyhow::Result<ExitCode> {
    let text = read_manifest(options.text("manifest"))?;
    let manifest = parse_manifest(&text);
    debug!("Manifest has {} header(s)", manifest.len());

    let mut keys = options.list("key");
    keys.extend(options.positionals().iter().map(String::as_str));

    if keys.is_empty() {
        let options = options.defaulted("output", JSON_MIME);
        let mut outcome = Outcome::default();
        let rendered = OutputFormat::negotiate(&options, 0).and_then(|format| {
            let lines = format.render(&Table::Pairs(manifest.into_iter().collect()))?;
            Ok((format, lines))
        });
        match rendered {
            Ok((format, lines)) => {
                let mut buffer = LineBuffer::new(format.is_table())
                    .with_wrapper(options.text("prolog"), options.text("epilog"));
                buffer.extend(lines);
                buffer.emit()?;
            }
            Err(err) => {
                error!("{err}");
                outcome.output_failed();
            }
        }
        return Ok(outcome.exit_code());
    }

    let mut buffer = LineBuffer::new(true);
    for key in keys {
        match manifest.get(key).and_then(Value::as_str) {
            Some(value) => buffer.push(value),
            None => {
                warn!("Manifest has no {key:?} property");
                buffer.push(MISSING_PROPERTY);
            }
        }
    }
    buffer.emit()?;
    Ok(ExitCode::SUCCESS)
}

/// Manifest text from a file, from inside a `.jar`, or from stdin.
fn read_manifest(source: Option<&str>) -> Result<String, StageError> {
    match source {
        None | Some("-") => read_input(&[], false),
        Some(path) if path.to_ascii_lowercase().ends_with(".jar") => unzip_manifest(path),
        Some(path) => read_input(&[path.to_string()], false),
    }
}

fn unzip_manifest(jar: &str) -> Result<String, StageError> {
    debug!("Reading {MANIFEST_ENTRY} from {jar}");
    let output = Command::new("unzip")
        .args(["-p", jar, MANIFEST_ENTRY])
        .output()
        .map_err(|source| StageError::Spawn {
            program: "unzip".to_string(),
            source,
        })?;
    if !output.status.success() {
        return Err(StageError::Subprocess {
            program: "unzip".to_string(),
            code: output.status.code().unwrap_or(1),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parses manifest headers in order. A line that is not `Name: value`
/// continues the previous header's value.
///
/// The name ends at the first `": "`. Header names never contain one, while
/// values such as `Implementation-Title: Plugin: Directory` may.
pub fn parse_manifest(text: &str) -> Packet {
    let mut manifest = Packet::new();
    let mut header: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        match line.split_once(": ") {
            Some((name, value)) if !name.is_empty() => {
                manifest.insert(name.to_string(), Value::String(value.to_string()));
                header = Some(name.to_string());
            }
            _ => {
                if let Some(name) = &header
                    && let Some(Value::String(value)) = manifest.get_mut(name)
                {
                    value.push_str(line);
                }
            }
        }
    }
    manifest
}
