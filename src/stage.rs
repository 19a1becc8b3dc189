//! Plumbing shared by every pipeline stage: reading the piped packet,
//! pulling switch values out of it, and turning failures into exit codes.

use crate::packet::{self, Packet};
use crate::selector;
use crate::switches::{Options, SwitchValue};
use serde_json::Value;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

pub struct StageExitCode;

impl StageExitCode {
    /// A requested key was not in the packet.
    pub fn key_missing() -> ExitCode {
        ExitCode::from(1)
    }

    /// No packet could be decoded from the input.
    pub fn decode_error() -> ExitCode {
        ExitCode::from(2)
    }

    /// Invalid switches or arguments.
    pub fn usage_error() -> ExitCode {
        ExitCode::from(2)
    }

    /// A named input file could not be read.
    pub fn io_error() -> ExitCode {
        ExitCode::from(3)
    }

    /// The selected values could not be rendered.
    pub fn output_error() -> ExitCode {
        ExitCode::from(254)
    }

    /// `100 + N` for an external program that exited with status `N`.
    pub fn subprocess(code: i32) -> ExitCode {
        ExitCode::from(subprocess_code(code))
    }
}

const INTERRUPTED: u8 = 255;

fn subprocess_code(code: i32) -> u8 {
    u8::try_from(code.saturating_add(100).max(0)).unwrap_or(u8::MAX)
}

/// Failures noted while a stage keeps going, reported once at the end.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    decode_failed: bool,
    key_missing: bool,
    output_failed: bool,
}

impl Outcome {
    pub fn decode_failed(&mut self) {
        self.decode_failed = true;
    }

    pub fn key_missing(&mut self) {
        self.key_missing = true;
    }

    pub fn output_failed(&mut self) {
        self.output_failed = true;
    }

    pub fn is_success(&self) -> bool {
        *self == Outcome::default()
    }

    /// Decode failures outrank missing keys, which outrank rendering failures.
    pub fn exit_code(&self) -> ExitCode {
        if self.decode_failed {
            StageExitCode::decode_error()
        } else if self.key_missing {
            StageExitCode::key_missing()
        } else if self.output_failed {
            StageExitCode::output_error()
        } else {
            ExitCode::SUCCESS
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("Could not read {path}: {source}")]
    Input {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not read standard input: {0}")]
    Stdin(std::io::Error),
    #[error("Could not run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with status {code}")]
    Subprocess { program: String, code: i32 },
}

impl StageError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            StageError::Input { .. } | StageError::Stdin(_) | StageError::Spawn { .. } => {
                StageExitCode::io_error()
            }
            StageError::Subprocess { code, .. } => StageExitCode::subprocess(*code),
        }
    }
}

/// Reads the named input files in order, `-` meaning stdin.
///
/// With no files, stdin is read. A `conditional` read skips stdin when it is
/// a terminal, so a stage run by hand does not sit waiting for a packet.
pub fn read_input(files: &[String], conditional: bool) -> Result<String, StageError> {
    if files.is_empty() {
        if conditional && std::io::stdin().is_terminal() {
            debug!("stdin is a terminal, not waiting for a piped packet");
            return Ok(String::new());
        }
        return read_stdin();
    }

    let mut text = String::new();
    for file in files {
        let chunk = if file == "-" {
            read_stdin()?
        } else {
            let bytes = std::fs::read(file).map_err(|source| StageError::Input {
                path: PathBuf::from(file),
                source,
            })?;
            String::from_utf8_lossy(&bytes).into_owned()
        };
        text.push_str(&chunk);
        if !text.ends_with('\n') {
            text.push('\n');
        }
    }
    Ok(text)
}

fn read_stdin() -> Result<String, StageError> {
    let mut bytes = Vec::new();
    std::io::stdin()
        .lock()
        .read_to_end(&mut bytes)
        .map_err(StageError::Stdin)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// A packet value as a switch: lists become repeated switches, everything
/// else its plain text.
pub fn switch_value(value: &Value) -> SwitchValue {
    match value {
        Value::Array(items) => SwitchValue::List(items.iter().map(packet::plain_text).collect()),
        other => SwitchValue::Text(packet::plain_text(other)),
    }
}

/// Fills `switch` from the packet's `key` unless the command line set it.
pub fn backfill(options: &Options, packet: &Packet, switch: &str, key: &str) -> Options {
    let value = selector::get(packet, key, true).found().map(switch_value);
    options.backfilled(switch, value)
}

fn interrupt_message(script: &str) -> String {
    format!("\nKeyboardInterrupt: [{script}] interrupted\n")
}

/// Ctrl-C stops the stage with a one-line notice and exit status 255.
pub fn trap_interrupt(script: &'static str) {
    let trapped = ctrlc::set_handler(move || {
        eprint!("{}", interrupt_message(script));
        std::process::exit(i32::from(INTERRUPTED));
    });
    if let Err(err) = trapped {
        debug!("Could not trap Ctrl-C: {err}");
    }
}
