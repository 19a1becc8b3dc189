//! `adpn json-to-switches`: turns a packet into `--name=value` lines for
//! scripts that take their settings as switches.

use super::Script;
use crate::cli::help_text::JSON_TO_SWITCHES_USAGE;
use crate::output::LineBuffer;
use crate::packet::{self, Packet};
use crate::packet_store::PacketStore;
use crate::stage::{self, StageExitCode, read_input};
use crate::switches::{Options, SwitchValue};
use serde_json::Value;
use std::process::ExitCode;
use tracing::{debug, error};

pub const SCRIPT: Script = Script {
    name: "adpn-json-to-switches",
    usage: JSON_TO_SWITCHES_USAGE,
    defined: &[
        ("au_title", None),
        ("jar", None),
        ("plugin-id", None),
        ("plugin", None),
        ("remote", None),
    ],
    positional: &[],
    run,
};

/// Switches taken from packet fields, in output order.
const PACKET_FIELDS: &[(&str, &str)] = &[
    ("au_title", "Ingest Title"),
    ("jar", "Plugin JAR"),
    ("plugin-id", "Plugin ID"),
];

fn run(options: &Options) -> anyhow::Result<ExitCode> {
    let text = read_input(options.positionals(), false)?;
    let mut store = PacketStore::new();
    store.accept(text.lines());

    let packet = match store.all_data() {
        Ok(Value::Object(packet)) => packet,
        Ok(_) => {
            error!("Expected a JSON packet, got a list");
            return Ok(StageExitCode::decode_error());
        }
        Err(err) => {
            error!("{err}");
            debug!("Input was:\n{text}");
            return Ok(StageExitCode::decode_error());
        }
    };

    let mut buffer = LineBuffer::new(true);
    for (name, value) in packet_switches(options, &packet) {
        buffer.push(&format!("--{name}={value}"));
    }
    buffer.emit()?;

    Ok(ExitCode::SUCCESS)
}

/// The switches a packet stands for, with command-line switches winning.
fn packet_switches(options: &Options, packet: &Packet) -> Vec<(String, String)> {
    let mut switches = options.clone();
    for (switch, field) in PACKET_FIELDS {
        switches = stage::backfill(&switches, packet, switch, field);
    }
    if switches.get("plugin-id").is_none() {
        switches = stage::backfill(&switches, packet, "plugin", "Plugin Name");
    }
    // Staged content has a size on the remote side.
    if packet.contains_key("File Size") || packet.contains_key("File Size ") {
        switches = switches.backfilled("remote", Some(SwitchValue::Text("1".to_string())));
    }

    let named = ["au_title", "jar", "plugin-id", "plugin", "remote"];
    let mut lines: Vec<(String, String)> = named
        .iter()
        .flat_map(|name| {
            switches
                .list(name)
                .into_iter()
                .map(|value| (name.to_string(), value.to_string()))
        })
        .collect();

    for (name, value) in packet::parameters(packet) {
        if options.on_command_line(name) {
            let given = options.list(name);
            lines.extend(given.into_iter().map(|value| (name.to_string(), value.to_string())));
        } else {
            lines.push((name.to_string(), packet::plain_text(value)));
        }
    }
    lines
}
