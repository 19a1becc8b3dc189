//! `adpn json`: query, filter and construct packets.

use super::{JSON_MIME, Script};
use crate::cli::help_text::JSON_USAGE;
use crate::output::{LineBuffer, OutputFormat, Table};
use crate::packet::Packet;
use crate::packet_store::PacketStore;
use crate::selector::{self, WhereFilter};
use crate::stage::{Outcome, read_input};
use crate::switches::Options;
use serde_json::Value;
use std::process::ExitCode;
use tracing::{debug, error, warn};

pub const SCRIPT: Script = Script {
    name: "adpn-json",
    usage: JSON_USAGE,
    defined: &[
        ("key", None),
        ("value", None),
        ("where", None),
        ("output", None),
        ("indent", None),
        ("template", None),
        ("prolog", None),
        ("epilog", None),
        ("screen", None),
        ("no-splat", None),
    ],
    positional: &[],
    run,
};

#[derive(Debug, thiserror::Error)]
pub enum ConstructError {
    #[error("{keys} --key switch(es) but {values} --value switch(es); they must pair up")]
    Unpaired { keys: usize, values: usize },
}

fn run(options: &Options) -> anyhow::Result<ExitCode> {
    let filter = options
        .text("where")
        .map(str::parse::<WhereFilter>)
        .transpose()?;
    let constructed = match options.get("value") {
        Some(_) => Some(construct(options)?),
        None => None,
    };

    let mut store = PacketStore::new()
        .with_splat(!options.switched("no-splat"))
        .with_screen(options.switched("screen"));
    if let Some(packet) = &constructed {
        store = store.with_cascade(packet.clone());
    }

    let text = read_input(options.positionals(), constructed.is_some())?;
    store.accept(text.lines());

    let mut outcome = Outcome::default();
    let document = match (&constructed, store.is_blank()) {
        (Some(packet), true) => Value::Object(packet.clone()),
        _ => match store.all_data() {
            Ok(document) => document,
            Err(err) => {
                error!("{err}");
                debug!("Input was:\n{text}");
                outcome.decode_failed();
                return Ok(outcome.exit_code());
            }
        },
    };
    let document = match &filter {
        Some(filter) => filter.apply(document),
        None => document,
    };

    // A constructed packet is emitted whole, as JSON unless asked otherwise.
    let (keys, options) = match constructed {
        Some(_) => (Vec::new(), options.defaulted("output", JSON_MIME)),
        None => (options.list("key"), options.clone()),
    };

    let table = tabulate(document, &keys, store.splat(), &mut outcome);

    let format = match OutputFormat::negotiate(&options, keys.len()) {
        Ok(format) => format,
        Err(err) => {
            error!("{err}");
            outcome.output_failed();
            return Ok(outcome.exit_code());
        }
    };
    debug!("Rendering {} key(s) as {format:?}", keys.len());

    let mut buffer = LineBuffer::new(format.is_table())
        .with_wrapper(options.text("prolog"), options.text("epilog"));
    if let Some(table) = table {
        match format.render(&table) {
            Ok(lines) => buffer.extend(lines),
            Err(err) => {
                error!("{err}");
                outcome.output_failed();
            }
        }
    }
    buffer.emit()?;

    Ok(outcome.exit_code())
}

/// Pairs each `--key` with the `--value` in the same position.
fn construct(options: &Options) -> Result<Packet, ConstructError> {
    let keys = options.list("key");
    let values = options.list("value");
    if keys.len() != values.len() {
        return Err(ConstructError::Unpaired {
            keys: keys.len(),
            values: values.len(),
        });
    }
    Ok(keys
        .into_iter()
        .zip(values)
        .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
        .collect())
}

/// Picks the requested keys out of the document.
///
/// Returns `None` when nothing was found for the keys that were asked for.
fn tabulate(document: Value, keys: &[&str], splat: bool, outcome: &mut Outcome) -> Option<Table> {
    match document {
        Value::Object(packet) => {
            let selection = selector::select(&packet, keys, splat);
            report_missing(&selection.missing, outcome);
            if keys.len() == 1 {
                return selection
                    .found
                    .into_iter()
                    .next()
                    .map(|(key, value)| Table::Value { key, value });
            }
            if !keys.is_empty() && selection.found.is_empty() {
                return None;
            }
            Some(Table::Pairs(selection.found))
        }
        Value::Array(records) if keys.is_empty() => Some(Table::Records(records)),
        Value::Array(records) => {
            let mut seen = vec![false; keys.len()];
            let mut rows = Vec::with_capacity(records.len());
            for packet in records.iter().filter_map(Value::as_object) {
                let selection = selector::select(packet, keys, splat);
                for (found, key) in seen.iter_mut().zip(keys) {
                    *found |= !selection.missing.iter().any(|missing| missing == key);
                }
                if keys.len() == 1 {
                    rows.extend(selection.found.into_iter().map(|(_, value)| value));
                } else {
                    // One cell per requested key, so columns line up across records.
                    let mut found: Packet = selection.found.into_iter().collect();
                    let row: Packet = keys
                        .iter()
                        .map(|key| (key.to_string(), found.remove(*key).unwrap_or(Value::Null)))
                        .collect();
                    rows.push(Value::Object(row));
                }
            }
            let missing: Vec<String> = keys
                .iter()
                .zip(&seen)
                .filter(|(_, seen)| !**seen)
                .map(|(key, _)| key.to_string())
                .collect();
            report_missing(&missing, outcome);
            Some(Table::Records(rows))
        }
        scalar => Some(Table::Value {
            key: String::new(),
            value: scalar,
        }),
    }
}

fn report_missing(missing: &[String], outcome: &mut Outcome) {
    for key in missing {
        warn!("Key not found: {key}");
        outcome.key_missing();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageExitCode;
    use serde_json::json;

    fn tabulated(document: Value, keys: &[&str]) -> (Option<Table>, Outcome) {
        let mut outcome = Outcome::default();
        let table = tabulate(document, keys, true, &mut outcome);
        (table, outcome)
    }

    #[test]
    fn single_key_selects_a_value() {
        let (table, outcome) = tabulated(json!({"Ingest Step": "packaged"}), &["Ingest Step"]);

        assert_eq!(
            table,
            Some(Table::Value {
                key: "Ingest Step".to_string(),
                value: json!("packaged")
            })
        );
        assert!(outcome.is_success());
    }

    #[test]
    fn single_missing_key_selects_nothing() {
        let (table, outcome) = tabulated(json!({"a": 1}), &["b"]);

        assert_eq!(table, None);
        assert_eq!(outcome.exit_code(), StageExitCode::key_missing());
    }

    #[test]
    fn partial_selection_keeps_found_keys() {
        let (table, outcome) = tabulated(json!({"a": 1, "b": 2}), &["b", "zz"]);

        assert_eq!(table, Some(Table::Pairs(vec![("b".to_string(), json!(2))])));
        assert!(!outcome.is_success());
    }

    #[test]
    fn no_keys_selects_the_whole_packet() {
        let (table, outcome) = tabulated(json!({"a": ["x"], "b": 2}), &[]);

        assert_eq!(
            table,
            Some(Table::Pairs(vec![
                ("a".to_string(), json!(["x"])),
                ("b".to_string(), json!(2))
            ]))
        );
        assert!(outcome.is_success());
    }

    #[test]
    fn records_project_selected_keys() {
        let records = json!([
            {"name": "a", "size": 1, "extra": true},
            {"name": "b", "size": 2},
            "not a record"
        ]);

        let (single, outcome) = tabulated(records.clone(), &["name"]);
        assert_eq!(single, Some(Table::Records(vec![json!("a"), json!("b")])));
        assert!(outcome.is_success());

        let (several, _) = tabulated(records, &["name", "size"]);
        assert_eq!(
            several,
            Some(Table::Records(vec![
                json!({"name": "a", "size": 1}),
                json!({"name": "b", "size": 2})
            ]))
        );
    }

    #[test]
    fn records_keep_one_cell_per_requested_key() {
        let (table, outcome) = tabulated(json!([{"a": 1, "b": 2}, {"b": 3}]), &["a", "b"]);

        assert_eq!(
            table,
            Some(Table::Records(vec![
                json!({"a": 1, "b": 2}),
                json!({"a": null, "b": 3})
            ]))
        );
        assert!(outcome.is_success());
    }

    #[test]
    fn records_missing_a_key_everywhere_report_it() {
        let (_, outcome) = tabulated(json!([{"a": 1}, {"b": 2}]), &["a", "b"]);
        assert!(outcome.is_success());

        let (_, outcome) = tabulated(json!([{"a": 1}]), &["c"]);
        assert_eq!(outcome.exit_code(), StageExitCode::key_missing());
    }

    #[test]
    fn construct_pairs_keys_with_values() {
        let options = Options::from_pairs(&[
            ("key", "Ingest Step"),
            ("value", "packaged"),
            ("key", "Ingest Title"),
            ("value", "WPA Folder 01"),
        ]);

        let packet = construct(&options).unwrap();

        assert_eq!(
            Value::Object(packet),
            json!({"Ingest Step": "packaged", "Ingest Title": "WPA Folder 01"})
        );
    }

    #[test]
    fn construct_rejects_unpaired_switches() {
        let options = Options::from_pairs(&[("key", "a"), ("key", "b"), ("value", "1")]);

        assert!(matches!(
            construct(&options),
            Err(ConstructError::Unpaired { keys: 2, values: 1 })
        ));
    }
}
