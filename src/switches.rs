//! Command-line switch resolution shared by every pipeline script.
//!
//! Scripts accept free-form `--name=value` switches rather than a fixed flag
//! set, because any plugin parameter (`--subdirectory=...`, `--base_url=...`)
//! can be passed through to the next stage. Values are layered, highest
//! precedence first:
//!
//! 1. switches on the command line
//! 2. the script's defaults file (`<script>.defaults.conf`, one switch per line)
//! 3. the settings file (`adpnet.json`), whose groups become `group/member` switches
//! 4. built-in defaults declared by the script
//!
//! Values pulled from a piped packet sit between 1 and 2; they are added with
//! [`Options::backfilled`] once the packet has been read, replacing anything
//! but a command-line switch.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SwitchError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Settings file {path} is not a JSON object: {reason}")]
    Settings { path: PathBuf, reason: String },
    #[error("--{name} must be an integer, got {value:?}")]
    Parse { name: String, value: String },
    #[error("--{name} must be a number or text, not a list or object")]
    Type { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchValue {
    /// A bare `--name` with no value.
    Flag,
    Text(String),
    /// Every value of a switch given more than once, first to last.
    List(Vec<String>),
}

impl SwitchValue {
    /// The scalar reading of the switch. A repeated switch reads as its last value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SwitchValue::Flag => None,
            SwitchValue::Text(text) => Some(text),
            SwitchValue::List(values) => values.last().map(String::as_str),
        }
    }

    pub fn as_list(&self) -> Vec<&str> {
        match self {
            SwitchValue::Flag => Vec::new(),
            SwitchValue::Text(text) => vec![text.as_str()],
            SwitchValue::List(values) => values.iter().map(String::as_str).collect(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            SwitchValue::Flag => Value::Bool(true),
            SwitchValue::Text(text) => Value::String(text.clone()),
            SwitchValue::List(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
        }
    }

    fn push(self, value: SwitchValue) -> SwitchValue {
        match (self, value) {
            (SwitchValue::List(mut values), SwitchValue::Text(text)) => {
                values.push(text);
                SwitchValue::List(values)
            }
            (SwitchValue::Text(first), SwitchValue::Text(second)) => {
                SwitchValue::List(vec![first, second])
            }
            (_, value) => value,
        }
    }
}

/// The resolved switches of one script invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    switches: BTreeMap<String, SwitchValue>,
    /// Switches set on the command line, directly or by a positional.
    given: BTreeSet<String>,
    positionals: Vec<String>,
}

impl Options {
    pub fn get(&self, name: &str) -> Option<&SwitchValue> {
        self.switches.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(SwitchValue::as_str)
    }

    pub fn list(&self, name: &str) -> Vec<&str> {
        self.get(name).map(SwitchValue::as_list).unwrap_or_default()
    }

    /// True when the switch is present with a non-empty value.
    pub fn switched(&self, name: &str) -> bool {
        match self.get(name) {
            None => false,
            Some(SwitchValue::Flag) => true,
            Some(SwitchValue::Text(text)) => !text.is_empty(),
            Some(SwitchValue::List(values)) => !values.is_empty(),
        }
    }

    /// Positional arguments left over after binding.
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    pub fn on_command_line(&self, name: &str) -> bool {
        self.given.contains(name)
    }

    /// Returns a copy with `name` set to a piped packet's `value`.
    ///
    /// The packet outranks defaults and settings, so only a switch given on
    /// the command line keeps its value.
    pub fn backfilled(&self, name: &str, value: Option<SwitchValue>) -> Options {
        let mut result = self.clone();
        if let Some(value) = value
            && !self.on_command_line(name)
        {
            result.switches.insert(name.to_string(), value);
        }
        result
    }

    /// Returns a copy with `name` set to `value` when no layer set it.
    pub fn defaulted(&self, name: &str, value: &str) -> Options {
        let mut result = self.clone();
        result
            .switches
            .entry(name.to_string())
            .or_insert_with(|| SwitchValue::Text(value.to_string()));
        result
    }

    /// Returns a copy where `left` and `right` read the same value.
    ///
    /// Whichever one is set fills the other; when both are set and differ,
    /// `left` wins.
    #[allow(dead_code)]
    pub fn aligned(&self, left: &str, right: &str) -> Options {
        let mut result = self.clone();
        let (source, value) = match (self.get(left), self.get(right)) {
            (Some(value), _) => (left, value.clone()),
            (None, Some(value)) => (right, value.clone()),
            (None, None) => return result,
        };
        if self.on_command_line(source) {
            result.given.insert(left.to_string());
            result.given.insert(right.to_string());
        }
        result.switches.insert(left.to_string(), value.clone());
        result.switches.insert(right.to_string(), value);
        result
    }

    /// Strict integer reading of a switch; absent switches read as `None`.
    #[allow(dead_code)]
    pub fn integer(&self, name: &str) -> Result<Option<i64>, SwitchError> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let text = value.as_str().unwrap_or_default();
        text.trim()
            .parse()
            .map(Some)
            .map_err(|_| SwitchError::Parse {
                name: name.to_string(),
                value: text.to_string(),
            })
    }

    /// Lenient integer reading of a switch, see [`convertto_numeric_value`].
    pub fn numeric(&self, name: &str) -> Result<i64, SwitchError> {
        let value = self.get(name).map(SwitchValue::to_json).unwrap_or(Value::Null);
        convertto_numeric_value(&value).map_err(|_| SwitchError::Type {
            name: name.to_string(),
        })
    }

    /// Diagnostic verbosity from `--verbose`, `--quiet` and `--debug`.
    pub fn verbosity(&self) -> Result<i64, SwitchError> {
        let verbose = if self.switched("quiet") {
            0
        } else {
            self.numeric("verbose")?
        };
        Ok(verbose.max(self.numeric("debug")?))
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Options {
        let mut switches = BTreeMap::new();
        for (name, value) in pairs {
            let value = SwitchValue::Text(value.to_string());
            let merged = match switches.remove(*name) {
                Some(existing) => SwitchValue::push(existing, value),
                None => value,
            };
            switches.insert(name.to_string(), merged);
        }
        Options {
            given: switches.keys().cloned().collect(),
            switches,
            positionals: Vec::new(),
        }
    }
}

/// Converts a loosely typed scalar to an integer.
///
/// Numbers are truncated. Strings like `"3, three files"` give their leading
/// count, integer strings parse, any other non-empty string is `1` and the
/// empty string is `0`. Null is `0` and booleans are `0`/`1`.
pub fn convertto_numeric_value(value: &Value) -> Result<i64, SwitchError> {
    match value {
        Value::Null => Ok(0),
        Value::Bool(flag) => Ok(i64::from(*flag)),
        Value::Number(number) => Ok(number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64))
            .unwrap_or_default()),
        Value::String(text) => Ok(leading_count(text)
            .or_else(|| text.trim().parse().ok())
            .unwrap_or(i64::from(!text.is_empty()))),
        Value::Array(_) | Value::Object(_) => Err(SwitchError::Type {
            name: "value".to_string(),
        }),
    }
}

fn leading_count(text: &str) -> Option<i64> {
    let digits = text.find(|c: char| !c.is_ascii_digit())?;
    if digits == 0 || !text[digits..].starts_with(',') {
        return None;
    }
    text[..digits].parse().ok()
}

/// Splits `--name=value` / `--name` tokens; anything else is not a switch.
fn parse_switch(token: &str) -> Option<(&str, SwitchValue)> {
    let body = token.strip_prefix("--")?;
    let first = body.chars().next()?;
    if !(first.is_ascii_alphanumeric() || first == '_') {
        return None;
    }
    Some(match body.split_once('=') {
        Some((name, value)) => (name.trim_end(), SwitchValue::Text(value.to_string())),
        None => (body, SwitchValue::Flag),
    })
}

fn collect_switches<'t>(
    tokens: impl IntoIterator<Item = &'t str>,
) -> (BTreeMap<String, SwitchValue>, Vec<String>) {
    let mut switches: BTreeMap<String, SwitchValue> = BTreeMap::new();
    let mut positionals = Vec::new();
    for token in tokens {
        match parse_switch(token) {
            Some((name, value)) => {
                let merged = match switches.remove(name) {
                    Some(existing) => existing.push(value),
                    None => value,
                };
                switches.insert(name.to_string(), merged);
            }
            None => positionals.push(token.to_string()),
        }
    }
    (switches, positionals)
}

/// Builds an [`Options`] from the command line and the persisted layers.
#[derive(Debug, Default)]
pub struct SwitchResolver<'a> {
    defined: &'a [(&'a str, Option<&'a str>)],
    positional: &'a [&'a str],
    defaults_file: Option<PathBuf>,
    settings_file: Option<PathBuf>,
    settings_groups: &'a [&'a str],
}

impl<'a> SwitchResolver<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in defaults; a `None` value declares a switch without a default.
    pub fn defined(mut self, defined: &'a [(&'a str, Option<&'a str>)]) -> Self {
        self.defined = defined;
        self
    }

    /// Switch names that bare positional arguments fill, in order.
    pub fn positional(mut self, names: &'a [&'a str]) -> Self {
        self.positional = names;
        self
    }

    pub fn defaults_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.defaults_file = Some(path.into());
        self
    }

    pub fn settings_file(mut self, path: impl Into<PathBuf>, groups: &'a [&'a str]) -> Self {
        self.settings_file = Some(path.into());
        self.settings_groups = groups;
        self
    }

    pub fn resolve<S: AsRef<str>>(&self, argv: &[S]) -> Result<Options, SwitchError> {
        let mut switches: BTreeMap<String, SwitchValue> = self
            .defined
            .iter()
            .filter_map(|(name, value)| {
                value.map(|value| (name.to_string(), SwitchValue::Text(value.to_string())))
            })
            .collect();

        if let Some(path) = &self.settings_file {
            switches.extend(read_settings_file(path, self.settings_groups)?);
        }
        if let Some(path) = &self.defaults_file {
            switches.extend(read_defaults_file(path)?);
        }

        let (from_argv, positionals) = collect_switches(argv.iter().map(AsRef::as_ref));
        let mut given: BTreeSet<String> = from_argv.keys().cloned().collect();
        switches.extend(from_argv);

        let mut positionals = positionals.into_iter();
        let mut leftover = Vec::new();
        for name in self.positional {
            if switches.contains_key(*name) {
                continue;
            }
            match positionals.next() {
                Some(value) => {
                    switches.insert(name.to_string(), SwitchValue::Text(value));
                    given.insert(name.to_string());
                }
                None => break,
            }
        }
        leftover.extend(positionals);

        Ok(Options {
            switches,
            given,
            positionals: leftover,
        })
    }
}

/// Reads `--switch=value` lines. A missing file contributes nothing.
pub fn read_defaults_file(path: &Path) -> Result<BTreeMap<String, SwitchValue>, SwitchError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(source) => {
            return Err(SwitchError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let lines = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'));
    let (switches, _) = collect_switches(lines);
    Ok(switches)
}

/// Flattens the settings JSON: members of a listed group become
/// `group/member`, top-level scalars become plain switches.
pub fn read_settings_file(
    path: &Path,
    groups: &[&str],
) -> Result<BTreeMap<String, SwitchValue>, SwitchError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(source) => {
            return Err(SwitchError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let settings = match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(settings)) => settings,
        Ok(_) => {
            return Err(SwitchError::Settings {
                path: path.to_path_buf(),
                reason: "top level is not an object".to_string(),
            });
        }
        Err(e) => {
            return Err(SwitchError::Settings {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };

    let mut switches = BTreeMap::new();
    for (name, value) in settings {
        match value {
            Value::Object(members) if groups.contains(&name.as_str()) => {
                for (member, value) in members {
                    if let Some(value) = setting_value(value) {
                        switches.insert(format!("{name}/{member}"), value);
                    }
                }
            }
            value => {
                if let Some(value) = setting_value(value) {
                    switches.insert(name, value);
                }
            }
        }
    }
    Ok(switches)
}

fn setting_value(value: Value) -> Option<SwitchValue> {
    match value {
        Value::Null | Value::Object(_) => None,
        Value::String(text) => Some(SwitchValue::Text(text)),
        Value::Bool(_) | Value::Number(_) => Some(SwitchValue::Text(value.to_string())),
        Value::Array(items) => Some(SwitchValue::List(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(text) => text,
                    other => other.to_string(),
                })
                .collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn resolve(argv: &[&str]) -> Options {
        SwitchResolver::new().resolve(argv).unwrap()
    }

    #[test]
    fn parses_values_flags_and_positionals() {
        let options = resolve(&["--key=Ingest Step", "--debug", "packet.json", "-"]);

        assert_eq!(options.text("key"), Some("Ingest Step"));
        assert_eq!(options.get("debug"), Some(&SwitchValue::Flag));
        assert!(options.switched("debug"));
        assert_eq!(options.positionals(), ["packet.json", "-"]);
    }

    #[test]
    fn value_may_contain_equals_signs() {
        let options = resolve(&["--base_url=http://example.org/?a=b"]);
        assert_eq!(options.text("base_url"), Some("http://example.org/?a=b"));
    }

    #[test]
    fn empty_value_is_not_switched() {
        let options = resolve(&["--skip="]);
        assert_eq!(options.text("skip"), Some(""));
        assert!(!options.switched("skip"));
        assert!(options.get("skip").is_some());
    }

    #[test]
    fn repeated_switch_accumulates_in_order() {
        let options = resolve(&["--key=a", "--key=b", "--key=c", "--value=1"]);

        assert_eq!(
            options.get("key"),
            Some(&SwitchValue::List(vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string()
            ]))
        );
        assert_eq!(options.list("key"), vec!["a", "b", "c"]);
        assert_eq!(options.text("key"), Some("c"));
        assert_eq!(options.get("value"), Some(&SwitchValue::Text("1".into())));
    }

    #[test]
    fn dash_tokens_that_are_not_switches_are_positionals() {
        let options = resolve(&["--", "-v", "---"]);
        assert_eq!(options.positionals(), ["--", "-v", "---"]);
    }

    #[test]
    fn positionals_bind_only_to_unset_switches() {
        let options = SwitchResolver::new()
            .positional(&["local", "remote"])
            .resolve(&["--local=/already/set", "first", "second"])
            .unwrap();

        assert_eq!(options.text("local"), Some("/already/set"));
        assert_eq!(options.text("remote"), Some("first"));
        assert_eq!(options.positionals(), ["second"]);
    }

    #[test]
    fn built_in_defaults_yield_to_command_line() {
        const DEFINED: &[(&str, Option<&str>)] =
            &[("output", Some("text/plain")), ("verbose", Some("1")), ("jar", None)];

        let options = SwitchResolver::new()
            .defined(DEFINED)
            .resolve(&["--verbose=2"])
            .unwrap();

        assert_eq!(options.text("output"), Some("text/plain"));
        assert_eq!(options.text("verbose"), Some("2"));
        assert_eq!(options.get("jar"), None);
    }

    #[test]
    fn defaults_file_fills_only_absent_switches() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("adpn-json.defaults.conf");
        fs::write(
            &path,
            "# proxy settings\n--proxy=localhost\n\n--port=31415\n--output=text/plain\n",
        )
        .unwrap();

        let options = SwitchResolver::new()
            .defaults_file(&path)
            .resolve(&["--output=application/json"])
            .unwrap();

        assert_eq!(options.text("proxy"), Some("localhost"));
        assert_eq!(options.text("port"), Some("31415"));
        assert_eq!(options.text("output"), Some("application/json"));
    }

    #[test]
    fn missing_defaults_file_is_ignored() {
        let temp = TempDir::new().unwrap();
        let options = SwitchResolver::new()
            .defaults_file(temp.path().join("nope.defaults.conf"))
            .resolve(&["--a=1"])
            .unwrap();
        assert_eq!(options.text("a"), Some("1"));
    }

    #[test]
    fn defaults_file_value_blocks_positional_binding() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("stage.defaults.conf");
        fs::write(&path, "--local=/from/defaults\n").unwrap();

        let options = SwitchResolver::new()
            .defaults_file(&path)
            .positional(&["local"])
            .resolve(&["/from/argv"])
            .unwrap();

        assert_eq!(options.text("local"), Some("/from/defaults"));
        assert_eq!(options.positionals(), ["/from/argv"]);
    }

    #[test]
    fn settings_groups_become_namespaced_switches() {
        let temp = TempDir::new().unwrap();
        let settings = temp.path().join("adpnet.json");
        fs::write(
            &settings,
            json!({
                "stage": {"user": "adah", "base": "ftp://drop.example.org/"},
                "user": {"email": "someone@example.org"},
                "institution": "Alabama Department of Archives and History",
                "misc": {"ignored": true}
            })
            .to_string(),
        )
        .unwrap();
        let defaults = temp.path().join("adpn-stage.defaults.conf");
        fs::write(&defaults, "--stage/user=override\n").unwrap();

        let options = SwitchResolver::new()
            .settings_file(&settings, &["stage", "user"])
            .defaults_file(&defaults)
            .resolve(&["--user=someone-else"])
            .unwrap();

        assert_eq!(options.text("stage/user"), Some("override"));
        assert_eq!(options.text("stage/base"), Some("ftp://drop.example.org/"));
        assert_eq!(options.text("user/email"), Some("someone@example.org"));
        assert_eq!(options.text("user"), Some("someone-else"));
        assert_eq!(
            options.text("institution"),
            Some("Alabama Department of Archives and History")
        );
        assert_eq!(options.get("misc"), None);
        assert_eq!(options.get("misc/ignored"), None);
    }

    #[test]
    fn settings_file_must_be_an_object() {
        let temp = TempDir::new().unwrap();
        let settings = temp.path().join("adpnet.json");
        fs::write(&settings, "[1, 2]").unwrap();

        let result = SwitchResolver::new()
            .settings_file(&settings, &[])
            .resolve(&[] as &[&str]);
        assert!(matches!(result, Err(SwitchError::Settings { .. })));
    }

    #[test]
    fn aligned_copies_whichever_side_is_set() {
        let options = resolve(&["--subdirectory=WPA-Folder-01"]);
        let aligned = options.aligned("directory", "subdirectory");

        assert_eq!(aligned.text("directory"), Some("WPA-Folder-01"));
        assert_eq!(aligned.text("subdirectory"), Some("WPA-Folder-01"));
        assert!(aligned.on_command_line("directory"));
        assert_eq!(options.get("directory"), None, "original is untouched");
    }

    #[test]
    fn aligned_prefers_left_when_both_differ() {
        let options = resolve(&["--base_url=http://left/", "--stage/base_url=http://right/"]);
        let aligned = options.aligned("base_url", "stage/base_url");

        assert_eq!(aligned.text("stage/base_url"), Some("http://left/"));
    }

    #[test]
    fn backfilled_never_overrides_explicit_switches() {
        let options = resolve(&["--au_title=Better Title"]);

        let filled = options
            .backfilled("au_title", Some(SwitchValue::Text("Piped Title".into())))
            .backfilled("jar", Some(SwitchValue::Text("http://x/p.jar".into())))
            .backfilled("plugin", None);

        assert_eq!(filled.text("au_title"), Some("Better Title"));
        assert_eq!(filled.text("jar"), Some("http://x/p.jar"));
        assert_eq!(filled.get("plugin"), None);
        assert_eq!(options.get("jar"), None);
    }

    #[test]
    fn backfilled_replaces_defaults_file_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("adpn-json-to-switches.defaults.conf");
        fs::write(&path, "--jar=http://defaults/old.jar\n--au_title=Default Title\n").unwrap();

        let options = SwitchResolver::new()
            .defaults_file(&path)
            .resolve(&["--au_title=Given Title"])
            .unwrap();
        let filled = options
            .backfilled("jar", Some(SwitchValue::Text("http://packet/new.jar".into())))
            .backfilled("au_title", Some(SwitchValue::Text("Piped Title".into())));

        assert!(options.on_command_line("au_title"));
        assert!(!options.on_command_line("jar"));
        assert_eq!(filled.text("jar"), Some("http://packet/new.jar"));
        assert_eq!(filled.text("au_title"), Some("Given Title"));
    }

    #[test]
    fn defaulted_fills_only_unset_switches() {
        let options = resolve(&["--output=text/plain"]);

        let filled = options
            .defaulted("output", "application/json")
            .defaulted("indent", "2");

        assert_eq!(filled.text("output"), Some("text/plain"));
        assert_eq!(filled.text("indent"), Some("2"));
    }

    #[test]
    fn convertto_numeric_value_coerces_loose_scalars() {
        assert_eq!(convertto_numeric_value(&json!("3,ignored")).unwrap(), 3);
        assert_eq!(convertto_numeric_value(&json!("12, twelve files")).unwrap(), 12);
        assert_eq!(convertto_numeric_value(&json!("")).unwrap(), 0);
        assert_eq!(convertto_numeric_value(&json!("abc")).unwrap(), 1);
        assert_eq!(convertto_numeric_value(&json!(" 7 ")).unwrap(), 7);
        assert_eq!(convertto_numeric_value(&json!(null)).unwrap(), 0);
        assert_eq!(convertto_numeric_value(&json!(5)).unwrap(), 5);
        assert_eq!(convertto_numeric_value(&json!(2.9)).unwrap(), 2);
        assert_eq!(convertto_numeric_value(&json!(true)).unwrap(), 1);
    }

    #[test]
    fn convertto_numeric_value_rejects_compound_values() {
        assert!(matches!(
            convertto_numeric_value(&json!([1])),
            Err(SwitchError::Type { .. })
        ));
        assert!(matches!(
            convertto_numeric_value(&json!({"a": 1})),
            Err(SwitchError::Type { .. })
        ));
    }

    #[test]
    fn integer_is_strict() {
        let options = resolve(&["--indent=4", "--port=abc"]);

        assert_eq!(options.integer("indent").unwrap(), Some(4));
        assert_eq!(options.integer("missing").unwrap(), None);
        assert!(matches!(
            options.integer("port"),
            Err(SwitchError::Parse { name, value }) if name == "port" && value == "abc"
        ));
    }

    #[test]
    fn verbosity_honors_quiet_and_debug() {
        assert_eq!(resolve(&[]).verbosity().unwrap(), 0);
        assert_eq!(resolve(&["--verbose=2"]).verbosity().unwrap(), 2);
        assert_eq!(resolve(&["--verbose"]).verbosity().unwrap(), 1);
        assert_eq!(resolve(&["--verbose=2", "--quiet"]).verbosity().unwrap(), 0);
        assert_eq!(resolve(&["--quiet", "--debug=2"]).verbosity().unwrap(), 2);
        assert!(resolve(&["--verbose=1", "--verbose=2"]).verbosity().is_err());
    }
}
