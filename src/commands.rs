//! The pipeline scripts behind each `adpn` subcommand.

pub(crate) mod json;
pub(crate) mod json_to_switches;
pub(crate) mod manifest_property;

use crate::switches::{Options, SwitchError, SwitchResolver};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Settings file shared by every script, read from the config directory.
pub const SETTINGS_FILE: &str = "adpnet.json";

/// Groups of the settings file exposed as `group/member` switches.
pub const SETTINGS_GROUPS: &[&str] = &["stage", "ftp", "user"];

pub const JSON_MIME: &str = "application/json";

pub struct Script {
    /// Name used in diagnostics and for `<name>.defaults.conf`.
    pub name: &'static str,
    pub usage: &'static str,
    /// Built-in defaults; `None` declares a switch without one.
    pub defined: &'static [(&'static str, Option<&'static str>)],
    /// Switches filled by bare positional arguments, in order.
    pub positional: &'static [&'static str],
    pub run: fn(&Options) -> anyhow::Result<ExitCode>,
}

impl Script {
    pub fn defaults_file(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(format!("{}.defaults.conf", self.name))
    }

    pub fn resolve<S: AsRef<str>>(
        &self,
        argv: &[S],
        config_dir: &Path,
    ) -> Result<Options, SwitchError> {
        SwitchResolver::new()
            .defined(self.defined)
            .positional(self.positional)
            .settings_file(config_dir.join(SETTINGS_FILE), SETTINGS_GROUPS)
            .defaults_file(self.defaults_file(config_dir))
            .resolve(argv)
    }
}
