pub(crate) mod help_text;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pipeline tools for passing JSON status packets between preservation stages
#[derive(Parser, Debug)]
#[command(name = "adpn", version, about, long_about = help_text::ROOT_LONG_ABOUT)]
pub struct Cli {
    /// Directory holding adpnet.json and <script>.defaults.conf (default: next to the executable)
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Query, filter and construct JSON packets
    #[command(disable_help_flag = true, disable_version_flag = true)]
    Json {
        /// Free-form --name=value switches and input files
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Convert a JSON packet into --name=value switch lines
    #[command(disable_help_flag = true, disable_version_flag = true)]
    JsonToSwitches {
        /// Free-form --name=value switches and input files
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Read properties from a JAR manifest
    #[command(disable_help_flag = true, disable_version_flag = true)]
    ManifestProperty {
        /// Manifest or JAR file, then property names
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

impl Command {
    pub fn args(&self) -> &[String] {
        match self {
            Command::Json { args }
            | Command::JsonToSwitches { args }
            | Command::ManifestProperty { args } => args,
        }
    }
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subcommand_switches_pass_through_untouched() {
        let cli = Cli::try_parse_from([
            "adpn",
            "json",
            "--key=Ingest Title",
            "--output=application/json",
            "-",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Json { .. }));
        assert_eq!(
            cli.command.args(),
            ["--key=Ingest Title", "--output=application/json", "-"]
        );
    }

    #[test]
    fn help_is_left_to_the_script() {
        let cli = Cli::try_parse_from(["adpn", "json-to-switches", "--help"]).unwrap();
        assert_eq!(cli.command.args(), ["--help"]);
    }

    #[test]
    fn config_dir_precedes_the_subcommand() {
        let cli =
            Cli::try_parse_from(["adpn", "--config-dir", "/etc/adpn", "manifest-property", "x"])
                .unwrap();
        assert_eq!(cli.config_dir, Some(PathBuf::from("/etc/adpn")));
        assert_eq!(cli.command.args(), ["x"]);
    }
}
