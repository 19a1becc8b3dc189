mod cli;
mod commands;
mod output;
mod packet;
mod packet_store;
mod selector;
mod stage;
mod switches;
mod util;

use cli::{Cli, Command};
use commands::Script;
use output::OutputError;
use stage::{StageError, StageExitCode};
use std::fmt as stdfmt;
use std::io::{IsTerminal, stderr};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Event, Level, Subscriber, debug, error};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt as tracing_fmt;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

fn script_for(command: &Command) -> &'static Script {
    match command {
        Command::Json { .. } => &commands::json::SCRIPT,
        Command::JsonToSwitches { .. } => &commands::json_to_switches::SCRIPT,
        Command::ManifestProperty { .. } => &commands::manifest_property::SCRIPT,
    }
}

/// The directory holding the `adpn` executable, where settings live by default.
fn default_config_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    if let Some(err) = err.downcast_ref::<StageError>() {
        err.exit_code()
    } else if err.downcast_ref::<OutputError>().is_some() {
        StageExitCode::output_error()
    } else {
        StageExitCode::usage_error()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let script = script_for(&cli.command);

    let config_dir = cli.config_dir.clone().unwrap_or_else(default_config_dir);

    let options = match script
        .resolve(cli.command.args(), &config_dir)
        .and_then(|options| options.verbosity().map(|verbosity| (options, verbosity)))
    {
        Ok((options, verbosity)) => {
            init_tracing(script.name, verbosity);
            options
        }
        Err(err) => {
            init_tracing(script.name, 0);
            error!("{err}");
            return StageExitCode::usage_error();
        }
    };

    stage::trap_interrupt(script.name);
    debug!("Settings and defaults from {}", config_dir.display());

    if options.switched("help") {
        print!("{}", script.usage);
        return ExitCode::SUCCESS;
    }
    if options.switched("version") {
        println!("{} {}", script.name, env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    match (script.run)(&options) {
        Ok(exit_code) => exit_code,
        Err(err) => {
            error!("{err:#}");
            exit_code_for(&err)
        }
    }
}

fn init_tracing(script: &'static str, verbosity: i64) {
    let stderr_is_terminal = stderr().is_terminal();
    let formatter = ScriptFormatter {
        script,
        stderr_is_terminal,
    };

    let default_level = match verbosity {
        i64::MIN..=0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = tracing_fmt::layer()
        .event_format(formatter)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Prefixes every diagnostic with `[script]` and its level.
struct ScriptFormatter {
    script: &'static str,
    stderr_is_terminal: bool,
}

impl<S, N> FormatEvent<S, N> for ScriptFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        if self.stderr_is_terminal {
            match *event.metadata().level() {
                Level::DEBUG => write!(writer, "🔍 ")?,
                Level::INFO => write!(writer, "ℹ️ ")?,
                Level::WARN => write!(writer, "⚠️  ")?,
                Level::ERROR => write!(writer, "❌️ ")?,
                _ => {}
            }
        } else {
            match *event.metadata().level() {
                Level::DEBUG => writer.write_str("DEBUG: ")?,
                Level::INFO => writer.write_str("INFO: ")?,
                Level::WARN => writer.write_str("WARN: ")?,
                Level::ERROR => writer.write_str("ERROR: ")?,
                _ => {}
            }
        }
        write!(writer, "[{}] ", self.script)?;

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
