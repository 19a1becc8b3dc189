use assert_cmd::{Command, cargo::cargo_bin_cmd};
use std::path::Path;
use std::process::Output;

/// `adpn` with settings and defaults read from `config_dir` only.
pub fn adpn_cmd(config_dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("adpn");
    cmd.env_remove("RUST_LOG").arg("--config-dir").arg(config_dir);
    cmd
}

/// Runs `adpn json` with `stdin` piped in.
#[allow(dead_code)]
pub fn json_output(config_dir: &Path, args: &[&str], stdin: &str) -> Output {
    let mut cmd = adpn_cmd(config_dir);
    cmd.arg("json").args(args).write_stdin(stdin);
    cmd.output().expect("failed to run `adpn json`")
}

// Each integration test file is compiled as its own crate, and not every one
// reads stdout as text.
#[allow(dead_code)]
pub fn stdout_text(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout should be UTF-8")
}
