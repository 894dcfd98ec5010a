#![allow(dead_code)]

use anyhow::{bail, Result};
use assert_cmd::cargo;
use rust_decimal::Decimal;
use serde_json::Value;
use std::process::{Command, Output};
use std::str::FromStr;
use tempfile::TempDir;

pub const PRICES_DIR: &str = "tests/fixtures/prices";

/// Command with an isolated HOME/config dir, offline prices and no colors
pub fn base_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("marketdash"));
    cmd.env("HOME", home.path());
    cmd.env("XDG_CONFIG_HOME", home.path().join(".config"));
    cmd.env_remove("MARKETDASH_DATA_DIR");
    cmd.env_remove("MARKETDASH_BASE_URL");
    cmd.env_remove("RUST_LOG");
    cmd.arg("--no-color").arg("--data-dir").arg(PRICES_DIR);
    cmd
}

pub fn run_cmd(home: &TempDir, args: &[&str]) -> Result<Output> {
    let mut cmd = base_cmd(home);
    cmd.args(args);
    let output = cmd.output()?;
    if !output.status.success() {
        bail!(
            "command failed: {:?}\nstdout: {}\nstderr: {}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

/// Run with `--json` and parse stdout, whatever the exit status
pub fn run_json(home: &TempDir, args: &[&str]) -> Result<Value> {
    let mut cmd = base_cmd(home);
    cmd.arg("--json").args(args);
    let output = cmd.output()?;
    Ok(serde_json::from_slice(&output.stdout)?)
}

/// Decimal field of a JSON object, stored as a string
pub fn decimal_field(value: &Value, key: &str) -> Decimal {
    let raw = value[key]
        .as_str()
        .unwrap_or_else(|| panic!("missing string field {}", key));
    Decimal::from_str(raw).unwrap_or_else(|e| panic!("bad decimal {}: {}", raw, e))
}
