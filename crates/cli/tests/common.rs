// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// `courier` bound to `temp` as its state directory, with the network
/// reported as down so enqueue never delivers on its own.
pub fn courier(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("courier");
    cmd.env("COURIER_STATE_DIR", temp.path())
        .env("COURIER_OFFLINE", "1")
        .env_remove("COURIER_CONFIG")
        .env_remove("COURIER_LOG")
        .env_remove("XDG_STATE_HOME");
    cmd
}

/// Like [`courier`], but online.
pub fn courier_online(temp: &TempDir) -> Command {
    let mut cmd = courier(temp);
    cmd.env_remove("COURIER_OFFLINE");
    cmd
}

/// Write `config.toml` into the state directory.
pub fn write_config(temp: &TempDir, toml: &str) {
    std::fs::write(temp.path().join("config.toml"), toml).unwrap();
}

/// Enqueue a request and return its id.
pub fn enqueue(temp: &TempDir, args: &[&str]) -> i64 {
    let output = courier(temp)
        .arg("enqueue")
        .args(args)
        .args(["-o", "json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "enqueue failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    value["id"].as_i64().unwrap()
}

/// Parsed `courier list -o json` output.
pub fn list_json(temp: &TempDir) -> serde_json::Value {
    let output = courier(temp).args(["list", "-o", "json"]).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}
