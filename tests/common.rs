//! Shared test helpers.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const HOSTS: &str = "127.0.0.1\tlocalhost\n::1\tlocalhost\n# keep me\n10.0.0.2 nas.lan\n";

/// Create a temp directory for use as FOCUS_HOME.
pub fn temp_focus_home() -> TempDir {
    tempfile::Builder::new()
        .prefix("focus_test_")
        .tempdir()
        .expect("temp dir")
}

/// Write a hosts file with `content` inside `dir`.
pub fn write_hosts(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("hosts");
    std::fs::write(&path, content).unwrap();
    path
}

/// `focus` binary pointed at a temp data dir and hosts file.
pub fn focus_cmd(home: &Path, hosts: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("focus").unwrap();
    cmd.env("FOCUS_HOME", home)
        .env("FOCUS_HOSTS_FILE", hosts)
        .env_remove("FOCUS_LOG");
    cmd
}
