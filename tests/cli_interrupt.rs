//! A signal during a timed block runs cleanup before exit, even right after
//! the entries are written.

#![cfg(unix)]

mod common;

use std::fs;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

fn spawn_block(home: &Path, hosts: &Path) -> Child {
    Command::new(assert_cmd::cargo::cargo_bin("focus"))
        .args(["a.com", "b.com", "-t", "1h", "-q"])
        .env("FOCUS_HOME", home)
        .env("FOCUS_HOSTS_FILE", hosts)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap()
}

/// Poll tightly so the signal lands as soon as the entries show up.
fn wait_for_entries(hosts: &Path) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        let n = fs::read_to_string(hosts)
            .map(|c| c.matches("# blocked by focus").count())
            .unwrap_or(0);
        if n == 2 {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    false
}

fn signal_after_entries_restores(sig: i32) {
    let dir = common::temp_focus_home();
    let hosts = common::write_hosts(dir.path(), common::HOSTS);
    let mut child = spawn_block(dir.path(), &hosts);

    assert!(wait_for_entries(&hosts), "entries never appeared");
    unsafe {
        libc::kill(child.id() as i32, sig);
    }
    let status = child.wait().unwrap();
    assert!(status.success(), "exit status {status:?}");
    assert_eq!(fs::read_to_string(&hosts).unwrap(), common::HOSTS);
}

#[test]
fn sigint_removes_entries() {
    for _ in 0..10 {
        signal_after_entries_restores(libc::SIGINT);
    }
}

#[test]
fn sigterm_removes_entries() {
    for _ in 0..5 {
        signal_after_entries_restores(libc::SIGTERM);
    }
}
