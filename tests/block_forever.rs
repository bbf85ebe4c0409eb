//! Forever mode: entries persist until restore or unblock.

mod common;

use focus::backup::BackupStore;
use focus::hosts;
use focus::platform::FileHostsEditor;
use focus::session::{Expiry, HostsBlocker, Outcome, Session};
use std::fs;

#[test]
fn forever_then_restore() {
    let dir = common::temp_focus_home();
    let hosts_path = common::write_hosts(dir.path(), common::HOSTS);
    let session_file = dir.path().join("session.json");
    let editor = FileHostsEditor::new(&hosts_path);
    let store = BackupStore::new(dir.path().join("backups"));
    let blocker = HostsBlocker::new(&editor, &store).session_file(&session_file);

    let session = Session::new(&["a.com"], Expiry::Never, true).unwrap();
    let report = blocker.block(&session).unwrap();
    assert_eq!(report.outcome, Outcome::Persistent);

    let blocked = fs::read_to_string(&hosts_path).unwrap();
    assert_eq!(blocked, format!("{}127.0.0.1\ta.com\t# blocked by focus\n", common::HOSTS));

    let status = blocker.status().unwrap();
    assert_eq!(status.entries.len(), 1);
    let record = status.session.expect("session record");
    assert_eq!(record.backup_hash, report.backup_hash);
    assert_eq!(record.domains, vec!["a.com"]);
    assert!(record.expires_at.is_none());

    let full = blocker.restore(&report.backup_hash[..10]).unwrap();
    assert_eq!(full, report.backup_hash);
    assert_eq!(fs::read_to_string(&hosts_path).unwrap(), common::HOSTS);
    assert!(!session_file.exists());

    // Backup stays usable.
    fs::write(&hosts_path, "garbage").unwrap();
    blocker.restore(&report.backup_hash).unwrap();
    assert_eq!(fs::read_to_string(&hosts_path).unwrap(), common::HOSTS);
}

#[test]
fn unblock_keeps_later_edits() {
    let dir = common::temp_focus_home();
    let hosts_path = common::write_hosts(dir.path(), common::HOSTS);
    let editor = FileHostsEditor::new(&hosts_path);
    let store = BackupStore::new(dir.path().join("backups"));
    let blocker = HostsBlocker::new(&editor, &store);

    blocker
        .block(&Session::new(&["a.com", "b.com"], Expiry::Never, true).unwrap())
        .unwrap();
    let mut edited = fs::read_to_string(&hosts_path).unwrap();
    edited.push_str("192.168.1.9 printer.lan\n");
    fs::write(&hosts_path, &edited).unwrap();

    assert_eq!(blocker.unblock().unwrap(), 2);
    let after = fs::read_to_string(&hosts_path).unwrap();
    assert!(hosts::tagged_entries(&after).is_empty());
    assert_eq!(after, format!("{}192.168.1.9 printer.lan\n", common::HOSTS));

    assert_eq!(blocker.unblock().unwrap(), 0);
}
