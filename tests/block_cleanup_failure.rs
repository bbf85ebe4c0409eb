//! When removing entries fails, the error names the backup to restore from.

mod common;

use focus::backup::{content_hash, BackupStore};
use focus::error::FocusError;
use focus::platform::{FileHostsEditor, HostsEditor};
use focus::session::{Expiry, HostsBlocker, Session};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Accepts the first write, refuses the rest.
struct WriteOnce {
    inner: FileHostsEditor,
    writes: AtomicUsize,
}

impl HostsEditor for WriteOnce {
    fn path(&self) -> &Path {
        self.inner.path()
    }
    fn read(&self) -> Result<String, FocusError> {
        self.inner.read()
    }
    fn check_writable(&self) -> Result<(), FocusError> {
        self.inner.check_writable()
    }
    fn write(&self, content: &str) -> Result<(), FocusError> {
        if self.writes.fetch_add(1, Ordering::SeqCst) == 0 {
            self.inner.write(content)
        } else {
            Err(FocusError::io(
                "write",
                self.path(),
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ))
        }
    }
}

#[test]
fn failed_cleanup_reports_backup_hash() {
    let dir = common::temp_focus_home();
    let hosts_path = common::write_hosts(dir.path(), common::HOSTS);
    let editor = WriteOnce {
        inner: FileHostsEditor::new(&hosts_path),
        writes: AtomicUsize::new(0),
    };
    let store = BackupStore::new(dir.path().join("backups"));
    let blocker = HostsBlocker::new(&editor, &store);

    let session = Session::new(&["a.com"], Expiry::After(Duration::from_secs(3600)), true).unwrap();
    let err = blocker.block_until(&session, std::future::ready(())).unwrap_err();

    let hash = content_hash(common::HOSTS);
    match &err {
        FocusError::Cleanup { backup_hash, source } => {
            assert_eq!(backup_hash, &hash);
            assert!(matches!(**source, FocusError::Permission { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains(&format!("focus restore {hash}")));
    assert_eq!(store.load(&hash).unwrap(), common::HOSTS);
}
