//! Unix (macOS, Linux) platform details.

use std::path::PathBuf;

pub fn hosts_path() -> PathBuf {
    PathBuf::from("/etc/hosts")
}

/// Effective uid 0.
pub fn is_elevated() -> bool {
    unsafe { libc::geteuid() == 0 }
}
