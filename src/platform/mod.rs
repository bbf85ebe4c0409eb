//! Platform abstraction for the hosts file.

#[cfg(unix)]
pub mod unix;

#[cfg(windows)]
pub mod windows;

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::FocusError;

/// Access to the hosts file. Every block/restore operation takes one of these
/// instead of touching a global path.
pub trait HostsEditor: Send + Sync {
    /// Path being edited (for messages).
    fn path(&self) -> &Path;
    /// Read the whole file.
    fn read(&self) -> Result<String, FocusError>;
    /// Fail with `Permission` unless the file can be opened for writing.
    fn check_writable(&self) -> Result<(), FocusError>;
    /// Replace the whole file with `content`.
    fn write(&self, content: &str) -> Result<(), FocusError>;
}

/// Platform hosts file location.
pub fn system_hosts_path() -> PathBuf {
    #[cfg(unix)]
    return unix::hosts_path();

    #[cfg(windows)]
    return windows::hosts_path();
}

/// Whether the process runs with root rights; `None` where there is no cheap check.
pub fn is_elevated() -> Option<bool> {
    #[cfg(unix)]
    return Some(unix::is_elevated());

    #[cfg(windows)]
    return None;
}

/// Get the hosts editor for this run.
/// FOCUS_HOSTS_FILE (e.g. in tests) wins over `hosts_file` in config.toml.
pub fn default_hosts_editor(config: &Config) -> Box<dyn HostsEditor> {
    let path = std::env::var_os("FOCUS_HOSTS_FILE")
        .map(PathBuf::from)
        .or_else(|| config.hosts_file.clone())
        .unwrap_or_else(system_hosts_path);
    Box::new(FileHostsEditor::new(path))
}

/// HostsEditor backed by a plain file, written in place under an exclusive lock.
#[derive(Debug, Clone)]
pub struct FileHostsEditor {
    path: PathBuf,
}

impl FileHostsEditor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HostsEditor for FileHostsEditor {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<String, FocusError> {
        let mut file = fs::File::open(&self.path).map_err(|e| FocusError::io("read", &self.path, e))?;
        let mut s = String::new();
        file.read_to_string(&mut s)
            .map_err(|e| FocusError::io("read", &self.path, e))?;
        Ok(s)
    }

    fn check_writable(&self) -> Result<(), FocusError> {
        fs::OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map(drop)
            .map_err(|e| FocusError::io("write", &self.path, e))
    }

    fn write(&self, content: &str) -> Result<(), FocusError> {
        let err = |e| FocusError::io("write", &self.path, e);
        // Truncate only after the lock is held; /etc/hosts may be a symlink so no rename.
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(err)?;
        fs2::FileExt::lock_exclusive(&file).map_err(err)?;
        file.set_len(0).map_err(err)?;
        file.write_all(content.as_bytes()).map_err(err)?;
        file.sync_all().map_err(err)?;
        fs2::FileExt::unlock(&file).map_err(err)?;
        Ok(())
    }
}
