//! Error taxonomy and process exit codes.

use std::io;
use std::path::{Path, PathBuf};

/// Errors surfaced by block, restore, and the backup store.
#[derive(Debug, thiserror::Error)]
pub enum FocusError {
    #[error("permission denied: cannot {action} {}", path.display())]
    Permission { action: &'static str, path: PathBuf },

    #[error("backup not found: {0}")]
    NotFound(String),

    #[error("backup prefix '{prefix}' is ambiguous ({matches} matches)")]
    Ambiguous { prefix: String, matches: usize },

    #[error("{0}")]
    Parse(String),

    /// Building the timer runtime or installing signal handlers failed.
    #[error("failed to set up timer and signal handling: {0}")]
    Runtime(#[source] io::Error),

    /// Entries were written but could not be removed again.
    #[error("could not remove block entries; run 'focus unblock' or 'focus restore {backup_hash}'")]
    Cleanup {
        backup_hash: String,
        #[source]
        source: Box<FocusError>,
    },

    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FocusError {
    /// Wrap an I/O error; permission failures get their own variant.
    pub fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            FocusError::Permission {
                action,
                path: path.to_path_buf(),
            }
        } else {
            FocusError::Io {
                action,
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            FocusError::Parse(_) => 64,
            FocusError::NotFound(_) | FocusError::Ambiguous { .. } => 66,
            FocusError::Permission { .. } => 77,
            FocusError::Cleanup { source, .. } => source.exit_code(),
            FocusError::Runtime(_) | FocusError::Io { .. } => 1,
        }
    }
}

/// Exit code for an error coming out of the CLI layer.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|e| e.downcast_ref::<FocusError>())
        .map(FocusError::exit_code)
        .unwrap_or(1)
}
