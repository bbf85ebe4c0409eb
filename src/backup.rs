//! Content-addressed snapshots of the hosts file.
//!
//! Each backup is the verbatim file text stored under the lower-case hex
//! SHA-256 of that text, so saving the same content twice is a no-op.

use chrono::{DateTime, Local};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::FocusError;

/// Shortest prefix accepted by [`BackupStore::resolve`].
pub const MIN_PREFIX_LEN: usize = 4;

/// Hash used to name a backup of `content`.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn is_hash(name: &str) -> bool {
    name.len() == 64 && name.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// One stored snapshot, as listed by `focus backups`.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub hash: String,
    pub saved_at: Option<DateTime<Local>>,
    pub size: u64,
}

/// Directory of snapshots keyed by content hash.
#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
}

impl BackupStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, hash: &str) -> PathBuf {
        self.dir.join(hash)
    }

    /// Store `content` and return its hash. The file is synced before returning.
    pub fn save(&self, content: &str) -> Result<String, FocusError> {
        fs::create_dir_all(&self.dir).map_err(|e| FocusError::io("create backup dir", &self.dir, e))?;
        let hash = content_hash(content);
        let path = self.path_for(&hash);
        if path.is_file() {
            tracing::debug!(hash = %hash, "backup already present");
            return Ok(hash);
        }

        let tmp = self.dir.join(format!(".{hash}.tmp"));
        let err = |e| FocusError::io("write backup", &tmp, e);
        let mut file = fs::File::create(&tmp).map_err(err)?;
        file.write_all(content.as_bytes()).map_err(err)?;
        file.sync_all().map_err(err)?;
        drop(file);
        fs::rename(&tmp, &path).map_err(|e| FocusError::io("write backup", &path, e))?;

        tracing::debug!("Backup saved: {}", path.display());
        Ok(hash)
    }

    /// Load the exact content saved under `hash`.
    pub fn load(&self, hash: &str) -> Result<String, FocusError> {
        if !is_hash(hash) {
            return Err(FocusError::NotFound(hash.to_string()));
        }
        let path = self.path_for(hash);
        match fs::read_to_string(&path) {
            Ok(s) => Ok(s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FocusError::NotFound(hash.to_string())),
            Err(e) => Err(FocusError::io("read backup", &path, e)),
        }
    }

    /// Expand a (possibly abbreviated) hash to the single stored hash it names.
    pub fn resolve(&self, prefix: &str) -> Result<String, FocusError> {
        let prefix = prefix.trim().to_ascii_lowercase();
        if prefix.len() < MIN_PREFIX_LEN || prefix.len() > 64 || !prefix.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(FocusError::NotFound(prefix));
        }
        let mut matches: Vec<String> = self
            .hashes()?
            .into_iter()
            .filter(|h| h.starts_with(&prefix))
            .collect();
        match matches.len() {
            0 => Err(FocusError::NotFound(prefix)),
            1 => Ok(matches.remove(0)),
            n => Err(FocusError::Ambiguous { prefix, matches: n }),
        }
    }

    /// All stored backups, newest first.
    pub fn list(&self) -> Result<Vec<BackupInfo>, FocusError> {
        let mut out = Vec::new();
        for hash in self.hashes()? {
            let path = self.path_for(&hash);
            let meta = fs::metadata(&path).map_err(|e| FocusError::io("stat backup", &path, e))?;
            out.push(BackupInfo {
                hash,
                saved_at: meta.modified().ok().map(DateTime::<Local>::from),
                size: meta.len(),
            });
        }
        out.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then_with(|| a.hash.cmp(&b.hash)));
        Ok(out)
    }

    fn hashes(&self) -> Result<Vec<String>, FocusError> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        let entries = fs::read_dir(&self.dir).map_err(|e| FocusError::io("list backups", &self.dir, e))?;
        for e in entries {
            let e = e.map_err(|e| FocusError::io("list backups", &self.dir, e))?;
            let name = e.file_name().into_string().unwrap_or_default();
            if is_hash(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn load_rejects_non_hash_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = BackupStore::new(dir.path());
        assert!(matches!(store.load("../hosts"), Err(FocusError::NotFound(_))));
    }
}
