//! Data store operations.

use anyhow::Result;
use std::path::Path;

use crate::backup::BackupStore;
use crate::config::{Config, FocusPaths};

/// Load config from store.
pub fn load_config(paths: &FocusPaths) -> Result<Config> {
    Config::load(paths)
}

/// Save config to store.
pub fn save_config(paths: &FocusPaths, config: &Config) -> Result<()> {
    Config::save(config, paths)
}

/// Backup store for this run: `--backup-dir`, then config.toml, then `<data>/backups`.
pub fn backup_store(paths: &FocusPaths, config: &Config, flag: Option<&Path>) -> BackupStore {
    let dir = flag
        .map(Path::to_path_buf)
        .or_else(|| config.backup_dir.clone())
        .unwrap_or_else(|| paths.backups_dir.clone());
    BackupStore::new(dir)
}
