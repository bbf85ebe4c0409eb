//! Configuration loading and path resolution.
//!
//! Supports FOCUS_HOME env var override for testing.

use anyhow::Result;
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use crate::hosts::DEFAULT_REDIRECT_IP;

/// Paths for the focus data store.
#[derive(Debug, Clone)]
pub struct FocusPaths {
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
    pub backups_dir: PathBuf,
    pub session_file: PathBuf,
}

impl FocusPaths {
    /// Build paths from base directory (e.g. ProjectDirs data dir or FOCUS_HOME).
    pub fn from_base(base: PathBuf) -> Self {
        Self {
            config_file: base.join("config.toml"),
            backups_dir: base.join("backups"),
            session_file: base.join("session.json"),
            data_dir: base,
        }
    }

    /// Paths for testing: use a temp dir as base.
    pub fn for_test(base: impl AsRef<Path>) -> Self {
        Self::from_base(base.as_ref().to_path_buf())
    }

    /// Get default focus paths (respects FOCUS_HOME).
    pub fn default_paths() -> Self {
        let base = if let Ok(home) = std::env::var("FOCUS_HOME") {
            PathBuf::from(home)
        } else if let Some(dirs) = directories::ProjectDirs::from("", "", "focus") {
            dirs.data_dir().to_path_buf()
        } else {
            PathBuf::from(".focus")
        };
        Self::from_base(base)
    }
}

/// config.toml structure. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Config {
    /// Address blocked domains resolve to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_ip: Option<IpAddr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,
}

impl Config {
    /// Load config from paths (with shared lock when file exists).
    pub fn load(paths: &FocusPaths) -> Result<Config> {
        if paths.config_file.is_file() {
            let mut file = fs::OpenOptions::new().read(true).open(&paths.config_file)?;
            fs2::FileExt::lock_shared(&file)?;
            use std::io::Read;
            let mut s = String::new();
            file.read_to_string(&mut s)?;
            let cfg: Config = toml::from_str(&s)?;
            Ok(cfg)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to paths (with exclusive lock). Creates parent dirs if needed.
    pub fn save(&self, paths: &FocusPaths) -> Result<()> {
        if let Some(p) = paths.config_file.parent() {
            fs::create_dir_all(p)?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&paths.config_file)?;
        fs2::FileExt::lock_exclusive(&file)?;
        let s = toml::to_string_pretty(self)?;
        use std::io::Write;
        file.write_all(s.as_bytes())?;
        Ok(())
    }

    pub fn redirect_ip(&self) -> IpAddr {
        self.redirect_ip.unwrap_or(DEFAULT_REDIRECT_IP)
    }
}
