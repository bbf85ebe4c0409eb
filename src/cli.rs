//! CLI definitions and command routing.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, FocusPaths};
use crate::error::FocusError;
use crate::platform;
use crate::session::{Expiry, HostsBlocker, Outcome, Session};
use crate::{duration, store};

#[derive(Parser)]
#[command(name = "focus")]
#[command(about = "Block distracting domains via the hosts file for a while")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub block: BlockArgs,
}

#[derive(Args)]
pub struct BlockArgs {
    /// Domains to block (e.g. youtube.com news.ycombinator.com)
    pub domains: Vec<String>,

    /// How long to block: 10s, 25m, 1h, 2d; several values are added up
    #[arg(short = 't', long = "time", value_name = "DURATION", num_args = 1.., value_parser = duration::parse_duration, conflicts_with = "never_ending")]
    pub time: Vec<Duration>,

    /// Block with no expiry, until 'focus restore' or 'focus unblock'
    #[arg(short = 'n', long)]
    pub never_ending: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Clone, Default)]
pub struct CommonArgs {
    /// No countdown and no informational output
    #[arg(short, long)]
    pub quiet: bool,

    /// Directory where hosts file backups are stored
    #[arg(short = 'b', long, value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Overwrite the hosts file with a backup (hash or unique prefix, as printed when blocking)
    Restore {
        hash: String,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Remove every focus entry from the hosts file, keeping other edits
    Unblock {
        #[arg(short, long)]
        quiet: bool,
    },
    /// Show the active block and the focus entries in the hosts file
    Status,
    /// List stored backups, newest first
    Backups {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Show or edit config.toml
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Print data directory and effective settings
    Show,
    /// Set a key in config.toml
    Set {
        #[arg(value_enum)]
        key: ConfigKey,
        value: String,
    },
    /// Remove a key from config.toml (back to the default)
    Unset {
        #[arg(value_enum)]
        key: ConfigKey,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ConfigKey {
    /// Address blocked domains resolve to (default 127.0.0.1)
    RedirectIp,
    /// Hosts file to edit (default: the system hosts file)
    HostsFile,
    /// Backup directory (default: <data dir>/backups)
    BackupDir,
}

impl Cli {
    fn quiet(&self) -> bool {
        match &self.command {
            None => self.block.common.quiet,
            Some(Commands::Restore { common, .. }) | Some(Commands::Backups { common }) => common.quiet,
            Some(Commands::Unblock { quiet }) => *quiet,
            Some(Commands::Status) | Some(Commands::Config { .. }) => false,
        }
    }
}

/// Diagnostics go to stderr; FOCUS_LOG overrides the level.
fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_env("FOCUS_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Run CLI and dispatch to handlers.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet());
    let paths = FocusPaths::default_paths();
    let config = store::load_config(&paths)?;

    match cli.command {
        None => cmd_block(&paths, &config, cli.block),
        Some(Commands::Restore { hash, common }) => cmd_restore(&paths, &config, &hash, &common),
        Some(Commands::Unblock { quiet }) => cmd_unblock(&paths, &config, quiet),
        Some(Commands::Status) => cmd_status(&paths, &config),
        Some(Commands::Backups { common }) => cmd_backups(&paths, &config, &common),
        Some(Commands::Config { cmd }) => cmd_config(&paths, config, cmd),
    }
}

fn cmd_block(paths: &FocusPaths, config: &Config, args: BlockArgs) -> Result<()> {
    let expiry = if args.never_ending {
        Expiry::Never
    } else if !args.time.is_empty() {
        Expiry::After(duration::total(&args.time)?)
    } else if args.domains.is_empty() {
        return Err(FocusError::Parse("no domains given; see 'focus --help'".into()).into());
    } else {
        return Err(FocusError::Parse("say how long to block with -t <duration>, or -n for no expiry".into()).into());
    };
    let quiet = args.common.quiet;
    let session = Session::new(&args.domains, expiry, quiet)?;

    let editor = platform::default_hosts_editor(config);
    let backups = store::backup_store(paths, config, args.common.backup_dir.as_deref());
    let blocker = HostsBlocker::new(editor.as_ref(), &backups)
        .redirect_ip(config.redirect_ip())
        .session_file(&paths.session_file);

    let report = blocker
        .block(&session)
        .map_err(with_privilege_hint)
        .with_context(|| format!("block {}", session.domains.join(", ")))?;

    match report.outcome {
        Outcome::Persistent => {
            println!("Blocked: {}", session.domains.join(", "));
            println!("Backup: {}", report.backup_hash);
            println!("Run 'focus restore {}' or 'focus unblock' to lift the block.", report.backup_hash);
        }
        Outcome::Expired if !quiet => println!("Time is up; unblocked {} domain(s)", report.removed),
        Outcome::Interrupted if !quiet => println!("Stopped early; unblocked {} domain(s)", report.removed),
        Outcome::Expired | Outcome::Interrupted => {}
    }
    Ok(())
}

/// What to tell the user when the hosts file refused a write.
fn privilege_hint(err: &FocusError, elevated: Option<bool>) -> Option<&'static str> {
    let denied = match err {
        FocusError::Permission { .. } => true,
        FocusError::Cleanup { source, .. } => matches!(**source, FocusError::Permission { .. }),
        _ => false,
    };
    match (denied, elevated) {
        (false, _) | (true, Some(true)) => None,
        (true, Some(false)) => Some("not running as root; try again with sudo"),
        (true, None) => Some("run from an elevated (Administrator) prompt"),
    }
}

fn with_privilege_hint(err: FocusError) -> anyhow::Error {
    match privilege_hint(&err, platform::is_elevated()) {
        Some(hint) => anyhow::Error::new(err).context(hint),
        None => err.into(),
    }
}

fn cmd_restore(paths: &FocusPaths, config: &Config, hash: &str, common: &CommonArgs) -> Result<()> {
    let editor = platform::default_hosts_editor(config);
    let backups = store::backup_store(paths, config, common.backup_dir.as_deref());
    let blocker = HostsBlocker::new(editor.as_ref(), &backups).session_file(&paths.session_file);
    let full = blocker
        .restore(hash)
        .map_err(with_privilege_hint)
        .with_context(|| format!("restore {}", editor.path().display()))?;
    if !common.quiet {
        println!("Restored {} from backup {full}", editor.path().display());
    }
    Ok(())
}

fn cmd_unblock(paths: &FocusPaths, config: &Config, quiet: bool) -> Result<()> {
    let editor = platform::default_hosts_editor(config);
    let backups = store::backup_store(paths, config, None);
    let blocker = HostsBlocker::new(editor.as_ref(), &backups).session_file(&paths.session_file);
    let removed = blocker.unblock().map_err(with_privilege_hint).context("unblock")?;
    if !quiet {
        println!("Removed {removed} focus entries from {}", editor.path().display());
    }
    Ok(())
}

fn cmd_status(paths: &FocusPaths, config: &Config) -> Result<()> {
    let editor = platform::default_hosts_editor(config);
    let backups = store::backup_store(paths, config, None);
    let blocker = HostsBlocker::new(editor.as_ref(), &backups).session_file(&paths.session_file);
    let status = blocker.status().context("status")?;

    match &status.session {
        Some(s) => {
            println!("Session started {} (backup {})", s.started_at, s.backup_hash);
            match &s.expires_at {
                Some(t) => println!("  expires: {t}"),
                None => println!("  expires: never"),
            }
        }
        None => println!("No active session"),
    }
    if status.entries.is_empty() {
        println!("No focus entries in {}", editor.path().display());
    } else {
        for e in &status.entries {
            println!("{}\t{}", e.domain, e.ip);
        }
    }
    Ok(())
}

fn cmd_backups(paths: &FocusPaths, config: &Config, common: &CommonArgs) -> Result<()> {
    let backups = store::backup_store(paths, config, common.backup_dir.as_deref());
    for b in backups.list().context("list backups")? {
        let saved = b
            .saved_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{}\t{}\t{} bytes", b.hash, saved, b.size);
    }
    Ok(())
}

fn cmd_config(paths: &FocusPaths, mut config: Config, cmd: ConfigCmd) -> Result<()> {
    match cmd {
        ConfigCmd::Show => {
            let editor = platform::default_hosts_editor(&config);
            let backups = store::backup_store(paths, &config, None);
            println!("data_dir\t{}", paths.data_dir.display());
            println!("config_file\t{}", paths.config_file.display());
            println!("redirect_ip\t{}", config.redirect_ip());
            println!("hosts_file\t{}", editor.path().display());
            println!("backup_dir\t{}", backups.dir().display());
            Ok(())
        }
        ConfigCmd::Set { key, value } => {
            match key {
                ConfigKey::RedirectIp => {
                    let ip = value
                        .parse()
                        .map_err(|_| FocusError::Parse(format!("'{value}' is not an IP address")))?;
                    config.redirect_ip = Some(ip);
                }
                ConfigKey::HostsFile => config.hosts_file = Some(PathBuf::from(&value)),
                ConfigKey::BackupDir => config.backup_dir = Some(PathBuf::from(&value)),
            }
            store::save_config(paths, &config)?;
            println!("Saved {}", paths.config_file.display());
            Ok(())
        }
        ConfigCmd::Unset { key } => {
            match key {
                ConfigKey::RedirectIp => config.redirect_ip = None,
                ConfigKey::HostsFile => config.hosts_file = None,
                ConfigKey::BackupDir => config.backup_dir = None,
            }
            store::save_config(paths, &config)?;
            println!("Saved {}", paths.config_file.display());
            Ok(())
        }
    }
}
