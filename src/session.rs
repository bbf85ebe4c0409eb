//! Blocking sessions: add tagged entries, wait, clean up; restore from backup.
//!
//! Per invocation the hosts file goes through
//! `IDLE -> BACKED_UP -> BLOCKING -> (EXPIRED | INTERRUPTED) -> CLEANED_UP`,
//! or `IDLE -> BACKED_UP -> BLOCKING_PERSISTENT` in forever mode.

use anyhow::Context;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fs;
use std::future::Future;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::time::Instant;

use crate::backup::BackupStore;
use crate::duration::format_remaining;
use crate::error::FocusError;
use crate::hosts::{self, HostEntry, DEFAULT_REDIRECT_IP};
use crate::platform::HostsEditor;

/// How long a block lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    After(Duration),
    /// Entries stay until `restore` or `unblock`.
    Never,
}

/// Domains to block plus how long and how loudly.
#[derive(Debug, Clone)]
pub struct Session {
    pub domains: Vec<String>,
    pub expiry: Expiry,
    pub quiet: bool,
}

impl Session {
    /// Validates and de-duplicates `domains`; zero-length expiry is rejected.
    pub fn new<S: AsRef<str>>(domains: &[S], expiry: Expiry, quiet: bool) -> Result<Self, FocusError> {
        let domains = hosts::normalize_domains(domains)?;
        if expiry == Expiry::After(Duration::ZERO) {
            return Err(FocusError::Parse("duration must be greater than zero".into()));
        }
        Ok(Self {
            domains,
            expiry,
            quiet,
        })
    }
}

/// How a block ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Expired,
    Interrupted,
    /// Forever mode: entries were left in place.
    Persistent,
}

#[derive(Debug, Clone)]
pub struct BlockReport {
    pub backup_hash: String,
    pub outcome: Outcome,
    /// Tagged lines removed at the end (0 in forever mode).
    pub removed: usize,
}

/// Active-session record stored in session.json.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionRecord {
    pub backup_hash: String,
    pub domains: Vec<String>,
    pub started_at: String,
    pub expires_at: Option<String>,
}

impl SessionRecord {
    fn read(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let s = fs::read_to_string(path).context("read session.json")?;
        let record = serde_json::from_str(&s).context("parse session.json")?;
        Ok(Some(record))
    }

    fn write(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(p) = path.parent() {
            fs::create_dir_all(p)?;
        }
        let s = serde_json::to_string_pretty(self)?;
        fs::write(path, s).context("write session.json")?;
        Ok(())
    }

    fn clear(path: &Path) -> anyhow::Result<()> {
        if path.is_file() {
            fs::remove_file(path).context("remove session.json")?;
        }
        Ok(())
    }
}

/// What `focus status` reports.
#[derive(Debug, Clone)]
pub struct Status {
    pub session: Option<SessionRecord>,
    pub entries: Vec<HostEntry>,
}

/// Remove every tagged entry from the hosts file. Returns how many were removed;
/// a file with none is not rewritten, so calling this twice is harmless.
pub fn remove_entries(editor: &dyn HostsEditor) -> Result<usize, FocusError> {
    let content = editor.read()?;
    let removed = hosts::tagged_entries(&content).len();
    if removed > 0 {
        editor.write(&hosts::strip_entries(&content))?;
    }
    Ok(removed)
}

/// Owns the entries of a timed block until released; dropping it unreleased
/// (early return, panic) still removes them.
struct ActiveBlock<'a> {
    editor: &'a dyn HostsEditor,
    backup_hash: String,
    released: bool,
}

impl<'a> ActiveBlock<'a> {
    fn new(editor: &'a dyn HostsEditor, backup_hash: &str) -> Self {
        Self {
            editor,
            backup_hash: backup_hash.to_string(),
            released: false,
        }
    }

    /// A failure carries the backup hash so the user can still get back.
    fn release(mut self) -> Result<usize, FocusError> {
        self.released = true;
        remove_entries(self.editor).map_err(|e| FocusError::Cleanup {
            backup_hash: std::mem::take(&mut self.backup_hash),
            source: Box::new(e),
        })
    }
}

impl Drop for ActiveBlock<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match remove_entries(self.editor) {
            Ok(n) => tracing::warn!("Removed {n} block entries after an aborted session"),
            Err(e) => tracing::error!(
                "Could not remove block entries from {}: {e}; run 'focus unblock' or 'focus restore {}'",
                self.editor.path().display(),
                self.backup_hash
            ),
        }
    }
}

/// Blocks domains in a hosts file and restores it from backups.
pub struct HostsBlocker<'a> {
    editor: &'a dyn HostsEditor,
    store: &'a BackupStore,
    redirect_ip: IpAddr,
    session_file: Option<PathBuf>,
}

impl<'a> HostsBlocker<'a> {
    pub fn new(editor: &'a dyn HostsEditor, store: &'a BackupStore) -> Self {
        Self {
            editor,
            store,
            redirect_ip: DEFAULT_REDIRECT_IP,
            session_file: None,
        }
    }

    pub fn redirect_ip(mut self, ip: IpAddr) -> Self {
        self.redirect_ip = ip;
        self
    }

    /// Keep an active-session record at `path` (session.json).
    pub fn session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    /// Block for the session's duration, cleaning up on expiry, Ctrl-C, or SIGTERM.
    ///
    /// For a timed block the signal handlers are installed before the hosts file
    /// is touched, so an early Ctrl-C still goes through cleanup.
    pub fn block(&self, session: &Session) -> Result<BlockReport, FocusError> {
        let rt = timer_runtime()?;
        let shutdown = match session.expiry {
            Expiry::After(_) => {
                let _ctx = rt.enter();
                Some(Shutdown::arm().map_err(FocusError::Runtime)?)
            }
            Expiry::Never => None,
        };
        let interrupt = async move {
            match shutdown {
                Some(shutdown) => shutdown.recv().await,
                None => std::future::pending::<()>().await,
            }
        };
        self.block_on(&rt, session, interrupt)
    }

    /// Like [`block`](Self::block), but a timed block ends when `interrupt` completes
    /// instead of on a signal.
    pub fn block_until<F>(&self, session: &Session, interrupt: F) -> Result<BlockReport, FocusError>
    where
        F: Future<Output = ()>,
    {
        let rt = timer_runtime()?;
        self.block_on(&rt, session, interrupt)
    }

    fn block_on<F>(&self, rt: &Runtime, session: &Session, interrupt: F) -> Result<BlockReport, FocusError>
    where
        F: Future<Output = ()>,
    {
        let current = self.editor.read()?;
        self.editor.check_writable()?;
        let backup_hash = self.store.save(&current)?;
        tracing::info!("Backup {backup_hash} (undo with 'focus restore {backup_hash}')");

        let entries: Vec<HostEntry> = session
            .domains
            .iter()
            .map(|d| HostEntry::new(self.redirect_ip, d.as_str()))
            .collect();
        self.editor.write(&hosts::with_entries(&current, &entries))?;
        let guard = match session.expiry {
            Expiry::After(_) => Some(ActiveBlock::new(self.editor, &backup_hash)),
            Expiry::Never => None,
        };
        tracing::info!("Blocked: {}", session.domains.join(", "));
        self.record_start(&backup_hash, session);

        let (Expiry::After(total), Some(guard)) = (session.expiry, guard) else {
            return Ok(BlockReport {
                backup_hash,
                outcome: Outcome::Persistent,
                removed: 0,
            });
        };

        let outcome = wait_out(rt, total, countdown_target(session.quiet), interrupt);
        if outcome == Outcome::Interrupted {
            tracing::warn!("Interrupted; removing block entries");
        }
        let removed = guard.release()?;
        self.clear_record();
        tracing::info!("{} restored", self.editor.path().display());
        Ok(BlockReport {
            backup_hash,
            outcome,
            removed,
        })
    }

    /// Overwrite the hosts file with the backup named by `hash` (or an unambiguous prefix).
    /// Returns the full hash. The backup is kept.
    pub fn restore(&self, hash: &str) -> Result<String, FocusError> {
        let full = self.store.resolve(hash)?;
        let content = self.store.load(&full)?;
        self.editor.write(&content)?;
        self.clear_record();
        tracing::info!("{} restored from backup {full}", self.editor.path().display());
        Ok(full)
    }

    /// Remove all tagged entries, leaving the rest of the file as it is now.
    pub fn unblock(&self) -> Result<usize, FocusError> {
        let removed = remove_entries(self.editor)?;
        self.clear_record();
        Ok(removed)
    }

    pub fn status(&self) -> Result<Status, FocusError> {
        let content = self.editor.read()?;
        let session = match &self.session_file {
            Some(path) => SessionRecord::read(path).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable session record: {e:#}");
                None
            }),
            None => None,
        };
        Ok(Status {
            session,
            entries: hosts::tagged_entries(&content),
        })
    }

    fn record_start(&self, backup_hash: &str, session: &Session) {
        let Some(path) = &self.session_file else {
            return;
        };
        let now = chrono::Utc::now();
        let expires_at = match session.expiry {
            Expiry::After(d) => chrono::Duration::from_std(d)
                .ok()
                .and_then(|d| now.checked_add_signed(d))
                .map(|t| t.to_rfc3339()),
            Expiry::Never => None,
        };
        let record = SessionRecord {
            backup_hash: backup_hash.to_string(),
            domains: session.domains.clone(),
            started_at: now.to_rfc3339(),
            expires_at,
        };
        if let Err(e) = record.write(path) {
            tracing::warn!("Could not write session record: {e:#}");
        }
    }

    fn clear_record(&self) {
        if let Some(path) = &self.session_file {
            if let Err(e) = SessionRecord::clear(path) {
                tracing::warn!("Could not clear session record: {e:#}");
            }
        }
    }
}

/// Ctrl-C (and SIGTERM on Unix) listeners, registered with the OS as soon as
/// they are armed. Arming needs a runtime context.
pub struct Shutdown {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(windows)]
    ctrl_c: tokio::signal::windows::CtrlC,
}

impl Shutdown {
    pub fn arm() -> std::io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            Ok(Self {
                interrupt: signal(SignalKind::interrupt())?,
                terminate: signal(SignalKind::terminate())?,
            })
        }
        #[cfg(windows)]
        {
            Ok(Self {
                ctrl_c: tokio::signal::windows::ctrl_c()?,
            })
        }
    }

    /// Completes on the first signal.
    pub async fn recv(mut self) {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = self.interrupt.recv() => {}
                _ = self.terminate.recv() => {}
            }
        }
        #[cfg(windows)]
        {
            self.ctrl_c.recv().await;
        }
    }
}

fn timer_runtime() -> Result<Runtime, FocusError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(FocusError::Runtime)
}

/// Countdown goes to stdout; hidden in quiet mode.
fn countdown_target(quiet: bool) -> ProgressDrawTarget {
    if quiet {
        ProgressDrawTarget::hidden()
    } else {
        ProgressDrawTarget::stdout()
    }
}

fn countdown_bar(target: ProgressDrawTarget) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(None, target);
    let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb
}

/// Sleep for `total`, ticking the countdown once per second, unless `interrupt` fires first.
fn wait_out<F>(rt: &Runtime, total: Duration, target: ProgressDrawTarget, interrupt: F) -> Outcome
where
    F: Future<Output = ()>,
{
    rt.block_on(async move {
        let bar = countdown_bar(target);
        let deadline = Instant::now() + total;
        let expired = tokio::time::sleep_until(deadline);
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        tokio::pin!(expired, interrupt);

        let outcome = loop {
            tokio::select! {
                biased;
                _ = &mut interrupt => break Outcome::Interrupted,
                _ = &mut expired => break Outcome::Expired,
                _ = ticker.tick() => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    let secs = left.as_millis().div_ceil(1000) as u64;
                    bar.set_message(format!("{} left", format_remaining(Duration::from_secs(secs))));
                    bar.tick();
                }
            }
        };
        bar.finish_and_clear();
        outcome
    })
}
