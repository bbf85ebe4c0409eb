//! Hosts file text handling: tagged block entries and domain validation.
//!
//! Only lines ending in [`MARKER`] are ever added or removed; every other line
//! is passed through byte for byte.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use crate::error::FocusError;

/// Trailing comment identifying lines owned by focus.
pub const MARKER: &str = "# blocked by focus";

/// Default address blocked domains resolve to.
pub const DEFAULT_REDIRECT_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// One blocking line: `<ip>\t<domain>\t# blocked by focus`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    pub ip: IpAddr,
    pub domain: String,
}

impl HostEntry {
    pub fn new(ip: IpAddr, domain: impl Into<String>) -> Self {
        Self {
            ip,
            domain: domain.into(),
        }
    }

    /// Parse a tagged line back into an entry; untagged lines yield `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        if !is_tagged(line) {
            return None;
        }
        let body = line.trim_end();
        let body = &body[..body.len() - MARKER.len()];
        let mut fields = body.split_whitespace();
        let ip = fields.next()?.parse().ok()?;
        let domain = fields.next()?;
        Some(Self::new(ip, domain))
    }
}

impl fmt::Display for HostEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{MARKER}", self.ip, self.domain)
    }
}

/// True if the line was written by focus.
pub fn is_tagged(line: &str) -> bool {
    line.trim_end().ends_with(MARKER)
}

/// Remove every tagged line, keeping all other bytes as they were.
pub fn strip_entries(content: &str) -> String {
    content
        .split_inclusive('\n')
        .filter(|line| !is_tagged(line))
        .collect()
}

/// Replace any existing tagged lines with `entries`, appended at the end.
pub fn with_entries(content: &str, entries: &[HostEntry]) -> String {
    let mut out = strip_entries(content);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for entry in entries {
        out.push_str(&entry.to_string());
        out.push('\n');
    }
    out
}

/// Entries currently tagged in the file.
pub fn tagged_entries(content: &str) -> Vec<HostEntry> {
    content.lines().filter_map(HostEntry::parse_line).collect()
}

/// Validate hostname format.
pub fn validate_hostname(domain: &str) -> Result<(), FocusError> {
    let bad = |why: &str| Err(FocusError::Parse(format!("invalid domain '{domain}': {why}")));
    if domain.is_empty() {
        return bad("empty");
    }
    if domain.len() > 253 {
        return bad("longer than 253 characters");
    }
    if domain == "localhost" {
        return bad("bare localhost not allowed");
    }
    for label in domain.split('.') {
        if label.is_empty() {
            return bad("empty label");
        }
        if let Some(c) = label.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '-') {
            return bad(&format!("illegal char {c:?}"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return bad("label cannot start/end with hyphen");
        }
    }
    Ok(())
}

/// Lower-case, validate, and de-duplicate domains, keeping first-seen order.
pub fn normalize_domains<S: AsRef<str>>(domains: &[S]) -> Result<Vec<String>, FocusError> {
    if domains.is_empty() {
        return Err(FocusError::Parse("no domains given".into()));
    }
    let mut out: Vec<String> = Vec::with_capacity(domains.len());
    for d in domains {
        let d = d.as_ref().trim().trim_end_matches('.').to_ascii_lowercase();
        validate_hostname(&d)?;
        if !out.contains(&d) {
            out.push(d);
        }
    }
    Ok(out)
}
