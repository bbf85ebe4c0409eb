//! Block duration parsing (`10s`, `25m`, `1h`, `2d`).

use std::time::Duration;

use crate::error::FocusError;

const SECS_PER_MIN: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MIN;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// Parse a single `<number><unit>` value into whole seconds.
pub fn parse_duration(s: &str) -> Result<Duration, FocusError> {
    let s = s.trim();
    let invalid = || FocusError::Parse(format!("invalid duration '{s}' (expected e.g. 10s, 25m, 1h, 2d)"));

    let Some(unit) = s.chars().last() else {
        return Err(invalid());
    };
    let digits = &s[..s.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let scale = match unit {
        's' => 1,
        'm' => SECS_PER_MIN,
        'h' => SECS_PER_HOUR,
        'd' => SECS_PER_DAY,
        _ => return Err(invalid()),
    };
    let n: u64 = digits.parse().map_err(|_| invalid())?;
    if n == 0 {
        return Err(FocusError::Parse(format!("duration '{s}' must be greater than zero")));
    }
    let secs = n
        .checked_mul(scale)
        .ok_or_else(|| FocusError::Parse(format!("duration '{s}' is too large")))?;
    Ok(Duration::from_secs(secs))
}

/// Sum several `-t` values (`-t 1h 30m`).
pub fn total(parts: &[Duration]) -> Result<Duration, FocusError> {
    if parts.is_empty() {
        return Err(FocusError::Parse("no duration given".into()));
    }
    parts.iter().try_fold(Duration::ZERO, |acc, d| {
        acc.checked_add(*d)
            .ok_or_else(|| FocusError::Parse("total duration is too large".into()))
    })
}

/// Render remaining time as `1h 02m 03s`.
pub fn format_remaining(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / SECS_PER_HOUR, (secs % SECS_PER_HOUR) / SECS_PER_MIN, secs % SECS_PER_MIN);
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}
