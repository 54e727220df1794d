//! Creation-timestamp parsing and relative-age rendering.

#![forbid(unsafe_code)]

/// Parse an RFC3339 `metadata.creationTimestamp` into epoch seconds.
/// Absent or unparseable input maps to 0 so callers can render "-".
pub fn parse_creation_ts(raw: Option<&str>) -> i64 {
    raw.and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.timestamp())
        .unwrap_or(0)
}

/// Render a relative age at an explicit `now` (epoch seconds).
pub fn render_age_at(creation_ts: i64, now: i64) -> String {
    if creation_ts <= 0 {
        return "-".to_string();
    }
    let mut secs = (now - creation_ts).max(0) as u64;
    let days = secs / 86_400;
    secs %= 86_400;
    let hours = secs / 3600;
    secs %= 3600;
    let mins = secs / 60;
    secs %= 60;
    if days > 0 {
        format!("{}d{}h", days, hours)
    } else if hours > 0 {
        format!("{}h{}m", hours, mins)
    } else if mins > 0 {
        format!("{}m", mins)
    } else {
        format!("{}s", secs)
    }
}

/// Render a relative age against the current wall clock. Recomputed on every
/// call so displays always reflect now.
pub fn render_age(creation_ts: i64) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    render_age_at(creation_ts, now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339() {
        assert_eq!(parse_creation_ts(Some("2024-01-01T00:00:00Z")), 1_704_067_200);
        assert_eq!(parse_creation_ts(Some("not-a-date")), 0);
        assert_eq!(parse_creation_ts(None), 0);
    }

    #[test]
    fn renders_each_magnitude() {
        let t0 = 1_704_067_200;
        assert_eq!(render_age_at(t0, t0 + 30), "30s");
        assert_eq!(render_age_at(t0, t0 + 9 * 60), "9m");
        assert_eq!(render_age_at(t0, t0 + 4 * 3600 + 7 * 60), "4h7m");
        assert_eq!(render_age_at(t0, t0 + 2 * 86_400 + 3 * 3600), "2d3h");
        assert_eq!(render_age_at(0, t0), "-");
    }

    #[test]
    fn clock_skew_clamps_to_zero() {
        let t0 = 1_704_067_200;
        assert_eq!(render_age_at(t0, t0 - 5), "0s");
    }
}
