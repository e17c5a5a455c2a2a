use chrono::{DateTime, NaiveDate, Utc};

/// Parse a backend date: an RFC 3339 timestamp or a bare `YYYY-MM-DD` day
/// (taken as midnight UTC).
pub fn parse_timestamp(date: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(date.get(..10)?, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    match parse_timestamp(date) {
        Some(dt) => dt.format("%a, %b %d, %Y").to_string(),
        None => date.to_string(),
    }
}

/// Format an average rating with one decimal, or `N/A` when there is none
pub fn format_average(average: Option<f64>) -> String {
    match average {
        Some(avg) => format!("{:.1}", avg),
        None => "N/A".to_string(),
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
