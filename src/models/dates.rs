//! Rendering of symws timestamps for display

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

/// Parse the date forms symws emits: RFC 3339 timestamps, naive timestamps or plain dates
pub fn parse_remote_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::<FixedOffset>::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn render(raw: &str, fmt: &str) -> String {
    match parse_remote_date(raw) {
        Some(dt) => dt.format(fmt).to_string(),
        None => {
            tracing::debug!("Unparseable symws date {:?}, passing through", raw);
            raw.to_string()
        }
    }
}

/// `May 1, 2012`
pub fn display_date(raw: &str) -> String {
    render(raw, "%B %-d, %Y")
}

/// `1-May-12`
pub fn short_date(raw: &str) -> String {
    render(raw, "%-d-%b-%y")
}

/// `11:59 pm`
pub fn clock_time(raw: &str) -> String {
    render(raw, "%-I:%M %P")
}
