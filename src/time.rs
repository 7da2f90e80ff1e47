use chrono::{NaiveDate, SecondsFormat, Utc};

const STORAGE_FORMAT: &str = "%Y-%m-%d";
const SHORT_DISPLAY_FORMAT: &str = "%d/%m/%Y";

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a date as typed into spreadsheets by the firm's staff.
///
/// Values containing `/` are read as `DD/MM/YYYY`; otherwise values
/// containing `-` are read as ISO `YYYY-MM-DD`, with any time part after
/// `T` or a space discarded. Impossible calendar dates yield `None`.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.contains('/') {
        let mut parts = raw.split('/').map(str::trim);
        let day: u32 = parts.next()?.parse().ok()?;
        let month: u32 = parts.next()?.parse().ok()?;
        let year: i32 = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day)
    } else if raw.contains('-') {
        let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, STORAGE_FORMAT).ok()
    } else {
        None
    }
}

/// Canonical `YYYY-MM-DD` form written to the data store.
pub fn to_storage(date: NaiveDate) -> String {
    date.format(STORAGE_FORMAT).to_string()
}

/// Short display form used in exported sheets. Values the parser does not
/// recognise are passed through untouched.
pub fn short_display(stored: &str) -> String {
    match parse_record_date(stored) {
        Some(date) => date.format(SHORT_DISPLAY_FORMAT).to_string(),
        None => stored.to_string(),
    }
}
