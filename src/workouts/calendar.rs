//! Calendar day windows.
//!
//! A calendar day maps to the half-open interval `[midnight, next midnight)`
//! in a fixed UTC offset, so every instant belongs to exactly one day.

use chrono::{DateTime, Datelike, Days, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

/// Format of the dashboard date parameter.
pub const DATE_PARAM_FORMAT: &str = "%Y-%m-%d";

/// The `[start, end)` instants covering one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Window for `date` as observed in `offset`.
    ///
    /// Both bounds saturate at the representable range instead of panicking.
    pub fn for_date(date: NaiveDate, offset: FixedOffset) -> Self {
        let start = midnight(date, offset);
        let end = date
            .checked_add_days(Days::new(1))
            .map(|next| midnight(next, offset))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self { start, end }
    }
}

fn midnight(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(NaiveTime::MIN);
    let shift = Duration::seconds(i64::from(offset.local_minus_utc()));

    match local.checked_sub_signed(shift) {
        Some(utc) => Utc.from_utc_datetime(&utc),
        None if shift > Duration::zero() => DateTime::<Utc>::MIN_UTC,
        None => DateTime::<Utc>::MAX_UTC,
    }
}

/// Build a fixed offset from minutes east of UTC.
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(minutes.checked_mul(60)?)
}

/// Today's date as observed in `offset`.
pub fn today_in(offset: FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(&offset).date_naive()
}

/// Parse a `YYYY-MM-DD` date parameter, falling back to `today` when absent,
/// malformed, or outside years 0000-9999.
pub fn parse_date_param(param: Option<&str>, today: NaiveDate) -> NaiveDate {
    param
        .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), DATE_PARAM_FORMAT).ok())
        .filter(|date| (0..=9999).contains(&date.year()))
        .unwrap_or(today)
}

/// Render a date as a `YYYY-MM-DD` parameter.
pub fn format_date_param(date: NaiveDate) -> String {
    date.format(DATE_PARAM_FORMAT).to_string()
}
