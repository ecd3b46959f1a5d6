//! Pre-persistence normalization for events.
//!
//! `normalize_event` takes the proposed record plus the set of source fields
//! that changed in this save and returns the record with slug, date and time
//! in canonical form, or the per-field validation errors.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use std::borrow::Cow;
use tracing::debug;
use validator::{ValidationError, ValidationErrors};

use crate::error::{Error, Result};
use crate::models::Event;

/// Which normalization sources changed in the current save
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventChanges {
    pub title: bool,
    pub date: bool,
    pub time: bool,
}

impl EventChanges {
    /// Everything counts as changed, as on first insert
    pub fn all() -> Self {
        Self {
            title: true,
            date: true,
            time: true,
        }
    }

    pub fn between(stored: &Event, proposed: &Event) -> Self {
        Self {
            title: stored.title != proposed.title,
            date: stored.date != proposed.date,
            time: stored.time != proposed.time,
        }
    }

    pub fn any(&self) -> bool {
        self.title || self.date || self.time
    }
}

/// Derive the URL slug for a title.
///
/// Lowercase, keep ASCII word characters, turn whitespace and hyphen runs into
/// a single hyphen, drop everything else, no hyphen at either end.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;

    for ch in lowered.trim().chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '-' {
            pending_hyphen = true;
        }
    }

    slug
}

// Two-digit years go first: `%Y` would otherwise read `3/5/25` as year 3.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
];

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

fn invalid(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(Cow::from(message))
}

/// Parse a calendar date in any accepted shape and emit `YYYY-MM-DD`.
/// Timestamps carrying an offset resolve to their UTC date. Years outside
/// `1000..=9999` have no four-digit canonical form and are rejected.
pub fn normalize_date(input: &str) -> Result<String, ValidationError> {
    let value = input.trim();

    let date = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|datetime| datetime.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .or_else(|_| DateTime::parse_from_rfc2822(value))
                .ok()
                .map(|datetime| datetime.with_timezone(&Utc).date_naive())
        })
        .filter(|date| (1000..=9999).contains(&date.year()))
        .ok_or_else(|| invalid("date", format!("invalid date: {value:?}")))?;

    Ok(date.format("%Y-%m-%d").to_string())
}

/// Accept `H:MM` / `HH:MM` in 24-hour form, or the same followed by an
/// `AM`/`PM` suffix in 12-hour form, and emit zero-padded 24-hour `HH:MM`.
pub fn normalize_time(input: &str) -> Result<String, ValidationError> {
    let value = input.trim();
    let reject = || invalid("time", format!("invalid time: {value:?}"));

    let upper = value.to_ascii_uppercase();
    let (clock, meridiem) = match upper.strip_suffix("AM") {
        Some(clock) => (clock.trim_end(), Some(false)),
        None => match upper.strip_suffix("PM") {
            Some(clock) => (clock.trim_end(), Some(true)),
            None => (upper.as_str(), None),
        },
    };

    let (hours, minutes) = clock.split_once(':').ok_or_else(reject)?;
    let digits = |part: &str, min: usize, max: usize| {
        (min..=max).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
    };
    if !digits(hours, 1, 2) || !digits(minutes, 2, 2) {
        return Err(reject());
    }

    let hours: u32 = hours.parse().map_err(|_| reject())?;
    let minutes: u32 = minutes.parse().map_err(|_| reject())?;
    if minutes > 59 {
        return Err(reject());
    }

    let hours = match meridiem {
        None if hours <= 23 => hours,
        Some(pm) if (1..=12).contains(&hours) => match (hours, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, false) => h,
            (h, true) => h + 12,
        },
        _ => return Err(reject()),
    };

    Ok(format!("{hours:02}:{minutes:02}"))
}

/// Normalize the fields flagged in `changes`; untouched fields are kept as
/// stored.
pub fn normalize_event(mut event: Event, changes: EventChanges) -> Result<Event> {
    let mut errors = ValidationErrors::new();

    if changes.title {
        let slug = slugify(&event.title);
        if slug.is_empty() {
            errors.add(
                "title",
                invalid(
                    "slug",
                    "title must contain at least one letter or digit".to_string(),
                ),
            );
        }
        debug!("Derived slug {:?} from title {:?}", slug, event.title);
        event.slug = slug;
    }

    if changes.date {
        match normalize_date(&event.date) {
            Ok(date) => event.date = date,
            Err(error) => errors.add("date", error),
        }
    }

    if changes.time {
        match normalize_time(&event.time) {
            Ok(time) => event.time = time,
            Err(error) => errors.add("time", error),
        }
    }

    if errors.is_empty() {
        Ok(event)
    } else {
        Err(Error::Validation(errors))
    }
}
