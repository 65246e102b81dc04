use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};

use crate::matcher::Matchers;

/// Wire format used for every instant handed to `amtool`.
pub const UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+00:00";

/// Which calendar days a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recurrence {
    /// Every day except the listed weekdays.
    EveryDay { except: HashSet<Weekday> },
    /// One fixed weekday (`everyMonday` … `everySunday`).
    EveryWeekday { day: Weekday },
    /// Absolute dates; the window runs from `date_start` to `date_end`.
    Fixed {
        date_start: NaiveDate,
        date_end: NaiveDate,
    },
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recurrence::EveryDay { .. } => write!(f, "everyDay"),
            Recurrence::EveryWeekday { day } => write!(f, "every{}", weekday_title(*day)),
            Recurrence::Fixed { .. } => write!(f, "fixed"),
        }
    }
}

/// Defaults applied to every rule without its own comment/author.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Global {
    pub comment: String,
    pub author: String,
}

/// One validated silencing directive.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Position in the `alerts` list; used only for diagnostics.
    pub index: usize,
    pub recurrence: Recurrence,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    pub comment: Option<String>,
    pub author: Option<String>,
    pub matchers: Matchers,
}

impl Rule {
    pub fn comment<'a>(&'a self, global: &'a Global) -> &'a str {
        self.comment.as_deref().unwrap_or(&global.comment)
    }

    pub fn author<'a>(&'a self, global: &'a Global) -> &'a str {
        self.author.as_deref().unwrap_or(&global.author)
    }

    /// `alerts[N] (alertname=X)`, for error and log context.
    pub fn location(&self) -> String {
        match self.matchers.alertname() {
            Some(name) => format!("alerts[{}] (alertname={name})", self.index),
            None => format!("alerts[{}]", self.index),
        }
    }
}

/// Concrete UTC bounds of one silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
}

impl Window {
    pub fn start_rendered(&self) -> String {
        self.start_utc.format(UTC_FORMAT).to_string()
    }

    pub fn end_rendered(&self) -> String {
        self.end_utc.format(UTC_FORMAT).to_string()
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start_rendered(), self.end_rendered())
    }
}

/// The identity part of a stored matcher: kind is not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherPair {
    pub name: String,
    pub value: String,
}

/// A silence already known to the silence store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingSilence {
    /// Store-side ID, only used in log lines.
    pub id: Option<String>,
    pub status: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub matchers: Vec<MatcherPair>,
}

/// Everything the store needs to create one silence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SilenceRequest {
    pub comment: String,
    pub author: String,
    pub window: Window,
    /// Rendered matcher expressions, in rule order.
    pub matchers: Vec<String>,
}

/// Lower-case English weekday name, as written in `except` lists.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

fn weekday_title(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parse a full weekday name, ignoring case. Abbreviations are rejected.
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    let lower = name.trim().to_ascii_lowercase();
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .into_iter()
    .find(|d| weekday_name(*d) == lower)
}

/// Parse `H:M:S` with one or two digits per field.
pub fn parse_time_of_day(raw: &str) -> std::result::Result<NaiveTime, String> {
    let fields = split_numeric(raw, ':', [(1, 2), (1, 2), (1, 2)])
        .ok_or_else(|| format!("expected H:M:S with 1-2 digit fields, got {raw:?}"))?;
    NaiveTime::from_hms_opt(fields[0], fields[1], fields[2])
        .ok_or_else(|| format!("time out of range: {raw:?}"))
}

/// Parse `D-M-YYYY` with a one or two digit day and month.
pub fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    let fields = split_numeric(raw, '-', [(1, 2), (1, 2), (4, 4)])
        .ok_or_else(|| format!("expected D-M-YYYY, got {raw:?}"))?;
    NaiveDate::from_ymd_opt(fields[2] as i32, fields[1], fields[0])
        .ok_or_else(|| format!("date out of range: {raw:?}"))
}

/// Split `raw` on `sep` into exactly three all-digit fields whose lengths fall
/// within the given `(min, max)` digit counts.
fn split_numeric(raw: &str, sep: char, widths: [(usize, usize); 3]) -> Option<[u32; 3]> {
    let parts: Vec<&str> = raw.trim().split(sep).collect();
    if parts.len() != 3 {
        return None;
    }
    let mut out = [0u32; 3];
    for (i, part) in parts.iter().enumerate() {
        let (min, max) = widths[i];
        if part.len() < min || part.len() > max || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        out[i] = part.parse().ok()?;
    }
    Some(out)
}
