//! Wall-clock to UTC conversion in the configured IANA zone.

use chrono::{DateTime, Duration, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use hush_core::{HushError, Result};

/// Parse an IANA zone name such as `Europe/Madrid`.
pub fn parse_zone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| HushError::Config(format!("invalid timezone: {name}")))
}

/// Current wall-clock time in `zone`.
pub fn local_now(zone: Tz) -> NaiveDateTime {
    Utc::now().with_timezone(&zone).naive_local()
}

/// Interpret `local` as wall-clock time in `zone` and return the UTC instant.
///
/// An ambiguous time (autumn fall-back) resolves to the earlier instant. A
/// time inside the spring-forward gap is read with the offset in force before
/// the gap, which lands it the same distance past the transition.
pub fn to_utc(local: NaiveDateTime, zone: Tz) -> DateTime<Utc> {
    match zone.from_local_datetime(&local).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        None => {
            let before = zone
                .offset_from_utc_datetime(&(local - Duration::days(1)))
                .fix()
                .local_minus_utc();
            Utc.from_utc_datetime(&(local - Duration::seconds(before as i64)))
        }
    }
}
