use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Timelike};
use chrono_tz::Tz;
use hush_core::{HushError, Recurrence, Result, Rule, Window};

use crate::timezone::to_utc;

/// Whether a rule with `recurrence` applies on `today`.
///
/// Fixed rules always pass here; their dates are applied by
/// [`local_bounds`] instead of by a comparison with `today`.
pub fn fires(recurrence: &Recurrence, today: NaiveDate) -> bool {
    match recurrence {
        Recurrence::EveryDay { except } => !except.contains(&today.weekday()),
        Recurrence::EveryWeekday { day } => today.weekday() == *day,
        Recurrence::Fixed { .. } => true,
    }
}

/// Local wall-clock start and end of the silence for `rule`, seen from `now`.
///
/// The end rolls over to the next day when the start hour is greater than the
/// end hour (equal hours do not roll over). Fixed rules take both dates
/// literally. Each bound that is already in the past is pushed forward by
/// exactly one day, independently of the other.
pub fn local_bounds(rule: &Rule, now: NaiveDateTime) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let today = now.date();
    let rolls_over = rule.time_start.hour() > rule.time_end.hour();

    let (start_date, end_date) = match rule.recurrence {
        Recurrence::Fixed {
            date_start,
            date_end,
        } => (date_start, date_end),
        // Overnight window, e.g. 23:00 to 01:00.
        _ if rolls_over => (today, next_day(rule, today)?),
        _ => (today, today),
    };

    let mut start = start_date.and_time(rule.time_start);
    let mut end = end_date.and_time(rule.time_end);

    // Already started: move to the same time tomorrow.
    if start < now {
        start = next_day(rule, start.date())?.and_time(start.time());
    }
    // Already over: the end alone moves, which may leave it before the start.
    if end < now {
        end = next_day(rule, end.date())?.and_time(end.time());
    }

    Ok((start, end))
}

/// Compute the UTC window for `rule`, interpreting wall-clock times in `zone`.
pub fn compute_window(rule: &Rule, now: NaiveDateTime, zone: Tz) -> Result<Window> {
    let (start, end) = local_bounds(rule, now)?;
    Ok(Window {
        start_utc: to_utc(start, zone),
        end_utc: to_utc(end, zone),
    })
}

fn next_day(rule: &Rule, date: NaiveDate) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(1)).ok_or_else(|| {
        HushError::validation(rule.location(), "when", format!("no day after {date}"))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{NaiveTime, Weekday};
    use hush_core::{Matcher, Matchers};

    use super::*;

    const ALL_DAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, s).unwrap()
    }

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn rule(recurrence: Recurrence, start: NaiveTime, end: NaiveTime) -> Rule {
        Rule {
            index: 0,
            recurrence,
            time_start: start,
            time_end: end,
            comment: None,
            author: None,
            matchers: Matchers::from(vec![Matcher::exact("alertname", "X")]),
        }
    }

    fn daily(start: NaiveTime, end: NaiveTime) -> Rule {
        rule(
            Recurrence::EveryDay {
                except: HashSet::new(),
            },
            start,
            end,
        )
    }

    // 2024-03-04 is a Monday.
    fn week_of(day: Weekday) -> NaiveDate {
        date(2024, 3, 4 + day.num_days_from_monday())
    }

    #[test]
    fn weekday_rule_fires_only_on_its_day() {
        for rule_day in ALL_DAYS {
            let recurrence = Recurrence::EveryWeekday { day: rule_day };
            for today in ALL_DAYS {
                assert_eq!(
                    fires(&recurrence, week_of(today)),
                    rule_day == today,
                    "rule {rule_day:?} on {today:?}"
                );
            }
        }
    }

    #[test]
    fn every_day_skips_exceptions() {
        let recurrence = Recurrence::EveryDay {
            except: HashSet::from([Weekday::Mon]),
        };
        for today in ALL_DAYS {
            assert_eq!(fires(&recurrence, week_of(today)), today != Weekday::Mon);
        }
    }

    #[test]
    fn fixed_rule_always_fires() {
        let recurrence = Recurrence::Fixed {
            date_start: date(2020, 1, 1),
            date_end: date(2020, 1, 2),
        };
        for today in ALL_DAYS {
            assert!(fires(&recurrence, week_of(today)));
        }
    }

    #[test]
    fn start_hour_after_end_hour_rolls_over() {
        let now = at(2024, 3, 1, 12, 0, 0);
        let (start, end) = local_bounds(&daily(hms(23, 0, 0), hms(1, 0, 0)), now).unwrap();
        assert_eq!(start, at(2024, 3, 1, 23, 0, 0));
        assert_eq!(end, at(2024, 3, 2, 1, 0, 0));
    }

    #[test]
    fn start_hour_before_end_hour_stays_on_the_same_day() {
        let now = at(2024, 3, 1, 0, 30, 0);
        let (start, end) = local_bounds(&daily(hms(1, 0, 0), hms(23, 0, 0)), now).unwrap();
        assert_eq!(start.date(), end.date());
        assert_eq!(start, at(2024, 3, 1, 1, 0, 0));
        assert_eq!(end, at(2024, 3, 1, 23, 0, 0));
    }

    #[test]
    fn equal_hours_do_not_roll_over() {
        let now = at(2024, 3, 1, 0, 0, 0);
        let (start, end) = local_bounds(&daily(hms(10, 0, 0), hms(10, 30, 0)), now).unwrap();
        assert_eq!(start, at(2024, 3, 1, 10, 0, 0));
        assert_eq!(end, at(2024, 3, 1, 10, 30, 0));

        // Only hours are compared: 10:30 -> 10:00 ends before it starts.
        let (start, end) = local_bounds(&daily(hms(10, 30, 0), hms(10, 0, 0)), now).unwrap();
        assert_eq!(start.date(), end.date());
    }

    #[test]
    fn elapsed_window_moves_to_tomorrow() {
        let now = at(2024, 3, 1, 10, 0, 0);
        let (start, end) = local_bounds(&daily(hms(8, 0, 0), hms(9, 0, 0)), now).unwrap();
        assert_eq!(start, at(2024, 3, 2, 8, 0, 0));
        assert_eq!(end, at(2024, 3, 2, 9, 0, 0));
    }

    #[test]
    fn only_the_elapsed_bound_moves() {
        let now = at(2024, 3, 1, 10, 0, 0);
        let (start, end) = local_bounds(&daily(hms(8, 0, 0), hms(12, 0, 0)), now).unwrap();
        assert_eq!(start, at(2024, 3, 2, 8, 0, 0));
        assert_eq!(end, at(2024, 3, 1, 12, 0, 0));
    }

    #[test]
    fn start_equal_to_now_is_not_moved() {
        let now = at(2024, 3, 1, 8, 0, 0);
        let (start, _) = local_bounds(&daily(hms(8, 0, 0), hms(9, 0, 0)), now).unwrap();
        assert_eq!(start, now);
    }

    #[test]
    fn month_end_rollover() {
        let now = at(2024, 2, 29, 12, 0, 0);
        let (_, end) = local_bounds(&daily(hms(22, 0, 0), hms(2, 0, 0)), now).unwrap();
        assert_eq!(end, at(2024, 3, 1, 2, 0, 0));
    }

    #[test]
    fn fixed_dates_are_taken_literally() {
        let fixed = rule(
            Recurrence::Fixed {
                date_start: date(2030, 12, 24),
                date_end: date(2030, 12, 26),
            },
            hms(23, 0, 0),
            hms(1, 0, 0),
        );
        let (start, end) = local_bounds(&fixed, at(2024, 3, 1, 12, 0, 0)).unwrap();
        assert_eq!(start, at(2030, 12, 24, 23, 0, 0));
        // No extra rollover day for fixed rules.
        assert_eq!(end, at(2030, 12, 26, 1, 0, 0));
    }

    #[test]
    fn past_fixed_dates_move_one_day_only() {
        let fixed = rule(
            Recurrence::Fixed {
                date_start: date(2020, 1, 1),
                date_end: date(2020, 1, 2),
            },
            hms(8, 0, 0),
            hms(9, 0, 0),
        );
        let (start, end) = local_bounds(&fixed, at(2024, 3, 1, 12, 0, 0)).unwrap();
        assert_eq!(start, at(2020, 1, 2, 8, 0, 0));
        assert_eq!(end, at(2020, 1, 3, 9, 0, 0));
    }

    #[test]
    fn window_is_expressed_in_utc() {
        let now = at(2024, 3, 1, 10, 0, 0);
        let window =
            compute_window(&daily(hms(8, 0, 0), hms(9, 0, 0)), now, chrono_tz::Europe::Madrid)
                .unwrap();
        // Madrid is UTC+1 in March before the switch.
        assert_eq!(window.start_rendered(), "2024-03-02T07:00:00+00:00");
        assert_eq!(window.end_rendered(), "2024-03-02T08:00:00+00:00");
    }
}
