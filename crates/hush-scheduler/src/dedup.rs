use chrono::{DateTime, SubsecRound, Utc};
use hush_core::{ExistingSilence, MatcherPair, Matchers, Window};

/// Find a silence in `existing` equivalent to the candidate.
///
/// Bounds are compared at second precision. Matchers are compared as ordered
/// `(name, value)` sequences; the exact/regex kind is not part of the stored
/// identity and is ignored.
pub fn find_duplicate<'a>(
    candidate: &Window,
    matchers: &Matchers,
    existing: &'a [ExistingSilence],
) -> Option<&'a ExistingSilence> {
    let start = to_second(candidate.start_utc);
    let end = to_second(candidate.end_utc);
    let wanted = matchers.pairs();

    existing.iter().find(|silence| {
        to_second(silence.starts_at) == start
            && to_second(silence.ends_at) == end
            && same_pairs(&wanted, &silence.matchers)
    })
}

pub fn is_duplicate(candidate: &Window, matchers: &Matchers, existing: &[ExistingSilence]) -> bool {
    find_duplicate(candidate, matchers, existing).is_some()
}

fn to_second(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(0)
}

fn same_pairs(wanted: &[MatcherPair], stored: &[MatcherPair]) -> bool {
    wanted.len() == stored.len() && wanted.iter().zip(stored).all(|(a, b)| a == b)
}
