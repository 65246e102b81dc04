//! Lenient decoding of `amtool silence query -o json` output.
//!
//! Depending on how the output travels back through the pod exec, it may use
//! Python-style literals (`True`, `False`, `None`) and single-quoted strings.
//! [`normalize`] rewrites those into JSON before parsing; the rest of the
//! pipeline only ever sees typed [`ExistingSilence`] values.

use chrono::{DateTime, Utc};
use hush_core::{ExistingSilence, HushError, MatcherPair, Result};
use serde::Deserialize;

use crate::truncate::{truncate_output, DEFAULT_MAX_CHARS};

/// One entry of the query output. Unused fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AmSilence {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: Option<AmStatus>,
    starts_at: String,
    ends_at: String,
    #[serde(default)]
    matchers: Vec<AmMatcher>,
}

#[derive(Debug, Deserialize)]
struct AmStatus {
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AmMatcher {
    name: String,
    value: String,
}

/// Decode the query output into typed silences.
pub fn decode_silences(raw: &str) -> Result<Vec<ExistingSilence>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }

    let normalized = normalize(trimmed);
    let entries: Vec<AmSilence> = serde_json::from_str(&normalized).map_err(|e| {
        HushError::Parse(format!(
            "silence query output is not a silence list ({e}): {}",
            truncate_output(trimmed, DEFAULT_MAX_CHARS)
        ))
    })?;

    entries.into_iter().map(into_existing).collect()
}

fn into_existing(entry: AmSilence) -> Result<ExistingSilence> {
    Ok(ExistingSilence {
        starts_at: parse_instant(&entry.starts_at, "startsAt")?,
        ends_at: parse_instant(&entry.ends_at, "endsAt")?,
        id: entry.id,
        status: entry.status.and_then(|s| s.state),
        matchers: entry
            .matchers
            .into_iter()
            .map(|m| MatcherPair {
                name: m.name,
                value: m.value,
            })
            .collect(),
    })
}

fn parse_instant(raw: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| HushError::Parse(format!("{field} {raw:?}: {e}")))
}

/// Rewrite Python-style literals into JSON, leaving string contents alone.
///
/// Outside strings: `True`/`False`/`None` become `true`/`false`/`null`.
/// Single-quoted strings become double-quoted, with inner `"` escaped.
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                out.push('"');
                while let Some(c) = chars.next() {
                    out.push(c);
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                out.push(escaped);
                            }
                        }
                        '"' => break,
                        _ => {}
                    }
                }
            }
            '\'' => {
                out.push('"');
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some('\'') => out.push('\''),
                            Some(escaped) => {
                                out.push('\\');
                                out.push(escaped);
                            }
                            None => {}
                        },
                        '"' => out.push_str("\\\""),
                        '\'' => break,
                        _ => out.push(c),
                    }
                }
                out.push('"');
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        word.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(match word.as_str() {
                    "True" => "true",
                    "False" => "false",
                    "None" => "null",
                    other => other,
                });
            }
            _ => out.push(c),
        }
    }
    out
}
