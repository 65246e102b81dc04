use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use chrono::Weekday;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::Deserialize;
use tracing::debug;

use crate::error::{HushError, Result};
use crate::matcher::{self, RawLabel};
use crate::types::{parse_date, parse_time_of_day, parse_weekday, Global, Recurrence, Rule};

pub const DEFAULT_CONFIG_PATH: &str = "conf/silence-alerts.yaml";
pub const DEFAULT_TIMEZONE: &str = "Europe/Madrid";
pub const DEFAULT_NAMESPACE: &str = "alertmanager";
pub const DEFAULT_AMTOOL: &str = "amtool --alertmanager.url=http://localhost:9093";
pub const DEFAULT_EXEC_TIMEOUT_SECS: u64 = 30;

/// Recognised keys under `when`.
pub const WHEN_KEYS: [&str; 9] = [
    "everyDay",
    "everyMonday",
    "everyTuesday",
    "everyWednesday",
    "everyThursday",
    "everyFriday",
    "everySaturday",
    "everySunday",
    "fixed",
];

/// The configuration document as written (silence-alerts.yaml + HUSH_* env
/// overrides). Every field is optional here so that missing sections are
/// reported as validation errors with a field name rather than serde errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigDocument {
    pub global: Option<GlobalSection>,
    pub alerts: Option<Vec<AlertEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalSection {
    pub comment: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertEntry {
    pub when: Option<BTreeMap<String, WhenSpec>>,
    pub labels: Option<Vec<RawLabel>>,
    pub comment: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhenSpec {
    pub time_start: Option<String>,
    pub time_end: Option<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    /// Only meaningful for `everyDay`.
    #[serde(default)]
    pub except: Vec<String>,
}

/// Validated configuration: global defaults plus typed rules, in order.
#[derive(Debug, Clone)]
pub struct HushConfig {
    pub global: Global,
    pub rules: Vec<Rule>,
}

impl HushConfig {
    /// Load and validate the YAML document at `path`, with `HUSH_*` env
    /// overrides (e.g. `HUSH_GLOBAL_COMMENT`).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HushError::Config(format!(
                "file \"{}\" not found",
                path.display()
            )));
        }

        let doc: ConfigDocument = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("HUSH_").split("_"))
            .extract()
            .map_err(|e| HushError::Config(e.to_string()))?;

        debug!(path = %path.display(), "configuration document loaded");
        Self::from_document(doc)
    }

    /// Validate a document held in memory. Env overrides are not applied.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let doc: ConfigDocument = Figment::from(Yaml::string(yaml))
            .extract()
            .map_err(|e| HushError::Config(e.to_string()))?;
        Self::from_document(doc)
    }

    pub fn from_document(doc: ConfigDocument) -> Result<Self> {
        let alerts = doc
            .alerts
            .ok_or_else(|| HushError::validation("document", "alerts", "section not found"))?;

        // Nothing to silence, so the global defaults are never used.
        if alerts.is_empty() {
            return Ok(Self {
                global: Global::default(),
                rules: Vec::new(),
            });
        }

        let global = validate_global(doc.global)?;

        let rules = alerts
            .iter()
            .enumerate()
            .map(|(index, entry)| parse_rule(index, entry))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { global, rules })
    }
}

fn validate_global(section: Option<GlobalSection>) -> Result<Global> {
    let section =
        section.ok_or_else(|| HushError::validation("document", "global", "section not found"))?;

    let comment = required_non_empty(section.comment, "comment")?;
    let author = required_non_empty(section.author, "author")?;
    Ok(Global { comment, author })
}

fn required_non_empty(value: Option<String>, field: &str) -> Result<String> {
    match value {
        None => Err(HushError::validation("global", field, "directive not found")),
        Some(v) if v.is_empty() => Err(HushError::validation("global", field, "is empty")),
        Some(v) => Ok(v),
    }
}

fn parse_rule(index: usize, entry: &AlertEntry) -> Result<Rule> {
    let location = format!("alerts[{index}]");

    let when = entry
        .when
        .as_ref()
        .ok_or_else(|| HushError::validation(&location, "when", "directive not found"))?;
    let labels = entry
        .labels
        .as_ref()
        .ok_or_else(|| HushError::validation(&location, "labels", "directive not found"))?;

    let (key, spec) = single_when(&location, when)?;
    let field = |name: &str| format!("when.{key}.{name}");

    let time_start = required_time(&location, &field("timeStart"), spec.time_start.as_deref())?;
    let time_end = required_time(&location, &field("timeEnd"), spec.time_end.as_deref())?;

    let recurrence = match key {
        "everyDay" => {
            let mut except = HashSet::new();
            for (i, name) in spec.except.iter().enumerate() {
                let day = parse_weekday(name).ok_or_else(|| {
                    HushError::validation(
                        &location,
                        field(&format!("except[{i}]")),
                        format!("unknown weekday {name:?}"),
                    )
                })?;
                except.insert(day);
            }
            Recurrence::EveryDay { except }
        }
        "fixed" => {
            let date_start =
                required_date(&location, &field("dateStart"), spec.date_start.as_deref())?;
            let date_end = required_date(&location, &field("dateEnd"), spec.date_end.as_deref())?;
            Recurrence::Fixed {
                date_start,
                date_end,
            }
        }
        other => Recurrence::EveryWeekday {
            day: weekday_for_key(other).ok_or_else(|| {
                HushError::validation(&location, "when", format!("unknown directive {other:?}"))
            })?,
        },
    };

    let matchers = matcher::build(&location, labels)?;

    Ok(Rule {
        index,
        recurrence,
        time_start,
        time_end,
        comment: entry.comment.clone(),
        author: entry.author.clone(),
        matchers,
    })
}

/// `when` must hold exactly one key, and it must be a recognised one.
fn single_when<'a>(
    location: &str,
    when: &'a BTreeMap<String, WhenSpec>,
) -> Result<(&'a str, &'a WhenSpec)> {
    if let Some(unknown) = when.keys().find(|k| !WHEN_KEYS.contains(&k.as_str())) {
        return Err(HushError::validation(
            location,
            "when",
            format!("unknown directive {unknown:?}"),
        ));
    }

    let mut entries = when.iter();
    let Some((key, spec)) = entries.next() else {
        return Err(HushError::validation(
            location,
            "when",
            "no directive every* or fixed found",
        ));
    };
    if entries.next().is_some() {
        return Err(HushError::validation(
            location,
            "when",
            "more than one every*/fixed directive",
        ));
    }
    Ok((key.as_str(), spec))
}

fn weekday_for_key(key: &str) -> Option<Weekday> {
    key.strip_prefix("every").and_then(parse_weekday)
}

fn required_time(location: &str, field: &str, raw: Option<&str>) -> Result<chrono::NaiveTime> {
    let raw = raw.ok_or_else(|| HushError::validation(location, field, "not found"))?;
    parse_time_of_day(raw).map_err(|reason| HushError::validation(location, field, reason))
}

fn required_date(location: &str, field: &str, raw: Option<&str>) -> Result<chrono::NaiveDate> {
    let raw = raw.ok_or_else(|| HushError::validation(location, field, "not found"))?;
    parse_date(raw).map_err(|reason| HushError::validation(location, field, reason))
}
