//! Label matchers: validation of the `labels` list of a rule and rendering
//! into the `name="value"` / `name=~"value"` form `amtool` expects.

use std::fmt;

use serde::Deserialize;

use crate::error::{HushError, Result};
use crate::types::MatcherPair;

/// Label that must be present in every rule.
pub const ALERTNAME: &str = "alertname";

/// How a matcher compares the label value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// `type: string` in the configuration.
    Exact,
    Regex,
}

impl std::str::FromStr for MatchKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "string" => Ok(MatchKind::Exact),
            "regex" => Ok(MatchKind::Regex),
            other => Err(format!("unknown label type {other:?}, only string or regex")),
        }
    }
}

/// A label as written in the configuration document, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLabel {
    pub name: Option<String>,
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    pub name: String,
    pub value: String,
    pub kind: MatchKind,
}

impl Matcher {
    pub fn exact(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind: MatchKind::Exact,
        }
    }

    pub fn regex(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind: MatchKind::Regex,
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MatchKind::Exact => write!(f, "{}=\"{}\"", self.name, self.value),
            MatchKind::Regex => write!(f, "{}=~\"{}\"", self.name, self.value),
        }
    }
}

/// Ordered matcher list of one rule. Order is part of its identity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Matchers(Vec<Matcher>);

impl Matchers {
    pub fn iter(&self) -> std::slice::Iter<'_, Matcher> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of the first `alertname` matcher.
    pub fn alertname(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|m| m.name == ALERTNAME)
            .map(|m| m.value.as_str())
    }

    pub fn render(&self) -> Vec<String> {
        self.0.iter().map(Matcher::render).collect()
    }

    /// `(name, value)` pairs in order, the form silences are compared by.
    pub fn pairs(&self) -> Vec<MatcherPair> {
        self.0
            .iter()
            .map(|m| MatcherPair {
                name: m.name.clone(),
                value: m.value.clone(),
            })
            .collect()
    }
}

impl From<Vec<Matcher>> for Matchers {
    fn from(matchers: Vec<Matcher>) -> Self {
        Self(matchers)
    }
}

impl<'a> IntoIterator for &'a Matchers {
    type Item = &'a Matcher;
    type IntoIter = std::slice::Iter<'a, Matcher>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Validate `labels` and turn them into matchers, keeping their order.
///
/// `location` names the rule in error messages (e.g. `alerts[3]`).
pub fn build(location: &str, labels: &[RawLabel]) -> Result<Matchers> {
    let mut matchers = Vec::with_capacity(labels.len());

    for (i, label) in labels.iter().enumerate() {
        let field = format!("labels[{i}]");
        let (Some(name), Some(value), Some(kind)) = (&label.name, &label.value, &label.kind)
        else {
            return Err(HushError::validation(
                location,
                field,
                "name, value or type not found",
            ));
        };
        if name.is_empty() {
            return Err(HushError::validation(location, field, "name is empty"));
        }
        let kind: MatchKind = kind
            .parse()
            .map_err(|reason: String| HushError::validation(location, &field, reason))?;

        matchers.push(Matcher {
            name: name.clone(),
            value: value.clone(),
            kind,
        });
    }

    if !matchers.iter().any(|m| m.name == ALERTNAME) {
        return Err(HushError::validation(
            location,
            "labels",
            "alertname label not found",
        ));
    }

    Ok(Matchers(matchers))
}
