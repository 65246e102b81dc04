//! `hush-core`: shared model for recurring Alertmanager silences.
//!
//! Holds the error taxonomy, the typed schedule model, the configuration
//! loader that turns `silence-alerts.yaml` into validated [`Rule`]s, and the
//! label matcher builder.

pub mod config;
pub mod error;
pub mod matcher;
pub mod types;

pub use config::HushConfig;
pub use error::{HushError, Result};
pub use matcher::{MatchKind, Matcher, Matchers};
pub use types::{ExistingSilence, Global, MatcherPair, Recurrence, Rule, SilenceRequest, Window};
