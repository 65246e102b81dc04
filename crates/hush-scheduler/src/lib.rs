//! `hush-scheduler`: recurrence evaluation, window computation and
//! deduplication for recurring Alertmanager silences.
//!
//! # Overview
//!
//! For every rule, [`engine::SilenceEngine`] asks [`schedule::fires`] whether
//! the rule applies today, computes its UTC window with
//! [`schedule::compute_window`], and creates the silence through a
//! [`store::SilenceStore`] unless [`dedup::is_duplicate`] finds an equivalent
//! one.
//!
//! # Recurrence variants
//!
//! | Variant        | Fires                                   | Window dates            |
//! |----------------|-----------------------------------------|-------------------------|
//! | `EveryDay`     | every day not listed in `except`        | today (+1 on rollover)  |
//! | `EveryWeekday` | on its weekday only                     | today (+1 on rollover)  |
//! | `Fixed`        | always                                  | `dateStart` / `dateEnd` |

pub mod dedup;
pub mod engine;
pub mod schedule;
pub mod store;
pub mod timezone;

pub use engine::{Outcome, RunReport, SilenceEngine};
pub use store::SilenceStore;
