use chrono::NaiveDateTime;
use chrono_tz::Tz;
use hush_core::{Global, HushConfig, HushError, Result, Rule, SilenceRequest, Window};
use tracing::{debug, error, info, warn};

use crate::{
    dedup::find_duplicate,
    schedule::{compute_window, fires},
    store::SilenceStore,
};

/// What happened to one rule during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The recurrence does not apply today.
    NotToday,
    /// An equivalent silence already exists.
    Duplicate(Window),
    Created(Window),
    /// Would have been created, but the engine runs in dry-run mode.
    DryRun(Window),
}

/// Per-outcome counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub created: usize,
    pub duplicates: usize,
    pub not_today: usize,
    pub dry_run: usize,
}

impl RunReport {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::NotToday => self.not_today += 1,
            Outcome::Duplicate(_) => self.duplicates += 1,
            Outcome::Created(_) => self.created += 1,
            Outcome::DryRun(_) => self.dry_run += 1,
        }
    }
}

/// Drives every rule through recurrence check, window computation, dedup and
/// creation, strictly one rule at a time.
pub struct SilenceEngine<S> {
    store: S,
    zone: Tz,
    dry_run: bool,
}

impl<S: SilenceStore> SilenceEngine<S> {
    pub fn new(store: S, zone: Tz) -> Self {
        Self {
            store,
            zone,
            dry_run: false,
        }
    }

    /// In dry-run mode everything runs except the final `create`.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Evaluate all rules against the same `now` (wall-clock time in the
    /// engine's zone). The first error aborts the run.
    pub async fn run(&self, config: &HushConfig, now: NaiveDateTime) -> Result<RunReport> {
        info!(rules = config.rules.len(), %now, zone = %self.zone, dry_run = self.dry_run, "evaluating silence rules");

        let mut report = RunReport::default();
        for rule in &config.rules {
            let outcome = match self.process_rule(rule, &config.global, now).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let e = with_rule_context(rule, e);
                    error!(rule = %rule.location(), code = e.code(), "{e}");
                    return Err(e);
                }
            };
            report.record(&outcome);
        }

        info!(
            created = report.created,
            duplicates = report.duplicates,
            not_today = report.not_today,
            dry_run = report.dry_run,
            "run complete"
        );
        Ok(report)
    }

    /// Process a single rule.
    pub async fn process_rule(
        &self,
        rule: &Rule,
        global: &Global,
        now: NaiveDateTime,
    ) -> Result<Outcome> {
        let location = rule.location();

        if !fires(&rule.recurrence, now.date()) {
            debug!(rule = %location, recurrence = %rule.recurrence, "not scheduled today");
            return Ok(Outcome::NotToday);
        }

        let window = compute_window(rule, now, self.zone)?;
        if window.end_utc <= window.start_utc {
            warn!(rule = %location, %window, "window ends before it starts");
        }

        // Re-read on every rule so silences created earlier in this run count.
        let existing = self.store.query().await?;
        if let Some(found) = find_duplicate(&window, &rule.matchers, &existing) {
            info!(
                rule = %location,
                silence_id = found.id.as_deref().unwrap_or("-"),
                %window,
                "silence already exists"
            );
            return Ok(Outcome::Duplicate(window));
        }

        let request = SilenceRequest {
            comment: rule.comment(global).to_string(),
            author: rule.author(global).to_string(),
            window,
            matchers: rule.matchers.render(),
        };

        if self.dry_run {
            info!(rule = %location, %window, matchers = ?request.matchers, "dry run: silence not created");
            return Ok(Outcome::DryRun(window));
        }

        self.store.create(&request).await?;
        info!(rule = %location, %window, "silence created");
        Ok(Outcome::Created(window))
    }
}

/// Prefix store failures with the rule being processed. Validation errors
/// already carry their location.
fn with_rule_context(rule: &Rule, err: HushError) -> HushError {
    match err {
        HushError::Parse(msg) => HushError::Parse(format!("{}: {msg}", rule.location())),
        HushError::Transport(msg) => HushError::Transport(format!("{}: {msg}", rule.location())),
        other => other,
    }
}
