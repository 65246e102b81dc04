// Drive the engine end to end against an in-memory silence store.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Europe::Madrid;
use hush_core::{
    ExistingSilence, HushConfig, HushError, MatcherPair, Result, SilenceRequest,
};
use hush_scheduler::{RunReport, SilenceEngine, SilenceStore};

const CONFIG: &str = r#"
global:
  comment: "maintenance"
  author: "ops"
alerts:
  - when:
      everyDay: { timeStart: "23:00:00", timeEnd: "01:00:00" }
    labels:
      - { name: alertname, value: BackupRunning, type: string }
  - when:
      everyTuesday: { timeStart: "12:00:00", timeEnd: "14:00:00" }
    comment: "weekly deploy"
    labels:
      - { name: alertname, value: Deploy, type: string }
      - { name: pod, value: "api-.*", type: regex }
  - when:
      everyMonday: { timeStart: "12:00:00", timeEnd: "14:00:00" }
    labels:
      - { name: alertname, value: Mondays, type: string }
"#;

#[derive(Default)]
struct MemoryStore {
    existing: Mutex<Vec<ExistingSilence>>,
    created: Mutex<Vec<SilenceRequest>>,
    fail_query: bool,
}

#[async_trait]
impl SilenceStore for MemoryStore {
    async fn query(&self) -> Result<Vec<ExistingSilence>> {
        if self.fail_query {
            return Err(HushError::Transport("connection refused".to_string()));
        }
        Ok(self.existing.lock().unwrap().clone())
    }

    async fn create(&self, request: &SilenceRequest) -> Result<()> {
        self.created.lock().unwrap().push(request.clone());
        self.existing.lock().unwrap().push(ExistingSilence {
            id: None,
            status: Some("active".to_string()),
            starts_at: request.window.start_utc,
            ends_at: request.window.end_utc,
            matchers: request.matchers.iter().map(String::as_str).map(unrender).collect(),
        });
        Ok(())
    }
}

/// `name="v"` / `name=~"v"` back into a pair.
fn unrender(rendered: &str) -> MatcherPair {
    let (name, rest) = rendered.split_once('=').unwrap();
    let value = rest.trim_start_matches('~').trim_matches('"');
    MatcherPair {
        name: name.to_string(),
        value: value.to_string(),
    }
}

// 2024-03-05 is a Tuesday.
fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn config() -> HushConfig {
    HushConfig::from_yaml_str(CONFIG).unwrap()
}

#[tokio::test]
async fn creates_silences_for_rules_firing_today() {
    let engine = SilenceEngine::new(MemoryStore::default(), Madrid);
    let report = engine.run(&config(), now()).await.unwrap();

    assert_eq!(
        report,
        RunReport {
            created: 2,
            duplicates: 0,
            not_today: 1,
            dry_run: 0,
        }
    );

    let created = engine.store().created.lock().unwrap();
    assert_eq!(created[0].comment, "maintenance");
    assert_eq!(created[0].window.start_rendered(), "2024-03-05T22:00:00+00:00");
    assert_eq!(created[0].window.end_rendered(), "2024-03-06T00:00:00+00:00");
    assert_eq!(created[0].matchers, vec![r#"alertname="BackupRunning""#]);

    assert_eq!(created[1].comment, "weekly deploy");
    assert_eq!(created[1].author, "ops");
    assert_eq!(created[1].window.start_rendered(), "2024-03-05T11:00:00+00:00");
    assert_eq!(
        created[1].matchers,
        vec![r#"alertname="Deploy""#, r#"pod=~"api-.*""#]
    );
}

#[tokio::test]
async fn second_run_is_idempotent() {
    let engine = SilenceEngine::new(MemoryStore::default(), Madrid);
    let cfg = config();
    engine.run(&cfg, now()).await.unwrap();

    let report = engine.run(&cfg, now()).await.unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(report.duplicates, 2);
    assert_eq!(engine.store().created.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn dry_run_never_creates() {
    let engine = SilenceEngine::new(MemoryStore::default(), Madrid).with_dry_run(true);
    let report = engine.run(&config(), now()).await.unwrap();

    assert_eq!(report.dry_run, 2);
    assert_eq!(report.created, 0);
    assert!(engine.store().created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn store_failure_aborts_with_rule_context() {
    let store = MemoryStore {
        fail_query: true,
        ..Default::default()
    };
    let engine = SilenceEngine::new(store, Madrid);
    let err = engine.run(&config(), now()).await.unwrap_err();

    assert_eq!(err.code(), "TRANSPORT_ERROR");
    assert!(err
        .to_string()
        .contains("alerts[0] (alertname=BackupRunning)"));
    assert!(engine.store().created.lock().unwrap().is_empty());
}
