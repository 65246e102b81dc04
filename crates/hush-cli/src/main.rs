use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use hush_amtool::{AmtoolStore, ConnectionMode, ExecOptions, KubectlExecutor};
use hush_core::config::{
    DEFAULT_AMTOOL, DEFAULT_CONFIG_PATH, DEFAULT_EXEC_TIMEOUT_SECS, DEFAULT_NAMESPACE,
    DEFAULT_TIMEZONE,
};
use hush_core::{HushConfig, HushError};
use hush_scheduler::timezone::{local_now, parse_zone};
use hush_scheduler::SilenceEngine;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("HUSH_GIT_SHA"), ")");

/// Create today's recurring Alertmanager silences.
#[derive(Debug, Parser)]
#[command(name = "hush", version, long_version = LONG_VERSION)]
struct Args {
    /// Silence rules document (YAML).
    #[arg(long, env = "FILE_CONF", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Kubernetes connection: `in` (service account) or `out` (kubeconfig).
    #[arg(long, env = "K8S_CONNECTION", default_value = "in")]
    connection: ConnectionMode,

    /// Namespace holding the Alertmanager pods.
    #[arg(long, env = "HUSH_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    /// `amtool` invocation prefix run inside the pod.
    #[arg(long, env = "HUSH_AMTOOL", default_value = DEFAULT_AMTOOL)]
    amtool: String,

    /// `kubectl` binary used to reach the cluster.
    #[arg(long, env = "HUSH_KUBECTL", default_value = "kubectl")]
    kubectl: String,

    /// IANA zone the rule times are written in.
    #[arg(long, env = "HUSH_TIMEZONE", default_value = DEFAULT_TIMEZONE)]
    timezone: String,

    /// Seconds before a kubectl call is killed.
    #[arg(long, env = "HUSH_EXEC_TIMEOUT", default_value_t = DEFAULT_EXEC_TIMEOUT_SECS)]
    exec_timeout: u64,

    /// Evaluate and deduplicate, but do not create silences.
    #[arg(long, env = "HUSH_DRY_RUN")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "hush_cli=info,hush_core=info,hush_scheduler=info,hush_amtool=info".into()
            }),
        )
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let started = Instant::now();
    let code = tokio::select! {
        result = run(args) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                let code = e.downcast_ref::<HushError>().map_or("ERROR", HushError::code);
                error!(code, "{e:#}");
                ExitCode::FAILURE
            }
        },
        signal = shutdown_signal() => {
            info!(signal, "got signal, stopping");
            ExitCode::SUCCESS
        }
    };

    info!(
        duration = %format!("{:.4}s", started.elapsed().as_secs_f64()),
        "finished"
    );
    code
}

async fn run(args: Args) -> anyhow::Result<()> {
    let run_id = Uuid::now_v7();
    let span = info_span!("run", %run_id);

    async move {
        info!(version = LONG_VERSION, config = %args.config.display(), "hush starting");

        let zone = parse_zone(&args.timezone)?;
        let config = HushConfig::load(&args.config)
            .with_context(|| format!("loading {}", args.config.display()))?;

        if config.rules.is_empty() {
            info!("no alerts configured, nothing to do");
            return Ok(());
        }

        let options = ExecOptions {
            timeout_secs: args.exec_timeout,
            ..ExecOptions::default()
        };
        let executor = KubectlExecutor::new(args.connection, &args.namespace, options)?
            .with_kubectl(&args.kubectl);
        let store = AmtoolStore::new(executor, &args.amtool);
        let engine = SilenceEngine::new(store, zone).with_dry_run(args.dry_run);

        // One instant for every rule in this run.
        let now = local_now(zone);
        engine.run(&config, now).await?;
        Ok(())
    }
    .instrument(span)
    .await
}

/// Resolves with the name of the first termination signal received.
async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        if let Ok(mut term) = signal(SignalKind::terminate()) {
            tokio::select! {
                Ok(()) = tokio::signal::ctrl_c() => return "SIGINT",
                Some(()) = term.recv() => return "SIGTERM",
                else => {}
            }
        }
    }

    let _ = tokio::signal::ctrl_c().await;
    "SIGINT"
}
