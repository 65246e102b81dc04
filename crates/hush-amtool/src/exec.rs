//! Running `amtool` inside an Alertmanager pod through `kubectl exec`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use hush_core::{HushError, Result};
use rand::seq::IndexedRandom;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, info};

use crate::truncate::truncate_output;
use crate::types::{ConnectionMode, ExecOptions, ExecResult};

const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// Runs a shell command line somewhere `amtool` is available.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn exec(&self, command: &str) -> Result<ExecResult>;
}

/// Executes commands in a randomly chosen pod of the Alertmanager namespace.
pub struct KubectlExecutor {
    kubectl: String,
    namespace: String,
    /// Extra global flags selecting the cluster connection.
    connection_args: Vec<String>,
    options: ExecOptions,
}

impl KubectlExecutor {
    /// Check that credentials for `mode` are present and build the executor.
    pub fn new(
        mode: ConnectionMode,
        namespace: impl Into<String>,
        options: ExecOptions,
    ) -> Result<Self> {
        let connection_args = match mode {
            ConnectionMode::In => {
                in_cluster_check(Path::new(SERVICE_ACCOUNT_DIR))?;
                Vec::new()
            }
            ConnectionMode::Out => {
                let path = kubeconfig_path()?;
                vec!["--kubeconfig".to_string(), path.display().to_string()]
            }
        };

        let namespace = namespace.into();
        info!(%mode, %namespace, "kubernetes connection configured");
        Ok(Self {
            kubectl: "kubectl".to_string(),
            namespace,
            connection_args,
            options,
        })
    }

    /// Use a different `kubectl` binary.
    pub fn with_kubectl(mut self, kubectl: impl Into<String>) -> Self {
        self.kubectl = kubectl.into();
        self
    }

    /// Names of the running pods in the namespace. Empty is an error.
    pub async fn list_pods(&self) -> Result<Vec<String>> {
        let result = self
            .kubectl(&[
                "get",
                "pods",
                "--field-selector=status.phase=Running",
                "-o",
                "jsonpath={.items[*].metadata.name}",
            ])
            .await?;
        if !result.success() {
            return Err(HushError::Transport(format!(
                "listing pods in {} failed: {}",
                self.namespace,
                self.quote(&result.stderr)
            )));
        }

        let pods = parse_pod_names(&result.stdout);
        if pods.is_empty() {
            return Err(HushError::Transport(format!(
                "Alertmanager pods not found in namespace {}",
                self.namespace
            )));
        }
        Ok(pods)
    }

    /// Run `args` through `kubectl -n <namespace>` with the configured timeout.
    async fn kubectl(&self, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = AsyncCommand::new(&self.kubectl);
        cmd.args(&self.connection_args)
            .arg("-n")
            .arg(&self.namespace)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| HushError::Transport(format!("spawning {} failed: {e}", self.kubectl)))?;

        let timeout = Duration::from_secs(self.options.timeout_secs);
        // Dropping the future on timeout kills the child (kill_on_drop).
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(output) => output.map_err(|e| {
                HushError::Transport(format!("waiting for {} failed: {e}", self.kubectl))
            })?,
            Err(_elapsed) => {
                return Err(HushError::Transport(format!(
                    "{} {} timed out after {}s",
                    self.kubectl,
                    args.first().unwrap_or(&""),
                    self.options.timeout_secs
                )))
            }
        };

        Ok(ExecResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn quote(&self, output: &str) -> String {
        truncate_output(output.trim(), self.options.max_output_chars)
    }
}

#[async_trait]
impl Executor for KubectlExecutor {
    async fn exec(&self, command: &str) -> Result<ExecResult> {
        let pods = self.list_pods().await?;
        let pod = pods
            .choose(&mut rand::rng())
            .ok_or_else(|| HushError::Transport("no pod to choose from".to_string()))?;

        debug!(%pod, %command, "exec in pod");
        let result = self
            .kubectl(&["exec", pod.as_str(), "--", "sh", "-c", command])
            .await?;
        if !result.success() {
            debug!(%pod, exit_code = result.exit_code, stderr = %self.quote(&result.stderr), "remote command failed");
        }
        Ok(result)
    }
}

/// In-cluster mode needs the API server address and a mounted service account.
fn in_cluster_check(service_account_dir: &Path) -> Result<()> {
    for var in ["KUBERNETES_SERVICE_HOST", "KUBERNETES_SERVICE_PORT"] {
        if std::env::var_os(var).is_none() {
            return Err(HushError::Config(format!(
                "in-cluster connection requested but {var} is not set"
            )));
        }
    }
    for file in ["token", "ca.crt"] {
        let path = service_account_dir.join(file);
        if !path.exists() {
            return Err(HushError::Config(format!(
                "in-cluster connection requested but {} is missing",
                path.display()
            )));
        }
    }
    Ok(())
}

/// `KUBECONFIG` (first entry) or `~/.kube/config`; must exist.
fn kubeconfig_path() -> Result<PathBuf> {
    let path = match std::env::var("KUBECONFIG") {
        Ok(list) if !list.is_empty() => std::env::split_paths(&list)
            .next()
            .unwrap_or_default(),
        _ => {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            Path::new(&home).join(".kube").join("config")
        }
    };
    if !path.exists() {
        return Err(HushError::Config(format!(
            "kubeconfig {} not found",
            path.display()
        )));
    }
    Ok(path)
}

/// Split `jsonpath` output (space separated names) into pod names.
fn parse_pod_names(stdout: &str) -> Vec<String> {
    stdout.split_whitespace().map(str::to_string).collect()
}
