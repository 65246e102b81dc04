//! [`SilenceStore`] backed by `amtool` through an [`Executor`].

use async_trait::async_trait;
use hush_core::{ExistingSilence, HushError, Result, SilenceRequest};
use hush_scheduler::SilenceStore;
use tracing::{debug, info};

use crate::command::{create_command, query_command};
use crate::decode::decode_silences;
use crate::exec::Executor;
use crate::truncate::{truncate_output, DEFAULT_MAX_CHARS};
use crate::types::ExecResult;

pub struct AmtoolStore<E> {
    executor: E,
    /// `amtool` invocation prefix, including global flags.
    amtool: String,
}

impl<E: Executor> AmtoolStore<E> {
    pub fn new(executor: E, amtool: impl Into<String>) -> Self {
        Self {
            executor,
            amtool: amtool.into(),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}

#[async_trait]
impl<E: Executor> SilenceStore for AmtoolStore<E> {
    async fn query(&self) -> Result<Vec<ExistingSilence>> {
        let result = self.executor.exec(&query_command(&self.amtool)).await?;
        ensure_success("silence query", &result)?;

        let silences = decode_silences(&result.stdout)?;
        debug!(count = silences.len(), "existing silences loaded");
        Ok(silences)
    }

    async fn create(&self, request: &SilenceRequest) -> Result<()> {
        let cmd = create_command(&self.amtool, request);
        let result = self.executor.exec(&cmd).await?;
        ensure_success("silence add", &result)?;

        // amtool prints the new silence ID on success.
        info!(silence_id = %result.stdout.trim(), "amtool accepted silence");
        Ok(())
    }
}

fn ensure_success(what: &str, result: &ExecResult) -> Result<()> {
    if result.success() {
        return Ok(());
    }
    let detail = if result.stderr.trim().is_empty() {
        &result.stdout
    } else {
        &result.stderr
    };
    Err(HushError::Transport(format!(
        "amtool {what} exited with {}: {}",
        result.exit_code,
        truncate_output(detail.trim(), DEFAULT_MAX_CHARS)
    )))
}
