use async_trait::async_trait;
use hush_core::{ExistingSilence, Result, SilenceRequest};

/// Where silences are read from and created in.
///
/// Implementations own the transport (pod exec, HTTP, …); the engine only
/// sees typed silences.
#[async_trait]
pub trait SilenceStore: Send + Sync {
    /// All silences currently known to the store.
    async fn query(&self) -> Result<Vec<ExistingSilence>>;

    /// Create one silence.
    async fn create(&self, request: &SilenceRequest) -> Result<()>;
}
