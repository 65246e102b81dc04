//! hush-amtool: the Alertmanager side of hush.
//!
//! Implements [`hush_scheduler::SilenceStore`] by running `amtool` inside an
//! Alertmanager pod:
//!
//! - [`command`]: renders `silence query` / `silence add` command lines
//! - [`decode`]: lenient decoding of the query output
//! - [`exec`]: the [`exec::Executor`] seam and its `kubectl exec` implementation
//! - [`store`]: [`store::AmtoolStore`], tying the three together

pub mod command;
pub mod decode;
pub mod exec;
pub mod store;
pub mod truncate;
pub mod types;

pub use exec::{Executor, KubectlExecutor};
pub use store::AmtoolStore;
pub use types::{ConnectionMode, ExecOptions, ExecResult};
