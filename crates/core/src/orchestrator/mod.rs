//! Sync orchestrator.
//!
//! Walks the movie libraries in scope and, for every item:
//! - **Sync**: match → filter → format → splice the block into the summary
//! - **Clear**: splice the block out
//!
//! Items are processed one at a time. Per-item failures are counted in the
//! [`RunReport`] and never abort the run.

mod runner;
mod types;

pub use runner::SyncOrchestrator;
pub use types::{OrchestratorError, RunMode, RunOptions, RunReport};
