//! Tool-calling orchestration over a text-only transport.

mod events;
mod preflight;
mod runner;

pub use events::{EventSink, RunEvent};
pub use preflight::{PreflightOptions, PreflightOrchestrator, WorkspaceOverview};
pub use runner::{ExecutionResult, FailureKind, Orchestrator, RunOptions, RunStatus};
