//! Tool catalog: definitions, registration, and per-run snapshots.
//!
//! Tools are registered once at process start and outlive any single
//! run. Each run receives an immutable snapshot of its allowed subset
//! (or the full catalog), so concurrent runs never race a mutating
//! registration.

mod definition;
mod error;
mod registry;

pub use definition::{ToolDefinition, ToolHandler};
pub use error::ToolError;
pub use registry::{DefaultToolRegistry, ToolRegistry};
