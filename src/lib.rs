//! PromptCall - Emulated tool calling over text-only LLM channels
//!
//! PromptCall drives multi-turn tool-calling conversations with models
//! that expose no native function-calling API. The calling convention is
//! declared in the prompt itself: the model requests tools inside a
//! single `<TOOL_CALL>` delimiter pair, and the orchestrator parses,
//! validates, dispatches, and feeds results back as plain text.
//!
//! - **`config`** - TOML configuration and environment loading
//! - **`observability`** - Markdown run logging
//! - **`protocol`** - Prompt rendering and strict response parsing
//! - **`registry`** - Tool definitions, handlers, and lookup
//! - **`tools`** - Built-in workspace file tools and access policy
//! - **`transport`** - The channel abstraction and polled completion detection
//! - **`orchestration`** - The run loop, events, and preflight variant
//!
//! # Example: a looped run
//!
//! ```ignore
//! use promptcall::prelude::*;
//! use std::sync::Arc;
//!
//! async fn example(transport: Arc<dyn Transport>) {
//!     let mut registry = DefaultToolRegistry::new();
//!     registry
//!         .register(ReadFileTool::new(".", Arc::new(AllowAll)).definition())
//!         .unwrap();
//!
//!     let orchestrator = Orchestrator::new(transport, registry);
//!     let result = orchestrator.run("What's in config.json?").await;
//!     println!("{:?}", result.content);
//! }
//! ```
//!
//! # Example: loading configuration
//!
//! ```ignore
//! use promptcall::config::ConfigurationLoader;
//! use promptcall::orchestration::RunOptions;
//! use std::path::Path;
//!
//! let loader = ConfigurationLoader::new(Some(Path::new("config/promptcall.toml"))).unwrap();
//! let options = RunOptions::from_config(&loader.config.execution, &loader.config.transport);
//! ```

#![warn(missing_docs)]

/// Configuration management
pub mod config;

/// Observability utilities
pub mod observability;

/// Orchestration loop and events
pub mod orchestration;

/// Wire protocol: prompt rendering and response parsing
pub mod protocol;

/// Tool registry and handler contract
pub mod registry;

/// Built-in workspace tools
pub mod tools;

/// Transport abstraction and completion detection
pub mod transport;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Configuration, ConfigurationLoader, EnvironmentLoader};
    pub use crate::observability::Logger;
    pub use crate::orchestration::{
        EventSink, ExecutionResult, FailureKind, Orchestrator, PreflightOrchestrator, RunEvent,
        RunOptions, RunStatus,
    };
    pub use crate::protocol::{
        Message, ParsedResponse, PromptFormatter, ResponseParser, Role, ToolCall, ToolOutcome,
    };
    pub use crate::registry::{
        DefaultToolRegistry, ToolDefinition, ToolError, ToolHandler, ToolRegistry,
    };
    pub use crate::tools::{AccessPolicy, AllowAll, BatchFileReader, DenyList, ReadFileTool};
    pub use crate::transport::{
        CallOptions, CompletionDetector, PollConfig, Sample, Transport, TransportError,
    };
}
