//! Configuration management for the orchestrator.

mod config;
mod environment;

pub use config::{
    AgentConfig, Configuration, ConfigurationLoader, ExecutionConfig, LoggingConfig, ToolsConfig,
    TransportConfig,
};
pub use environment::EnvironmentLoader;
