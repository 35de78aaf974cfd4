//! TOML configuration parsing and management.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::transport::PollConfig;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            logging: LoggingConfig::default(),
            execution: ExecutionConfig::default(),
            transport: TransportConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

/// Agent identity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,
    #[serde(default = "default_agent_version")]
    pub version: String,
}

fn default_agent_name() -> String {
    "promptcall".to_string()
}

fn default_agent_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            version: default_agent_version(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub log_file: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_file() -> String {
    std::env::temp_dir()
        .join("promptcall")
        .join(format!(
            "run_{}_{}.md",
            Utc::now().timestamp_millis(),
            std::process::id()
        ))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }
}

/// Orchestration loop limits and loop-breaking behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_max_tool_calls")]
    pub max_tool_calls: u32,
    #[serde(default = "default_detect_duplicates")]
    pub detect_duplicates: bool,
    #[serde(default = "default_duplicate_window")]
    pub duplicate_window: usize,
}

fn default_max_iterations() -> u32 {
    10
}

fn default_max_tool_calls() -> u32 {
    20
}

fn default_detect_duplicates() -> bool {
    true
}

fn default_duplicate_window() -> usize {
    3
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_tool_calls: default_max_tool_calls(),
            detect_duplicates: default_detect_duplicates(),
            duplicate_window: default_duplicate_window(),
        }
    }
}

/// Transport channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: u32,
    #[serde(default = "default_required_stable")]
    pub required_stable: u32,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_poll_max_attempts() -> u32 {
    90
}

fn default_required_stable() -> u32 {
    2
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: None,
            poll_interval_ms: default_poll_interval_ms(),
            poll_max_attempts: default_poll_max_attempts(),
            required_stable: default_required_stable(),
        }
    }
}

impl TransportConfig {
    /// Build the polling schedule for the configured channel.
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval_ms: self.poll_interval_ms,
            max_attempts: self.poll_max_attempts,
            required_stable: self.required_stable,
        }
    }
}

/// Tools configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_workspace_root")]
    pub workspace_root: String,
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    #[serde(default = "default_max_preflight_files")]
    pub max_preflight_files: usize,
}

fn default_workspace_root() -> String {
    ".".to_string()
}

fn default_max_preflight_files() -> usize {
    5
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            workspace_root: default_workspace_root(),
            excluded_paths: Vec::new(),
            max_preflight_files: default_max_preflight_files(),
        }
    }
}

/// Loads and manages TOML configuration.
#[derive(Debug)]
pub struct ConfigurationLoader {
    pub config_path: PathBuf,
    pub config: Configuration,
}

impl ConfigurationLoader {
    /// Initialize configuration loader.
    ///
    /// # Arguments
    /// * `config_path` - Path to TOML config file. If None, uses default config.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config_path = config_path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("config/promptcall.toml"));

        let config = if config_path.exists() {
            Self::load_config(&config_path)?
        } else {
            Configuration::default()
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Create a loader from a pre-parsed Configuration, reading no files.
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config_path: PathBuf::from("config/promptcall.toml"),
            config,
        }
    }

    /// Load configuration from TOML file.
    fn load_config(path: &Path) -> Result<Configuration> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }
}
