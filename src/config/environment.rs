//! Environment variable loading and management.
//!
//! Only channel-level settings live here. Everything else comes from
//! the TOML configuration; environment variables exist for the values
//! operators most often override per shell.

use std::env;
use std::path::Path;

/// Loads environment variables from .env file and system environment.
#[derive(Debug, Clone)]
pub struct EnvironmentLoader {
    #[allow(dead_code)]
    env_file: Option<String>,
}

impl EnvironmentLoader {
    /// Initialize the environment loader.
    ///
    /// # Arguments
    /// * `env_file` - Path to .env file. If None, looks for .env in current directory.
    pub fn new(env_file: Option<&Path>) -> Self {
        let env_path = env_file.unwrap_or(Path::new(".env"));

        // Only load a .env file if an explicit path was provided. This avoids
        // picking up repository or system .env files during unit tests which
        // expect default values.
        if env_file.is_some() && env_path.exists() {
            if let Err(e) = dotenv::from_path(env_path) {
                eprintln!("Warning: Failed to load .env file: {}", e);
            }
        }

        Self {
            env_file: env_file.map(|p| p.to_string_lossy().to_string()),
        }
    }

    /// Model identifier override, when the channel supports selection.
    pub fn model(&self) -> Option<String> {
        env::var("PROMPTCALL_MODEL").ok()
    }

    /// Log file override.
    pub fn log_file(&self) -> Option<String> {
        env::var("PROMPTCALL_LOG_FILE").ok()
    }

    /// Log level override.
    pub fn log_level(&self) -> Option<String> {
        env::var("PROMPTCALL_LOG_LEVEL").ok()
    }
}

impl Default for EnvironmentLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_selection() {
        env::remove_var("PROMPTCALL_MODEL");
        let env_loader = EnvironmentLoader::default();
        assert_eq!(env_loader.model(), None);

        env::set_var("PROMPTCALL_MODEL", "gpt-4o");
        let env_loader = EnvironmentLoader::default();
        assert_eq!(env_loader.model(), Some("gpt-4o".to_string()));

        env::remove_var("PROMPTCALL_MODEL");
    }

    #[test]
    fn test_env_file_loading() {
        let env_loader = EnvironmentLoader::new(None);
        assert!(env_loader.env_file.is_none());
    }
}
