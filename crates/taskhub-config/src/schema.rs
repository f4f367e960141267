//! Configuration schema definitions.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use taskhub_protocols::TopologyTemplate;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub coordinator: CoordinatorConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Extra topology templates, registered after the built-in ones.
    #[serde(default)]
    pub templates: Vec<TopologyTemplate>,
}

/// `~/.taskhub`, or `./.taskhub` without a home directory.
pub fn taskhub_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".taskhub"))
        .unwrap_or_else(|| PathBuf::from(".taskhub"))
}

/// Session store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory holding the session file.
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    taskhub_dir().join("session")
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
        }
    }
}

/// Lifecycle coordinator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Periodic session save interval (in seconds).
    #[serde(default = "default_save_interval")]
    pub save_interval_secs: u64,

    /// Archived server cleanup interval (in seconds).
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,

    /// Restore the previous session on start.
    #[serde(default = "default_restore_on_start")]
    pub restore_on_start: bool,
}

fn default_save_interval() -> u64 {
    30
}

fn default_cleanup_interval() -> u64 {
    3600 // 1 hour
}

fn default_restore_on_start() -> bool {
    true
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            save_interval_secs: default_save_interval(),
            cleanup_interval_secs: default_cleanup_interval(),
            restore_on_start: default_restore_on_start(),
        }
    }
}

impl CoordinatorConfig {
    /// Get the save interval as a Duration.
    pub fn save_interval(&self) -> Duration {
        Duration::from_secs(self.save_interval_secs)
    }

    /// Get the cleanup interval as a Duration.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

/// When a terminal progress report archives the task server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchivePolicy {
    /// Archive on every completed or failed report.
    #[default]
    Always,
    /// Archive only tasks created with `auto_archive_on_completion`.
    RespectTaskConfig,
}

/// Task server orchestrator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default)]
    pub archive_policy: ArchivePolicy,

    /// Skip the include-flag channels when the template already produced that kind.
    #[serde(default)]
    pub deduplicate_channels: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write a daily rolling log file next to console output.
    #[serde(default = "default_file_enabled")]
    pub file_enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_file_enabled() -> bool {
    true
}

fn default_log_dir() -> PathBuf {
    taskhub_dir().join("logs")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_enabled: default_file_enabled(),
            log_dir: default_log_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.coordinator.save_interval(), Duration::from_secs(30));
        assert_eq!(config.coordinator.cleanup_interval(), Duration::from_secs(3600));
        assert!(config.coordinator.restore_on_start);
        assert_eq!(config.orchestrator.archive_policy, ArchivePolicy::Always);
        assert!(!config.orchestrator.deduplicate_channels);
        assert_eq!(config.logging.level, "info");
        assert!(config.templates.is_empty());
        assert!(config.session.storage_path.ends_with("session"));
    }

    #[test]
    fn test_archive_policy_serde() {
        let policy: ArchivePolicy = serde_json::from_str("\"respect_task_config\"").unwrap();
        assert_eq!(policy, ArchivePolicy::RespectTaskConfig);
    }
}
