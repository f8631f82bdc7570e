//! Logging configuration.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/weblog/config.toml` when
//! present, then overridden from the environment. The facade only consumes the
//! resolved values.

use crate::{Error, Result, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the error log inside the log directory
pub const ERROR_LOG_FILE: &str = "error_log.log";

/// Deployment environment of the host server
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Other(String),
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Console threshold when none is configured
    pub fn default_console_level(&self) -> Severity {
        if self.is_development() {
            Severity::Debug
        } else {
            Severity::Info
        }
    }
}

impl From<String> for Environment {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "production" | "prod" => Environment::Production,
            _ => Environment::Other(value),
        }
    }
}

impl From<Environment> for String {
    fn from(value: Environment) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
            Environment::Other(name) => f.write_str(name),
        }
    }
}

/// Logging configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    /// Master switch; `false` selects the degraded pass-through logger
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub environment: Environment,

    /// Level switch. `"none"`, `"off"` or `"false"` disable logging; a
    /// severity name sets the console threshold when `min_console_level`
    /// is unset.
    #[serde(default)]
    pub level: Option<String>,

    /// Console threshold; defaults by environment
    #[serde(default)]
    pub min_console_level: Option<Severity>,

    #[serde(default = "default_true")]
    pub colorize: bool,

    #[serde(default = "default_true")]
    pub file_enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    #[serde(default = "default_file_max_bytes")]
    pub file_max_bytes: u64,

    #[serde(default = "default_file_max_rotations")]
    pub file_max_rotations: usize,

    /// Capacity of the background file writer queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Redirect ambient `tracing`/`log` output into the facade
    #[serde(default)]
    pub override_global_console: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            environment: Environment::default(),
            level: None,
            min_console_level: None,
            colorize: true,
            file_enabled: true,
            log_dir: default_log_dir(),
            file_max_bytes: default_file_max_bytes(),
            file_max_rotations: default_file_max_rotations(),
            queue_capacity: default_queue_capacity(),
            override_global_console: false,
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}

fn default_file_max_bytes() -> u64 {
    1_024_000
}

fn default_file_max_rotations() -> usize {
    10
}

fn default_queue_capacity() -> usize {
    1_024
}

impl LogConfig {
    /// Load configuration from the standard config path, falling back to
    /// defaults, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        let config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            tracing::debug!("No config file found at {:?}, using defaults", config_path);
            Self::default()
        };
        Ok(config.apply_env())
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: LogConfig = toml::from_str(&contents)?;
        tracing::debug!("Loaded logging config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("weblog").join("config.toml")
    }

    /// Save the configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Recognized variables: `WEBLOG_ENV` (falls back to `APP_ENV`),
    /// `WEBLOG_ENABLED`, `WEBLOG_LEVEL`, `WEBLOG_DIR`.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(env) = lookup("WEBLOG_ENV").or_else(|| lookup("APP_ENV")) {
            self.environment = Environment::from(env);
        }
        if let Some(enabled) = lookup("WEBLOG_ENABLED") {
            self.enabled = !matches!(
                enabled.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }
        if let Some(level) = lookup("WEBLOG_LEVEL") {
            self.level = Some(level);
        }
        if let Some(dir) = lookup("WEBLOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        self
    }

    /// Whether the configuration asks for the degraded pass-through logger
    pub fn is_disabled(&self) -> bool {
        if !self.enabled {
            return true;
        }
        self.level.as_deref().is_some_and(|level| {
            matches!(
                level.trim().to_ascii_lowercase().as_str(),
                "none" | "off" | "false"
            )
        })
    }

    /// Console threshold: explicit setting, then the level switch, then
    /// `debug` in development and `info` elsewhere
    pub fn console_level(&self) -> Result<Severity> {
        if let Some(level) = self.min_console_level {
            return Ok(level);
        }
        if let Some(level) = self.level.as_deref() {
            return level.parse();
        }
        Ok(self.environment.default_console_level())
    }

    /// Path of the error log file
    pub fn error_log_path(&self) -> PathBuf {
        self.log_dir.join(ERROR_LOG_FILE)
    }

    /// Check values that would make the active logger unusable
    pub fn validate(&self) -> Result<()> {
        self.console_level()
            .map_err(|e| Error::Config(format!("level: {}", e)))?;

        if self.file_enabled {
            if self.log_dir.as_os_str().is_empty() {
                return Err(Error::Config("log_dir must not be empty".into()));
            }
            if self.file_max_bytes == 0 {
                return Err(Error::Config("file_max_bytes must be positive".into()));
            }
            if self.queue_capacity == 0 {
                return Err(Error::Config("queue_capacity must be positive".into()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert!(!config.is_disabled());
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.file_max_bytes, 1_024_000);
        assert_eq!(config.file_max_rotations, 10);
        assert_eq!(config.error_log_path(), PathBuf::from("./logs/error_log.log"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_console_level_by_environment() {
        let mut config = LogConfig::default();
        assert_eq!(config.console_level().unwrap(), Severity::Debug);

        config.environment = Environment::Production;
        assert_eq!(config.console_level().unwrap(), Severity::Info);

        config.environment = Environment::Other("staging".into());
        assert_eq!(config.console_level().unwrap(), Severity::Info);

        config.min_console_level = Some(Severity::Warning);
        assert_eq!(config.console_level().unwrap(), Severity::Warning);
    }

    #[test]
    fn test_level_switch() {
        let mut config = LogConfig::default();

        config.level = Some("none".into());
        assert!(config.is_disabled());

        config.level = Some("FALSE".into());
        assert!(config.is_disabled());

        config.level = Some("notice".into());
        assert!(!config.is_disabled());
        assert_eq!(config.console_level().unwrap(), Severity::Notice);

        config.level = Some("chatty".into());
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_disabled_flag() {
        let config = LogConfig {
            enabled: false,
            ..LogConfig::default()
        };
        assert!(config.is_disabled());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = LogConfig {
            file_max_bytes: 0,
            ..LogConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        // Irrelevant when the file sink is off
        let config = LogConfig {
            file_max_bytes: 0,
            file_enabled: false,
            ..LogConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = LogConfig::default().apply_env_from(lookup(&[
            ("APP_ENV", "production"),
            ("WEBLOG_LEVEL", "warning"),
            ("WEBLOG_DIR", "/var/log/site"),
        ]));
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.console_level().unwrap(), Severity::Warning);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/site"));

        let config = LogConfig::default().apply_env_from(lookup(&[
            ("WEBLOG_ENV", "test"),
            ("APP_ENV", "production"),
            ("WEBLOG_ENABLED", "off"),
        ]));
        assert_eq!(config.environment, Environment::Other("test".into()));
        assert!(config.is_disabled());
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
environment = "production"
file_max_rotations = 3
min_console_level = "notice"
"#;
        let config: LogConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.file_max_rotations, 3);
        assert_eq!(config.min_console_level, Some(Severity::Notice));
        assert_eq!(config.file_max_bytes, 1_024_000); // default
    }

    #[test]
    fn test_default_config_path() {
        let path = LogConfig::default_config_path();
        assert!(path.ends_with("weblog/config.toml"));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = LogConfig {
            environment: Environment::Other("staging".into()),
            override_global_console: true,
            ..LogConfig::default()
        };
        config.save_to(&path).unwrap();

        let loaded = LogConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
