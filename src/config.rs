use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use sitesync_core::{ApiOptions, FileSessionStore};

const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_AUTH_SCHEME: &str = "Token";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Base URL of the REST backend
    pub api_url: ConfigValue<String>,
    /// Directory holding the session file
    pub data_dir: ConfigValue<PathBuf>,
    /// Scheme placed before the token in the Authorization header
    pub auth_scheme: ConfigValue<String>,
    /// Request timeout in seconds
    pub timeout_secs: ConfigValue<u64>,
    /// Append a trailing slash to every request path
    pub trailing_slash: ConfigValue<bool>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    api_url: Option<String>,
    data_dir: Option<PathBuf>,
    auth_scheme: Option<String>,
    timeout_secs: Option<u64>,
    trailing_slash: Option<bool>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut api_url = ConfigValue::new(DEFAULT_API_URL.to_string(), ConfigSource::Default);
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut auth_scheme =
            ConfigValue::new(DEFAULT_AUTH_SCHEME.to_string(), ConfigSource::Default);
        let mut timeout_secs = ConfigValue::new(DEFAULT_TIMEOUT_SECS, ConfigSource::Default);
        let mut trailing_slash = ConfigValue::new(false, ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(url) = file_config.api_url {
                api_url = ConfigValue::new(url, ConfigSource::File);
            }
            if let Some(dir) = file_config.data_dir {
                // Resolve relative paths against config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(scheme) = file_config.auth_scheme {
                auth_scheme = ConfigValue::new(scheme, ConfigSource::File);
            }
            if let Some(secs) = file_config.timeout_secs {
                timeout_secs = ConfigValue::new(secs, ConfigSource::File);
            }
            if let Some(slash) = file_config.trailing_slash {
                trailing_slash = ConfigValue::new(slash, ConfigSource::File);
            }
        }

        if let Ok(url) = std::env::var("SITESYNC_API_URL") {
            api_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        if let Ok(dir) = std::env::var("SITESYNC_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(scheme) = std::env::var("SITESYNC_AUTH_SCHEME") {
            auth_scheme = ConfigValue::new(scheme, ConfigSource::Environment);
        }
        if let Ok(raw) = std::env::var("SITESYNC_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("SITESYNC_TIMEOUT_SECS", raw.clone()))?;
            timeout_secs = ConfigValue::new(secs, ConfigSource::Environment);
        }

        Ok(Self {
            api_url,
            data_dir,
            auth_scheme,
            timeout_secs,
            trailing_slash,
            config_file,
        })
    }

    /// Connection settings for the API client.
    pub fn api_options(&self) -> ApiOptions {
        ApiOptions {
            base_url: self.api_url.value.clone(),
            auth_scheme: self.auth_scheme.value.clone(),
            timeout: Duration::from_secs(self.timeout_secs.value),
            trailing_slash: self.trailing_slash.value,
        }
    }

    pub fn session_store(&self) -> FileSessionStore {
        FileSessionStore::in_dir(&self.data_dir.value)
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/sitesync/
    /// - macOS: ~/Library/Application Support/sitesync/
    /// - Windows: %APPDATA%/sitesync/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sitesync")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/sitesync/
    /// - macOS: ~/Library/Application Support/sitesync/
    /// - Windows: %APPDATA%/sitesync/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sitesync")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidEnv(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidEnv(var, value) => {
                write!(f, "Invalid value '{}' for {}", value, var)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.api_url.value, DEFAULT_API_URL);
        assert_eq!(config.api_url.source, ConfigSource::Default);
        assert_eq!(config.timeout_secs.value, 30);
        assert!(!config.trailing_slash.value);
        assert!(config.data_dir.value.ends_with("sitesync"));
        assert_eq!(config.config_file, None);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "api_url: https://build.example.com/api").unwrap();
        writeln!(file, "auth_scheme: Bearer").unwrap();
        writeln!(file, "timeout_secs: 5").unwrap();
        writeln!(file, "trailing_slash: true").unwrap();
        writeln!(file, "data_dir: state").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.api_url.value, "https://build.example.com/api");
        assert_eq!(config.api_url.source, ConfigSource::File);
        assert_eq!(config.auth_scheme.value, "Bearer");
        assert_eq!(config.data_dir.value, temp_dir.path().join("state"));
        assert_eq!(config.config_file, Some(config_path));

        let options = config.api_options();
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert!(options.trailing_slash);
    }

    #[test]
    #[ignore] // Run with --ignored; env vars can pollute parallel tests
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "api_url: http://fromfile").unwrap();

        std::env::set_var("SITESYNC_API_URL", "http://fromenv");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.api_url.value, "http://fromenv");
        assert_eq!(config.api_url.source, ConfigSource::Environment);

        std::env::remove_var("SITESYNC_API_URL");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
