use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the user directory API, e.g. "http://localhost:5000/api"
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// File holding the cached session token between runs
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

// Default value functions
fn default_timeout_secs() -> u64 {
    30
}

fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

fn default_console() -> bool {
    true
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            num_threads: default_num_threads(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            console: default_console(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            bail!(
                "api.base_url must start with http:// or https://, got '{}'",
                self.api.base_url
            );
        }

        if self.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be greater than 0");
        }

        if self.session.path.as_os_str().is_empty() {
            bail!("session.path must not be empty");
        }

        if self.runtime.num_threads == 0 {
            bail!("runtime.num_threads must be greater than 0");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
        [api]
        base_url = "http://localhost:5000/api"

        [session]
        path = ".regdesk-session"
    "#;

    fn parse(toml_str: &str) -> Config {
        toml::from_str(toml_str).expect("config should parse")
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse(MINIMAL);

        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "console");
        assert!(config.runtime.num_threads > 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = Config::from_file(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5000/api");
    }

    #[test]
    fn test_from_file_missing() {
        let result = Config::from_file(&PathBuf::from("/nonexistent/regdesk.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_empty_base_url() {
        let mut config = parse(MINIMAL);
        config.api.base_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = parse(MINIMAL);
        config.api.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = parse(MINIMAL);
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut config = parse(MINIMAL);
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        let mut config = parse(MINIMAL);
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }
}
