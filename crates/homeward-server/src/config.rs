use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub tractive: TractiveSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TractiveSettings {
    /// Override for the Tractive API base URL (staging, mocks)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tractive: TractiveSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("HOMEWARD_HOST") {
            self.host = val;
        }

        if let Ok(val) = std::env::var("HOMEWARD_PORT") {
            if let Ok(port) = val.parse::<u16>() {
                self.port = port;
            }
        }

        if let Ok(val) = std::env::var("HOMEWARD_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("TRACTIVE_BASE_URL") {
            self.tractive.base_url = Some(val);
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert!(config.tractive.base_url.is_none());
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"host: 0.0.0.0\nport: 9090\nlogging:\n  level: debug\n")
            .unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9090);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"host = \"0.0.0.0\"\nport = 9090\n\n[tractive]\nbase_url = \"http://localhost:4000\"\n")
            .unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(
            config.tractive.base_url.as_deref(),
            Some("http://localhost:4000")
        );
    }

    #[test]
    #[serial]
    fn test_merge_env_takes_precedence() {
        std::env::set_var("HOMEWARD_PORT", "3001");
        std::env::set_var("HOMEWARD_LOG_LEVEL", "trace");
        std::env::set_var("TRACTIVE_BASE_URL", "http://localhost:4000");

        let mut config = ServerConfig::default();
        config.merge_env();

        assert_eq!(config.port, 3001);
        assert_eq!(config.logging.level, "trace");
        assert_eq!(
            config.tractive.base_url.as_deref(),
            Some("http://localhost:4000")
        );

        std::env::remove_var("HOMEWARD_PORT");
        std::env::remove_var("HOMEWARD_LOG_LEVEL");
        std::env::remove_var("TRACTIVE_BASE_URL");
    }

    #[test]
    #[serial]
    fn test_merge_env_ignores_invalid_port() {
        std::env::set_var("HOMEWARD_PORT", "not-a-port");

        let mut config = ServerConfig::default();
        config.merge_env();
        assert_eq!(config.port, 8080);

        std::env::remove_var("HOMEWARD_PORT");
    }
}
