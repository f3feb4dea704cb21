//! Shared HTTP client utilities

use homeward_core::{Error, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Maximum number of idle connections per host
    pub pool_max_idle_per_host: usize,

    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            pool_max_idle_per_host: 4,
            user_agent: format!("Homeward/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Create a configured HTTP client with connection pooling
pub fn create_client(config: &HttpClientConfig) -> Result<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        // Expire idle connections before the upstream closes them
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))
}
