use anyhow::{anyhow, Result};
use config::Config;
use std::collections::HashMap;
use std::path::Path;

/// Default base URL for the BGPView routing-data API
pub const DEFAULT_API_BASE_URL: &str = "https://api.bgpview.io";

/// Default per-lookup DNS timeout in seconds
pub const DEFAULT_DNS_TIMEOUT_SECS: u64 = 5;

/// Default per-request HTTP timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

pub struct NetlensConfig {
    /// Base URL of the routing-data API
    pub api_base_url: String,

    /// Per-lookup DNS timeout in seconds
    pub dns_timeout_secs: u64,

    /// Per-request HTTP timeout in seconds for the routing-data API
    pub http_timeout_secs: u64,
}

const EMPTY_CONFIG: &str = r#"### netlens configuration file

### base URL of the routing-data API
# api_base_url = "https://api.bgpview.io"

### per-lookup DNS timeout in seconds
# dns_timeout_secs = 5

### per-request HTTP timeout in seconds for the routing-data API
# http_timeout_secs = 10
"#;

impl Default for NetlensConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            dns_timeout_secs: DEFAULT_DNS_TIMEOUT_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl NetlensConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<NetlensConfig> {
        let mut builder = Config::builder();

        // By default use $HOME/.netlens/netlens.toml as the configuration file path
        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();

        let netlens_dir = format!("{}/.netlens", home_dir.as_str());

        // Add in toml configuration file
        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                std::fs::create_dir_all(netlens_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create netlens directory: {}", e))?;
                let p = format!("{}/netlens.toml", netlens_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // Add in settings from the environment (with a prefix of NETLENS)
        // E.g., `NETLENS_API_BASE_URL=http://localhost:8080 ./netlens` would
        // point the routing lens at a different API endpoint
        builder = builder.add_source(config::Environment::with_prefix("NETLENS"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        let api_base_url = config
            .get("api_base_url")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let dns_timeout_secs = config
            .get("dns_timeout_secs")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_DNS_TIMEOUT_SECS);

        let http_timeout_secs = config
            .get("http_timeout_secs")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        Ok(NetlensConfig {
            api_base_url,
            dns_timeout_secs,
            http_timeout_secs,
        })
    }
}
