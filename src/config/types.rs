use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Channel-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listing: ListingConfig,
    pub render: RenderConfig,
    pub output: OutputConfig,
}

/// Where the ranked listings are served from
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ListingConfig {
    /// Scheme and host the listing URL templates are built on
    pub base_url: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://socialblade.com".to_string(),
        }
    }
}

/// Page loading behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderConfig {
    /// User agent sent with every page load
    pub user_agent: String,

    /// Whole-request timeout for a page load (milliseconds)
    pub load_timeout_ms: u64,

    /// TCP/TLS connect timeout (milliseconds)
    pub connect_timeout_ms: u64,

    /// How long to wait for an expected element to appear (milliseconds)
    pub wait_timeout_ms: u64,

    /// Delay between re-checks while waiting for an element (milliseconds)
    pub poll_interval_ms: u64,

    /// Maximum redirect hops followed during a load
    pub max_redirects: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("channel-harvest/", env!("CARGO_PKG_VERSION")).to_string(),
            load_timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            wait_timeout_ms: 30_000,
            poll_interval_ms: 1_000,
            max_redirects: 10,
        }
    }
}

impl RenderConfig {
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory the JSON artifacts are written under
    pub data_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}
