use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the headless browser that renders the source page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Navigation timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// How long to wait for any candidate selector to appear, in seconds (default: 15)
    pub ready_timeout_secs: u64,

    /// Interval between readiness probes in milliseconds (default: 250)
    pub poll_interval_ms: u64,

    /// Wait time after the page is ready, for late content, in milliseconds (default: 2000)
    pub wait_after_load_ms: u64,

    /// Capture a full-page screenshot for failure diagnostics (default: true)
    pub screenshot: bool,

    /// User agent string to use
    pub user_agent: Option<String>,

    /// Chrome/Chromium binary; detected from PATH when unset
    pub executable: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            timeout_secs: 30,
            ready_timeout_secs: 15,
            poll_interval_ms: 250,
            wait_after_load_ms: 2000,
            screenshot: true,
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            executable: None,
        }
    }
}

impl BrowserConfig {
    /// Get the navigation timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the readiness timeout as a Duration
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }

    /// Get the wait time after load as a Duration
    pub fn wait_after_load(&self) -> Duration {
        Duration::from_millis(self.wait_after_load_ms)
    }
}
