//! Configuration management for pagefeed.
//!
//! Configuration is read from `~/.config/pagefeed/config.toml` unless a path is
//! given on the command line. If the default file doesn't exist, one with
//! comments is created.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::browser::BrowserConfig;
use crate::diagnostics::DiagnosticsConfig;
use crate::domain::{FeedFormat, FeedMetadata};
use crate::pipeline::ExtractionConfig;

/// The page being mirrored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: "https://web.swipeinsight.app/app/for-you".to_string(),
        }
    }
}

/// Where and how the feed is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub format: FeedFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("feed.xml"),
            format: FeedFormat::Rss2,
        }
    }
}

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub browser: BrowserConfig,
    pub extraction: ExtractionConfig,
    pub feed: FeedMetadata,
    pub output: OutputConfig,
    pub diagnostics: DiagnosticsConfig,
}

impl Config {
    /// Load configuration from `path`, or from the default path.
    ///
    /// An explicit path must exist. A missing default file is created with
    /// commented defaults. Missing fields use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(ConfigError::NotFound(p.to_path_buf())),
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path: `~/.config/pagefeed/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("pagefeed").join("config.toml"))
    }

    /// The source page URL, parsed.
    pub fn source_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.source.url)
            .map_err(|e| ConfigError::Invalid(format!("source.url `{}`: {}", self.source.url, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::Invalid(format!(
                "source.url must be http(s), got `{}`",
                other
            ))),
        }
    }

    /// Reject configurations that cannot produce a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source_url()?;

        if self.extraction.candidate_selectors.is_empty() {
            return Err(ConfigError::Invalid(
                "extraction.candidate_selectors must not be empty".into(),
            ));
        }
        if self.extraction.max_items == 0 {
            return Err(ConfigError::Invalid(
                "extraction.max_items must be greater than zero".into(),
            ));
        }
        for selector in self.extraction.all_selectors() {
            scraper::Selector::parse(selector).map_err(|e| {
                ConfigError::Invalid(format!("selector `{}`: {}", selector, e))
            })?;
        }
        Ok(())
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &PathBuf) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    pub fn default_config_content() -> String {
        r##"# pagefeed configuration
#
# Every field is optional; anything left out uses the value shown here.

[source]
# Page to mirror as a feed
url = "https://web.swipeinsight.app/app/for-you"

[browser]
# Run browser in headless mode (no visible window)
headless = true

# Navigation timeout in seconds
timeout_secs = 30

# How long to wait for any candidate selector to appear (seconds)
ready_timeout_secs = 15

# Interval between readiness probes (milliseconds)
poll_interval_ms = 250

# Wait time after the page is ready, for late content (milliseconds)
wait_after_load_ms = 2000

# Capture a full-page screenshot for failure diagnostics
screenshot = true

user_agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"

# Chrome/Chromium binary (detected from PATH when unset)
# executable = "/usr/bin/chromium"

[extraction]
# Candidate article selectors, tried in order; the first one that matches wins
candidate_selectors = [
    "div.article",
    "article",
    '[class*="article"]',
    '[class*="card"]',
]

# Only the first N candidates are extracted
max_items = 50

# Per-field fallback chains, tried in order inside each candidate
title_selectors = ["h2 a", "h1 a, h3 a, h4 a", "h1, h2, h3, h4", 'a[class*="title"]']
link_selectors = ["a[href]"]
description_selectors = [
    "section p",
    "p",
    '[class*="description"], [class*="content"], [class*="summary"]',
]
image_selectors = ["img"]
image_attributes = ["src", "data-src"]

# Identifier attributes; the link is used when none is present
id_attributes = ["data-article-id", "data-id"]

default_description = "No description"

# Duplicate handling: "none", "link" or "id"
dedupe = "none"

[feed]
title = "SwipeInsight - For You"
description = "Daily picks from the SwipeInsight For You page"
id = "https://web.swipeinsight.app/app/for-you"
link = "https://web.swipeinsight.app/app/for-you"
language = "zh-CN"
generator = "pagefeed/0.1.0"
copyright = "SwipeInsight"
image = "https://web.swipeinsight.app/images/swipe-insight-og-image.webp"
favicon = "https://web.swipeinsight.app/favicon.ico"
# Public URL of the generated feed
# self_link = "https://example.github.io/feed.xml"

[output]
path = "feed.xml"
# "rss2" or "atom"
format = "rss2"

[diagnostics]
# Dump page markup, screenshot and a summary when a run fails
enabled = true
dir = "."
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
