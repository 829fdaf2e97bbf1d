//! Watch mode: regenerate the feed on a fixed interval.
//!
//! Failed cycles are logged and diagnostics captured, then the loop carries on;
//! the previously written feed stays in place. A cycle whose entries match the
//! last written feed leaves the file untouched.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::app::{AppContext, PagefeedError, Result};
use crate::browser::PageRenderer;
use crate::cli::commands::{produce, write_feed};

/// Watch loop configuration
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Interval between runs in seconds (default: 3600 = 1 hour)
    pub interval_secs: u64,
    /// Whether to run immediately on start
    pub run_on_start: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600, // 1 hour
            run_on_start: true,
        }
    }
}

impl WatchConfig {
    /// Parse interval string like "1h", "30m", "6h", "1d"
    pub fn parse_interval(s: &str) -> std::result::Result<u64, String> {
        let s = s.trim().to_lowercase();

        let (digits, unit, unit_secs) = match s.char_indices().last() {
            Some((i, 'd')) => (&s[..i], "days", 86400),
            Some((i, 'h')) => (&s[..i], "hours", 3600),
            Some((i, 'm')) => (&s[..i], "minutes", 60),
            Some((i, 's')) => (&s[..i], "seconds", 1),
            _ => (s.as_str(), "", 1),
        };

        let invalid = || {
            if unit.is_empty() {
                format!("Invalid interval: {}. Use format like '1h', '30m', '1d'", s)
            } else {
                format!("Invalid {}: {}", unit, digits)
            }
        };

        let secs = digits
            .parse::<u64>()
            .map_err(|_| invalid())?
            .checked_mul(unit_secs)
            .ok_or_else(|| format!("Interval too large: {}", s))?;

        if secs == 0 {
            return Err("Interval must be greater than zero".to_string());
        }
        Ok(secs)
    }

    /// Format interval for display
    pub fn format_interval(secs: u64) -> String {
        if secs >= 86400 && secs.is_multiple_of(86400) {
            format!("{}d", secs / 86400)
        } else if secs >= 3600 && secs.is_multiple_of(3600) {
            format!("{}h", secs / 3600)
        } else if secs >= 60 && secs.is_multiple_of(60) {
            format!("{}m", secs / 60)
        } else {
            format!("{}s", secs)
        }
    }
}

/// Result of one watch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cycle {
    Written { entries: usize },
    Unchanged,
    Failed,
}

pub struct Watcher<'a> {
    ctx: &'a AppContext,
    renderer: &'a dyn PageRenderer,
    config: WatchConfig,
    output: PathBuf,
    last_fingerprint: Option<String>,
}

impl<'a> Watcher<'a> {
    pub fn new(ctx: &'a AppContext, renderer: &'a dyn PageRenderer, config: WatchConfig) -> Self {
        Self {
            ctx,
            renderer,
            config,
            output: ctx.config.output.path.clone(),
            last_fingerprint: None,
        }
    }

    /// Run until SIGINT or SIGTERM.
    pub async fn run(&mut self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Run until `shutdown` resolves. A cycle in progress is finished first.
    pub async fn run_until<F: Future<Output = ()>>(&mut self, shutdown: F) -> Result<()> {
        if self.config.interval_secs == 0 {
            return Err(PagefeedError::Other("watch interval must be greater than zero".into()));
        }

        info!(
            "Watching {} (interval: {}, output: {})",
            self.ctx.source_url,
            WatchConfig::format_interval(self.config.interval_secs),
            self.output.display()
        );

        if self.config.run_on_start {
            self.run_once().await;
        }

        let mut timer = interval(Duration::from_secs(self.config.interval_secs));
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        timer.tick().await; // Skip the first immediate tick

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = timer.tick() => {
                    self.run_once().await;
                }
            }
        }

        info!("Watch stopped");
        Ok(())
    }

    /// Run a single cycle. Never fails; problems are logged.
    pub async fn run_once(&mut self) -> Cycle {
        let start = Utc::now();

        let run = match produce(self.ctx, self.renderer).await {
            Ok(run) => run,
            Err(e) => {
                // produce() has already logged and captured run failures
                if !e.is_run_failure() {
                    error!("Watch cycle failed: {}", e);
                }
                return Cycle::Failed;
            }
        };

        let fingerprint = run.feed.fingerprint();
        if self.last_fingerprint.as_deref() == Some(fingerprint.as_str()) && self.output.exists() {
            info!("No changes since last run ({} entries)", run.feed.len());
            return Cycle::Unchanged;
        }

        match write_feed(self.ctx, &run.feed, &self.output) {
            Ok(_) => {
                self.last_fingerprint = Some(fingerprint);
                let elapsed = Utc::now().signed_duration_since(start);
                info!(
                    "Cycle complete: {} entries ({:.1}s)",
                    run.feed.len(),
                    elapsed.num_milliseconds() as f64 / 1000.0
                );
                Cycle::Written {
                    entries: run.feed.len(),
                }
            }
            Err(e) => {
                error!("Failed to write {}: {}", self.output.display(), e);
                Cycle::Failed
            }
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {},
                    _ = tokio::signal::ctrl_c() => {},
                }
                return;
            }
            Err(e) => warn!("Failed to set up SIGTERM handler: {}", e),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use url::Url;

    use crate::browser::RenderedPage;
    use crate::config::Config;

    struct SwitchRenderer {
        markup: &'static str,
        broken: AtomicBool,
    }

    #[async_trait]
    impl PageRenderer for SwitchRenderer {
        async fn render(&self, url: &Url, _ready: &[String]) -> Result<RenderedPage> {
            Ok(RenderedPage {
                url: url.clone(),
                markup: if self.broken.load(Ordering::SeqCst) {
                    "<html><body>offline</body></html>".to_string()
                } else {
                    self.markup.to_string()
                },
                ready: true,
                screenshot: None,
            })
        }
    }

    fn context(dir: &std::path::Path) -> AppContext {
        let mut config = Config::default();
        config.output.path = dir.join("feed.xml");
        config.diagnostics.dir = dir.join("debug");
        AppContext::new(config).unwrap()
    }

    fn renderer() -> SwitchRenderer {
        SwitchRenderer {
            markup: r#"<div class="article"><h2><a href="/a">A</a></h2></div>"#,
            broken: AtomicBool::new(false),
        }
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(WatchConfig::parse_interval("1h").unwrap(), 3600);
        assert_eq!(WatchConfig::parse_interval("30m").unwrap(), 1800);
        assert_eq!(WatchConfig::parse_interval("1d").unwrap(), 86400);
        assert_eq!(WatchConfig::parse_interval("60s").unwrap(), 60);
        assert_eq!(WatchConfig::parse_interval("3600").unwrap(), 3600);
        assert_eq!(WatchConfig::parse_interval("6h").unwrap(), 21600);
        assert!(WatchConfig::parse_interval("invalid").is_err());
        assert!(WatchConfig::parse_interval("0m").is_err());
    }

    #[test]
    fn test_parse_interval_rejects_overflow() {
        let err = WatchConfig::parse_interval("18446744073709551615h").unwrap_err();
        assert!(err.contains("too large"));
        assert!(WatchConfig::parse_interval("300000000000000d").is_err());
        assert_eq!(WatchConfig::parse_interval(" 2H ").unwrap(), 7200);
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(WatchConfig::format_interval(3600), "1h");
        assert_eq!(WatchConfig::format_interval(1800), "30m");
        assert_eq!(WatchConfig::format_interval(86400), "1d");
        assert_eq!(WatchConfig::format_interval(90), "90s");
        assert_eq!(WatchConfig::format_interval(7200), "2h");
    }

    #[tokio::test]
    async fn test_unchanged_feed_is_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let renderer = renderer();
        let mut watcher = Watcher::new(&ctx, &renderer, WatchConfig::default());

        assert_eq!(watcher.run_once().await, Cycle::Written { entries: 1 });
        assert_eq!(watcher.run_once().await, Cycle::Unchanged);

        std::fs::remove_file(dir.path().join("feed.xml")).unwrap();
        assert_eq!(watcher.run_once().await, Cycle::Written { entries: 1 });
    }

    #[tokio::test]
    async fn test_failed_cycle_keeps_previous_feed() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let renderer = renderer();
        let mut watcher = Watcher::new(&ctx, &renderer, WatchConfig::default());

        watcher.run_once().await;
        let before = std::fs::read_to_string(dir.path().join("feed.xml")).unwrap();

        renderer.broken.store(true, Ordering::SeqCst);
        assert_eq!(watcher.run_once().await, Cycle::Failed);

        let after = std::fs::read_to_string(dir.path().join("feed.xml")).unwrap();
        assert_eq!(before, after);
        assert!(dir.path().join("debug").join("debug-summary.txt").exists());
    }

    #[tokio::test]
    async fn test_run_until_runs_initial_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let renderer = renderer();
        let mut watcher = Watcher::new(&ctx, &renderer, WatchConfig::default());

        watcher.run_until(std::future::ready(())).await.unwrap();
        assert!(dir.path().join("feed.xml").exists());
    }

    #[tokio::test]
    async fn test_zero_interval_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let renderer = renderer();
        let config = WatchConfig {
            interval_secs: 0,
            run_on_start: false,
        };
        let mut watcher = Watcher::new(&ctx, &renderer, config);
        assert!(watcher.run_until(std::future::ready(())).await.is_err());
    }
}
