use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::app::{PagefeedError, Result};
use crate::browser::config::BrowserConfig;
use crate::browser::{PageRenderer, RenderedPage};

fn browser_error(context: &'static str) -> impl Fn(chromiumoxide::error::CdpError) -> PagefeedError {
    move |e| PagefeedError::Browser(format!("{}: {}", context, e))
}

/// Chrome-based page renderer using chromiumoxide
pub struct ChromeRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
    config: BrowserConfig,
}

impl ChromeRenderer {
    /// Launch a browser with the given configuration
    pub async fn launch(config: BrowserConfig) -> Result<Self> {
        let mut builder = ChromeConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .request_timeout(config.timeout());

        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(ref executable) = config.executable {
            builder = builder.chrome_executable(executable);
        }

        let browser_config = builder
            .build()
            .map_err(|e| PagefeedError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            PagefeedError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        // Drive the CDP connection
        let handler = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        info!("Browser launched (headless: {})", config.headless);

        Ok(Self {
            browser,
            handler,
            config,
        })
    }

    async fn load(&self, page: &Page, url: &Url, ready_selectors: &[String]) -> Result<RenderedPage> {
        if let Some(ref ua) = self.config.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(browser_error("Failed to set user agent"))?;
        }

        info!("Navigating to {}", url);
        match timeout(self.config.timeout(), page.goto(url.as_str())).await {
            Ok(result) => {
                result.map_err(browser_error("Navigation failed"))?;
            }
            Err(_) => {
                return Err(PagefeedError::Browser(format!(
                    "Navigation timed out after {}s",
                    self.config.timeout_secs
                )));
            }
        }

        let ready = self.wait_until_ready(page, ready_selectors).await;
        if ready {
            // Late content (lazy images, hydration)
            sleep(self.config.wait_after_load()).await;
        } else {
            warn!(
                "No candidate selector appeared within {}s",
                self.config.ready_timeout_secs
            );
        }

        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .and_then(|u| Url::parse(&u).ok())
            .unwrap_or_else(|| url.clone());

        let markup = page
            .content()
            .await
            .map_err(browser_error("Failed to read page content"))?;

        let screenshot = if self.config.screenshot {
            let params = ScreenshotParams::builder().full_page(true).build();
            match page.screenshot(params).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!("Screenshot failed: {}", e);
                    None
                }
            }
        } else {
            None
        };

        debug!(
            "Snapshot of {} taken ({} bytes of markup)",
            final_url,
            markup.len()
        );

        Ok(RenderedPage {
            url: final_url,
            markup,
            ready,
            screenshot,
        })
    }

    /// Poll until any selector matches or the readiness timeout passes.
    async fn wait_until_ready(&self, page: &Page, selectors: &[String]) -> bool {
        if selectors.is_empty() {
            return true;
        }

        let deadline = Instant::now() + self.config.ready_timeout();
        loop {
            for selector in selectors {
                if page.find_element(selector.as_str()).await.is_ok() {
                    debug!("Page ready: `{}` present", selector);
                    return true;
                }
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(self.config.poll_interval()).await;
        }
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &Url, ready_selectors: &[String]) -> Result<RenderedPage> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(browser_error("Failed to create page"))?;

        let result = self.load(&page, url, ready_selectors).await;

        if let Err(e) = page.close().await {
            debug!("Failed to close page: {}", e);
        }

        result
    }

    async fn close(&mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(browser_error("Failed to close browser"))?;
        if let Err(e) = self.browser.wait().await {
            debug!("Browser process wait failed: {}", e);
        }
        self.handler.abort();
        Ok(())
    }
}
