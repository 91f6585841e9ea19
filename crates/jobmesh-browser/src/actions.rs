use crate::engine::PageSession;
use crate::error::{BrowserError, Result};
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};

/// Poll interval while waiting for a selector.
const SELECTOR_POLL_MS: u64 = 200;

/// Browser actions for automation
#[async_trait::async_trait]
pub trait BrowserActions {
    /// Navigate to a URL, failing with [`BrowserError::Timeout`] past `limit`
    async fn navigate(&self, url: &str, limit: Duration) -> Result<()>;

    /// Wait for a selector to appear
    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<()>;

    /// Scroll down in steps so lazy-loaded results render
    async fn scroll_to_bottom(&self, steps: u32, delay_ms: u64) -> Result<()>;

    /// Full rendered HTML of the page
    async fn content(&self) -> Result<String>;

    /// Extract text from an element
    async fn extract_text(&self, selector: &str) -> Result<String>;
}

#[async_trait::async_trait]
impl BrowserActions for PageSession {
    async fn navigate(&self, url: &str, limit: Duration) -> Result<()> {
        let page = self.page()?;
        tracing::debug!(url, "Navigating");
        match timeout(limit, page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::NavigationError(format!("{url}: {e}"))),
            Err(_) => Err(BrowserError::Timeout(format!(
                "navigation to {url} exceeded {}s",
                limit.as_secs()
            ))),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<()> {
        let page = self.page()?;
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout(format!(
                    "selector '{selector}' not present after {timeout_ms}ms"
                )));
            }
            sleep(Duration::from_millis(SELECTOR_POLL_MS)).await;
        }
    }

    async fn scroll_to_bottom(&self, steps: u32, delay_ms: u64) -> Result<()> {
        let page = self.page()?;
        for _ in 0..steps {
            page.evaluate("window.scrollBy(0, window.innerHeight)")
                .await
                .map_err(|e| BrowserError::ScriptError(e.to_string()))?;
            sleep(Duration::from_millis(delay_ms)).await;
        }
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        self.page()?
            .content()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))
    }

    async fn extract_text(&self, selector: &str) -> Result<String> {
        let element = self
            .page()?
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        element
            .inner_text()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?
            .map(|text| text.trim().to_string())
            .ok_or_else(|| BrowserError::SelectorNotFound(selector.to_string()))
    }
}
