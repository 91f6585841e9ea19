use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use jobmesh_core::BrowserConfig;
use tokio::task::JoinHandle;

/// Browser automation engine.
///
/// Owns one Chromium process shared by every browser-tier adapter. Each
/// adapter call gets its own page through [`BrowserEngine::open_page`].
pub struct BrowserEngine {
    browser: Browser,
    handler: JoinHandle<()>,
    settings: BrowserConfig,
}

impl BrowserEngine {
    /// Launch Chromium with the given settings and start the CDP event loop.
    pub async fn launch(settings: &BrowserConfig) -> Result<Self> {
        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .window_size(settings.window_width, settings.window_height);
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "CDP handler event error");
                }
            }
        });

        tracing::info!(headless = settings.headless, "Browser engine launched");

        Ok(Self {
            browser,
            handler,
            settings: settings.clone(),
        })
    }

    /// Settings the engine was launched with.
    pub fn settings(&self) -> &BrowserConfig {
        &self.settings
    }

    /// Open a blank page with a fresh randomized fingerprint.
    pub async fn open_page(&self) -> Result<PageSession> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        // From here on the guard owns the page, so a failed setup still closes it
        let session = PageSession::new(page);

        let fingerprint = FingerprintConfig::randomized();
        session.apply_fingerprint(&fingerprint).await?;
        Ok(session)
    }
}

impl Drop for BrowserEngine {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// A browser page scoped to one adapter call.
///
/// Call [`PageSession::close`] on the happy path. When the session is dropped
/// any other way (early return, panic unwinding, a caller timeout abandoning
/// the future) the page is closed in a task on the current runtime.
pub struct PageSession {
    page: Option<Page>,
}

impl PageSession {
    fn new(page: Page) -> Self {
        Self { page: Some(page) }
    }

    pub(crate) fn page(&self) -> Result<&Page> {
        self.page.as_ref().ok_or(BrowserError::SessionClosed)
    }

    async fn apply_fingerprint(&self, fingerprint: &FingerprintConfig) -> Result<()> {
        let page = self.page()?;
        page.set_user_agent(SetUserAgentOverrideParams::new(
            fingerprint.user_agent.clone(),
        ))
        .await
        .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(fingerprint.viewport_width),
            i64::from(fingerprint.viewport_height),
            1.0,
            false,
        ))
        .await
        .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(())
    }

    /// Close the page and wait for Chromium to acknowledge.
    pub async fn close(mut self) -> Result<()> {
        if let Some(page) = self.page.take() {
            page.close()
                .await
                .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        }
        Ok(())
    }

    /// Whether the page is still owned by this session.
    pub fn is_open(&self) -> bool {
        self.page.is_some()
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        let Some(page) = self.page.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = page.close().await {
                        tracing::debug!(error = %e, "Failed to close abandoned page");
                    }
                });
            }
            Err(_) => tracing::warn!("No tokio runtime to close abandoned page"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_override_uses_network_domain() {
        let fingerprint = FingerprintConfig::randomized();
        let params = SetUserAgentOverrideParams::new(fingerprint.user_agent.clone());
        assert_eq!(params.user_agent, fingerprint.user_agent);
        assert!(params.accept_language.is_none());
    }
}
