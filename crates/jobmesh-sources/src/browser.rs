//! Browser-tier adapter: renders a board's public search page and scrapes it.

use crate::adapter::SourceAdapter;
use crate::definition::{ExtractionSelectors, SearchMethod, SourceDefinition};
use crate::error::{AdapterError, AdapterResult, SourceError};
use crate::locale::LocaleSignal;
use crate::parser::{RawListing, ResultParser};
use crate::url_builder::build_search_url;
use async_trait::async_trait;
use jobmesh_browser::{BrowserActions, BrowserEngine, BrowserError};
use jobmesh_core::{BrowserConfig, ListingDraft, SourceId, SourceTier};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Adapter for a source whose search method is `browser`.
pub struct BrowserAdapter {
    definition: SourceDefinition,
    plan: ScrapePlan,
    engine: Arc<BrowserEngine>,
}

impl BrowserAdapter {
    /// Wrap a browser definition around the shared engine.
    pub fn new(
        definition: SourceDefinition,
        engine: Arc<BrowserEngine>,
    ) -> Result<Self, SourceError> {
        let plan = ScrapePlan::from_definition(&definition, engine.settings())?;
        Ok(Self {
            definition,
            plan,
            engine,
        })
    }
}

#[async_trait]
impl SourceAdapter for BrowserAdapter {
    fn source_id(&self) -> &SourceId {
        self.definition.id()
    }

    fn tier(&self) -> SourceTier {
        SourceTier::Browser
    }

    fn serves(&self, locale: &LocaleSignal) -> bool {
        self.definition.serves(locale)
    }

    async fn fetch_listings(
        &self,
        query: &str,
        location: &str,
    ) -> AdapterResult<Vec<ListingDraft>> {
        let locale = LocaleSignal::detect(location);
        let url = build_search_url(
            self.definition.id(),
            &self.definition.search,
            query,
            location,
            &locale,
        )?;

        let session = self.engine.open_page().await?;
        let outcome = self.plan.run(&session, &url).await;
        if let Err(e) = session.close().await {
            warn!(source = %self.definition.id(), error = %e, "Failed to close page");
        }

        let drafts: Vec<_> = outcome?
            .into_iter()
            .map(|raw| raw.into_draft(self.definition.id().clone()))
            .collect();
        debug!(
            source = %self.definition.id(),
            count = drafts.len(),
            "Browser source returned listings"
        );
        Ok(drafts)
    }
}

/// Everything needed to scrape one board, independent of the page driver.
pub struct ScrapePlan {
    board: String,
    base_url: String,
    selectors: ExtractionSelectors,
    scroll: bool,
    max_cards: usize,
    navigation_timeout: Duration,
    results_wait_ms: u64,
    scroll_steps: u32,
    scroll_delay_ms: u64,
}

impl ScrapePlan {
    /// Derive the plan from a browser definition and engine settings.
    pub fn from_definition(
        definition: &SourceDefinition,
        settings: &BrowserConfig,
    ) -> Result<Self, SourceError> {
        let SearchMethod::Browser {
            selectors, scroll, ..
        } = &definition.search
        else {
            return Err(SourceError::ValidationError {
                source_id: definition.id().to_string(),
                reason: "browser adapter requires a browser search method".to_string(),
            });
        };

        Ok(Self {
            board: definition.name().to_string(),
            base_url: definition.source.url.clone(),
            selectors: selectors.clone(),
            scroll: *scroll,
            max_cards: settings.max_cards.min(definition.source.max_results),
            navigation_timeout: Duration::from_secs(settings.navigation_timeout_secs),
            results_wait_ms: settings.results_wait_ms,
            scroll_steps: settings.scroll_steps,
            scroll_delay_ms: settings.scroll_delay_ms,
        })
    }

    /// Navigate, wait for results, optionally scroll, then parse the page.
    pub async fn run<P>(&self, page: &P, url: &str) -> AdapterResult<Vec<RawListing>>
    where
        P: BrowserActions + Sync,
    {
        page.navigate(url, self.navigation_timeout)
            .await
            .map_err(into_adapter_error)?;

        if let Err(e) = page
            .wait_for_selector(&self.selectors.results_container, self.results_wait_ms)
            .await
        {
            if !e.is_timeout() {
                return Err(into_adapter_error(e));
            }
            // The container never rendered; a no-results or blocked page explains why
            let html = page.content().await.map_err(into_adapter_error)?;
            return match self.parser()?.parse(&html) {
                Err(AdapterError::SelectorsOutdated(_)) => Err(AdapterError::Timeout(format!(
                    "results container '{}' did not render on {}",
                    self.selectors.results_container, self.board
                ))),
                other => other,
            };
        }

        if self.scroll {
            page.scroll_to_bottom(self.scroll_steps, self.scroll_delay_ms)
                .await
                .map_err(into_adapter_error)?;
        }

        let html = page.content().await.map_err(into_adapter_error)?;
        self.parser()?.parse(&html)
    }

    fn parser(&self) -> AdapterResult<ResultParser> {
        ResultParser::new(&self.selectors, &self.base_url, self.max_cards, &self.board)
    }
}

fn into_adapter_error(e: BrowserError) -> AdapterError {
    match e {
        BrowserError::Timeout(reason) => AdapterError::Timeout(reason),
        other => AdapterError::Browser(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::SourceMetadata;
    use jobmesh_browser::Result as BrowserResult;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Page driver that serves canned HTML.
    struct FakePage {
        html: String,
        container_renders: bool,
        scrolls: AtomicU32,
        navigation_fails: bool,
    }

    impl FakePage {
        fn new(html: &str, container_renders: bool) -> Self {
            Self {
                html: html.to_string(),
                container_renders,
                scrolls: AtomicU32::new(0),
                navigation_fails: false,
            }
        }
    }

    #[async_trait]
    impl BrowserActions for FakePage {
        async fn navigate(&self, url: &str, _limit: Duration) -> BrowserResult<()> {
            if self.navigation_fails {
                return Err(BrowserError::Timeout(format!("navigation to {url}")));
            }
            Ok(())
        }

        async fn wait_for_selector(&self, selector: &str, _timeout_ms: u64) -> BrowserResult<()> {
            if self.container_renders {
                Ok(())
            } else {
                Err(BrowserError::Timeout(selector.to_string()))
            }
        }

        async fn scroll_to_bottom(&self, steps: u32, _delay_ms: u64) -> BrowserResult<()> {
            self.scrolls.fetch_add(steps, Ordering::SeqCst);
            Ok(())
        }

        async fn content(&self) -> BrowserResult<String> {
            Ok(self.html.clone())
        }

        async fn extract_text(&self, selector: &str) -> BrowserResult<String> {
            Err(BrowserError::SelectorNotFound(selector.to_string()))
        }
    }

    fn definition() -> SourceDefinition {
        SourceDefinition {
            source: SourceMetadata {
                id: SourceId::new("bdjobs").expect("valid source ID"),
                name: "Bdjobs".to_string(),
                url: "https://jobs.bdjobs.com".to_string(),
                domain: "bdjobs.com".to_string(),
                region_relevance: vec!["bd".to_string()],
                enabled: true,
                max_results: 2,
            },
            search: SearchMethod::Browser {
                template: "https://jobs.bdjobs.com/jobsearch.asp?txtsearch={query}".to_string(),
                default_location: None,
                regional: vec![],
                selectors: ExtractionSelectors {
                    results_container: "div.job-list".to_string(),
                    card: "div.job".to_string(),
                    title: "a.title".to_string(),
                    company: ".comp".to_string(),
                    location: ".loc".to_string(),
                    link: "a.title".to_string(),
                    description: None,
                    no_results_indicator: Some(".no-result".to_string()),
                    blocked_indicator: Some("form#captcha".to_string()),
                },
                scroll: true,
            },
            fallback: None,
        }
    }

    fn plan() -> ScrapePlan {
        ScrapePlan::from_definition(&definition(), &BrowserConfig::default()).expect("plan")
    }

    const PAGE: &str = r#"
        <div class="job-list">
            <div class="job"><a class="title" href="jobdetails.asp?id=1">Accountant</a>
                <span class="comp">Square Group</span><span class="loc">Dhaka</span></div>
            <div class="job"><a class="title" href="jobdetails.asp?id=2">Junior Accountant</a>
                <span class="comp">BRAC</span><span class="loc">Sylhet</span></div>
            <div class="job"><a class="title" href="jobdetails.asp?id=3">Audit Officer</a></div>
        </div>
    "#;

    #[tokio::test]
    async fn test_scrape_extracts_bounded_cards() {
        let page = FakePage::new(PAGE, true);
        let listings = plan().run(&page, "https://jobs.bdjobs.com/x").await.expect("scrape");

        // max_results = 2 wins over the default max_cards of 15
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].title, "Accountant");
        assert_eq!(listings[0].company, "Square Group");
        assert_eq!(
            listings[0].apply_url,
            "https://jobs.bdjobs.com/jobdetails.asp?id=1"
        );
        assert_eq!(page.scrolls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_container_timeout() {
        let page = FakePage::new("<html><body>loading…</body></html>", false);
        let result = plan().run(&page, "https://jobs.bdjobs.com/x").await;
        assert!(matches!(result, Err(AdapterError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_no_results_page_is_empty_not_error() {
        let page = FakePage::new(r#"<p class="no-result">No jobs found</p>"#, false);
        let listings = plan().run(&page, "https://jobs.bdjobs.com/x").await.expect("scrape");
        assert!(listings.is_empty());
    }

    #[tokio::test]
    async fn test_blocked_page() {
        let page = FakePage::new(r#"<form id="captcha"></form>"#, false);
        let result = plan().run(&page, "https://jobs.bdjobs.com/x").await;
        assert!(matches!(result, Err(AdapterError::Blocked(board)) if board == "Bdjobs"));
    }

    #[tokio::test]
    async fn test_navigation_timeout_maps_to_timeout() {
        let mut page = FakePage::new(PAGE, true);
        page.navigation_fails = true;
        let result = plan().run(&page, "https://jobs.bdjobs.com/x").await;
        assert!(matches!(result, Err(AdapterError::Timeout(_))));
    }

    #[test]
    fn test_plan_rejects_rest_definition() {
        let mut def = definition();
        def.search = SearchMethod::RestApi {
            endpoint: "https://api.test.com".to_string(),
            query_param: None,
            location_param: None,
            params: std::collections::BTreeMap::new(),
            response: crate::definition::ResponseMapping {
                items_path: String::new(),
                title: "t".to_string(),
                company: "c".to_string(),
                url: "u".to_string(),
                location: None,
                description: None,
                salary: None,
                job_type: None,
                tags: None,
                default_location: None,
            },
        };
        assert!(ScrapePlan::from_definition(&def, &BrowserConfig::default()).is_err());
    }
}
