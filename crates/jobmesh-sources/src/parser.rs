//! Selector-driven extraction of result cards from rendered search pages.

use crate::definition::ExtractionSelectors;
use crate::error::{AdapterError, AdapterResult};
use jobmesh_core::{ListingDraft, SourceId};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

/// One result card as scraped, before it becomes a [`ListingDraft`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    /// Card title
    pub title: String,
    /// Employer, empty when the card shows none
    pub company: String,
    /// Location, empty when the card shows none
    pub location: String,
    /// Absolute listing URL
    pub apply_url: String,
    /// Card summary
    pub description: Option<String>,
}

impl RawListing {
    /// Convert into a draft tagged with the producing source.
    #[must_use]
    pub fn into_draft(self, source: SourceId) -> ListingDraft {
        let draft = ListingDraft::new(
            source,
            self.title,
            self.company,
            self.location,
            self.apply_url,
        );
        match self.description {
            Some(description) => draft.with_description(description),
            None => draft,
        }
    }
}

struct CompiledSelectors {
    results_container: Selector,
    card: Selector,
    title: Selector,
    company: Option<Selector>,
    location: Option<Selector>,
    link: Selector,
    description: Option<Selector>,
    no_results_indicator: Option<Selector>,
    blocked_indicator: Option<Selector>,
}

impl CompiledSelectors {
    fn compile(selectors: &ExtractionSelectors) -> AdapterResult<Self> {
        Ok(Self {
            results_container: required(&selectors.results_container, "container")?,
            card: required(&selectors.card, "card")?,
            title: required(&selectors.title, "title")?,
            company: optional(Some(&selectors.company), "company")?,
            location: optional(Some(&selectors.location), "location")?,
            link: required(&selectors.link, "link")?,
            description: optional(selectors.description.as_ref(), "description")?,
            no_results_indicator: optional(
                selectors.no_results_indicator.as_ref(),
                "no-results indicator",
            )?,
            blocked_indicator: optional(selectors.blocked_indicator.as_ref(), "blocked indicator")?,
        })
    }
}

fn required(selector: &str, what: &str) -> AdapterResult<Selector> {
    Selector::parse(selector).map_err(|e| {
        AdapterError::SelectorsOutdated(format!("invalid {what} selector '{selector}': {e}"))
    })
}

fn optional(selector: Option<&String>, what: &str) -> AdapterResult<Option<Selector>> {
    match selector {
        Some(s) if !s.trim().is_empty() => required(s, what).map(Some),
        _ => Ok(None),
    }
}

/// Turns a rendered search page into raw listings using one board's selectors.
pub struct ResultParser {
    selectors: CompiledSelectors,
    base_url: Url,
    max_cards: usize,
    board: String,
}

impl ResultParser {
    /// Compile the selectors; relative links resolve against `base_url`.
    pub fn new(
        selectors: &ExtractionSelectors,
        base_url: &str,
        max_cards: usize,
        board: impl Into<String>,
    ) -> AdapterResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AdapterError::SelectorsOutdated(format!("invalid base URL: {e}")))?;
        Ok(Self {
            selectors: CompiledSelectors::compile(selectors)?,
            base_url,
            max_cards,
            board: board.into(),
        })
    }

    /// Extract up to `max_cards` listings. Cards without a title or link are skipped.
    pub fn parse(&self, html: &str) -> AdapterResult<Vec<RawListing>> {
        let document = Html::parse_document(html);

        // Check for CAPTCHA / access denied
        if let Some(selector) = &self.selectors.blocked_indicator {
            if document.select(selector).next().is_some() {
                return Err(AdapterError::Blocked(self.board.clone()));
            }
        }

        // Check for no results
        if let Some(selector) = &self.selectors.no_results_indicator {
            if document.select(selector).next().is_some() {
                return Ok(vec![]);
            }
        }

        let containers: Vec<_> = document.select(&self.selectors.results_container).collect();
        if containers.is_empty() {
            return Err(AdapterError::SelectorsOutdated(format!(
                "results container not found on {}",
                self.board
            )));
        }

        let listings = containers
            .iter()
            .flat_map(|container| container.select(&self.selectors.card))
            .filter_map(|card| self.parse_card(&card))
            .take(self.max_cards)
            .collect();

        Ok(listings)
    }

    fn parse_card(&self, card: &ElementRef) -> Option<RawListing> {
        let title = select_text(card, Some(&self.selectors.title))?;
        let href = card
            .select(&self.selectors.link)
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())?;
        let apply_url = self.base_url.join(href).ok()?;

        Some(RawListing {
            title,
            company: select_text(card, self.selectors.company.as_ref()).unwrap_or_default(),
            location: select_text(card, self.selectors.location.as_ref()).unwrap_or_default(),
            apply_url: apply_url.into(),
            description: select_text(card, self.selectors.description.as_ref()),
        })
    }
}

fn select_text(element: &ElementRef, selector: Option<&Selector>) -> Option<String> {
    selector
        .and_then(|s| element.select(s).next())
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reduce an HTML fragment (as many job APIs return descriptions) to plain text.
pub fn html_to_text(fragment: &str) -> String {
    if !fragment.contains('<') {
        return collapse_whitespace(fragment);
    }
    let parsed = Html::parse_fragment(fragment);
    let text = parsed.root_element().text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&text)
}
