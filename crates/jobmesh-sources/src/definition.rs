//! Source definition types and structures.
//!
//! This module defines the data structures for job source definitions loaded
//! from TOML files. Adding a board is a data change: a new file with a search
//! method, extraction selectors and an optional fallback link.

use crate::error::{Result, SourceError};
use crate::locale::LocaleSignal;
use jobmesh_core::{SourceId, SourceTier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Region tag that makes a source eligible for every locale.
pub const GLOBAL_REGION: &str = "global";

/// Complete source definition loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDefinition {
    /// Core source metadata
    pub source: SourceMetadata,

    /// How listings are fetched
    pub search: SearchMethod,

    /// Direct search link used when every adapter comes back empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackLink>,
}

impl SourceDefinition {
    /// Get the source ID.
    #[must_use]
    pub fn id(&self) -> &SourceId {
        &self.source.id
    }

    /// Get the source name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.source.name
    }

    /// Tier implied by the search method.
    #[must_use]
    pub fn tier(&self) -> SourceTier {
        match self.search {
            SearchMethod::RestApi { .. } => SourceTier::Rest,
            SearchMethod::Browser { .. } => SourceTier::Browser,
        }
    }

    /// Whether this source should be queried for the given locale.
    #[must_use]
    pub fn serves(&self, locale: &LocaleSignal) -> bool {
        locale.matches_relevance(&self.source.region_relevance)
    }

    /// Validate the source definition for completeness and correctness.
    pub fn validate(&self) -> Result<()> {
        let id = &self.source.id;

        if self.source.name.is_empty() {
            return Err(validation(id, "source name cannot be empty"));
        }

        if self.source.url.is_empty() {
            return Err(validation(id, "source URL cannot be empty"));
        }
        url::Url::parse(&self.source.url)
            .map_err(|e| validation(id, &format!("source URL is not absolute: {e}")))?;

        if self.source.region_relevance.is_empty() {
            return Err(validation(
                id,
                "region_relevance must list at least one region (use \"global\")",
            ));
        }

        if self.source.max_results == 0 || self.source.max_results > 100 {
            return Err(validation(
                id,
                &format!("max_results must be 1-100, got {}", self.source.max_results),
            ));
        }

        self.search.validate(id)?;

        if let Some(fallback) = &self.fallback {
            fallback.validate(id)?;
        }

        Ok(())
    }
}

fn validation(id: &SourceId, reason: &str) -> SourceError {
    SourceError::ValidationError {
        source_id: id.to_string(),
        reason: reason.to_string(),
    }
}

/// Core source metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Unique source identifier (e.g., "remotive", "bdjobs")
    pub id: SourceId,

    /// Human-readable board name
    pub name: String,

    /// Board website URL; relative result links resolve against it
    pub url: String,

    /// Board domain (e.g., "bdjobs.com")
    pub domain: String,

    /// Regions this board is relevant for (`global`, `remote`, `bd`, ...)
    #[serde(default = "default_relevance")]
    pub region_relevance: Vec<String>,

    /// Disabled sources stay loadable but are never queried
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Upper bound on listings taken from one call
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_relevance() -> Vec<String> {
    vec![GLOBAL_REGION.to_string()]
}

fn default_enabled() -> bool {
    true
}

fn default_max_results() -> usize {
    20
}

/// Methods for searching a job source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum SearchMethod {
    /// Public JSON API
    RestApi {
        /// Endpoint URL without query parameters
        endpoint: String,
        /// Query-string parameter carrying the search phrase
        #[serde(default, skip_serializing_if = "Option::is_none")]
        query_param: Option<String>,
        /// Query-string parameter carrying the location hint
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location_param: Option<String>,
        /// Fixed extra parameters (page size and the like)
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        params: BTreeMap<String, String>,
        /// Where listing fields live in the JSON response
        response: ResponseMapping,
    },

    /// Public search page rendered in a headless browser
    Browser {
        /// URL template with `{query}` and `{location}` placeholders
        template: String,
        /// Location substituted when the caller gave none
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_location: Option<String>,
        /// Region-specific templates tried before `template`
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        regional: Vec<RegionalRoute>,
        /// Structural selectors for the result cards
        selectors: ExtractionSelectors,
        /// Scroll to trigger lazy-loaded cards
        #[serde(default)]
        scroll: bool,
    },
}

impl SearchMethod {
    /// Validate the search method configuration.
    fn validate(&self, source_id: &SourceId) -> Result<()> {
        match self {
            Self::RestApi {
                endpoint, response, ..
            } => {
                if endpoint.is_empty() {
                    return Err(validation(source_id, "search.endpoint cannot be empty"));
                }
                url::Url::parse(endpoint).map_err(|e| {
                    validation(source_id, &format!("search.endpoint is not a URL: {e}"))
                })?;
                response.validate(source_id)
            }
            Self::Browser {
                template,
                regional,
                selectors,
                ..
            } => {
                validate_template(source_id, "search.template", template)?;
                for route in regional {
                    if route.region.is_empty() {
                        return Err(validation(
                            source_id,
                            "search.regional.region cannot be empty",
                        ));
                    }
                    validate_template(source_id, "search.regional.template", &route.template)?;
                }
                selectors.validate(source_id)
            }
        }
    }
}

fn validate_template(source_id: &SourceId, field: &str, template: &str) -> Result<()> {
    if template.is_empty() {
        return Err(validation(source_id, &format!("{field} cannot be empty")));
    }
    if !template.contains("{query}") {
        return Err(validation(
            source_id,
            &format!("{field} must contain a {{query}} placeholder"),
        ));
    }
    Ok(())
}

/// Dotted paths into a REST response.
///
/// Paths are segments separated by `.`; numeric segments index arrays.
/// An empty `items_path` means the response root is the array of entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMapping {
    /// Path to the array of entries
    #[serde(default)]
    pub items_path: String,
    /// Job title
    pub title: String,
    /// Employer name
    pub company: String,
    /// Apply / detail URL
    pub url: String,
    /// Free-text location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Description (HTML is reduced to text)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Salary text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    /// Employment type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    /// Tag list, consulted by the client-side relevance filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Location used when the entry carries none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_location: Option<String>,
}

impl ResponseMapping {
    fn validate(&self, source_id: &SourceId) -> Result<()> {
        for (field, path) in [
            ("title", &self.title),
            ("company", &self.company),
            ("url", &self.url),
        ] {
            if path.is_empty() {
                return Err(validation(
                    source_id,
                    &format!("search.response.{field} path cannot be empty"),
                ));
            }
        }
        Ok(())
    }
}

/// Region-specific search template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionalRoute {
    /// Region code matched against the detected locale (e.g. "bd")
    pub region: String,
    /// Template used for that region
    pub template: String,
}

/// Structural selectors for one board's search results page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSelectors {
    /// Element that appears once results have rendered
    pub results_container: String,
    /// One result card, relative to the container
    pub card: String,
    /// Title, relative to the card
    pub title: String,
    /// Employer, relative to the card
    pub company: String,
    /// Location, relative to the card
    pub location: String,
    /// Anchor carrying the listing URL, relative to the card
    pub link: String,
    /// Short description, relative to the card
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Present when the board found nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_results_indicator: Option<String>,
    /// Present on CAPTCHA / access-denied pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_indicator: Option<String>,
}

impl ExtractionSelectors {
    fn validate(&self, source_id: &SourceId) -> Result<()> {
        for (field, selector) in [
            ("results_container", &self.results_container),
            ("card", &self.card),
            ("title", &self.title),
            ("link", &self.link),
        ] {
            if selector.is_empty() {
                return Err(validation(
                    source_id,
                    &format!("search.selectors.{field} is required"),
                ));
            }
        }
        Ok(())
    }
}

/// Direct link to a board's own search page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackLink {
    /// Board name shown in the synthetic listing
    pub board: String,
    /// URL template with `{query}` and `{location}` placeholders
    pub template: String,
}

impl FallbackLink {
    fn validate(&self, source_id: &SourceId) -> Result<()> {
        if self.board.is_empty() {
            return Err(validation(source_id, "fallback.board cannot be empty"));
        }
        validate_template(source_id, "fallback.template", &self.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_id() -> SourceId {
        SourceId::new("test-source").expect("valid source ID")
    }

    fn selectors() -> ExtractionSelectors {
        ExtractionSelectors {
            results_container: "div.results".to_string(),
            card: "div.card".to_string(),
            title: "h2".to_string(),
            company: ".company".to_string(),
            location: ".location".to_string(),
            link: "a".to_string(),
            description: None,
            no_results_indicator: None,
            blocked_indicator: None,
        }
    }

    fn browser_definition() -> SourceDefinition {
        SourceDefinition {
            source: SourceMetadata {
                id: source_id(),
                name: "Test Board".to_string(),
                url: "https://jobs.test.com".to_string(),
                domain: "test.com".to_string(),
                region_relevance: vec!["bd".to_string()],
                enabled: true,
                max_results: 15,
            },
            search: SearchMethod::Browser {
                template: "https://jobs.test.com/search?q={query}&l={location}".to_string(),
                default_location: None,
                regional: vec![],
                selectors: selectors(),
                scroll: true,
            },
            fallback: Some(FallbackLink {
                board: "Test Board".to_string(),
                template: "https://jobs.test.com/search?q={query}".to_string(),
            }),
        }
    }

    #[test]
    fn test_definition_validation() {
        let definition = browser_definition();
        assert!(definition.validate().is_ok());
        assert_eq!(definition.tier(), SourceTier::Browser);

        let mut invalid = definition.clone();
        invalid.source.name = String::new();
        assert!(invalid.validate().is_err());

        let mut invalid = definition.clone();
        invalid.source.max_results = 0;
        assert!(invalid.validate().is_err());

        let mut invalid = definition.clone();
        invalid.source.url = "not a url".to_string();
        assert!(invalid.validate().is_err());

        let mut invalid = definition;
        invalid.source.region_relevance.clear();
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_search_method_validation() {
        let id = source_id();

        // Template without a query placeholder is useless
        let method = SearchMethod::Browser {
            template: "https://jobs.test.com/search".to_string(),
            default_location: None,
            regional: vec![],
            selectors: selectors(),
            scroll: false,
        };
        assert!(method.validate(&id).is_err());

        let mut missing_card = selectors();
        missing_card.card = String::new();
        let method = SearchMethod::Browser {
            template: "https://jobs.test.com/search?q={query}".to_string(),
            default_location: None,
            regional: vec![],
            selectors: missing_card,
            scroll: false,
        };
        assert!(method.validate(&id).is_err());

        let method = SearchMethod::RestApi {
            endpoint: "https://api.test.com/jobs".to_string(),
            query_param: Some("search".to_string()),
            location_param: None,
            params: BTreeMap::new(),
            response: ResponseMapping {
                items_path: "jobs".to_string(),
                title: "title".to_string(),
                company: String::new(),
                url: "url".to_string(),
                location: None,
                description: None,
                salary: None,
                job_type: None,
                tags: None,
                default_location: None,
            },
        };
        assert!(method.validate(&id).is_err());
    }

    #[test]
    fn test_fallback_validation() {
        let mut definition = browser_definition();
        definition.fallback = Some(FallbackLink {
            board: "Test Board".to_string(),
            template: "https://jobs.test.com/".to_string(),
        });
        assert!(definition.validate().is_err());
    }

    #[test]
    fn test_parse_rest_definition_toml() {
        let toml_str = r#"
[source]
id = "remotive"
name = "Remotive"
url = "https://remotive.com"
domain = "remotive.com"

[search]
method = "rest-api"
endpoint = "https://remotive.com/api/remote-jobs"
query_param = "search"

[search.params]
limit = "50"

[search.response]
items_path = "jobs"
title = "title"
company = "company_name"
url = "url"
"#;
        let definition: SourceDefinition = toml::from_str(toml_str).expect("parse definition");
        assert!(definition.validate().is_ok());
        assert_eq!(definition.tier(), SourceTier::Rest);
        assert_eq!(definition.source.region_relevance, vec![GLOBAL_REGION]);
        assert_eq!(definition.source.max_results, 20);
        assert!(definition.source.enabled);
        assert!(definition.fallback.is_none());
    }

    #[test]
    fn test_serves_by_relevance() {
        let definition = browser_definition();
        assert!(definition.serves(&LocaleSignal::detect("Dhaka, Bangladesh")));
        assert!(!definition.serves(&LocaleSignal::detect("Remote")));
        assert!(definition.serves(&LocaleSignal::Unspecified));
    }
}
