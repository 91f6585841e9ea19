//! REST-tier adapter: one GET against a public JSON job API.

use crate::adapter::SourceAdapter;
use crate::definition::{ResponseMapping, SearchMethod, SourceDefinition};
use crate::error::{AdapterError, AdapterResult, SourceError};
use crate::locale::LocaleSignal;
use crate::parser::html_to_text;
use crate::url_builder::build_search_url;
use async_trait::async_trait;
use jobmesh_core::{normalize, tokenize, ListingDraft, SourceId, SourceTier};
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::debug;

/// Adapter for a source whose search method is `rest-api`.
pub struct RestAdapter {
    definition: SourceDefinition,
    mapping: ResponseMapping,
    client: reqwest::Client,
}

impl RestAdapter {
    /// Wrap a REST definition. The client is shared across adapters.
    pub fn new(definition: SourceDefinition, client: reqwest::Client) -> Result<Self, SourceError> {
        let SearchMethod::RestApi { response, .. } = &definition.search else {
            return Err(SourceError::ValidationError {
                source_id: definition.id().to_string(),
                reason: "REST adapter requires a rest-api search method".to_string(),
            });
        };
        let mapping = response.clone();
        Ok(Self {
            definition,
            mapping,
            client,
        })
    }

    /// Map a decoded response body to drafts matching `query`.
    ///
    /// Entries that are not objects, or that lack a title or URL, are skipped.
    /// The result is bounded by the source's `max_results`.
    pub fn map_response(&self, body: &Value, query: &str) -> AdapterResult<Vec<ListingDraft>> {
        let items = lookup(body, &self.mapping.items_path)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                AdapterError::Decode(format!(
                    "expected an array at '{}' in {} response",
                    self.mapping.items_path,
                    self.definition.id()
                ))
            })?;

        let filter = QueryFilter::new(query);
        let drafts = items
            .iter()
            .filter(|entry| entry.is_object())
            .filter_map(|entry| self.map_entry(entry, &filter))
            .take(self.definition.source.max_results)
            .collect();
        Ok(drafts)
    }

    fn map_entry(&self, entry: &Value, filter: &QueryFilter) -> Option<ListingDraft> {
        let mapping = &self.mapping;
        let field =
            |path: Option<&String>| path.and_then(|p| lookup(entry, p)).and_then(value_text);

        let title = field(Some(&mapping.title))?;
        let apply_url = field(Some(&mapping.url))?;
        let company = field(Some(&mapping.company)).unwrap_or_default();
        let tags = field(mapping.tags.as_ref()).unwrap_or_default();

        if !filter.matches(&[title.as_str(), company.as_str(), tags.as_str()]) {
            return None;
        }

        let location = field(mapping.location.as_ref())
            .or_else(|| mapping.default_location.clone())
            .unwrap_or_default();

        let mut draft = ListingDraft::new(
            self.definition.id().clone(),
            title,
            company,
            location,
            apply_url,
        );
        if let Some(description) = field(mapping.description.as_ref()) {
            draft = draft.with_description(html_to_text(&description));
        }
        if let Some(salary) = field(mapping.salary.as_ref()) {
            draft = draft.with_salary(salary);
        }
        if let Some(job_type) = field(mapping.job_type.as_ref()) {
            draft = draft.with_job_type(job_type);
        }
        Some(draft)
    }
}

#[async_trait]
impl SourceAdapter for RestAdapter {
    fn source_id(&self) -> &SourceId {
        self.definition.id()
    }

    fn tier(&self) -> SourceTier {
        SourceTier::Rest
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
        debug!(source = %self.definition.id(), %url, "Querying REST source");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Http {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let json: Value = serde_json::from_str(&body)
            .map_err(|e| AdapterError::Decode(e.to_string()))?;

        let drafts = self.map_response(&json, query)?;
        debug!(
            source = %self.definition.id(),
            count = drafts.len(),
            "REST source returned listings"
        );
        Ok(drafts)
    }
}

/// Client-side relevance check for APIs that ignore or loosely apply the query.
struct QueryFilter {
    phrase: String,
    tokens: Vec<String>,
}

impl QueryFilter {
    fn new(query: &str) -> Self {
        Self {
            phrase: normalize(query),
            tokens: tokenize(query),
        }
    }

    fn matches(&self, fields: &[&str]) -> bool {
        if self.phrase.is_empty() {
            return true;
        }
        fields.iter().map(|f| normalize(f)).any(|field| {
            field.contains(&self.phrase) || self.tokens.iter().any(|t| field.contains(t.as_str()))
        })
    }
}

/// Resolve a dotted path; numeric segments index arrays. Empty path is the root.
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        Value::Object(map) => map.get(segment),
        _ => None,
    })
}

/// Render a scalar or array of scalars as text. Empty results are `None`.
fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}
