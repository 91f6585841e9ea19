//! Shared types used across the jobmesh pipeline.
//!
//! This module defines the newtypes and the transient listing record that
//! flows from source adapters through the orchestrator into storage.

use crate::dedup::build_key;
use crate::error::JobmeshError;
use crate::text::truncate_at_word;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Source tag carried by synthetic search-link listings.
pub const FALLBACK_SOURCE: &str = "fallback";

/// Newtype for source identifiers with validation.
///
/// Source IDs must be lowercase alphanumeric with hyphens, 3-50 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceId(String);

impl SourceId {
    /// Create a new `SourceId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID doesn't match the required format.
    pub fn new(id: impl Into<String>) -> Result<Self, JobmeshError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// The source tag used for fallback search links.
    #[must_use]
    pub fn fallback() -> Self {
        Self(FALLBACK_SOURCE.to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the fallback marker.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.0 == FALLBACK_SOURCE
    }

    /// Validate source ID format: lowercase alphanumeric with hyphens, 3-50 chars.
    fn validate(id: &str) -> Result<(), JobmeshError> {
        static SOURCE_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = SOURCE_REGEX
            .get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9-]{1,48}[a-z0-9]$").expect("valid regex"));

        if id.len() < 3 || id.len() > 50 {
            return Err(JobmeshError::Validation(format!(
                "invalid source ID: must be 3-50 characters, got {} characters",
                id.len()
            )));
        }

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(JobmeshError::Validation(format!(
                "invalid source ID: must be lowercase alphanumeric with hyphens, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SourceId {
    type Error = JobmeshError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SourceId> for String {
    fn from(id: SourceId) -> Self {
        id.0
    }
}

/// Which tier of the aggregation pipeline a source belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceTier {
    /// Lightweight JSON API, tried first
    Rest,
    /// Headless-browser scrape of a public search page
    Browser,
    /// Synthetic search links used when every other tier is empty
    Fallback,
}

impl SourceTier {
    /// Get a human-readable display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Rest => "REST API",
            Self::Browser => "Browser",
            Self::Fallback => "Fallback",
        }
    }
}

/// A listing as produced by a source adapter, before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    /// Job title
    pub title: String,
    /// Employer name
    pub company: String,
    /// Free-text location
    pub location: String,
    /// Origin / apply URL; required for persistence
    pub apply_url: String,
    /// Bounded free-text description
    #[serde(default)]
    pub description: String,
    /// Salary text as published
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    /// Experience requirement text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    /// Education requirement text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    /// Application deadline text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    /// Employment type (full-time, contract, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    /// Adapter that produced the listing
    pub source: SourceId,
    /// Identity key, filled in by [`ListingDraft::finalize`]
    #[serde(default)]
    pub identity_key: String,
}

impl ListingDraft {
    /// Create a draft with the required fields set and everything else empty.
    #[must_use]
    pub fn new(
        source: SourceId,
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        apply_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            location: location.into(),
            apply_url: apply_url.into(),
            description: String::new(),
            salary: None,
            experience: None,
            education: None,
            deadline: None,
            job_type: None,
            source,
            identity_key: String::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the salary text.
    #[must_use]
    pub fn with_salary(mut self, salary: impl Into<String>) -> Self {
        self.salary = Some(salary.into());
        self
    }

    /// Set the employment type.
    #[must_use]
    pub fn with_job_type(mut self, job_type: impl Into<String>) -> Self {
        self.job_type = Some(job_type.into());
        self
    }

    /// Trim every field, bound the description and compute the identity key.
    #[must_use]
    pub fn finalize(mut self, description_max_chars: usize) -> Self {
        self.title = collapse(&self.title);
        self.company = collapse(&self.company);
        self.location = collapse(&self.location);
        self.apply_url = self.apply_url.trim().to_string();
        self.description = truncate_at_word(self.description.trim(), description_max_chars);
        for field in [
            &mut self.salary,
            &mut self.experience,
            &mut self.education,
            &mut self.deadline,
            &mut self.job_type,
        ] {
            *field = field
                .take()
                .map(|value| collapse(&value))
                .filter(|value| !value.is_empty());
        }
        self.identity_key = build_key(&self.title, &self.company, self.source.as_str());
        self
    }

    /// Whether the draft carries a usable apply URL.
    #[must_use]
    pub fn has_apply_url(&self) -> bool {
        !self.apply_url.trim().is_empty()
    }
}

fn collapse(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
