//! Listing operations.
//!
//! CRUD and per-field search primitives for the `listings` table. Search is
//! deliberately single-column; cross-field relevance lives in the ranker.

use crate::error::{DatabaseError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use jobmesh_core::{build_key, normalize, ListingDraft};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::{Pool, Row, Sqlite};

const COLUMNS: &str = "id, title, company, location, apply_url, description, salary, \
                       experience, education, deadline, job_type, source, source_key, slug, \
                       enrichment, created_at, updated_at, enriched_at";

/// A persisted listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredListing {
    /// UUID primary key
    pub id: String,
    /// Job title
    pub title: String,
    /// Employer name
    pub company: String,
    /// Free-text location
    pub location: String,
    /// Origin / apply URL, never blank
    pub apply_url: String,
    /// Bounded description
    pub description: String,
    /// Salary text
    pub salary: Option<String>,
    /// Experience requirement
    pub experience: Option<String>,
    /// Education requirement
    pub education: Option<String>,
    /// Application deadline
    pub deadline: Option<String>,
    /// Employment type
    pub job_type: Option<String>,
    /// Adapter that produced the listing
    pub source: String,
    /// Identity key used for duplicate detection
    pub source_key: String,
    /// URL-safe slug, set by the enrichment pass
    pub slug: Option<String>,
    /// Bounded enrichment payload
    pub enrichment: Option<JsonValue>,
    /// When the listing was first stored
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// When enrichment was attached
    pub enriched_at: Option<DateTime<Utc>>,
}

/// Column targeted by [`search_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    /// `title`
    Title,
    /// `company`
    Company,
    /// `description`
    Description,
    /// `location`
    Location,
}

impl SearchField {
    /// Every searchable field, in ranking weight order.
    pub const ALL: [SearchField; 4] = [
        SearchField::Title,
        SearchField::Company,
        SearchField::Description,
        SearchField::Location,
    ];

    /// Column name in the `listings` table.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Company => "company",
            Self::Description => "description",
            Self::Location => "location",
        }
    }

    /// Normalized shadow column that search runs against.
    #[must_use]
    pub fn search_column(self) -> &'static str {
        match self {
            Self::Title => "title_norm",
            Self::Company => "company_norm",
            Self::Description => "description_norm",
            Self::Location => "location_norm",
        }
    }
}

impl std::fmt::Display for SearchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Sortable RFC 3339 timestamp (fixed width, UTC).
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Persist a draft.
///
/// The draft's identity key is used as `source_key`; an unfinalized draft has
/// its key computed here.
///
/// # Errors
/// Returns `DatabaseError::Validation` for a blank `apply_url` (nothing is
/// written), `DatabaseError::Duplicate` when the key already exists.
pub async fn create_listing(pool: &Pool<Sqlite>, draft: &ListingDraft) -> Result<StoredListing> {
    if draft.apply_url.trim().is_empty() {
        return Err(DatabaseError::Validation(format!(
            "listing '{}' has no apply_url",
            draft.title
        )));
    }
    if draft.title.trim().is_empty() {
        return Err(DatabaseError::Validation(
            "listing has no title".to_string(),
        ));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();
    let source_key = if draft.identity_key.is_empty() {
        build_key(&draft.title, &draft.company, draft.source.as_str())
    } else {
        draft.identity_key.clone()
    };

    sqlx::query(
        "INSERT INTO listings (id, title, company, location, apply_url, description, salary,
                               experience, education, deadline, job_type, source, source_key,
                               created_at, updated_at, title_norm, company_norm,
                               description_norm, location_norm)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&draft.title)
    .bind(&draft.company)
    .bind(&draft.location)
    .bind(draft.apply_url.trim())
    .bind(&draft.description)
    .bind(&draft.salary)
    .bind(&draft.experience)
    .bind(&draft.education)
    .bind(&draft.deadline)
    .bind(&draft.job_type)
    .bind(draft.source.as_str())
    .bind(&source_key)
    .bind(timestamp(now))
    .bind(timestamp(now))
    .bind(normalize(&draft.title))
    .bind(normalize(&draft.company))
    .bind(normalize(&draft.description))
    .bind(normalize(&draft.location))
    .execute(pool)
    .await
    .map_err(|e| match e.as_database_error() {
        Some(db) if db.is_unique_violation() => DatabaseError::Duplicate(source_key.clone()),
        _ => DatabaseError::Sqlx(e),
    })?;

    tracing::debug!(id = %id, source = %draft.source, "stored listing");

    Ok(StoredListing {
        id,
        title: draft.title.clone(),
        company: draft.company.clone(),
        location: draft.location.clone(),
        apply_url: draft.apply_url.trim().to_string(),
        description: draft.description.clone(),
        salary: draft.salary.clone(),
        experience: draft.experience.clone(),
        education: draft.education.clone(),
        deadline: draft.deadline.clone(),
        job_type: draft.job_type.clone(),
        source: draft.source.to_string(),
        source_key,
        slug: None,
        enrichment: None,
        created_at: now,
        updated_at: now,
        enriched_at: None,
    })
}

/// Whether a listing with this identity key is already stored.
///
/// # Errors
/// Returns `sqlx` errors from the lookup.
pub async fn exists_by_source_key(pool: &Pool<Sqlite>, source_key: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listings WHERE source_key = ?")
        .bind(source_key)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Fetch one listing by id.
///
/// # Errors
/// Returns `DatabaseError::NotFoundWithMessage` when no such listing exists.
pub async fn get_by_id(pool: &Pool<Sqlite>, id: &str) -> Result<StoredListing> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM listings WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFoundWithMessage(format!("Listing '{id}' not found")))?;
    parse_listing(&row)
}

/// Fetch one listing by slug.
///
/// # Errors
/// Returns `sqlx` errors from the lookup.
pub async fn get_by_slug(pool: &Pool<Sqlite>, slug: &str) -> Result<Option<StoredListing>> {
    sqlx::query(&format!("SELECT {COLUMNS} FROM listings WHERE slug = ?"))
        .bind(slug)
        .fetch_optional(pool)
        .await?
        .as_ref()
        .map(parse_listing)
        .transpose()
}

/// Listings whose `field` contains any of `terms`, newest first.
///
/// Terms and stored values are compared in normalized form, so matching is
/// case-insensitive for all scripts, not only ASCII. Blank terms are ignored;
/// no terms yields no rows.
///
/// # Errors
/// Returns `sqlx` errors from the query.
pub async fn search_field(
    pool: &Pool<Sqlite>,
    field: SearchField,
    terms: &[String],
    limit: usize,
) -> Result<Vec<StoredListing>> {
    let patterns: Vec<String> = terms
        .iter()
        .map(|term| normalize(term.as_str()))
        .filter(|term| !term.is_empty())
        .map(|term| format!("%{}%", escape_like(&term)))
        .collect();
    if patterns.is_empty() || limit == 0 {
        return Ok(Vec::new());
    }

    let column = field.search_column();
    let clause = vec![format!("{column} LIKE ? ESCAPE '\\'"); patterns.len()].join(" OR ");
    let sql =
        format!("SELECT {COLUMNS} FROM listings WHERE {clause} ORDER BY created_at DESC LIMIT ?");

    let mut query = sqlx::query(&sql);
    for pattern in &patterns {
        query = query.bind(pattern.as_str());
    }
    let rows = query
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(pool)
        .await?;

    rows.iter().map(parse_listing).collect()
}

/// Most recent listings, newest first.
///
/// # Errors
/// Returns `sqlx` errors from the query.
pub async fn list_recent(pool: &Pool<Sqlite>, limit: usize) -> Result<Vec<StoredListing>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM listings ORDER BY created_at DESC LIMIT ?"
    ))
    .bind(i64::try_from(limit).unwrap_or(i64::MAX))
    .fetch_all(pool)
    .await?;

    rows.iter().map(parse_listing).collect()
}

/// Total number of stored listings.
///
/// # Errors
/// Returns `sqlx` errors from the query.
pub async fn count(pool: &Pool<Sqlite>) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM listings")
        .fetch_one(pool)
        .await?)
}

/// Attach a serialized enrichment payload and slug to a listing.
///
/// # Errors
/// Returns `DatabaseError::NotFoundWithMessage` when the listing does not exist.
pub async fn attach_enrichment(
    pool: &Pool<Sqlite>,
    id: &str,
    payload: &str,
    slug: &str,
) -> Result<()> {
    let now = timestamp(Utc::now());
    let result = sqlx::query(
        "UPDATE listings SET enrichment = ?, slug = ?, enriched_at = ?, updated_at = ? WHERE id = ?",
    )
    .bind(payload)
    .bind(slug)
    .bind(&now)
    .bind(&now)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFoundWithMessage(format!(
            "Listing '{id}' not found"
        )));
    }

    Ok(())
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::Decode(format!("invalid timestamp '{value}': {e}")))
}

/// Helper function to parse a listing from a database row.
fn parse_listing(row: &sqlx::sqlite::SqliteRow) -> Result<StoredListing> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    let enriched_at: Option<String> = row.try_get("enriched_at")?;
    let enrichment: Option<String> = row.try_get("enrichment")?;

    Ok(StoredListing {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        company: row.try_get("company")?,
        location: row.try_get("location")?,
        apply_url: row.try_get("apply_url")?,
        description: row.try_get("description")?,
        salary: row.try_get("salary")?,
        experience: row.try_get("experience")?,
        education: row.try_get("education")?,
        deadline: row.try_get("deadline")?,
        job_type: row.try_get("job_type")?,
        source: row.try_get("source")?,
        source_key: row.try_get("source_key")?,
        slug: row.try_get("slug")?,
        enrichment: enrichment
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| serde_json::from_str(&raw).ok()),
        created_at: parse_time(&created_at)?,
        updated_at: parse_time(&updated_at)?,
        enriched_at: enriched_at.as_deref().map(parse_time).transpose()?,
    })
}
