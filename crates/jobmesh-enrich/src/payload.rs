//! Enrichment payload schema.
//!
//! The wire form is camelCase JSON. Section bodies are adjacently tagged:
//! `{"type": "bullet_list", "content": ["..."]}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// AI-generated content attached to a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedContent {
    /// Headline block
    #[serde(default)]
    pub header: Header,
    /// Short label/value facts shown near the top
    #[serde(default)]
    pub quick_info: Vec<LabeledValue>,
    /// One-line selling points
    #[serde(default)]
    pub highlights: Vec<String>,
    /// Ordered body sections
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Search-engine metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<SeoMeta>,
    /// How to apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_info: Option<ApplyInfo>,
    /// Whether the enrichment pass completed
    #[serde(default)]
    pub is_enhanced: bool,
    /// When the enrichment pass completed
    #[serde(default)]
    pub enhanced_at: Option<DateTime<Utc>>,
}

/// Headline block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Secondary line, usually employer and location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Short summary paragraph
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Small badges ("Remote", "Urgent")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub badges: Vec<String>,
}

/// A label/value pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledValue {
    /// Label
    pub label: String,
    /// Value
    pub value: String,
}

impl LabeledValue {
    /// Create a pair.
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// One body section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Stable identifier within the payload
    pub id: String,
    /// Section heading
    pub title: String,
    /// Tagged body
    pub body: SectionBody,
}

/// Section body variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum SectionBody {
    /// Free text
    Paragraph(String),
    /// Unordered items
    BulletList(Vec<String>),
    /// Ordered items
    NumberedList(Vec<String>),
    /// Short keyword chips
    Tags(Vec<String>),
    /// Items under sub-headings
    GroupedList(Vec<ListGroup>),
    /// Simple table
    Table {
        /// Column headings
        headers: Vec<String>,
        /// Cell rows
        rows: Vec<Vec<String>>,
    },
    /// Label/value rows
    KeyValue(Vec<LabeledValue>),
}

impl SectionBody {
    /// The `type` tag for this body.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Paragraph(_) => "paragraph",
            Self::BulletList(_) => "bullet_list",
            Self::NumberedList(_) => "numbered_list",
            Self::Tags(_) => "tags",
            Self::GroupedList(_) => "grouped_list",
            Self::Table { .. } => "table",
            Self::KeyValue(_) => "key_value",
        }
    }

    /// Whether the body carries no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Paragraph(text) => text.trim().is_empty(),
            Self::BulletList(items) | Self::NumberedList(items) | Self::Tags(items) => {
                items.is_empty()
            }
            Self::GroupedList(groups) => groups.iter().all(|g| g.items.is_empty()),
            Self::Table { rows, .. } => rows.is_empty(),
            Self::KeyValue(pairs) => pairs.is_empty(),
        }
    }
}

/// A heading with its items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListGroup {
    /// Group heading
    pub heading: String,
    /// Items
    pub items: Vec<String>,
}

/// Search-engine metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoMeta {
    /// Page title
    #[serde(default)]
    pub title: String,
    /// Meta description
    #[serde(default)]
    pub description: String,
    /// Keyword list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

/// How to apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyInfo {
    /// Application URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Contact email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Deadline text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    /// Free-text instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_body_is_adjacently_tagged() {
        let section = Section {
            id: "duties".to_string(),
            title: "Duties".to_string(),
            body: SectionBody::BulletList(vec!["Reconcile ledgers".to_string()]),
        };

        let value = serde_json::to_value(&section).expect("serialize section");
        assert_eq!(
            value,
            json!({
                "id": "duties",
                "title": "Duties",
                "body": {"type": "bullet_list", "content": ["Reconcile ledgers"]}
            })
        );
    }

    #[test]
    fn test_table_body_shape() {
        let body = SectionBody::Table {
            headers: vec!["Grade".to_string()],
            rows: vec![vec!["A".to_string()]],
        };
        let value = serde_json::to_value(&body).expect("serialize body");
        assert_eq!(value["type"], "table");
        assert_eq!(value["content"]["headers"][0], "Grade");
        assert_eq!(body.kind(), "table");
    }

    #[test]
    fn test_empty_bodies() {
        assert!(SectionBody::Paragraph("  ".to_string()).is_empty());
        assert!(SectionBody::GroupedList(vec![ListGroup::default()]).is_empty());
        assert!(!SectionBody::Tags(vec!["rust".to_string()]).is_empty());
    }

    #[test]
    fn test_content_round_trips_through_json() {
        let content = EnhancedContent {
            header: Header {
                title: "Accountant".to_string(),
                ..Header::default()
            },
            quick_info: vec![LabeledValue::new("Salary", "Negotiable")],
            is_enhanced: true,
            ..EnhancedContent::default()
        };
        let raw = serde_json::to_string(&content).expect("serialize");
        assert!(raw.contains("\"quickInfo\""));
        let back: EnhancedContent = serde_json::from_str(&raw).expect("deserialize");
        assert_eq!(back, content);
    }
}
