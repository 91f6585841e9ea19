//! Boundary validation for generated enrichment JSON.
//!
//! Model output is loosely shaped: numbers where strings belong, keyword
//! lists as comma strings, invented section types. Everything is coerced
//! here once so the rest of the crate works with [`EnhancedContent`].

use crate::error::{EnrichError, Result};
use crate::payload::{
    ApplyInfo, EnhancedContent, Header, LabeledValue, ListGroup, Section, SectionBody, SeoMeta,
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

/// Validate and coerce a generated payload.
///
/// Both camelCase and `snake_case` keys are accepted. Unknown section types
/// are skipped and sections with no content are dropped.
///
/// # Errors
/// Returns `EnrichError::NotAnObject` unless `value` is a JSON object.
pub fn parse_enhanced(value: &Value) -> Result<EnhancedContent> {
    let Value::Object(root) = value else {
        return Err(EnrichError::NotAnObject(json_kind(value)));
    };

    let sections = field(root, &["sections", "content_sections", "contentSections"])
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .enumerate()
                .filter_map(|(index, entry)| parse_section(index, entry))
                .collect()
        })
        .unwrap_or_default();

    Ok(EnhancedContent {
        header: field(root, &["header"]).map(parse_header).unwrap_or_default(),
        quick_info: field(root, &["quickInfo", "quick_info"])
            .map(labeled_values)
            .unwrap_or_default(),
        highlights: field(root, &["highlights"])
            .map(string_list)
            .unwrap_or_default(),
        sections,
        seo: field(root, &["seo", "seoMeta", "seo_meta"]).and_then(parse_seo),
        apply_info: field(root, &["applyInfo", "apply_info"]).and_then(parse_apply_info),
        is_enhanced: field(root, &["isEnhanced", "is_enhanced"]).is_some_and(truthy),
        enhanced_at: field(root, &["enhancedAt", "enhanced_at"])
            .and_then(text)
            .and_then(|raw| parse_timestamp(&raw)),
    })
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| map.get(*key))
        .filter(|value| !value.is_null())
}

pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Scalar coercion: strings trimmed, numbers and booleans stringified.
fn text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Arrays of scalars, or a single comma-separated string.
fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(text).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(ToString::to_string)
            .collect(),
        other => text(other).into_iter().collect(),
    }
}

/// `[{label, value}]`, `[[label, value]]` or `{label: value}`.
fn labeled_values(value: &Value) -> Vec<LabeledValue> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(map) => {
                    let label = field(map, &["label", "key", "name"]).and_then(text)?;
                    let value = field(map, &["value", "text"]).and_then(text)?;
                    Some(LabeledValue::new(label, value))
                }
                Value::Array(pair) if pair.len() == 2 => {
                    Some(LabeledValue::new(text(&pair[0])?, text(&pair[1])?))
                }
                _ => None,
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(label, value)| Some(LabeledValue::new(label.trim(), text(value)?)))
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_header(value: &Value) -> Header {
    match value {
        Value::Object(map) => Header {
            title: field(map, &["title", "headline"])
                .and_then(text)
                .unwrap_or_default(),
            subtitle: field(map, &["subtitle", "tagline"]).and_then(text),
            summary: field(map, &["summary", "description"]).and_then(text),
            badges: field(map, &["badges", "tags"])
                .map(string_list)
                .unwrap_or_default(),
        },
        other => Header {
            title: text(other).unwrap_or_default(),
            ..Header::default()
        },
    }
}

fn parse_seo(value: &Value) -> Option<SeoMeta> {
    let Value::Object(map) = value else {
        return None;
    };
    Some(SeoMeta {
        title: field(map, &["title", "metaTitle", "meta_title"])
            .and_then(text)
            .unwrap_or_default(),
        description: field(map, &["description", "metaDescription", "meta_description"])
            .and_then(text)
            .unwrap_or_default(),
        keywords: field(map, &["keywords"])
            .map(string_list)
            .unwrap_or_default(),
    })
}

fn parse_apply_info(value: &Value) -> Option<ApplyInfo> {
    match value {
        Value::Object(map) => Some(ApplyInfo {
            url: field(map, &["url", "applyUrl", "apply_url", "link"]).and_then(text),
            email: field(map, &["email"]).and_then(text),
            deadline: field(map, &["deadline"]).and_then(text),
            instructions: field(map, &["instructions", "howToApply", "how_to_apply"])
                .and_then(text),
        }),
        Value::String(_) => Some(ApplyInfo {
            instructions: text(value),
            ..ApplyInfo::default()
        }),
        _ => None,
    }
}

/// `bulletList`, `bullet-list` and `Bullet List` all become `bullet_list`.
fn type_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len() + 4);
    for (i, c) in raw.trim().chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 && !key.ends_with('_') {
                key.push('_');
            }
            key.extend(c.to_lowercase());
        } else if c == '-' || c.is_whitespace() {
            if !key.ends_with('_') {
                key.push('_');
            }
        } else {
            key.push(c);
        }
    }
    key
}

fn parse_section(index: usize, value: &Value) -> Option<Section> {
    let Value::Object(map) = value else {
        return None;
    };
    let kind = field(map, &["type", "kind"]).and_then(text)?;
    let content = field(map, &["content", "items", "body"]).unwrap_or(&Value::Null);

    let body = match type_key(&kind).as_str() {
        "paragraph" | "text" => SectionBody::Paragraph(match content {
            Value::Array(_) => string_list(content).join("\n\n"),
            other => text(other).unwrap_or_default(),
        }),
        "bullet_list" | "bullets" | "list" => SectionBody::BulletList(string_list(content)),
        "numbered_list" | "ordered_list" | "steps" => {
            SectionBody::NumberedList(string_list(content))
        }
        "tags" | "chips" => SectionBody::Tags(string_list(content)),
        "grouped_list" | "groups" => SectionBody::GroupedList(list_groups(content)),
        "table" => parse_table(content),
        "key_value" | "kv" | "key_values" => SectionBody::KeyValue(labeled_values(content)),
        other => {
            debug!(section_type = other, "skipping unknown enrichment section type");
            return None;
        }
    };

    if body.is_empty() {
        return None;
    }

    let id = field(map, &["id"])
        .and_then(text)
        .unwrap_or_else(|| format!("section-{}", index + 1));
    let title = field(map, &["title", "heading"])
        .and_then(text)
        .unwrap_or_default();

    Some(Section { id, title, body })
}

fn list_groups(value: &Value) -> Vec<ListGroup> {
    match value {
        Value::Array(groups) => groups
            .iter()
            .filter_map(|group| {
                let Value::Object(map) = group else {
                    return None;
                };
                Some(ListGroup {
                    heading: field(map, &["heading", "title", "label"])
                        .and_then(text)
                        .unwrap_or_default(),
                    items: field(map, &["items", "content"])
                        .map(string_list)
                        .unwrap_or_default(),
                })
            })
            .filter(|group| !group.items.is_empty())
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(heading, items)| ListGroup {
                heading: heading.trim().to_string(),
                items: string_list(items),
            })
            .filter(|group| !group.items.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_table(value: &Value) -> SectionBody {
    let Value::Object(map) = value else {
        return SectionBody::Table {
            headers: Vec::new(),
            rows: Vec::new(),
        };
    };
    let rows = field(map, &["rows"])
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(Value::as_array)
                .map(|cells| {
                    cells
                        .iter()
                        .map(|c| text(c).unwrap_or_default())
                        .collect::<Vec<String>>()
                })
                .filter(|cells| !cells.is_empty())
                .collect()
        })
        .unwrap_or_default();

    SectionBody::Table {
        headers: field(map, &["headers", "columns"])
            .map(string_list)
            .unwrap_or_default(),
        rows,
    }
}
