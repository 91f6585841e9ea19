//! Size-bounded serialization of enrichment payloads.
//!
//! The stored JSON must never exceed a byte budget. Oversized payloads go
//! through a fixed ladder of shrink passes, each re-serialized and measured;
//! the first one that fits wins. Every rung produces valid JSON.

use crate::payload::{
    ApplyInfo, EnhancedContent, Header, LabeledValue, ListGroup, Section, SectionBody, SeoMeta,
};
use crate::validate::{field, parse_enhanced, parse_timestamp, truthy};
use chrono::{DateTime, Utc};
use jobmesh_core::truncate_at_word;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Caps applied by one shrink pass.
#[derive(Debug, Clone, Copy)]
struct ShrinkPass {
    highlights: usize,
    highlight_chars: usize,
    quick_info: usize,
    quick_info_chars: usize,
    paragraph_chars: usize,
    list_items: usize,
    item_chars: usize,
    outline_sections: bool,
}

const SHRINK_PASSES: [ShrinkPass; 3] = [
    ShrinkPass {
        highlights: 12,
        highlight_chars: 300,
        quick_info: 12,
        quick_info_chars: 200,
        paragraph_chars: 2000,
        list_items: 15,
        item_chars: 300,
        outline_sections: false,
    },
    ShrinkPass {
        highlights: 8,
        highlight_chars: 200,
        quick_info: 8,
        quick_info_chars: 120,
        paragraph_chars: 1000,
        list_items: 10,
        item_chars: 200,
        outline_sections: false,
    },
    ShrinkPass {
        highlights: 5,
        highlight_chars: 150,
        quick_info: 6,
        quick_info_chars: 80,
        paragraph_chars: 0,
        list_items: 0,
        item_chars: 0,
        outline_sections: true,
    },
];

/// Stored section: full body, or only its identifying metadata.
#[derive(Serialize)]
#[serde(untagged)]
enum StoredSection<'a> {
    Full(&'a Section),
    Outline {
        id: &'a str,
        title: &'a str,
        #[serde(rename = "type")]
        kind: &'static str,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredContent<'a> {
    header: &'a Header,
    quick_info: &'a [LabeledValue],
    highlights: &'a [String],
    sections: Vec<StoredSection<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seo: Option<&'a SeoMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    apply_info: Option<&'a ApplyInfo>,
    is_enhanced: bool,
    enhanced_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EssentialShape<'a> {
    header: &'a Header,
    #[serde(skip_serializing_if = "Option::is_none")]
    apply_info: Option<&'a ApplyInfo>,
    is_enhanced: bool,
    enhanced_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusShape {
    is_enhanced: bool,
    enhanced_at: Option<DateTime<Utc>>,
}

const EMPTY_OBJECT: &str = "{}";

/// Serialize `content` so the output is at most `max_len` bytes.
///
/// The returned string is always valid JSON, or empty when even `{}` does
/// not fit.
#[must_use]
pub fn stringify_for_storage(content: &EnhancedContent, max_len: usize) -> String {
    let full = serialize(&stored_view(content, None));
    if let Some(full) = full.filter(|s| s.len() <= max_len) {
        return full;
    }

    for (index, pass) in SHRINK_PASSES.iter().enumerate() {
        let reduced = apply_pass(content, pass);
        if let Some(json) =
            serialize(&stored_view(&reduced, Some(pass))).filter(|s| s.len() <= max_len)
        {
            debug!(
                pass = index + 1,
                bytes = json.len(),
                max_len,
                "enrichment shrunk to fit budget"
            );
            return json;
        }
    }

    warn!(max_len, "enrichment exceeds budget after every pass, keeping essentials");
    let essentials = EssentialShape {
        header: &content.header,
        apply_info: content.apply_info.as_ref(),
        is_enhanced: content.is_enhanced,
        enhanced_at: content.enhanced_at,
    };
    if let Some(json) = serialize(&essentials).filter(|s| s.len() <= max_len) {
        return json;
    }

    status_only(content.is_enhanced, content.enhanced_at, max_len)
}

/// Like [`stringify_for_storage`], for untrusted JSON.
///
/// Input that does not validate degrades to the status-field shape.
#[must_use]
pub fn stringify_value_for_storage(value: &Value, max_len: usize) -> String {
    match parse_enhanced(value) {
        Ok(content) => stringify_for_storage(&content, max_len),
        Err(e) => {
            warn!(error = %e, "unparseable enrichment, storing status fields only");
            let (is_enhanced, enhanced_at) = match value {
                Value::Object(map) => (
                    field(map, &["isEnhanced", "is_enhanced"]).is_some_and(truthy),
                    field(map, &["enhancedAt", "enhanced_at"])
                        .and_then(Value::as_str)
                        .and_then(parse_timestamp),
                ),
                _ => (false, None),
            };
            status_only(is_enhanced, enhanced_at, max_len)
        }
    }
}

fn status_only(is_enhanced: bool, enhanced_at: Option<DateTime<Utc>>, max_len: usize) -> String {
    let status = StatusShape {
        is_enhanced,
        enhanced_at,
    };
    if let Some(json) = serialize(&status).filter(|s| s.len() <= max_len) {
        return json;
    }
    if EMPTY_OBJECT.len() <= max_len {
        EMPTY_OBJECT.to_string()
    } else {
        String::new()
    }
}

fn serialize<T: Serialize>(value: &T) -> Option<String> {
    serde_json::to_string(value).ok()
}

fn stored_view<'a>(content: &'a EnhancedContent, pass: Option<&ShrinkPass>) -> StoredContent<'a> {
    let outline = pass.is_some_and(|p| p.outline_sections);
    StoredContent {
        header: &content.header,
        quick_info: &content.quick_info,
        highlights: &content.highlights,
        sections: content
            .sections
            .iter()
            .map(|section| {
                if outline {
                    StoredSection::Outline {
                        id: &section.id,
                        title: &section.title,
                        kind: section.body.kind(),
                    }
                } else {
                    StoredSection::Full(section)
                }
            })
            .collect(),
        seo: content.seo.as_ref(),
        apply_info: content.apply_info.as_ref(),
        is_enhanced: content.is_enhanced,
        enhanced_at: content.enhanced_at,
    }
}

fn apply_pass(content: &EnhancedContent, pass: &ShrinkPass) -> EnhancedContent {
    let mut reduced = content.clone();

    if let Some(seo) = reduced.seo.as_mut() {
        seo.keywords.clear();
    }

    reduced.highlights = cap_items(&content.highlights, pass.highlights, pass.highlight_chars);
    reduced.quick_info = content
        .quick_info
        .iter()
        .take(pass.quick_info)
        .map(|pair| LabeledValue {
            label: truncate_at_word(&pair.label, pass.quick_info_chars),
            value: truncate_at_word(&pair.value, pass.quick_info_chars),
        })
        .collect();

    if !pass.outline_sections {
        for section in &mut reduced.sections {
            section.body = cap_body(&section.body, pass);
        }
    }

    reduced
}

fn cap_items(items: &[String], count: usize, chars: usize) -> Vec<String> {
    items
        .iter()
        .take(count)
        .map(|item| truncate_at_word(item, chars))
        .collect()
}

fn cap_body(body: &SectionBody, pass: &ShrinkPass) -> SectionBody {
    let items = |list: &[String]| cap_items(list, pass.list_items, pass.item_chars);
    match body {
        SectionBody::Paragraph(text) => {
            SectionBody::Paragraph(truncate_at_word(text, pass.paragraph_chars))
        }
        SectionBody::BulletList(list) => SectionBody::BulletList(items(list)),
        SectionBody::NumberedList(list) => SectionBody::NumberedList(items(list)),
        SectionBody::Tags(list) => SectionBody::Tags(items(list)),
        SectionBody::GroupedList(groups) => SectionBody::GroupedList(
            groups
                .iter()
                .take(pass.list_items)
                .map(|group| ListGroup {
                    heading: truncate_at_word(&group.heading, pass.item_chars),
                    items: items(&group.items),
                })
                .collect(),
        ),
        SectionBody::Table { headers, rows } => SectionBody::Table {
            headers: cap_items(headers, pass.list_items, pass.item_chars),
            rows: rows
                .iter()
                .take(pass.list_items)
                .map(|row| items(row))
                .collect(),
        },
        SectionBody::KeyValue(pairs) => SectionBody::KeyValue(
            pairs
                .iter()
                .take(pass.list_items)
                .map(|pair| LabeledValue {
                    label: truncate_at_word(&pair.label, pass.item_chars),
                    value: truncate_at_word(&pair.value, pass.item_chars),
                })
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bulky(sections: usize, paragraph_chars: usize) -> EnhancedContent {
        let paragraph = "lorem ipsum ".repeat(paragraph_chars / 12);
        EnhancedContent {
            header: Header {
                title: "Senior Accountant".to_string(),
                subtitle: Some("Ledger Ltd, Dhaka".to_string()),
                ..Header::default()
            },
            quick_info: (0..20)
                .map(|i| LabeledValue::new(format!("Fact {i}"), "x".repeat(250)))
                .collect(),
            highlights: (0..20).map(|i| format!("Highlight {i} ").repeat(30)).collect(),
            sections: (0..sections)
                .map(|i| Section {
                    id: format!("s{i}"),
                    title: format!("Section {i}"),
                    body: if i % 2 == 0 {
                        SectionBody::Paragraph(paragraph.clone())
                    } else {
                        SectionBody::BulletList(vec!["item text ".repeat(40); 30])
                    },
                })
                .collect(),
            seo: Some(SeoMeta {
                title: "Accountant job".to_string(),
                description: "Apply now".to_string(),
                keywords: vec!["finance".to_string(); 50],
            }),
            apply_info: Some(ApplyInfo {
                url: Some("https://jobs.test/apply".to_string()),
                ..ApplyInfo::default()
            }),
            is_enhanced: true,
            enhanced_at: None,
        }
    }

    fn parse(json: &str) -> Value {
        serde_json::from_str(json).expect("stored output is valid JSON")
    }

    #[test]
    fn test_small_payload_is_unchanged() {
        let content = bulky(1, 100);
        let json = stringify_for_storage(&content, 50_000);
        let value = parse(&json);
        assert_eq!(value["seo"]["keywords"].as_array().map(Vec::len), Some(50));
        assert_eq!(value["sections"][0]["body"]["type"], "paragraph");
    }

    #[test]
    fn test_first_pass_drops_keywords_and_caps_lists() {
        let content = bulky(4, 3000);
        let full = serde_json::to_string(&content).expect("serialize");
        let json = stringify_for_storage(&content, full.len() - 1);
        let value = parse(&json);

        assert!(json.len() < full.len());
        assert!(value["seo"].get("keywords").is_none());
        assert_eq!(value["highlights"].as_array().map(Vec::len), Some(12));
        assert_eq!(
            value["sections"][1]["body"]["content"]
                .as_array()
                .map(Vec::len),
            Some(15)
        );
    }

    #[test]
    fn test_third_pass_collapses_sections() {
        let content = bulky(60, 4000);
        let json = stringify_for_storage(&content, 12_000);
        assert!(json.len() <= 12_000);

        let value = parse(&json);
        assert_eq!(
            value["sections"][0],
            json!({"id": "s0", "title": "Section 0", "type": "paragraph"})
        );
        assert_eq!(value["highlights"].as_array().map(Vec::len), Some(5));
    }

    #[test]
    fn test_essentials_then_status_then_empty() {
        let content = bulky(400, 100);

        let json = stringify_for_storage(&content, 12_000);
        let value = parse(&json);
        assert!(value.get("sections").is_none());
        assert_eq!(value["header"]["title"], "Senior Accountant");
        assert_eq!(value["applyInfo"]["url"], "https://jobs.test/apply");

        let json = stringify_for_storage(&content, 64);
        assert_eq!(parse(&json), json!({"isEnhanced": true, "enhancedAt": null}));

        assert_eq!(stringify_for_storage(&content, 10), "{}");
        assert_eq!(stringify_for_storage(&content, 1), "");
    }

    #[test]
    fn test_output_never_exceeds_budget() {
        let shapes = [bulky(0, 0), bulky(3, 500), bulky(40, 5000)];
        for content in &shapes {
            for max_len in [0, 1, 2, 30, 100, 500, 2_000, 10_000, 50_000] {
                let json = stringify_for_storage(content, max_len);
                assert!(
                    json.len() <= max_len,
                    "{} bytes exceeds budget {max_len}",
                    json.len()
                );
                if !json.is_empty() {
                    parse(&json);
                }
            }
        }
    }

    #[test]
    fn test_multibyte_text_is_cut_on_char_boundaries() {
        let mut content = bulky(2, 100);
        content.highlights = vec!["চাকরি ".repeat(400); 20];
        let full = serde_json::to_string(&content).expect("serialize");

        let json = stringify_for_storage(&content, full.len() / 2);
        assert!(json.len() <= full.len() / 2);
        parse(&json);
    }

    #[test]
    fn test_value_input_degrades_gracefully() {
        let json = stringify_value_for_storage(&json!("not an object"), 1_000);
        assert_eq!(parse(&json), json!({"isEnhanced": false, "enhancedAt": null}));

        let json = stringify_value_for_storage(
            &json!({"header": {"title": "Nurse"}, "isEnhanced": true}),
            1_000,
        );
        assert_eq!(parse(&json)["header"]["title"], "Nurse");
    }
}
