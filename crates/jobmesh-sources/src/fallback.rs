//! Synthetic search-link listings for when every adapter came back empty.
//!
//! These are not real postings: each one points at a board's own search page
//! for the caller's query and carries the `fallback` source tag.

use crate::definition::FallbackLink;
use crate::locale::LocaleSignal;
use crate::registry::SourceRegistry;
use crate::url_builder::fill_template;
use jobmesh_core::{ListingDraft, SourceId};
use tracing::debug;

#[derive(Debug, Clone)]
struct BoardLink {
    source_id: SourceId,
    relevance: Vec<String>,
    link: FallbackLink,
}

/// Deterministic fallback-link generator.
#[derive(Debug, Clone, Default)]
pub struct FallbackLinks {
    boards: Vec<BoardLink>,
}

impl FallbackLinks {
    /// Collect every definition (enabled or not) that declares a fallback link.
    #[must_use]
    pub fn from_registry(registry: &SourceRegistry) -> Self {
        let mut boards: Vec<BoardLink> = registry
            .get_all()
            .into_iter()
            .filter_map(|def| {
                def.fallback.clone().map(|link| BoardLink {
                    source_id: def.id().clone(),
                    relevance: def.source.region_relevance.clone(),
                    link,
                })
            })
            .collect();
        boards.sort_by(|a, b| a.source_id.cmp(&b.source_id));
        Self { boards }
    }

    /// Number of boards with a fallback link.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boards.len()
    }

    /// Whether no board declares a fallback link.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    /// One listing per relevant board, in source-id order.
    ///
    /// Boards relevant to the location hint are preferred; if none are, every
    /// board is used so a reasonable query never comes back empty.
    #[must_use]
    pub fn generate(&self, query: &str, location: &str) -> Vec<ListingDraft> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let locale = LocaleSignal::detect(location);
        let relevant: Vec<&BoardLink> = self
            .boards
            .iter()
            .filter(|board| locale.matches_relevance(&board.relevance))
            .collect();
        let boards = if relevant.is_empty() {
            self.boards.iter().collect()
        } else {
            relevant
        };

        let location_label = match location.trim() {
            "" => "Any location",
            hint => hint,
        };

        let drafts: Vec<_> = boards
            .into_iter()
            .map(|board| {
                let board_name = board.link.board.as_str();
                ListingDraft::new(
                    SourceId::fallback(),
                    format!("{query} jobs on {board_name}"),
                    board_name,
                    location_label,
                    fill_template(&board.link.template, query, location),
                )
                .with_description(format!(
                    "Search {board_name} directly for \"{query}\" openings. \
                     This is a search link, not a single posting."
                ))
            })
            .collect();

        debug!(count = drafts.len(), "Generated fallback search links");
        drafts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{
        ExtractionSelectors, SearchMethod, SourceDefinition, SourceMetadata,
    };

    fn definition(id: &str, board: &str, relevance: &[&str]) -> SourceDefinition {
        SourceDefinition {
            source: SourceMetadata {
                id: SourceId::new(id).expect("valid source ID"),
                name: board.to_string(),
                url: format!("https://{id}.test"),
                domain: format!("{id}.test"),
                region_relevance: relevance.iter().map(ToString::to_string).collect(),
                enabled: true,
                max_results: 15,
            },
            search: SearchMethod::Browser {
                template: format!("https://{id}.test/search?q={{query}}"),
                default_location: None,
                regional: vec![],
                selectors: ExtractionSelectors {
                    results_container: "ul".to_string(),
                    card: "li".to_string(),
                    title: "h3".to_string(),
                    company: "h4".to_string(),
                    location: "span".to_string(),
                    link: "a".to_string(),
                    description: None,
                    no_results_indicator: None,
                    blocked_indicator: None,
                },
                scroll: false,
            },
            fallback: Some(FallbackLink {
                board: board.to_string(),
                template: format!("https://{id}.test/jobs?q={{query}}&l={{location}}"),
            }),
        }
    }

    fn links() -> FallbackLinks {
        let registry = SourceRegistry::new();
        for def in [
            definition("linkedin", "LinkedIn", &["global"]),
            definition("bdjobs", "Bdjobs", &["bd"]),
            definition("skilljobs", "Skill Jobs", &["bd"]),
        ] {
            registry.insert(def).expect("insert definition");
        }
        FallbackLinks::from_registry(&registry)
    }

    #[test]
    fn test_generate_for_bangladesh() {
        let drafts = links().generate("Accountant", "Bangladesh");

        assert_eq!(drafts.len(), 3);
        let titles: Vec<_> = drafts.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Accountant jobs on Bdjobs",
                "Accountant jobs on LinkedIn",
                "Accountant jobs on Skill Jobs",
            ]
        );
        assert!(drafts.iter().all(|d| d.source.is_fallback()));
        assert_eq!(
            drafts[0].apply_url,
            "https://bdjobs.test/jobs?q=Accountant&l=Bangladesh"
        );
    }

    #[test]
    fn test_generate_filters_by_locale() {
        let drafts = links().generate("rust developer", "Remote");
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].company, "LinkedIn");
        assert_eq!(
            drafts[0].apply_url,
            "https://linkedin.test/jobs?q=rust%20developer&l=Remote"
        );
    }

    #[test]
    fn test_generate_is_deterministic() {
        let links = links();
        assert_eq!(
            links.generate("nurse", "Dhaka"),
            links.generate("nurse", "Dhaka")
        );
    }

    #[test]
    fn test_blank_query_yields_nothing() {
        assert!(links().generate("   ", "Dhaka").is_empty());
    }

    #[test]
    fn test_empty_registry() {
        let links = FallbackLinks::from_registry(&SourceRegistry::new());
        assert!(links.is_empty());
        assert!(links.generate("nurse", "").is_empty());
    }
}
