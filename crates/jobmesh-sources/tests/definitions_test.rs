//! The built-in definitions shipped in `source-definitions/` must all load.

use jobmesh_core::SourceTier;
use jobmesh_sources::{FallbackLinks, LocaleSignal, SourceLoader, SourceRegistry};
use std::path::PathBuf;

fn builtin_loader() -> SourceLoader {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../source-definitions");
    SourceLoader::new(dir).expect("source-definitions directory")
}

#[test]
fn test_builtin_definitions_are_valid() {
    let loader = builtin_loader();
    let registry = SourceRegistry::load_from(&loader).expect("load registry");

    let definitions = registry.get_all();
    let count = |tier: SourceTier| definitions.iter().filter(|d| d.tier() == tier).count();
    assert_eq!(count(SourceTier::Rest), 4);
    assert_eq!(count(SourceTier::Browser), 3);
}

#[test]
fn test_bangladesh_is_served_by_regional_board() {
    let registry = SourceRegistry::load_from(&builtin_loader()).expect("load registry");
    let bdjobs = registry
        .get_all()
        .into_iter()
        .find(|d| d.id().as_str() == "bdjobs")
        .expect("bdjobs definition");

    assert!(bdjobs.source.enabled);
    assert!(bdjobs.serves(&LocaleSignal::detect("Dhaka, Bangladesh")));
    assert!(!bdjobs.serves(&LocaleSignal::detect("Remote")));
}

#[test]
fn test_builtin_fallback_links() {
    let registry = SourceRegistry::load_from(&builtin_loader()).expect("load registry");
    let drafts = FallbackLinks::from_registry(&registry).generate("Accountant", "Bangladesh");

    assert!(!drafts.is_empty());
    assert!(drafts.iter().all(|d| d.source.is_fallback()));
    assert!(drafts.iter().all(|d| d.apply_url.starts_with("https://")));
}
