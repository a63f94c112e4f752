use pwa_check_core::catalog::{catalog_v1, load_catalog, RuleCatalog, CATALOG_VERSION_V1};
use pwa_check_core::error::CoreError;
use pwa_check_core::eval::default_registry;
use pwa_check_core::Category;
use std::collections::BTreeSet;

#[test]
fn shipped_catalog_loads_with_unique_ids() {
    let catalog = catalog_v1().unwrap();
    assert_eq!(catalog.catalog_version, CATALOG_VERSION_V1);
    let ids: BTreeSet<&str> = catalog.rules.iter().map(|r| r.rule_id.as_str()).collect();
    assert_eq!(ids.len(), catalog.rules.len());

    let registry = catalog.into_registry().unwrap();
    assert_eq!(
        registry.categories(),
        vec![
            Category::Required,
            Category::Recommended,
            Category::Enhancement,
            Category::ServiceWorker,
            Category::Security,
        ]
    );
    for c in Category::ALL {
        assert!(!registry.by_category(c).is_empty(), "no rules for {}", c);
    }
}

#[test]
fn default_registry_is_built_once() {
    assert!(std::ptr::eq(default_registry(), default_registry()));
    assert_eq!(default_registry().catalog_version(), CATALOG_VERSION_V1);
}

#[test]
fn catalog_file_overrides_shipped_rules() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.json");
    std::fs::write(
        &path,
        r#"{
  "catalog_version": "pwa_rules_v1",
  "rules": [
    {"rule_id": "SEC", "category": "security", "description": "https", "check": {"kind": "site_https"}},
    {"rule_id": "SW", "category": "serviceWorker", "description": "sw", "check": {"kind": "service_worker_present"}}
  ]
}"#,
    )
    .unwrap();
    let registry = load_catalog(&path).unwrap().into_registry().unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.get("SW").unwrap().category, Category::ServiceWorker);
}

#[test]
fn wrong_catalog_version_is_rejected() {
    let err = RuleCatalog::from_json_str(r#"{"catalog_version": "pwa_rules_v0", "rules": []}"#)
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));
}

#[test]
fn duplicate_ids_in_catalog_fail_registry_construction() {
    let catalog = RuleCatalog::from_json_str(
        r#"{
  "catalog_version": "pwa_rules_v1",
  "rules": [
    {"rule_id": "X", "category": "required", "description": "a", "check": {"kind": "manifest_present"}},
    {"rule_id": "X", "category": "security", "description": "b", "check": {"kind": "site_https"}}
  ]
}"#,
    )
    .unwrap();
    let err = catalog.into_registry().unwrap_err();
    assert!(matches!(err, CoreError::DuplicateRuleId(ref id) if id == "X"));
}

#[test]
fn unknown_check_kind_is_a_json_error() {
    let err = RuleCatalog::from_json_str(
        r#"{"catalog_version": "pwa_rules_v1", "rules": [
    {"rule_id": "X", "category": "required", "description": "a", "check": {"kind": "telepathy"}}
  ]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::Json(_)));
}

#[test]
fn missing_catalog_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_catalog(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, CoreError::Io(_)));
}
