use pwa_check_core::eval::report::render_results_csv;
use pwa_check_core::eval::{default_registry, score_for};
use pwa_check_core::manifest::ManifestDocument;
use pwa_check_core::rules::ScoreGroup;
use pwa_check_core::{Category, Evaluator, ValidationContext};
use serde_json::json;

fn minimal_context() -> ValidationContext {
    ValidationContext::new("https://example.com/")
        .with_manifest_url("https://example.com/manifest.json")
        .with_manifest(
            ManifestDocument::from_value(json!({
                "name": "Demo",
                "short_name": "Demo",
                "start_url": "/",
                "icons": [
                    {"src": "/512.png", "sizes": "512x512"},
                    {"src": "/192.png", "sizes": "192x192"}
                ]
            }))
            .unwrap(),
        )
}

#[test]
fn minimal_installable_manifest_passes_required_only() {
    let report = Evaluator::new(default_registry()).scan(&minimal_context());
    assert!(report.required_passed);
    assert_eq!(report.app_name, "Demo");

    let required = score_for(&report.results, Category::Required);
    assert_eq!(required.passed, required.total);
    assert_eq!(required.percent(), 100);

    let sw = score_for(&report.results, Category::ServiceWorker);
    assert_eq!(sw.passed, 0);
    assert!(sw.total > 0);

    let security = report
        .group_scores
        .iter()
        .find(|g| g.group == ScoreGroup::Security)
        .unwrap();
    assert_eq!(security.passed, security.total);
}

#[test]
fn scores_partition_all_results() {
    let report = Evaluator::new(default_registry()).scan(&minimal_context());
    let category_total: usize = report.category_scores.iter().map(|s| s.total).sum();
    let group_total: usize = report.group_scores.iter().map(|g| g.total).sum();
    assert_eq!(category_total, report.results.len());
    assert_eq!(group_total, report.results.len());
    for s in &report.category_scores {
        assert!(s.passed <= s.total);
    }
}

#[test]
fn missing_name_fails_required() {
    let ctx = ValidationContext::new("http://example.com/").with_manifest(
        ManifestDocument::from_value(json!({"short_name": "Demo"})).unwrap(),
    );
    let report = Evaluator::new(default_registry()).scan(&ctx);
    assert!(!report.required_passed);
    assert_eq!(report.app_name, "Demo");
    assert!(report
        .failures()
        .any(|r| r.rule_id == "SECURITY.HTTPS" && r.info_string.contains("not HTTPS")));
}

#[test]
fn report_serializes_with_stable_field_names() {
    let report = Evaluator::new(default_registry()).scan(&minimal_context());
    let v = serde_json::to_value(&report).unwrap();
    assert_eq!(v["catalog_version"], "pwa_rules_v1");
    assert_eq!(v["results"][0]["rule_id"], "MANIFEST.PRESENT");
    assert_eq!(v["results"][0]["category"], "required");
    assert_eq!(v["results"][0]["result"], true);
    assert_eq!(v["group_scores"][1]["group"], "service_worker");

    let csv = render_results_csv(&report.results).unwrap();
    assert_eq!(csv.lines().count(), report.results.len() + 1);
}
