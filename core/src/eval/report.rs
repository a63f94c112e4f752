use crate::context::ValidationContext;
use crate::determinism::digest::canonical_sha256_hex;
use crate::error::CoreResult;
use crate::eval::runner::CheckResult;
use crate::eval::score::{category_scores, group_scores, CategoryScore, GroupScore};
use crate::manifest::FALLBACK_APP_NAME;
use crate::rules::Category;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub catalog_version: String,
    pub site_url: String,
    pub app_name: String,
    pub required_passed: bool,
    pub results: Vec<CheckResult>,
    pub category_scores: Vec<CategoryScore>,
    pub group_scores: Vec<GroupScore>,
    pub results_sha256: String,
}

impl ScanReport {
    pub fn new(catalog_version: &str, ctx: &ValidationContext, results: Vec<CheckResult>) -> Self {
        let required_passed = results
            .iter()
            .filter(|r| r.category == Category::Required)
            .all(|r| r.result);
        let results_sha256 = match canonical_sha256_hex(&results) {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(error = %e, "could not digest scan results");
                String::new()
            }
        };
        Self {
            catalog_version: catalog_version.to_string(),
            site_url: ctx.site_url.clone(),
            app_name: ctx
                .manifest
                .as_ref()
                .map(|m| m.display_name())
                .unwrap_or(FALLBACK_APP_NAME)
                .to_string(),
            required_passed,
            category_scores: category_scores(&results),
            group_scores: group_scores(&results),
            results,
            results_sha256,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.result)
    }
}

pub fn render_results_csv(results: &[CheckResult]) -> CoreResult<String> {
    let mut wtr = csv::WriterBuilder::new().from_writer(vec![]);
    wtr.write_record(["rule_id", "category", "result", "info_string"])?;
    for r in results {
        wtr.write_record([
            r.rule_id.as_str(),
            r.category.as_str(),
            if r.result { "PASS" } else { "FAIL" },
            r.info_string.as_str(),
        ])?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).replace("\r\n", "\n"))
}

pub fn render_results_text(report: &ScanReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", report.app_name, report.site_url);
    for g in &report.group_scores {
        let _ = writeln!(
            out,
            "{} {}% ({}/{})",
            g.group.label(),
            g.percent(),
            g.passed,
            g.total
        );
    }
    for r in &report.results {
        let _ = writeln!(
            out,
            "{} {} [{}] {}",
            if r.result { "PASS" } else { "FAIL" },
            r.rule_id,
            r.category,
            r.info_string
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(id: &str, category: Category, result: bool, info: &str) -> CheckResult {
        CheckResult {
            rule_id: id.to_string(),
            category,
            info_string: info.to_string(),
            result,
        }
    }

    #[test]
    fn csv_quotes_messages_with_commas() {
        let csv = render_results_csv(&[
            res("A", Category::Required, true, "ok"),
            res("B", Category::Security, false, "one, two"),
        ])
        .unwrap();
        assert_eq!(
            csv,
            "rule_id,category,result,info_string\nA,required,PASS,ok\nB,security,FAIL,\"one, two\"\n"
        );
    }

    #[test]
    fn text_report_lists_rings_then_results() {
        let ctx = ValidationContext::new("https://example.com");
        let report = ScanReport::new(
            "test",
            &ctx,
            vec![
                res("A", Category::Required, true, "ok"),
                res("B", Category::ServiceWorker, false, "none"),
            ],
        );
        let text = render_results_text(&report);
        assert!(text.starts_with("My App (https://example.com)\n"));
        assert!(text.contains("Manifest 100% (1/1)"));
        assert!(text.contains("Service Worker 0% (0/1)"));
        assert!(text.contains("Security 0% (0/0)"));
        assert!(text.contains("FAIL B [service_worker] none"));
        assert!(report.required_passed);
        assert_eq!(report.failures().count(), 1);
    }
}
