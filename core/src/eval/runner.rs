use crate::catalog::catalog_v1;
use crate::context::ValidationContext;
use crate::eval::report::ScanReport;
use crate::rules::registry::RuleRegistry;
use crate::rules::{Category, Outcome, Rule};
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::OnceLock;

pub const INTERNAL_ERROR_PREFIX: &str = "internal error in rule";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub rule_id: String,
    pub category: Category,
    pub info_string: String,
    pub result: bool,
}

impl CheckResult {
    /// True when the failure came from the checker, not from the manifest.
    pub fn is_internal_error(&self) -> bool {
        !self.result && self.info_string.starts_with(INTERNAL_ERROR_PREFIX)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'r> {
    registry: &'r RuleRegistry,
}

impl<'r> Evaluator<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r RuleRegistry {
        self.registry
    }

    /// One result per registered rule, in registration order. Never fails.
    pub fn run(&self, ctx: &ValidationContext) -> Vec<CheckResult> {
        let results: Vec<CheckResult> = self
            .registry
            .all()
            .iter()
            .map(|rule| evaluate_contained(rule, ctx))
            .collect();
        let passed = results.iter().filter(|r| r.result).count();
        tracing::info!(
            site = %ctx.site_url,
            catalog = %self.registry.catalog_version(),
            passed,
            total = results.len(),
            "manifest checks complete"
        );
        results
    }

    pub fn scan(&self, ctx: &ValidationContext) -> ScanReport {
        let results = self.run(ctx);
        ScanReport::new(self.registry.catalog_version(), ctx, results)
    }
}

fn evaluate_contained(rule: &Rule, ctx: &ValidationContext) -> CheckResult {
    let outcome = match catch_unwind(AssertUnwindSafe(|| rule.evaluate(ctx))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let payload_text = panic_payload_to_string(payload.as_ref());
            tracing::warn!(rule_id = %rule.id, panic = %payload_text, "rule panicked; recorded as failed");
            Outcome::fail(format!(
                "{} {}: {}",
                INTERNAL_ERROR_PREFIX, rule.id, payload_text
            ))
        }
    };
    tracing::debug!(rule_id = %rule.id, passed = outcome.passed, info = %outcome.info, "rule evaluated");
    CheckResult {
        rule_id: rule.id.clone(),
        category: rule.category,
        info_string: outcome.info,
        result: outcome.passed,
    }
}

fn panic_payload_to_string(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Process-wide registry built from the shipped catalog on first use.
pub fn default_registry() -> &'static RuleRegistry {
    static REGISTRY: OnceLock<RuleRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        catalog_v1()
            .and_then(|c| c.into_registry())
            .expect("embedded rule catalog v1 must load")
    })
}

pub fn run_manifest_checks(ctx: &ValidationContext) -> Vec<CheckResult> {
    Evaluator::new(default_registry()).run(ctx)
}
