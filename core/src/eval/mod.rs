pub mod report;
pub mod runner;
pub mod score;

pub use report::ScanReport;
pub use runner::{default_registry, run_manifest_checks, CheckResult, Evaluator};
pub use score::{category_scores, group_scores, score_for, CategoryScore, GroupScore};
