pub mod catalog;
pub mod context;
pub mod determinism;
pub mod eval;
pub mod manifest;
pub mod rules;

pub mod error;

pub use context::{ServiceWorkerInfo, ValidationContext};
pub use eval::{run_manifest_checks, CheckResult, Evaluator, ScanReport};
pub use rules::registry::{RegistryBuilder, RuleRegistry};
pub use rules::{Category, Outcome, Rule};
