pub mod checks;

use crate::error::{CoreError, CoreResult};
use crate::rules::registry::{RegistryBuilder, RuleRegistry};
use crate::rules::{Category, Rule};
use checks::CheckSpec;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CATALOG_VERSION_V1: &str = "pwa_rules_v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleCatalog {
    pub catalog_version: String,
    pub rules: Vec<RuleDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDef {
    pub rule_id: String,
    pub category: Category,
    pub description: String,
    pub check: CheckSpec,
}

impl RuleDef {
    pub fn into_rule(self) -> Rule {
        let spec = self.check;
        Rule::new(self.rule_id, self.category, self.description, move |ctx| {
            spec.evaluate(ctx)
        })
    }
}

impl RuleCatalog {
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let catalog: RuleCatalog = serde_json::from_str(json)?;
        if catalog.catalog_version != CATALOG_VERSION_V1 {
            return Err(CoreError::InvalidInput(format!(
                "rule catalog version {} is not {}",
                catalog.catalog_version, CATALOG_VERSION_V1
            )));
        }
        Ok(catalog)
    }

    pub fn into_registry(self) -> CoreResult<RuleRegistry> {
        let mut builder = RegistryBuilder::new(self.catalog_version);
        for def in self.rules {
            builder.register(def.into_rule())?;
        }
        Ok(builder.build())
    }
}

pub fn catalog_v1() -> CoreResult<RuleCatalog> {
    // Shipped catalog; operators can replace it with `load_catalog`.
    RuleCatalog::from_json_str(include_str!("catalog_v1.json"))
}

pub fn load_catalog(path: &Path) -> CoreResult<RuleCatalog> {
    let json = std::fs::read_to_string(path)?;
    let catalog = RuleCatalog::from_json_str(&json)?;
    tracing::debug!(path = %path.display(), rules = catalog.rules.len(), "loaded rule catalog");
    Ok(catalog)
}
