use crate::error::{CoreError, CoreResult};
use crate::rules::{Category, Rule};
use std::collections::BTreeMap;

/// Ordered rule catalog. Immutable once built.
#[derive(Debug)]
pub struct RuleRegistry {
    catalog_version: String,
    rules: Vec<Rule>,
    index: BTreeMap<String, usize>,
}

impl RuleRegistry {
    pub fn builder(catalog_version: impl Into<String>) -> RegistryBuilder {
        RegistryBuilder::new(catalog_version)
    }

    pub fn catalog_version(&self) -> &str {
        &self.catalog_version
    }

    /// Rules in registration order.
    pub fn all(&self) -> &[Rule] {
        &self.rules
    }

    pub fn by_category(&self, category: Category) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|r| r.category == category)
            .collect()
    }

    pub fn get(&self, rule_id: &str) -> Option<&Rule> {
        self.index.get(rule_id).map(|&i| &self.rules[i])
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Categories in order of first appearance.
    pub fn categories(&self) -> Vec<Category> {
        let mut out: Vec<Category> = Vec::new();
        for r in &self.rules {
            if !out.contains(&r.category) {
                out.push(r.category);
            }
        }
        out
    }
}

#[derive(Debug)]
pub struct RegistryBuilder {
    catalog_version: String,
    rules: Vec<Rule>,
    index: BTreeMap<String, usize>,
}

impl RegistryBuilder {
    pub fn new(catalog_version: impl Into<String>) -> Self {
        Self {
            catalog_version: catalog_version.into(),
            rules: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, rule: Rule) -> CoreResult<&mut Self> {
        if rule.id.trim().is_empty() {
            return Err(CoreError::InvalidInput("rule id must not be empty".to_string()));
        }
        if self.index.contains_key(&rule.id) {
            return Err(CoreError::DuplicateRuleId(rule.id));
        }
        self.index.insert(rule.id.clone(), self.rules.len());
        self.rules.push(rule);
        Ok(self)
    }

    pub fn build(self) -> RuleRegistry {
        RuleRegistry {
            catalog_version: self.catalog_version,
            rules: self.rules,
            index: self.index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Outcome;

    fn rule(id: &str, category: Category) -> Rule {
        Rule::new(id, category, "test rule", |_| Outcome::pass("ok"))
    }

    #[test]
    fn keeps_insertion_order_within_and_across_categories() {
        let mut b = RegistryBuilder::new("test");
        b.register(rule("b", Category::Required))
            .unwrap()
            .register(rule("sw", Category::ServiceWorker))
            .unwrap()
            .register(rule("a", Category::Required))
            .unwrap();
        let reg = b.build();
        let ids: Vec<&str> = reg.all().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "sw", "a"]);
        let req: Vec<&str> = reg
            .by_category(Category::Required)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(req, vec!["b", "a"]);
        assert_eq!(
            reg.categories(),
            vec![Category::Required, Category::ServiceWorker]
        );
        assert!(reg.by_category(Category::Security).is_empty());
        assert_eq!(reg.get("sw").unwrap().category, Category::ServiceWorker);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut b = RegistryBuilder::new("test");
        b.register(rule("x", Category::Required)).unwrap();
        let err = b.register(rule("x", Category::Security)).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateRuleId(ref id) if id == "x"));
        assert_eq!(b.build().len(), 1);
    }
}
