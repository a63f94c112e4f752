pub mod registry;

use crate::context::ValidationContext;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Required,
    Recommended,
    Enhancement,
    #[serde(alias = "serviceWorker")]
    ServiceWorker,
    Security,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Required,
        Category::Recommended,
        Category::Enhancement,
        Category::ServiceWorker,
        Category::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Required => "required",
            Category::Recommended => "recommended",
            Category::Enhancement => "enhancement",
            Category::ServiceWorker => "service_worker",
            Category::Security => "security",
        }
    }

    pub fn group(&self) -> ScoreGroup {
        match self {
            Category::Required | Category::Recommended | Category::Enhancement => {
                ScoreGroup::Manifest
            }
            Category::ServiceWorker => ScoreGroup::ServiceWorker,
            Category::Security => ScoreGroup::Security,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buckets the presentation layer draws completion rings for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreGroup {
    Manifest,
    ServiceWorker,
    Security,
}

impl ScoreGroup {
    pub const ALL: [ScoreGroup; 3] = [
        ScoreGroup::Manifest,
        ScoreGroup::ServiceWorker,
        ScoreGroup::Security,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ScoreGroup::Manifest => "Manifest",
            ScoreGroup::ServiceWorker => "Service Worker",
            ScoreGroup::Security => "Security",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub passed: bool,
    pub info: String,
}

impl Outcome {
    pub fn pass(info: impl Into<String>) -> Self {
        Self {
            passed: true,
            info: info.into(),
        }
    }

    pub fn fail(info: impl Into<String>) -> Self {
        Self {
            passed: false,
            info: info.into(),
        }
    }
}

pub type CheckFn = dyn Fn(&ValidationContext) -> Outcome + Send + Sync;

/// A named, pure check over a [`ValidationContext`].
pub struct Rule {
    pub id: String,
    pub category: Category,
    pub description: String,
    check: Box<CheckFn>,
}

impl Rule {
    pub fn new<F>(
        id: impl Into<String>,
        category: Category,
        description: impl Into<String>,
        check: F,
    ) -> Self
    where
        F: Fn(&ValidationContext) -> Outcome + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            category,
            description: description.into(),
            check: Box::new(check),
        }
    }

    pub fn evaluate(&self, ctx: &ValidationContext) -> Outcome {
        (self.check)(ctx)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_accepts_camel_case_service_worker() {
        let c: Category = serde_json::from_str("\"serviceWorker\"").unwrap();
        assert_eq!(c, Category::ServiceWorker);
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"service_worker\"");
    }

    #[test]
    fn manifest_categories_share_one_group() {
        assert_eq!(Category::Required.group(), ScoreGroup::Manifest);
        assert_eq!(Category::Enhancement.group(), ScoreGroup::Manifest);
        assert_eq!(Category::Security.group(), ScoreGroup::Security);
    }
}
