use crate::eval::runner::CheckResult;
use crate::rules::{Category, ScoreGroup};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    pub passed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupScore {
    pub group: ScoreGroup,
    pub passed: usize,
    pub total: usize,
}

fn ratio(passed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64
    }
}

fn percent(passed: usize, total: usize) -> u32 {
    (ratio(passed, total) * 100.0).round() as u32
}

impl CategoryScore {
    pub fn ratio(&self) -> f64 {
        ratio(self.passed, self.total)
    }

    pub fn percent(&self) -> u32 {
        percent(self.passed, self.total)
    }
}

impl GroupScore {
    pub fn ratio(&self) -> f64 {
        ratio(self.passed, self.total)
    }

    pub fn percent(&self) -> u32 {
        percent(self.passed, self.total)
    }
}

/// Groups results by category in order of first appearance.
pub fn category_scores(results: &[CheckResult]) -> Vec<CategoryScore> {
    let mut out: Vec<CategoryScore> = Vec::new();
    for r in results {
        let idx = match out.iter().position(|s| s.category == r.category) {
            Some(i) => i,
            None => {
                out.push(CategoryScore {
                    category: r.category,
                    passed: 0,
                    total: 0,
                });
                out.len() - 1
            }
        };
        out[idx].total += 1;
        if r.result {
            out[idx].passed += 1;
        }
    }
    out
}

/// Score for one category; zero totals when no result carries it.
pub fn score_for(results: &[CheckResult], category: Category) -> CategoryScore {
    let (passed, total) = results
        .iter()
        .filter(|r| r.category == category)
        .fold((0, 0), |(p, t), r| (p + usize::from(r.result), t + 1));
    CategoryScore {
        category,
        passed,
        total,
    }
}

/// Scores for the Manifest / Service Worker / Security rings, always all three.
pub fn group_scores(results: &[CheckResult]) -> Vec<GroupScore> {
    ScoreGroup::ALL
        .iter()
        .map(|&group| {
            let (passed, total) = results
                .iter()
                .filter(|r| r.category.group() == group)
                .fold((0, 0), |(p, t), r| (p + usize::from(r.result), t + 1));
            GroupScore {
                group,
                passed,
                total,
            }
        })
        .collect()
}
