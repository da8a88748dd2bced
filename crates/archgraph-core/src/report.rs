use serde::{Deserialize, Serialize};

use crate::config::ScoreWeights;
use crate::score::{HealthScore, ScoringModel};
use crate::types::{Category, Violation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total_violations: usize,
    pub circular_dependencies: usize,
}

/// Result of one analysis run. Serializes to the stable JSON contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub health_score: HealthScore,
    pub violations: Vec<Violation>,
    pub summary: Summary,
    #[serde(skip)]
    weights: ScoreWeights,
}

/// Count and penalty for one violation category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryBreakdown {
    pub category: Category,
    pub count: usize,
    pub weight: u32,
    pub penalty: u64,
}

impl Report {
    /// Sort violations into report order, collapse exact duplicates, count and score.
    pub fn assemble(mut violations: Vec<Violation>, scoring: &ScoringModel) -> Self {
        violations.sort();
        violations.dedup();

        let circular_dependencies = violations
            .iter()
            .filter(|v| v.category == Category::Circular)
            .count();
        let summary = Summary {
            total_violations: violations.len(),
            circular_dependencies,
        };
        let health_score = scoring.calculate(&violations);

        Self {
            health_score,
            violations,
            summary,
            weights: *scoring.weights(),
        }
    }

    /// The report for a project with nothing to analyze.
    pub fn empty() -> Self {
        Self::assemble(Vec::new(), &ScoringModel::default())
    }

    pub fn count(&self, category: Category) -> usize {
        self.violations
            .iter()
            .filter(|v| v.category == category)
            .count()
    }

    pub fn blocked_count(&self) -> usize {
        self.count(Category::Blocked)
    }

    pub fn has_blocked(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.category == Category::Blocked)
    }

    /// Per-category counts and penalties, in severity order.
    pub fn breakdown(&self) -> Vec<CategoryBreakdown> {
        [
            (Category::Blocked, self.weights.blocked),
            (Category::Circular, self.weights.circular),
            (Category::Warning, self.weights.warning),
            (Category::Complexity, self.weights.complexity),
        ]
        .into_iter()
        .map(|(category, weight)| {
            let count = self.count(category);
            CategoryBreakdown {
                category,
                count,
                weight,
                penalty: (count as u64).saturating_mul(u64::from(weight)),
            }
        })
        .collect()
    }
}
