use serde::{Deserialize, Serialize};

use crate::config::{GradeBands, ScoreWeights, ScoringConfig};
use crate::error::ConfigError;
use crate::types::{Category, Grade, Violation};

/// The 0-100 health score and its letter grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScore {
    pub total: u8,
    pub grade: Grade,
}

/// Validated weights and grade bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringModel {
    weights: ScoreWeights,
    grades: GradeBands,
}

impl ScoringModel {
    pub fn new(config: &ScoringConfig) -> Result<Self, ConfigError> {
        let w = config.weights;
        if !(w.blocked >= w.circular && w.circular >= w.warning && w.warning >= w.complexity) {
            return Err(ConfigError::NonMonotonicWeights {
                blocked: w.blocked,
                circular: w.circular,
                warning: w.warning,
                complexity: w.complexity,
            });
        }
        let g = config.grades;
        if !(g.a <= 100 && g.a > g.b && g.b > g.c && g.c > g.d) {
            return Err(ConfigError::InvalidGradeBands {
                a: g.a,
                b: g.b,
                c: g.c,
                d: g.d,
            });
        }
        Ok(Self {
            weights: w,
            grades: g,
        })
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    pub fn weight(&self, category: Category) -> u32 {
        match category {
            Category::Blocked => self.weights.blocked,
            Category::Circular => self.weights.circular,
            Category::Warning => self.weights.warning,
            Category::Complexity => self.weights.complexity,
        }
    }

    /// Total penalty for a violation list, saturating instead of overflowing.
    pub fn penalty(&self, violations: &[Violation]) -> u64 {
        violations
            .iter()
            .map(|v| u64::from(self.weight(v.category)))
            .fold(0u64, u64::saturating_add)
    }

    pub fn grade_for(&self, total: u8) -> Grade {
        let g = &self.grades;
        if total >= g.a {
            Grade::A
        } else if total >= g.b {
            Grade::B
        } else if total >= g.c {
            Grade::C
        } else if total >= g.d {
            Grade::D
        } else {
            Grade::F
        }
    }

    /// 100 minus the weighted penalty, clamped to 0..=100.
    pub fn calculate(&self, violations: &[Violation]) -> HealthScore {
        let total = 100u64.saturating_sub(self.penalty(violations));
        let total = u8::try_from(total).unwrap_or(0);
        HealthScore {
            total,
            grade: self.grade_for(total),
        }
    }
}

impl Default for ScoringModel {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            grades: GradeBands::default(),
        }
    }
}
