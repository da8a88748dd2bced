use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::LayerRuleConfig;
use crate::types::Severity;

/// Architecture style whose canned rule set can be enabled with `rules.preset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchitecturePattern {
    Hexagonal,
    Clean,
    Mvc,
    Layered,
}

impl ArchitecturePattern {
    pub const ALL: [ArchitecturePattern; 4] = [
        ArchitecturePattern::Hexagonal,
        ArchitecturePattern::Clean,
        ArchitecturePattern::Mvc,
        ArchitecturePattern::Layered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArchitecturePattern::Hexagonal => "hexagonal",
            ArchitecturePattern::Clean => "clean",
            ArchitecturePattern::Mvc => "mvc",
            ArchitecturePattern::Layered => "layered",
        }
    }

    /// The forbidden imports this style implies, in rule-index order.
    ///
    /// Hexagonal and Clean rules use directory fragments so they work without
    /// any layer configuration; MVC and Layered rules use the default layer tags.
    pub fn rules(&self) -> Vec<LayerRuleConfig> {
        use Severity::{Blocked, Warning};
        match self {
            ArchitecturePattern::Hexagonal => vec![
                LayerRuleConfig::new("/domain/", "/application/", Blocked)
                    .with_reason("The domain must not know about use cases"),
                LayerRuleConfig::new("/domain/", "/infrastructure/", Blocked)
                    .with_reason("The domain must be independent of infrastructure"),
                LayerRuleConfig::new("/application/", "/infrastructure/", Blocked)
                    .with_reason("Use cases depend on ports, not adapters"),
            ],
            ArchitecturePattern::Clean => vec![
                LayerRuleConfig::new("/entities/", "/use-cases/", Blocked)
                    .with_reason("Entities are the innermost circle"),
                LayerRuleConfig::new("/entities/", "/adapters/", Blocked)
                    .with_reason("Entities are the innermost circle"),
                LayerRuleConfig::new("/use-cases/", "/adapters/", Blocked)
                    .with_reason("Use cases must not depend on interface adapters"),
                LayerRuleConfig::new("/use-cases/", "/frameworks/", Blocked)
                    .with_reason("Use cases must not depend on frameworks"),
            ],
            ArchitecturePattern::Mvc => vec![
                LayerRuleConfig::new("model", "controller", Blocked)
                    .with_reason("Models must not depend on controllers"),
                LayerRuleConfig::new("model", "view", Blocked)
                    .with_reason("Models must not depend on views"),
                LayerRuleConfig::new("view", "model", Warning)
                    .with_reason("Views should receive data from controllers"),
            ],
            ArchitecturePattern::Layered => vec![
                LayerRuleConfig::new("controller", "repository", Blocked)
                    .with_reason("Controllers must go through services"),
                LayerRuleConfig::new("repository", "controller", Blocked)
                    .with_reason("Repositories must not call up into controllers"),
                LayerRuleConfig::new("repository", "service", Blocked)
                    .with_reason("Repositories must not call up into services"),
            ],
        }
    }
}

impl fmt::Display for ArchitecturePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArchitecturePattern {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hexagonal" | "ports-and-adapters" => Ok(ArchitecturePattern::Hexagonal),
            "clean" => Ok(ArchitecturePattern::Clean),
            "mvc" => Ok(ArchitecturePattern::Mvc),
            "layered" => Ok(ArchitecturePattern::Layered),
            _ => Err(anyhow::anyhow!(
                "unknown architecture preset '{s}' (expected hexagonal, clean, mvc or layered)"
            )),
        }
    }
}
