use globset::GlobSet;

use crate::config::Config;
use crate::error::ConfigError;
use crate::layer::{build_globset, LayerClassifier};
use crate::resolver::ModuleResolver;
use crate::rules::{compile_rules, LayerRule};
use crate::score::ScoringModel;

/// Compiled, immutable run configuration shared by every phase.
pub struct AnalysisContext {
    exclude: GlobSet,
    classifier: LayerClassifier,
    resolver: ModuleResolver,
    rules: Vec<LayerRule>,
    max_function_lines: i64,
    scoring: ScoringModel,
}

impl AnalysisContext {
    /// Validate and compile a config. Fails on bad globs, empty rule patterns,
    /// non-monotonic weights and invalid grade bands.
    pub fn compile(config: &Config) -> Result<Self, ConfigError> {
        let rules = compile_rules(&config.rules.effective_rules())?;
        let ctx = Self {
            exclude: build_globset(&config.project.exclude, "project.exclude")?,
            classifier: LayerClassifier::new(&config.layers)?,
            resolver: ModuleResolver::new(&config.resolve),
            rules,
            max_function_lines: config.complexity.max_function_lines,
            scoring: ScoringModel::new(&config.scoring)?,
        };
        tracing::debug!(
            rules = ctx.rules.len(),
            layers = config.layers.len(),
            "analysis context compiled"
        );
        Ok(ctx)
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude.is_match(path)
    }

    pub fn classifier(&self) -> &LayerClassifier {
        &self.classifier
    }

    pub fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    pub fn rules(&self) -> &[LayerRule] {
        &self.rules
    }

    pub fn max_function_lines(&self) -> i64 {
        self.max_function_lines
    }

    pub fn scoring(&self) -> &ScoringModel {
        &self.scoring
    }
}
