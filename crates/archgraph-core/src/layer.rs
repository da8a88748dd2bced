use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::LayerConfig;
use crate::error::ConfigError;

/// Compile a list of glob patterns into one set. `context` names the config
/// location for error messages.
pub(crate) fn build_globset(patterns: &[String], context: &str) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.clone(),
            context: context.to_string(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| ConfigError::InvalidPattern {
        pattern: patterns.join(", "),
        context: context.to_string(),
        source,
    })
}

struct CompiledLayer {
    name: String,
    patterns: GlobSet,
}

/// Assigns a layer tag to a canonical file path. Layers are tried in
/// configuration order and the first match wins.
pub struct LayerClassifier {
    layers: Vec<CompiledLayer>,
}

impl LayerClassifier {
    pub fn new(config: &[LayerConfig]) -> Result<Self, ConfigError> {
        let layers = config
            .iter()
            .map(|layer| {
                Ok(CompiledLayer {
                    name: layer.name.clone(),
                    patterns: build_globset(&layer.patterns, &format!("layer '{}'", layer.name))?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self { layers })
    }

    /// Classify a file path into a layer tag.
    pub fn classify(&self, path: &str) -> Option<&str> {
        let normalized = path.replace('\\', "/");
        self.layers
            .iter()
            .find(|layer| layer.patterns.is_match(&normalized))
            .map(|layer| layer.name.as_str())
    }
}
