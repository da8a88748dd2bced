use globset::GlobSet;
use rayon::prelude::*;

use crate::config::LayerRuleConfig;
use crate::error::ConfigError;
use crate::graph::{DependencyGraph, FileNode};
use crate::layer::build_globset;
use crate::types::{RuleRef, Severity, Violation};

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// One side of a layer rule.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// `"*"`: matches every file.
    Any,
    /// A layer tag such as `"controller"`.
    Layer(String),
    /// A path glob or directory fragment.
    Glob { source: String, set: GlobSet },
}

impl Pattern {
    /// Parse a rule pattern. `context` names the rule side for error messages.
    pub fn parse(raw: &str, context: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if raw == "*" {
            return Ok(Pattern::Any);
        }
        if raw.contains(GLOB_META) {
            // A leading `/` floats the glob: `/domain/**` matches at any depth.
            let glob = match raw.strip_prefix('/') {
                Some(rest) => format!("**/{rest}"),
                None => raw.to_string(),
            };
            return Ok(Pattern::Glob {
                source: raw.to_string(),
                set: build_globset(&[glob], context)?,
            });
        }
        if raw.contains('/') {
            return Ok(Pattern::Glob {
                source: raw.to_string(),
                set: build_globset(&directory_fragment_globs(raw), context)?,
            });
        }
        Ok(Pattern::Layer(raw.to_string()))
    }

    pub fn matches(&self, node: &FileNode) -> bool {
        match self {
            Pattern::Any => true,
            Pattern::Layer(tag) => node.layer.as_deref() == Some(tag.as_str()),
            Pattern::Glob { set, .. } => set.is_match(&node.path),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Any => "*",
            Pattern::Layer(tag) => tag,
            Pattern::Glob { source, .. } => source,
        }
    }
}

/// `/domain/` matches anything under a `domain` directory at any depth;
/// `src/domain` matches that path and everything below it.
fn directory_fragment_globs(raw: &str) -> Vec<String> {
    let floating = raw.starts_with('/');
    let has_trailing_slash = raw.ends_with('/');
    let fragment = raw.trim_matches('/');
    let prefix = if floating { "**/" } else { "" };

    let mut globs = vec![format!("{prefix}{fragment}/**")];
    if !has_trailing_slash {
        globs.push(format!("{prefix}{fragment}"));
    }
    globs
}

/// A compiled layer rule ready for evaluation.
#[derive(Debug, Clone)]
pub struct LayerRule {
    pub from: Pattern,
    pub to: Pattern,
    pub severity: Severity,
    pub reason: Option<String>,
}

impl LayerRule {
    pub fn rule_ref(&self) -> RuleRef {
        RuleRef {
            from: self.from.as_str().to_string(),
            to: self.to.as_str().to_string(),
        }
    }
}

/// Compile rule configs in order; a rule's position is its rule index.
pub fn compile_rules(configs: &[LayerRuleConfig]) -> Result<Vec<LayerRule>, ConfigError> {
    configs
        .iter()
        .enumerate()
        .map(|(index, cfg)| {
            if cfg.from.trim().is_empty() {
                return Err(ConfigError::EmptyRulePattern { index, field: "from" });
            }
            if cfg.to.trim().is_empty() {
                return Err(ConfigError::EmptyRulePattern { index, field: "to" });
            }
            Ok(LayerRule {
                from: Pattern::parse(&cfg.from, &format!("rule {index} 'from'"))?,
                to: Pattern::parse(&cfg.to, &format!("rule {index} 'to'"))?,
                severity: cfg.severity,
                reason: cfg.reason.clone(),
            })
        })
        .collect()
}

/// Evaluate every rule against every import edge. All matching rules are
/// reported; parallel edges are evaluated independently.
pub fn evaluate_rules(graph: &DependencyGraph, rules: &[LayerRule]) -> Vec<Violation> {
    if rules.is_empty() {
        return Vec::new();
    }
    let refs: Vec<RuleRef> = rules.iter().map(LayerRule::rule_ref).collect();

    let violations: Vec<Violation> = graph
        .edges_with_nodes()
        .par_iter()
        .flat_map_iter(|(src, tgt, edge)| {
            rules
                .iter()
                .enumerate()
                .filter(|(_, rule)| rule.from.matches(src) && rule.to.matches(tgt))
                .map(|(index, rule)| {
                    Violation::layer(
                        &src.path,
                        edge.line,
                        rule.severity,
                        index,
                        refs[index].clone(),
                        &edge.specifier,
                    )
                    .with_reason(rule.reason.as_deref())
                })
                .collect::<Vec<_>>()
        })
        .collect();

    tracing::debug!(count = violations.len(), "layer rules evaluated");
    violations
}
