use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::preset::ArchitecturePattern;
use crate::types::Severity;

/// Name of the config file looked up from the project directory upwards.
pub const CONFIG_FILE_NAME: &str = ".archgraph.toml";

/// Top-level configuration from `.archgraph.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default = "default_layers")]
    pub layers: Vec<LayerConfig>,
    #[serde(default)]
    pub resolve: ResolveConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub complexity: ComplexityConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: ProjectConfig::default(),
            layers: default_layers(),
            resolve: ResolveConfig::default(),
            rules: RulesConfig::default(),
            complexity: ComplexityConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Files matching these globs are left out of the graph entirely.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

fn default_exclude() -> Vec<String> {
    vec![
        "**/node_modules/**".to_string(),
        "**/dist/**".to_string(),
        "**/target/**".to_string(),
        "**/vendor/**".to_string(),
    ]
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
        }
    }
}

/// A layer tag and the path globs that assign it. First matching layer wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub name: String,
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl LayerConfig {
    fn new(name: &str, patterns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }
}

fn default_layers() -> Vec<LayerConfig> {
    vec![
        LayerConfig::new(
            "controller",
            &[
                "**/controllers/**",
                "**/controller/**",
                "**/*.controller.*",
                "**/*Controller.*",
                "**/*_controller.*",
            ],
        ),
        LayerConfig::new(
            "service",
            &[
                "**/services/**",
                "**/service/**",
                "**/*.service.*",
                "**/*Service.*",
                "**/*_service.*",
            ],
        ),
        LayerConfig::new(
            "repository",
            &[
                "**/repositories/**",
                "**/repository/**",
                "**/*.repository.*",
                "**/*.repo.*",
                "**/*Repository.*",
                "**/*_repository.*",
            ],
        ),
        LayerConfig::new("model", &["**/models/**", "**/model/**", "**/*.model.*"]),
        LayerConfig::new(
            "view",
            &["**/views/**", "**/view/**", "**/templates/**", "**/*.view.*"],
        ),
        LayerConfig::new(
            "domain",
            &["**/domain/**", "**/entities/**", "**/entity/**", "**/*.entity.*"],
        ),
        LayerConfig::new(
            "application",
            &[
                "**/application/**",
                "**/use-cases/**",
                "**/usecases/**",
                "**/use_cases/**",
                "**/*.usecase.*",
            ],
        ),
        LayerConfig::new(
            "infrastructure",
            &[
                "**/infrastructure/**",
                "**/infra/**",
                "**/adapters/**",
                "**/adapter/**",
                "**/*.adapter.*",
            ],
        ),
    ]
}

/// Module-resolution settings for turning import specifiers into file paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Directory that bare JS/TS specifiers are tried against (tsconfig `baseUrl`).
    #[serde(default)]
    pub base_url: Option<String>,
    /// tsconfig-style path aliases: `"@/*" = ["src/*"]`.
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
    /// Roots for dotted Python/Java/Kotlin module names.
    #[serde(default = "default_package_roots")]
    pub package_roots: Vec<String>,
}

fn default_package_roots() -> Vec<String> {
    vec![
        String::new(),
        "src".to_string(),
        "src/main/java".to_string(),
        "src/main/kotlin".to_string(),
    ]
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            aliases: BTreeMap::new(),
            package_roots: default_package_roots(),
        }
    }
}

/// A forbidden import declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRuleConfig {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl LayerRuleConfig {
    pub fn new(from: &str, to: &str, severity: Severity) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            severity,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: &str) -> Self {
        self.reason = Some(reason.to_string());
        self
    }
}

/// Rule configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Canned rule set for a common architecture style. Its rules come first.
    #[serde(default)]
    pub preset: Option<ArchitecturePattern>,
    #[serde(default)]
    pub forbidden: Vec<LayerRuleConfig>,
}

impl RulesConfig {
    /// Preset rules followed by explicitly configured ones; the position in this
    /// list is the rule index used for ordering.
    pub fn effective_rules(&self) -> Vec<LayerRuleConfig> {
        let mut rules = self.preset.map(|p| p.rules()).unwrap_or_default();
        rules.extend(self.forbidden.iter().cloned());
        rules
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityConfig {
    /// Functions longer than this are reported. Zero or negative disables the check.
    #[serde(default = "default_max_function_lines")]
    pub max_function_lines: i64,
}

fn default_max_function_lines() -> i64 {
    200
}

impl Default for ComplexityConfig {
    fn default() -> Self {
        Self {
            max_function_lines: default_max_function_lines(),
        }
    }
}

/// Points subtracted from 100 per violation of each category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "default_blocked_weight")]
    pub blocked: u32,
    #[serde(default = "default_circular_weight")]
    pub circular: u32,
    #[serde(default = "default_warning_weight")]
    pub warning: u32,
    #[serde(default = "default_complexity_weight")]
    pub complexity: u32,
}

fn default_blocked_weight() -> u32 {
    5
}
fn default_circular_weight() -> u32 {
    4
}
fn default_warning_weight() -> u32 {
    2
}
fn default_complexity_weight() -> u32 {
    1
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            blocked: default_blocked_weight(),
            circular: default_circular_weight(),
            warning: default_warning_weight(),
            complexity: default_complexity_weight(),
        }
    }
}

/// Lower bounds of the A..D grade bands; anything below `d` is F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeBands {
    #[serde(default = "default_grade_a")]
    pub a: u8,
    #[serde(default = "default_grade_b")]
    pub b: u8,
    #[serde(default = "default_grade_c")]
    pub c: u8,
    #[serde(default = "default_grade_d")]
    pub d: u8,
}

fn default_grade_a() -> u8 {
    90
}
fn default_grade_b() -> u8 {
    75
}
fn default_grade_c() -> u8 {
    60
}
fn default_grade_d() -> u8 {
    40
}

impl Default for GradeBands {
    fn default() -> Self {
        Self {
            a: default_grade_a(),
            b: default_grade_b(),
            c: default_grade_c(),
            d: default_grade_d(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: ScoreWeights,
    #[serde(default)]
    pub grades: GradeBands,
}

impl Config {
    /// Load configuration from a `.archgraph.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "failed to parse '{}'. Run `archgraph init` to create a valid config file",
                path.display()
            )
        })?;
        Ok(config)
    }

    /// Load from `.archgraph.toml` in the given directory or any ancestor, or return defaults.
    pub fn load_or_default(dir: &Path) -> Self {
        let start = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        let mut current = start.as_path();
        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!(
                            "failed to load config from '{}': {e:#}. Using defaults.",
                            config_path.display()
                        );
                        Self::default()
                    }
                };
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Self::default()
    }

    /// Generate default TOML content for `archgraph init`.
    pub fn default_toml() -> String {
        r#"# archgraph - Architecture Graph Configuration

[project]
# Files matching these globs are not part of the dependency graph
exclude = ["**/node_modules/**", "**/dist/**", "**/target/**", "**/vendor/**"]

# Layer tags are derived from file paths. First matching layer wins.
# Omit every [[layers]] table to use the built-in defaults
# (controller, service, repository, model, view, domain, application, infrastructure).
# [[layers]]
# name = "controller"
# patterns = ["**/controllers/**", "**/*.controller.*"]

[resolve]
# base_url = "src"
package_roots = ["", "src", "src/main/java", "src/main/kotlin"]

[resolve.aliases]
# "@/*" = ["src/*"]

[rules]
# Canned rules: "hexagonal", "clean", "mvc" or "layered"
# preset = "layered"

# Patterns are a layer tag ("controller"), a path glob ("src/legacy/**",
# "/domain/") or "*". Severity is "blocked" or "warning".
# [[rules.forbidden]]
# from = "controller"
# to = "repository"
# severity = "blocked"
# reason = "Controllers must go through services"

[complexity]
# Zero disables the long-function check
max_function_lines = 200

[scoring.weights]
blocked = 5
circular = 4
warning = 2
complexity = 1

[scoring.grades]
a = 90
b = 75
c = 60
d = 40
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.rules.forbidden.is_empty());
        assert!(config.rules.preset.is_none());
        assert_eq!(config.complexity.max_function_lines, 200);
        assert_eq!(config.scoring.weights.blocked, 5);
        assert_eq!(config.scoring.grades.a, 90);
        assert!(config.layers.iter().any(|l| l.name == "controller"));
        assert!(config.layers.iter().any(|l| l.name == "infrastructure"));
    }

    #[test]
    fn test_deserialize_config() {
        let toml_str = r#"
[[layers]]
name = "core"
patterns = ["**/core/**"]

[[layers]]
name = "web"
patterns = ["**/web/**"]

[resolve]
base_url = "src"

[resolve.aliases]
"@/*" = ["src/*"]

[[rules.forbidden]]
from = "core"
to = "web"

[[rules.forbidden]]
from = "web"
to = "src/db/**"
severity = "warning"
reason = "go through the repository"

[complexity]
max_function_lines = 80

[scoring.weights]
blocked = 10
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.layers.len(), 2);
        assert_eq!(config.layers[0].name, "core");
        assert_eq!(config.resolve.base_url.as_deref(), Some("src"));
        assert_eq!(config.resolve.aliases["@/*"], vec!["src/*"]);
        assert_eq!(config.rules.forbidden.len(), 2);
        assert_eq!(config.rules.forbidden[0].severity, Severity::Blocked);
        assert_eq!(config.rules.forbidden[1].severity, Severity::Warning);
        assert_eq!(
            config.rules.forbidden[1].reason.as_deref(),
            Some("go through the repository")
        );
        assert_eq!(config.complexity.max_function_lines, 80);
        assert_eq!(config.scoring.weights.blocked, 10);
        // Omitted weights keep their defaults
        assert_eq!(config.scoring.weights.circular, 4);
    }

    #[test]
    fn test_error_severity_alias() {
        let toml_str = r#"
[[rules.forbidden]]
from = "a"
to = "b"
severity = "error"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.rules.forbidden[0].severity, Severity::Blocked);
    }

    #[test]
    fn test_missing_layers_use_defaults() {
        let config: Config = toml::from_str("[complexity]\nmax_function_lines = 0\n").unwrap();
        assert_eq!(config.layers, default_layers());
        assert_eq!(config.complexity.max_function_lines, 0);
    }

    #[test]
    fn test_default_toml_is_valid() {
        let config: Config = toml::from_str(&Config::default_toml()).unwrap();
        assert!(config.rules.forbidden.is_empty());
        assert_eq!(config.scoring.weights, ScoreWeights::default());
        assert_eq!(config.scoring.grades, GradeBands::default());
        assert_eq!(config.layers, default_layers());
    }

    #[test]
    fn test_effective_rules_preset_first() {
        let config: Config = toml::from_str(
            r#"
[rules]
preset = "layered"

[[rules.forbidden]]
from = "service"
to = "controller"
"#,
        )
        .unwrap();
        let rules = config.rules.effective_rules();
        let preset_len = ArchitecturePattern::Layered.rules().len();
        assert_eq!(rules.len(), preset_len + 1);
        assert_eq!(rules[preset_len].from, "service");
    }

    #[test]
    fn test_load_or_default_walks_up() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[complexity]\nmax_function_lines = 42\n",
        )
        .unwrap();

        let config = Config::load_or_default(&nested);
        assert_eq!(config.complexity.max_function_lines, 42);
    }

    #[test]
    fn test_load_reports_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[complexity\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("archgraph init"));
    }
}
