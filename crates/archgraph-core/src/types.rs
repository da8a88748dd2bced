use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Severity a layer rule is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    #[default]
    #[serde(alias = "error")]
    Blocked,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Blocked => write!(f, "blocked"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blocked" | "error" => Ok(Severity::Blocked),
            "warning" | "warn" => Ok(Severity::Warning),
            _ => Err(anyhow::anyhow!("unknown severity: {s}")),
        }
    }
}

/// Report category of a violation. This is the field CI gating keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Blocked,
    Warning,
    Circular,
    Complexity,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Blocked => "blocked",
            Category::Warning => "warning",
            Category::Circular => "circular",
            Category::Complexity => "complexity",
        }
    }
}

impl From<Severity> for Category {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Blocked => Category::Blocked,
            Severity::Warning => Category::Warning,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `{from, to}` pair of the rule a layer violation cites, as written in config.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleRef {
    pub from: String,
    pub to: String,
}

/// Kind-specific payload of a violation.
///
/// Variant order is the tie-break order between kinds reported on the same line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ViolationKind {
    Layer {
        #[serde(skip)]
        rule_index: usize,
        rule: RuleRef,
        import: String,
        #[serde(skip)]
        reason: Option<String>,
    },
    Circular {
        cycle: Vec<String>,
    },
    Complexity {
        function: String,
        length: usize,
    },
}

/// A single finding in the report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    pub file: String,
    pub line: usize,
    pub category: Category,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl Violation {
    pub fn layer(
        file: &str,
        line: usize,
        severity: Severity,
        rule_index: usize,
        rule: RuleRef,
        import: &str,
    ) -> Self {
        Self {
            file: file.to_string(),
            line,
            category: severity.into(),
            kind: ViolationKind::Layer {
                rule_index,
                rule,
                import: import.to_string(),
                reason: None,
            },
        }
    }

    /// Attach the rule's explanation to a layer violation. Not part of the JSON contract.
    pub fn with_reason(mut self, text: Option<&str>) -> Self {
        if let ViolationKind::Layer { reason, .. } = &mut self.kind {
            *reason = text.map(str::to_string);
        }
        self
    }

    pub fn circular(file: &str, line: usize, cycle: Vec<String>) -> Self {
        Self {
            file: file.to_string(),
            line,
            category: Category::Circular,
            kind: ViolationKind::Circular { cycle },
        }
    }

    pub fn complexity(file: &str, line: usize, function: &str, length: usize) -> Self {
        Self {
            file: file.to_string(),
            line,
            category: Category::Complexity,
            kind: ViolationKind::Complexity {
                function: function.to_string(),
                length,
            },
        }
    }
}

/// Report order: file, then line, then kind (layer rules by index), then payload.
impl Ord for Violation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.file
            .cmp(&other.file)
            .then(self.line.cmp(&other.line))
            .then_with(|| self.kind.cmp(&other.kind))
            .then(self.category.cmp(&other.category))
    }
}

impl PartialOrd for Violation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Letter grade derived from the health score total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
