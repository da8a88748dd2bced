pub mod json;
pub mod markdown;
pub mod text;

use archgraph_core::types::{Category, Violation, ViolationKind};

/// One-line description of what a violation is about, shared by the text and
/// Markdown renderers.
pub(crate) fn describe(v: &Violation) -> String {
    match &v.kind {
        ViolationKind::Layer {
            rule,
            import,
            reason,
            ..
        } => {
            let mut line = format!("{} -> {} via '{}'", rule.from, rule.to, import);
            if let Some(reason) = reason {
                line.push_str(&format!(" ({reason})"));
            }
            line
        }
        ViolationKind::Circular { cycle } => {
            let mut members = cycle.clone();
            if let Some(first) = cycle.first() {
                members.push(first.clone());
            }
            format!("cycle {}", members.join(" -> "))
        }
        ViolationKind::Complexity { function, length } => {
            format!("function '{function}' is {length} lines long")
        }
    }
}

pub(crate) fn category_label(category: Category) -> &'static str {
    match category {
        Category::Blocked => "BLOCKED",
        Category::Warning => "WARN",
        Category::Circular => "CYCLE",
        Category::Complexity => "COMPLEXITY",
    }
}
