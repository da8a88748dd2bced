use crate::graph::DependencyGraph;
use crate::types::Violation;

/// Flag every function longer than `threshold` lines, at its start line.
/// A threshold of zero or less disables the check.
pub fn analyze_complexity(graph: &DependencyGraph, threshold: i64) -> Vec<Violation> {
    if threshold <= 0 {
        return Vec::new();
    }
    let violations: Vec<Violation> = graph
        .nodes()
        .flat_map(|(_, node)| {
            node.functions
                .iter()
                .filter(move |f| i64::try_from(f.line_count).map_or(true, |n| n > threshold))
                .map(move |f| Violation::complexity(&node.path, f.start_line, &f.name, f.line_count))
        })
        .collect();

    tracing::debug!(count = violations.len(), threshold, "complexity analyzed");
    violations
}
