use archgraph_core::Report;

use crate::{category_label, describe};

/// Escape characters that would break a Markdown table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Format a full analysis report as Markdown.
pub fn format_report(report: &Report) -> String {
    let mut out = String::new();

    out.push_str("# archgraph - Architecture Analysis\n\n");

    out.push_str("## Health Score\n\n");
    out.push_str("| Metric | Value |\n");
    out.push_str("|--------|-------|\n");
    out.push_str(&format!(
        "| **Score** | **{}/100** |\n",
        report.health_score.total
    ));
    out.push_str(&format!("| Grade | {} |\n", report.health_score.grade));

    out.push_str("\n### Penalties\n\n");
    out.push_str("| Category | Count | Weight | Penalty |\n");
    out.push_str("|----------|-------|--------|---------|\n");
    for row in report.breakdown() {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            row.category, row.count, row.weight, row.penalty
        ));
    }

    out.push_str(&format!(
        "\n## Summary\n\n- **Violations:** {}\n- **Circular dependencies:** {}\n",
        report.summary.total_violations, report.summary.circular_dependencies,
    ));

    if report.violations.is_empty() {
        out.push_str("\n## Violations\n\nNo violations found.\n");
    } else {
        out.push_str(&format!(
            "\n## Violations ({} found)\n\n",
            report.violations.len()
        ));
        out.push_str("| Category | Location | Details |\n");
        out.push_str("|----------|----------|---------|\n");
        for v in &report.violations {
            out.push_str(&format!(
                "| {} | `{}:{}` | {} |\n",
                category_label(v.category),
                cell(&v.file),
                v.line,
                cell(&describe(v))
            ));
        }
    }

    out.push('\n');
    out
}

/// Format a check result as Markdown. Returns (markdown, passed).
pub fn format_check(report: &Report) -> (String, bool) {
    let blocked = report.blocked_count();
    let passed = blocked == 0;

    let mut out = format_report(report);
    if passed {
        out.push_str("## Result\n\n**CHECK PASSED**\n");
    } else {
        out.push_str(&format!(
            "## Result\n\n**CHECK FAILED**: {blocked} blocked violation(s)\n"
        ));
    }

    (out, passed)
}
