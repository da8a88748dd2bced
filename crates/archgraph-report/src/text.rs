use colored::Colorize;

use archgraph_core::types::{Category, Grade};
use archgraph_core::Report;

use crate::{category_label, describe};

/// Format a full analysis report for terminal output.
pub fn format_report(report: &Report) -> String {
    let mut out = String::new();

    // Header
    out.push_str(&format!("\n{}\n", "archgraph - Architecture Analysis".bold()));
    out.push_str(&format!("{}\n\n", "=".repeat(40)));

    out.push_str(&format_score_section(report));

    out.push_str(&format!(
        "\n{}: {} violations, {} circular dependencies\n",
        "Summary".bold(),
        report.summary.total_violations,
        report.summary.circular_dependencies,
    ));

    if report.violations.is_empty() {
        out.push_str(&format!("\n{}\n", "No violations found!".green().bold()));
    } else {
        out.push_str(&format!(
            "\n{} ({} found)\n{}\n",
            "Violations".red().bold(),
            report.violations.len(),
            "-".repeat(40),
        ));

        for v in &report.violations {
            let label = category_label(v.category);
            let label = match v.category {
                Category::Blocked => label.red().bold(),
                Category::Warning => label.yellow().bold(),
                Category::Circular => label.magenta().bold(),
                Category::Complexity => label.blue().bold(),
            };
            out.push_str(&format!(
                "\n  {} {}:{}\n    {}\n",
                label,
                v.file,
                v.line,
                describe(v)
            ));
        }
    }

    out.push('\n');
    out
}

fn format_score_section(report: &Report) -> String {
    let mut out = String::new();
    let score = &report.health_score;

    let total_str = format!("{}/100 ({})", score.total, score.grade);
    let total_color = match score.grade {
        Grade::A | Grade::B => total_str.green(),
        Grade::C | Grade::D => total_str.yellow(),
        Grade::F => total_str.red(),
    };
    out.push_str(&format!("{}: {}\n", "Health Score".bold(), total_color));

    for row in report.breakdown().iter().filter(|r| r.count > 0) {
        out.push_str(&format!(
            "  {:<12} {:>4} x {:<2} = -{}\n",
            row.category.as_str(),
            row.count,
            row.weight,
            row.penalty
        ));
    }

    out
}

/// Format a check result for CI use. Returns (text, passed).
pub fn format_check(report: &Report) -> (String, bool) {
    let blocked = report.blocked_count();
    let passed = blocked == 0;

    let mut out = format_report(report);
    if passed {
        out.push_str(&format!("{}\n", "CHECK PASSED".green().bold()));
    } else {
        out.push_str(&format!(
            "{}: {} blocked violation(s)\n",
            "CHECK FAILED".red().bold(),
            blocked,
        ));
    }

    (out, passed)
}
