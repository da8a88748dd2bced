use anyhow::Result;
use serde::Serialize;

use archgraph_core::Report;

fn to_json<T: Serialize>(value: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(json)
}

/// Format a report as the stable JSON contract.
pub fn format_report(report: &Report, compact: bool) -> Result<String> {
    to_json(report, compact)
}

/// Wrapper for check output that adds pass/fail metadata.
#[derive(Debug, Serialize)]
pub struct CheckOutput<'a> {
    #[serde(flatten)]
    pub report: &'a Report,
    pub check: CheckStatus,
}

#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub passed: bool,
    pub blocked_count: usize,
}

/// Format a check result as JSON. Returns (json_string, passed).
pub fn format_check(report: &Report, compact: bool) -> Result<(String, bool)> {
    let blocked_count = report.blocked_count();
    let passed = blocked_count == 0;
    let output = CheckOutput {
        report,
        check: CheckStatus {
            passed,
            blocked_count,
        },
    };
    Ok((to_json(&output, compact)?, passed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgraph_core::types::{RuleRef, Severity, Violation};
    use archgraph_core::ScoringModel;

    fn sample_report(with_violations: bool) -> Report {
        let violations = if with_violations {
            vec![
                Violation::layer(
                    "src/user.controller.ts",
                    3,
                    Severity::Blocked,
                    0,
                    RuleRef {
                        from: "controller".to_string(),
                        to: "repository".to_string(),
                    },
                    "./user.repository",
                ),
                Violation::circular(
                    "src/a.ts",
                    2,
                    vec!["src/a.ts".to_string(), "src/b.ts".to_string()],
                ),
            ]
        } else {
            vec![]
        };
        Report::assemble(violations, &ScoringModel::default())
    }

    #[test]
    fn test_format_report_contract_fields() {
        let json = format_report(&sample_report(true), false).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("should be valid JSON");
        assert_eq!(parsed["health_score"]["total"], 91);
        assert_eq!(parsed["health_score"]["grade"], "A");
        assert_eq!(parsed["summary"]["total_violations"], 2);
        assert_eq!(parsed["summary"]["circular_dependencies"], 1);

        let first = &parsed["violations"][0];
        assert_eq!(first["file"], "src/a.ts");
        assert_eq!(first["category"], "circular");
        assert_eq!(first["cycle"][1], "src/b.ts");

        let second = &parsed["violations"][1];
        assert_eq!(second["category"], "blocked");
        assert_eq!(second["rule"]["from"], "controller");
        assert_eq!(second["import"], "./user.repository");
        assert!(second.get("rule_index").is_none());
    }

    #[test]
    fn test_format_report_compact_is_single_line() {
        let json = format_report(&sample_report(false), true).unwrap();
        assert!(!json.contains('\n'), "compact JSON should be single line");
        assert_eq!(
            json,
            r#"{"health_score":{"total":100,"grade":"A"},"violations":[],"summary":{"total_violations":0,"circular_dependencies":0}}"#
        );
    }

    #[test]
    fn test_format_report_pretty_is_multiline() {
        let json = format_report(&sample_report(false), false).unwrap();
        assert!(json.contains('\n'), "pretty JSON should be multiline");
    }

    #[test]
    fn test_format_check_passed() {
        let (json, passed) = format_check(&sample_report(false), false).unwrap();
        assert!(passed);
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("should be valid JSON");
        assert_eq!(parsed["check"]["passed"], true);
        assert_eq!(parsed["check"]["blocked_count"], 0);
    }

    #[test]
    fn test_format_check_failed() {
        let (json, passed) = format_check(&sample_report(true), true).unwrap();
        assert!(!passed);
        assert!(!json.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("should be valid JSON");
        assert_eq!(parsed["check"]["passed"], false);
        assert_eq!(parsed["check"]["blocked_count"], 1);
        // Flattened report fields stay at top level
        assert!(parsed.get("health_score").is_some());
        assert!(parsed.get("violations").is_some());
        assert!(parsed.get("summary").is_some());
    }
}
