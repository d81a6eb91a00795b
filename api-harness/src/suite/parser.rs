//! Normalizes the JSON summary printed by test tools.

use crate::config::LoadSettings;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Percentages per coverage dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub lines: f64,
    pub statements: f64,
    pub functions: f64,
    pub branches: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub requests: u64,
    pub failures: u64,
    pub avg_response_ms: f64,
    pub p95_response_ms: f64,
    pub p99_response_ms: f64,
    pub requests_per_second: f64,
    pub error_rate: f64,
}

/// Counts and extras pulled out of one tool's summary line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedOutput {
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub coverage: Option<CoverageSummary>,
    pub performance: Option<PerformanceMetrics>,
    pub artifacts: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ToolReport {
    #[serde(rename_all = "camelCase")]
    Jest {
        num_passed_tests: u32,
        num_failed_tests: u32,
        #[serde(default)]
        num_pending_tests: u32,
        coverage_summary: Option<Value>,
    },
    Playwright {
        stats: PlaywrightStats,
    },
    Normalized {
        passed: u32,
        failed: u32,
        #[serde(default)]
        skipped: u32,
        coverage: Option<Value>,
    },
}

#[derive(Debug, Deserialize)]
struct PlaywrightStats {
    expected: u32,
    unexpected: u32,
    #[serde(default)]
    skipped: u32,
    #[serde(default)]
    flaky: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadReport {
    requests: u64,
    failures: u64,
    avg_response_ms: f64,
    p95_response_ms: f64,
    p99_response_ms: f64,
    requests_per_second: f64,
}

/// The last non-empty line of `stdout`, parsed as JSON
fn summary_line(stdout: &str) -> Result<Value, String> {
    let line = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| "command produced no output".to_string())?;
    serde_json::from_str(line).map_err(|e| format!("last output line is not JSON: {}", e))
}

fn artifacts(value: &Value) -> Vec<String> {
    value
        .get("artifacts")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Accepts `{"lines": 80.0}` or Jest's `{"lines": {"pct": 80.0}}` (optionally under `total`)
fn coverage(value: &Value) -> Option<CoverageSummary> {
    let value = value.get("total").unwrap_or(value);
    let pct = |key: &str| -> Option<f64> {
        let entry = value.get(key)?;
        entry
            .as_f64()
            .or_else(|| entry.get("pct").and_then(Value::as_f64))
    };
    Some(CoverageSummary {
        lines: pct("lines")?,
        statements: pct("statements")?,
        functions: pct("functions")?,
        branches: pct("branches")?,
    })
}

/// Parse a test tool's summary (Jest, Playwright or normalized counts)
pub fn parse_test_output(stdout: &str) -> Result<ParsedOutput, String> {
    let value = summary_line(stdout)?;
    let artifacts = artifacts(&value);
    let report: ToolReport = serde_json::from_value(value)
        .map_err(|_| "unrecognized test summary format".to_string())?;

    let parsed = match report {
        ToolReport::Jest {
            num_passed_tests,
            num_failed_tests,
            num_pending_tests,
            coverage_summary,
        } => ParsedOutput {
            passed: num_passed_tests,
            failed: num_failed_tests,
            skipped: num_pending_tests,
            coverage: coverage_summary.as_ref().and_then(coverage),
            ..Default::default()
        },
        ToolReport::Playwright { stats } => ParsedOutput {
            passed: stats.expected.saturating_add(stats.flaky),
            failed: stats.unexpected,
            skipped: stats.skipped,
            ..Default::default()
        },
        ToolReport::Normalized {
            passed,
            failed,
            skipped,
            coverage: summary,
        } => ParsedOutput {
            passed,
            failed,
            skipped,
            coverage: summary.as_ref().and_then(coverage),
            ..Default::default()
        },
    };

    Ok(ParsedOutput { artifacts, ..parsed })
}

/// Parse a load report and turn it into one check per threshold
pub fn parse_load_output(stdout: &str, thresholds: &LoadSettings) -> Result<ParsedOutput, String> {
    let value = summary_line(stdout)?;
    let artifacts = artifacts(&value);
    let report: LoadReport =
        serde_json::from_value(value).map_err(|e| format!("invalid load report: {}", e))?;

    let error_rate = if report.requests == 0 {
        0.0
    } else {
        report.failures as f64 / report.requests as f64
    };

    let checks = [
        report.p95_response_ms <= thresholds.max_p95_ms,
        error_rate <= thresholds.max_error_rate,
    ];
    let passed = checks.iter().filter(|met| **met).count() as u32;

    Ok(ParsedOutput {
        passed,
        failed: checks.len() as u32 - passed,
        skipped: 0,
        coverage: None,
        performance: Some(PerformanceMetrics {
            requests: report.requests,
            failures: report.failures,
            avg_response_ms: report.avg_response_ms,
            p95_response_ms: report.p95_response_ms,
            p99_response_ms: report.p99_response_ms,
            requests_per_second: report.requests_per_second,
            error_rate,
        }),
        artifacts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jest_summary_with_coverage() {
        let stdout = concat!(
            "PASS tests/unit/math.test.ts\n",
            r#"{"numPassedTests":12,"numFailedTests":1,"numPendingTests":2,"coverageSummary":{"total":{"lines":{"pct":81.5},"statements":{"pct":80},"functions":{"pct":75},"branches":{"pct":60}}}}"#,
            "\n\n"
        );
        let parsed = parse_test_output(stdout).unwrap();
        assert_eq!((parsed.passed, parsed.failed, parsed.skipped), (12, 1, 2));
        assert_eq!(parsed.coverage.unwrap().lines, 81.5);
    }

    #[test]
    fn test_playwright_and_normalized_shapes() {
        let parsed =
            parse_test_output(r#"{"stats":{"expected":8,"unexpected":2,"skipped":1,"flaky":1}}"#)
                .unwrap();
        assert_eq!((parsed.passed, parsed.failed, parsed.skipped), (9, 2, 1));

        let parsed =
            parse_test_output(r#"{"passed":4,"failed":0,"artifacts":["reports/a11y.html"]}"#)
                .unwrap();
        assert_eq!((parsed.passed, parsed.failed, parsed.skipped), (4, 0, 0));
        assert_eq!(parsed.artifacts, vec!["reports/a11y.html".to_string()]);
    }

    #[test]
    fn test_unparseable_output_is_an_error() {
        assert!(parse_test_output("").is_err());
        assert!(parse_test_output("Tests: 3 passed").is_err());
        assert!(parse_test_output(r#"{"status":"ok"}"#).is_err());
    }

    #[test]
    fn test_load_thresholds_become_checks() {
        let thresholds = LoadSettings::default();
        let stdout = r#"{"requests":1000,"failures":50,"avgResponseMs":120.0,"p95ResponseMs":450.0,"p99ResponseMs":900.0,"requestsPerSecond":16.6}"#;

        let parsed = parse_load_output(stdout, &thresholds).unwrap();
        assert_eq!((parsed.passed, parsed.failed), (1, 1));
        let metrics = parsed.performance.unwrap();
        assert_eq!(metrics.error_rate, 0.05);
        assert_eq!(metrics.p95_response_ms, 450.0);
    }
}
