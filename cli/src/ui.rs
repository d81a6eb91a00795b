use api_harness::health::ServiceHealthReport;
use api_harness::suite::{SuiteResult, SuiteSummary};
use colored::Colorize;
use comfy_table::{
    Attribute, Cell, Color, ContentArrangement, Table, modifiers::UTF8_ROUND_CORNERS,
    presets::UTF8_FULL,
};

/// Print a success message
pub fn success_message(message: &str) {
    println!("{} {}", "✅".green(), message.green());
}

/// Print a warning message
pub fn warning_message(message: &str) {
    println!("{} {}", "⚠️ ".yellow(), message.yellow());
}

/// Print an error message
pub fn error_message(message: &str) {
    eprintln!("{} {}", "❌".red(), message.red().bold());
}

/// Print a section header to separate logical sections of output
pub fn section_header(title: &str) {
    println!("\n{}", format!("==== {} ====", title).cyan().bold());
}

/// Print a simple informational message
pub fn info_message(message: &str) {
    println!("{} {}", "ℹ️ ".blue(), message.blue());
}

fn styled_table<I: IntoIterator<Item = &'static str>>(headers: I) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .into_iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    table
}

/// One row per suite result
pub fn suite_table(results: &[SuiteResult]) -> Table {
    let mut table = styled_table(["Suite", "Environment", "Passed", "Failed", "Skipped", "Duration"]);
    for result in results {
        let failed = Cell::new(result.failed).fg(if result.failed > 0 {
            Color::Red
        } else {
            Color::Green
        });
        table.add_row(vec![
            Cell::new(result.suite),
            Cell::new(&result.environment),
            Cell::new(result.passed),
            failed,
            Cell::new(result.skipped),
            Cell::new(format!("{:.1}s", result.duration.as_secs_f64())),
        ]);
    }
    table
}

pub fn summary_line(summary: &SuiteSummary) -> String {
    format!(
        "{} tests in {} suite(s): {} passed, {} failed, {} skipped ({:.1}% success)",
        summary.total_tests,
        summary.suite_count,
        summary.passed,
        summary.failed,
        summary.skipped,
        summary.success_rate
    )
}

/// One row per checked service, in check order
pub fn health_table(report: &ServiceHealthReport) -> Table {
    let mut table = styled_table(["Service", "Status", "Response", "Error"]);
    for (name, result) in report.iter() {
        let status = if result.healthy {
            Cell::new("healthy").fg(Color::Green)
        } else {
            Cell::new("unhealthy").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(name),
            status,
            Cell::new(format!("{}ms", result.response_time.as_millis())),
            Cell::new(result.error.as_deref().unwrap_or("")),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_harness::suite::SuiteKind;
    use std::time::Duration;

    #[test]
    fn test_suite_table_lists_every_result() {
        let result = SuiteResult {
            suite: SuiteKind::Unit,
            environment: "ci".to_string(),
            passed: 3,
            failed: 1,
            skipped: 0,
            duration: Duration::from_millis(1500),
            coverage: None,
            performance_metrics: None,
            artifacts: Vec::new(),
        };
        let rendered = suite_table(&[result]).to_string();
        assert!(rendered.contains("unit"));
        assert!(rendered.contains("1.5s"));
    }
}
