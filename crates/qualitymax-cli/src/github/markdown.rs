//! Markdown for the job summary and the fallback PR comment.

use qualitymax_client::{ExecutionResults, TestOutcome};

const MAX_ERROR_CHARS: usize = 100;

fn status_emoji(results: &ExecutionResults) -> &'static str {
    if results.passed() {
        "✅"
    } else {
        "❌"
    }
}

/// Job summary: heading, metric table and report link.
pub fn job_summary(results: &ExecutionResults) -> String {
    let mut md = String::new();

    md.push_str(&format!(
        "## {} QualityMax Test Results\n\n",
        status_emoji(results)
    ));
    md.push_str("| Metric | Value |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!(
        "| Status | {} |\n",
        results.result.as_str().to_uppercase()
    ));
    md.push_str(&format!("| Total Tests | {} |\n", results.total_tests));
    md.push_str(&format!("| Passed | ✅ {} |\n", results.passed_tests));
    md.push_str(&format!("| Failed | ❌ {} |\n", results.failed_tests));
    md.push_str(&format!("| Skipped | ⏭️ {} |\n", results.skipped_tests));
    md.push_str(&format!(
        "| Duration | {}s |\n",
        results.duration_seconds.round()
    ));
    md.push_str(&format!(
        "| Browser | {} |\n",
        escape_markdown_table_cell(&results.browser)
    ));
    md.push('\n');
    md.push_str(&format!("[View Full Report]({})\n", results.report_url));

    md
}

/// PR comment body used when the service sends no `summary_markdown`.
pub fn fallback_comment(results: &ExecutionResults) -> String {
    let status_text = if results.passed() { "Passed" } else { "Failed" };

    let mut md = String::new();
    md.push_str("## 🧪 QualityMax Test Results\n\n");
    md.push_str("| Status | Tests | Duration |\n");
    md.push_str("|--------|-------|----------|\n");
    md.push_str(&format!(
        "| {} {} | {}/{} | {} |\n",
        status_emoji(results),
        status_text,
        results.passed_tests,
        results.total_tests,
        format_duration(results.duration_seconds)
    ));
    md.push('\n');
    md.push_str("### Summary\n");
    md.push_str(&format!(
        "- **Browser:** {}\n",
        escape_markdown_text(&results.browser)
    ));
    md.push_str(&format!(
        "- **Base URL:** {}\n",
        escape_markdown_text(results.base_url.as_deref().unwrap_or("Default"))
    ));

    if results.failed_tests > 0 {
        md.push_str("\n### ❌ Failed Tests\n\n");
        md.push_str("| Test | Error |\n|------|-------|\n");
        for test in results.failed_cases() {
            let error = truncate_chars(
                test.error_message.as_deref().unwrap_or("Unknown error"),
                MAX_ERROR_CHARS,
            );
            md.push_str(&format!(
                "| {} | {} |\n",
                escape_markdown_table_cell(&test.test_name),
                escape_markdown_table_cell(error)
            ));
        }
    }

    md.push_str(&format!("\n[View Full Report]({})", results.report_url));
    md
}

/// Body for the PR comment: the service's summary when present.
pub fn comment_body(results: &ExecutionResults) -> String {
    match results.summary_markdown.as_deref() {
        Some(md) if !md.trim().is_empty() => md.to_string(),
        _ => fallback_comment(results),
    }
}

/// `Xm Ys`, both parts floored.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}m {}s", total / 60, total % 60)
}

/// Result line for the closing log box.
pub fn result_headline(results: &ExecutionResults) -> String {
    match results.result {
        TestOutcome::Passed => "All tests passed!".to_string(),
        _ => format!(
            "{} test(s) failed. View report: {}",
            results.failed_tests, results.report_url
        ),
    }
}

fn truncate_chars(input: &str, max: usize) -> &str {
    match input.char_indices().nth(max) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

fn escape_markdown_table_cell(input: &str) -> String {
    escape_markdown_text(input).replace('|', "\\|")
}

fn escape_markdown_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\r' | '\n' => out.push(' '),
            '\\' | '`' | '*' | '_' | '[' | ']' | '#' | '<' | '>' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn results(result: &str, failed: u32) -> ExecutionResults {
        serde_json::from_value(json!({
            "execution_id": "ex_1",
            "status": "completed",
            "result": result,
            "total_tests": 3,
            "passed_tests": 3 - failed,
            "failed_tests": failed,
            "skipped_tests": 0,
            "duration_seconds": 125.6,
            "browser": "chromium",
            "report_url": "https://app.qualitymax.ai/r/ex_1",
            "tests": [
                {"test_id": 1, "test_name": "Login", "status": "passed"},
                {"test_id": 2, "test_name": "Cart | totals", "status": "failed",
                 "error_message": "x".repeat(150)},
                {"test_id": 3, "test_name": "Search", "status": "failed"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn duration_is_minutes_and_seconds() {
        assert_eq!(format_duration(125.6), "2m 5s");
        assert_eq!(format_duration(59.9), "0m 59s");
        assert_eq!(format_duration(-1.0), "0m 0s");
        assert_eq!(format_duration(f64::NAN), "0m 0s");
    }

    #[test]
    fn job_summary_table() {
        let md = job_summary(&results("failed", 2));
        assert!(md.starts_with("## ❌ QualityMax Test Results"));
        assert!(md.contains("| Status | FAILED |"));
        assert!(md.contains("| Passed | ✅ 1 |"));
        assert!(md.contains("| Duration | 126s |"));
        assert!(md.contains("[View Full Report](https://app.qualitymax.ai/r/ex_1)"));
    }

    #[test]
    fn fallback_lists_failed_tests_with_truncated_errors() {
        let md = fallback_comment(&results("failed", 2));
        assert!(md.contains("| ❌ Failed | 1/3 | 2m 5s |"));
        assert!(md.contains("- **Base URL:** Default"));
        assert!(md.contains("| Cart \\| totals | "));
        assert!(md.contains(&format!("| {} |", "x".repeat(100))));
        assert!(!md.contains(&"x".repeat(101)));
        assert!(md.contains("| Search | Unknown error |"));
        assert!(!md.contains("| Login |"));
    }

    #[test]
    fn fallback_without_failures_has_no_failure_table() {
        let md = fallback_comment(&results("passed", 0));
        assert!(md.contains("✅ Passed"));
        assert!(!md.contains("Failed Tests"));
    }

    #[test]
    fn fallback_escapes_base_url() {
        let mut r = results("passed", 0);
        r.base_url = Some("https://staging.example.com/<app>_v2".to_string());
        let md = fallback_comment(&r);
        assert!(md.contains("- **Base URL:** https://staging.example.com/\\<app\\>\\_v2\n"));
    }

    #[test]
    fn comment_prefers_service_markdown() {
        let mut r = results("passed", 0);
        r.summary_markdown = Some("## From service".to_string());
        assert_eq!(comment_body(&r), "## From service");

        r.summary_markdown = Some("  ".to_string());
        assert!(comment_body(&r).starts_with("## 🧪 QualityMax Test Results"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("ééé", 2), "éé");
        assert_eq!(truncate_chars("ab", 5), "ab");
    }
}
