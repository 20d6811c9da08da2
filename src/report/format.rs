//! Text rendering of a report.
//!
//! The layout is line-oriented and stable: tools that scrape the text output
//! rely on the header, the summary line and the per-check indentation.

use std::fmt::Write;

use crate::config::REPORT_RULE_WIDTH;

use super::model::{format_timestamp, CheckResult, Report};

fn rule() -> String {
    "=".repeat(REPORT_RULE_WIDTH)
}

/// Renders the report as sectioned text, grouped by category in order of
/// first appearance.
pub fn format_report(report: &Report) -> String {
    let rule = rule();
    let summary = report.summary();
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "DNS HEALTH CHECK: {}", report.domain());
    let _ = writeln!(out, "Timestamp: {}", format_timestamp(report.timestamp()));
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "SUMMARY: ✓ {} Passed | ⚠ {} Warnings | ✗ {} Errors",
        summary.passed, summary.warnings, summary.errors
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out);

    for category in report.categories() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{}", category.to_uppercase());
        let _ = writeln!(out, "{rule}");
        for check in report.checks_in(category) {
            write_check(&mut out, check);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "DNS Health Check Complete");
    let _ = writeln!(out, "{rule}");
    out
}

fn write_check(out: &mut String, check: &CheckResult) {
    let _ = writeln!(out);
    let _ = writeln!(out, "[{}] {}", check.status.glyph(), check.name);
    let _ = writeln!(out, "    {}", check.message);

    if let Some(doc) = &check.doc {
        let _ = writeln!(out, "    What we tested: {}", doc.explain);
        let _ = writeln!(out, "    Why it matters: {}", doc.why);
        let _ = writeln!(out, "    How to fix:     {}", doc.fix);
        if !doc.refs.is_empty() {
            let _ = writeln!(out, "    Refs:           {}", doc.refs.join("; "));
        }
    }
    for line in &check.evidence {
        let _ = writeln!(out, "    Evidence:       {line}");
    }
    for detail in &check.details {
        let _ = writeln!(out, "    - {detail}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CheckResult;

    fn sample_report() -> Report {
        let mut report = Report::new("example.com");
        report.append(
            CheckResult::pass("Nameservers", "NS Count", "2 nameservers found")
                .with_details(["ns1.example.com", "ns2.example.com"]),
        );
        report.append(
            CheckResult::error("Records", "Dangling CNAME www", "www.example.com CNAME target does not resolve")
                .with_evidence(["target=gone.example.net"]),
        );
        report.append(CheckResult::warn("Custom", "Undocumented", "no docs"));
        report
    }

    #[test]
    fn test_header_and_summary() {
        let text = format_report(&sample_report());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "=".repeat(80));
        assert_eq!(lines[1], "DNS HEALTH CHECK: example.com");
        assert!(lines[2].starts_with("Timestamp: "));
        assert_eq!(lines[3], "=".repeat(80));
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "SUMMARY: ✓ 1 Passed | ⚠ 1 Warnings | ✗ 1 Errors");
    }

    #[test]
    fn test_sections_follow_first_appearance() {
        let text = format_report(&sample_report());
        let ns = text.find("\nNAMESERVERS\n").unwrap();
        let records = text.find("\nRECORDS\n").unwrap();
        let custom = text.find("\nCUSTOM\n").unwrap();
        assert!(ns < records && records < custom);
    }

    #[test]
    fn test_check_block_field_order() {
        let text = format_report(&sample_report());
        let block_start = text.find("[✗] Dangling CNAME www").unwrap();
        let block = &text[block_start..];
        let message = block.find("    www.example.com CNAME target does not resolve").unwrap();
        let explain = block.find("    What we tested: ").unwrap();
        let why = block.find("    Why it matters: ").unwrap();
        let fix = block.find("    How to fix:     ").unwrap();
        let refs = block.find("    Refs:           ").unwrap();
        let evidence = block.find("    Evidence:       target=gone.example.net").unwrap();
        assert!(message < explain && explain < why && why < fix && fix < refs && refs < evidence);
    }

    #[test]
    fn test_details_are_bulleted() {
        let text = format_report(&sample_report());
        assert!(text.contains("\n    - ns1.example.com\n    - ns2.example.com\n"));
    }

    #[test]
    fn test_undocumented_check_has_no_doc_lines() {
        let text = format_report(&sample_report());
        let block_start = text.find("[⚠] Undocumented").unwrap();
        let block = &text[block_start..];
        let block_end = block.find("\n\n").unwrap();
        assert!(!block[..block_end].contains("What we tested"));
    }

    #[test]
    fn test_footer() {
        let text = format_report(&sample_report());
        let rule = "=".repeat(80);
        assert!(text.ends_with(&format!("\n\n{rule}\nDNS Health Check Complete\n{rule}\n")));
    }
}
