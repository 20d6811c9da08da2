//! Check results and the report accumulator.

use chrono::{DateTime, Local};
use serde::Serialize;
use strum_macros::{Display, EnumIter as EnumIterMacro};

use super::docs::{lookup_doc, DocEntry};

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIterMacro, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// The check found nothing to report
    Pass,
    /// Weak signal or missing optional configuration
    Warn,
    /// Probe failure or protocol violation
    Error,
}

impl CheckStatus {
    /// The glyph used in the text report.
    pub fn glyph(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "✓",
            CheckStatus::Warn => "⚠",
            CheckStatus::Error => "✗",
        }
    }
}

/// One check outcome as it appears in the report.
///
/// Built with `CheckResult::pass`/`warn`/`error` and the `with_*` builders.
/// Documentation is attached by `Report::append`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub category: String,
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<String>,
    #[serde(flatten)]
    pub doc: Option<DocEntry>,
}

impl CheckResult {
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
        status: CheckStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            status,
            message: message.into(),
            details: Vec::new(),
            evidence: Vec::new(),
            doc: None,
        }
    }

    pub fn pass(category: &str, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(category, name, CheckStatus::Pass, message)
    }

    pub fn warn(category: &str, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(category, name, CheckStatus::Warn, message)
    }

    pub fn error(category: &str, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(category, name, CheckStatus::Error, message)
    }

    pub fn with_details<I, S>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.details.extend(details.into_iter().map(Into::into));
        self
    }

    pub fn with_evidence<I, S>(mut self, evidence: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.evidence.extend(evidence.into_iter().map(Into::into));
        self
    }
}

/// Pass/warn/error counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl Summary {
    fn record(&mut self, status: CheckStatus) {
        match status {
            CheckStatus::Pass => self.passed += 1,
            CheckStatus::Warn => self.warnings += 1,
            CheckStatus::Error => self.errors += 1,
        }
    }

    /// Number of checks counted.
    pub fn total(&self) -> usize {
        self.passed + self.warnings + self.errors
    }
}

/// The result of one diagnostic run.
///
/// Checks are kept in execution order and can only be added, never edited;
/// the summary is maintained by `append`.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    domain: String,
    #[serde(serialize_with = "serialize_timestamp")]
    timestamp: DateTime<Local>,
    checks: Vec<CheckResult>,
    summary: Summary,
}

fn serialize_timestamp<S>(timestamp: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format_timestamp(timestamp))
}

/// Local time in the report header format.
pub(crate) fn format_timestamp(timestamp: &DateTime<Local>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

impl Report {
    /// Starts an empty report for `domain`, stamped with the current local time.
    pub fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            timestamp: Local::now(),
            checks: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Appends a check, attaching its documentation and counting its status.
    pub fn append(&mut self, mut check: CheckResult) {
        if check.doc.is_none() {
            check.doc = lookup_doc(&check.category, &check.name);
        }
        log::debug!(
            "[{}] {}: {} - {}",
            check.status,
            check.category,
            check.name,
            check.message
        );
        self.summary.record(check.status);
        self.checks.push(check);
    }

    /// Appends every check in order.
    pub fn extend(&mut self, checks: impl IntoIterator<Item = CheckResult>) {
        for check in checks {
            self.append(check);
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn timestamp(&self) -> &DateTime<Local> {
        &self.timestamp
    }

    pub fn checks(&self) -> &[CheckResult] {
        &self.checks
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// The first check with this category and name.
    pub fn find(&self, category: &str, name: &str) -> Option<&CheckResult> {
        self.checks
            .iter()
            .find(|c| c.category == category && c.name == name)
    }

    /// Distinct categories in order of first appearance.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for check in &self.checks {
            if !categories.contains(&check.category.as_str()) {
                categories.push(&check.category);
            }
        }
        categories
    }

    /// Checks in `category`, in execution order.
    pub fn checks_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a CheckResult> {
        self.checks.iter().filter(move |c| c.category == category)
    }
}
