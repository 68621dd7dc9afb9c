//! Report schema produced by aggregation and consumed by the printers.

use super::token::Category;
use super::{
    CandidateDeclaration, ClassificationResult, Severity, SourceKind, SyntaxKind, ViolationReason,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Per-file input to aggregation.
pub struct FileOutcome {
    pub file: String,
    pub path: PathBuf,
    pub kind: SourceKind,
    pub status: FileStatus,
}

pub enum FileStatus {
    Scanned(Vec<(CandidateDeclaration, ClassificationResult)>),
    Skipped(String),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
/// One reported violation.
pub struct Violation {
    pub line: usize,
    pub column: usize,
    pub category: Category,
    pub property: String,
    pub raw_value: String,
    pub syntax_kind: SyntaxKind,
    pub severity: Severity,
    pub reason: ViolationReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
    pub context: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
/// Declaration-level compliance for one category (or the `border-opacity` rule).
pub struct CategoryStats {
    pub declarations: usize,
    pub violations: usize,
    pub files_with_violations: usize,
    pub compliance_rate: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
/// Aggregate output of one scan run.
pub struct ComplianceReport {
    pub categories: Vec<Category>,
    pub total_files_scanned: usize,
    pub files_with_violations: usize,
    pub total_violations: usize,
    pub total_declarations: usize,
    pub compliance_rate: f64,
    pub unparsable_declarations: usize,
    pub dangling_references: usize,
    pub fixable_violations: usize,
    pub files_skipped: usize,
    pub violations_by_severity: SeverityCounts,
    pub by_category: BTreeMap<String, CategoryStats>,
    pub violations_by_file: BTreeMap<String, Vec<Violation>>,
    pub skipped: Vec<SkippedFile>,
}

impl ComplianceReport {
    /// Strict mode requires zero violations; otherwise the rate must reach `threshold`.
    pub fn passes(&self, threshold: f64, strict: bool) -> bool {
        if strict {
            self.total_violations == 0
        } else {
            self.compliance_rate >= threshold
        }
    }
}
