//! Roll per-file classifications up into a `ComplianceReport`.

use crate::models::report::{
    CategoryStats, ComplianceReport, FileOutcome, FileStatus, SeverityCounts, SkippedFile, Violation,
};
use crate::models::token::Category;
use crate::models::{CandidateDeclaration, ClassificationResult, ViolationReason};
use std::collections::{BTreeMap, BTreeSet};

/// Key of the layered border-opacity rule in `by_category`.
pub const BORDER_OPACITY: &str = "border-opacity";

fn rate(total: usize, failing: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        (total - failing) as f64 / total as f64
    }
}

fn to_violation(decl: &CandidateDeclaration, result: &ClassificationResult) -> Option<Violation> {
    Some(Violation {
        line: decl.line,
        column: decl.column,
        category: decl.category,
        property: decl.property.clone(),
        raw_value: decl.raw_value.clone(),
        syntax_kind: decl.syntax_kind,
        severity: result.severity?,
        reason: result.reason?,
        suggested_token: result.suggested_token.as_ref().map(|t| t.name.clone()),
        suggested_value: result.suggested_token.as_ref().map(|t| t.raw_value.clone()),
        fix: result.fix.clone(),
        context: decl.context.clone(),
    })
}

#[derive(Default)]
struct Tally {
    declarations: usize,
    violations: usize,
    files: BTreeSet<String>,
}

/// Aggregate file outcomes. File-level compliance counts a file as failing
/// when it has at least one violation; per-category rates are declaration-level.
pub fn aggregate(categories: &[Category], outcomes: &[FileOutcome]) -> ComplianceReport {
    let mut tallies: BTreeMap<String, Tally> = categories
        .iter()
        .map(|c| (c.as_str().to_string(), Tally::default()))
        .collect();
    if categories.contains(&Category::Border) {
        tallies.insert(BORDER_OPACITY.to_string(), Tally::default());
    }

    let mut scanned = 0usize;
    let mut total_declarations = 0usize;
    let mut by_severity = SeverityCounts::default();
    let mut by_file: BTreeMap<String, Vec<Violation>> = BTreeMap::new();
    let mut skipped = Vec::new();
    let (mut unparsable, mut dangling, mut fixable) = (0usize, 0usize, 0usize);

    for outcome in outcomes {
        let results = match &outcome.status {
            FileStatus::Skipped(reason) => {
                skipped.push(SkippedFile {
                    file: outcome.file.clone(),
                    reason: reason.clone(),
                });
                continue;
            }
            FileStatus::Scanned(results) => results,
        };
        scanned += 1;
        let mut violations = Vec::new();
        for (decl, result) in results {
            total_declarations += 1;
            let key = if result.reason == Some(ViolationReason::LowOpacity) {
                BORDER_OPACITY
            } else {
                decl.category.as_str()
            };
            if let Some(t) = tallies.get_mut(decl.category.as_str()) {
                t.declarations += 1;
            }
            if result.alpha.is_some() {
                if let Some(t) = tallies.get_mut(BORDER_OPACITY) {
                    t.declarations += 1;
                }
            }
            let Some(v) = to_violation(decl, result) else {
                continue;
            };
            if let Some(t) = tallies.get_mut(key) {
                t.violations += 1;
                t.files.insert(outcome.file.clone());
            }
            by_severity.add(v.severity);
            match v.reason {
                ViolationReason::Unparsable => unparsable += 1,
                ViolationReason::DanglingReference => dangling += 1,
                _ => {}
            }
            if v.fix.is_some() {
                fixable += 1;
            }
            violations.push(v);
        }
        if !violations.is_empty() {
            violations.sort_by(|a, b| {
                (a.line, a.column, &a.property).cmp(&(b.line, b.column, &b.property))
            });
            by_file.insert(outcome.file.clone(), violations);
        }
    }

    let files_with_violations = by_file.len();
    let total_violations = by_file.values().map(Vec::len).sum();
    let by_category = tallies
        .into_iter()
        .map(|(k, t)| {
            let stats = CategoryStats {
                declarations: t.declarations,
                violations: t.violations,
                files_with_violations: t.files.len(),
                compliance_rate: rate(t.declarations, t.violations.min(t.declarations)),
            };
            (k, stats)
        })
        .collect();

    ComplianceReport {
        categories: categories.to_vec(),
        total_files_scanned: scanned,
        files_with_violations,
        total_violations,
        total_declarations,
        compliance_rate: rate(scanned, files_with_violations),
        unparsable_declarations: unparsable,
        dangling_references: dangling,
        fixable_violations: fixable,
        files_skipped: skipped.len(),
        violations_by_severity: by_severity,
        by_category,
        violations_by_file: by_file,
        skipped,
    }
}
