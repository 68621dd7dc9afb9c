//! Scan pipeline: registry → walk → extract → classify → aggregate.
//!
//! Files are processed in parallel; results are sorted by path before
//! aggregation so reports are byte-identical across runs.

use crate::aggregate::aggregate;
use crate::classify::{Classifier, Policy};
use crate::error::{ConfigError, FileError};
use crate::extract::{extractors_for, Budget, PatternExtractor, Surface};
use crate::fix::{apply_fixes, AppliedFix};
use crate::models::report::{ComplianceReport, FileOutcome, FileStatus};
use crate::models::token::Category;
use crate::models::{CandidateDeclaration, ClassificationResult, SourceFile};
use crate::registry::{load_registry, Registry, RegistryOptions};
use crate::walker::Walker;
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub repo_root: PathBuf,
    /// Registry path; relative paths resolve against `repo_root`.
    pub registry: PathBuf,
    pub roots: Vec<String>,
    pub categories: Vec<Category>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub component_patterns: Vec<String>,
    pub policy: Policy,
    pub registry_options: RegistryOptions,
    /// Per-file extraction budget; 0 disables it.
    pub budget_ms: u64,
    pub jobs: Option<usize>,
    pub fix: bool,
}

pub struct ScanRun {
    pub report: ComplianceReport,
    pub fixes: Vec<AppliedFix>,
}

pub fn run_scan(opts: &ScanOptions) -> Result<ScanRun, ConfigError> {
    let registry = load_registry(&opts.repo_root.join(&opts.registry), &opts.registry_options)?;
    run_scan_with(opts, &registry)
}

/// Run against an already-loaded registry.
pub fn run_scan_with(opts: &ScanOptions, registry: &Registry) -> Result<ScanRun, ConfigError> {
    let walker = Walker::new(
        &opts.repo_root,
        &opts.roots,
        &opts.include,
        &opts.exclude,
        &opts.component_patterns,
    )?
    .skip_file(registry.source());
    let extractors = extractors_for(&opts.categories);
    let classifier = Classifier::new(registry, &opts.policy);

    let process = || -> Vec<FileOutcome> {
        walker
            .walk()
            .par_bridge()
            .map(|item| match item {
                Ok(file) => {
                    let budget = Budget::new(opts.budget_ms);
                    let status = match scan_file(&file, &extractors, &classifier, &budget) {
                        Ok(results) => FileStatus::Scanned(results),
                        Err(e) => {
                            warn!("{}", e);
                            FileStatus::Skipped(e.reason())
                        }
                    };
                    FileOutcome {
                        file: file.display,
                        path: file.path,
                        kind: file.kind,
                        status,
                    }
                }
                Err(e) => skipped(e),
            })
            .collect()
    };
    let mut outcomes = match opts.jobs {
        Some(n) if n > 0 => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
            Ok(pool) => pool.install(process),
            Err(e) => {
                warn!("thread pool unavailable ({}); using the global pool", e);
                process()
            }
        },
        _ => process(),
    };
    outcomes.sort_by(|a, b| a.file.cmp(&b.file));

    let report = aggregate(&opts.categories, &outcomes);
    info!(
        files = report.total_files_scanned,
        violations = report.total_violations,
        skipped = report.files_skipped,
        "scan complete"
    );
    let fixes = if opts.fix {
        apply_fixes(&outcomes, true)
    } else {
        Vec::new()
    };
    Ok(ScanRun { report, fixes })
}

fn skipped(e: FileError) -> FileOutcome {
    let file = e.path().to_string();
    FileOutcome {
        path: PathBuf::from(&file),
        file,
        kind: crate::models::SourceKind::Stylesheet,
        status: FileStatus::Skipped(e.reason()),
    }
}

/// Extract and classify one file; the budget is checked throughout extraction.
pub fn scan_file(
    file: &SourceFile,
    extractors: &[Box<dyn PatternExtractor>],
    classifier: &Classifier<'_>,
    budget: &Budget,
) -> Result<Vec<(CandidateDeclaration, ClassificationResult)>, FileError> {
    let surface = Surface::scan(file, budget)?;
    let mut results = Vec::new();
    for ex in extractors {
        budget.check(&file.display)?;
        for decl in ex.extract_from(&surface, file) {
            let r = classifier.evaluate(&decl);
            results.push((decl, r));
        }
    }
    results.sort_by(|(a, _), (b, _)| (a.line, a.column).cmp(&(b.line, b.column)));
    debug!(file = %file.display, declarations = results.len(), "scanned");
    Ok(results)
}

/// Classify an in-memory source without touching the filesystem.
pub fn scan_source(
    file: &SourceFile,
    registry: &Registry,
    policy: &Policy,
    categories: &[Category],
) -> Vec<(CandidateDeclaration, ClassificationResult)> {
    let classifier = Classifier::new(registry, policy);
    scan_file(file, &extractors_for(categories), &classifier, &Budget::unlimited())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceKind;
    use std::fs;
    use tempfile::tempdir;

    const TOKENS: &str = ":root {\n  /* Colors */\n  --bg-card: #18181b;\n  --text-primary: #ffffff;\n  /* Spacing */\n  --space-3: 12px;\n  --space-4: 16px;\n}\n";

    fn options(root: &std::path::Path, categories: Vec<Category>) -> ScanOptions {
        ScanOptions {
            repo_root: root.to_path_buf(),
            registry: PathBuf::from("styles/design-tokens.css"),
            roots: vec![".".into()],
            categories,
            include: vec!["**/*.css".into(), "**/*.tsx".into(), "**/*.ts".into()],
            exclude: vec![],
            component_patterns: vec!["**/*.module.css".into()],
            policy: Policy::default(),
            registry_options: RegistryOptions::default(),
            budget_ms: 0,
            jobs: Some(2),
            fix: false,
        }
    }

    fn setup() -> tempfile::TempDir {
        let td = tempdir().unwrap();
        fs::create_dir_all(td.path().join("styles")).unwrap();
        fs::create_dir_all(td.path().join("app")).unwrap();
        fs::write(td.path().join("styles/design-tokens.css"), TOKENS).unwrap();
        fs::write(
            td.path().join("app/Card.module.css"),
            ".card { padding: 12px; color: var(--text-primary); }\n",
        )
        .unwrap();
        fs::write(td.path().join("app/ok.css"), ".x { margin: var(--space-4); }\n").unwrap();
        td
    }

    #[test]
    fn test_registry_file_is_not_scanned() {
        let td = setup();
        let run = run_scan(&options(td.path(), vec![Category::Color, Category::Spacing])).unwrap();
        assert_eq!(run.report.total_files_scanned, 2);
        assert!(!run.report.violations_by_file.contains_key("styles/design-tokens.css"));
        assert_eq!(run.report.files_with_violations, 1);
        assert_eq!(run.report.compliance_rate, 0.5);
        let v = &run.report.violations_by_file["app/Card.module.css"][0];
        assert_eq!(v.raw_value, "12px");
        assert_eq!(v.suggested_token.as_deref(), Some("space-3"));
        assert_eq!(v.fix.as_deref(), Some("var(--space-3)"));
    }

    #[test]
    fn test_fix_pass_rewrites_and_is_idempotent() {
        let td = setup();
        let mut opts = options(td.path(), vec![Category::Spacing]);
        opts.fix = true;
        let first = run_scan(&opts).unwrap();
        assert_eq!(first.fixes.len(), 1);
        let body = fs::read_to_string(td.path().join("app/Card.module.css")).unwrap();
        assert!(body.contains("padding: var(--space-3);"));
        let second = run_scan(&opts).unwrap();
        assert!(second.fixes.is_empty());
        assert_eq!(second.report.total_violations, 0);
    }

    #[test]
    fn test_missing_registry_and_root_are_fatal() {
        let td = tempdir().unwrap();
        let err = run_scan(&options(td.path(), vec![Category::Color])).err().unwrap();
        assert!(matches!(err, ConfigError::RegistryMissing(_)));
        let td = setup();
        let mut opts = options(td.path(), vec![Category::Color]);
        opts.roots = vec!["missing".into()];
        assert!(matches!(run_scan(&opts).err().unwrap(), ConfigError::RootMissing(_)));
    }

    #[test]
    fn test_reports_are_deterministic() {
        let td = setup();
        let opts = options(td.path(), vec![Category::Color, Category::Spacing]);
        let a = serde_json::to_string(&run_scan(&opts).unwrap().report).unwrap();
        let b = serde_json::to_string(&run_scan(&opts).unwrap().report).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_scan_source_in_memory() {
        let reg = Registry::from_tokens(vec![crate::models::token::Token::new(
            "space-4",
            Category::Spacing,
            "16px",
        )])
        .unwrap();
        let file = SourceFile::new("a.css", SourceKind::Stylesheet, ".a { gap: 16px; }");
        let results = scan_source(&file, &reg, &Policy::default(), &[Category::Spacing]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].1.fix.as_deref(), Some("var(--space-4)"));
    }

    #[test]
    fn test_elapsed_budget_times_out_file() {
        let reg = Registry::from_tokens(vec![crate::models::token::Token::new(
            "space-4",
            Category::Spacing,
            "16px",
        )])
        .unwrap();
        let policy = Policy::default();
        let classifier = Classifier::new(&reg, &policy);
        let file = SourceFile::new("a.css", SourceKind::Stylesheet, ".a { gap: 16px; }");
        let budget = Budget::new(1);
        std::thread::sleep(std::time::Duration::from_millis(5));
        let err = scan_file(&file, &extractors_for(&[Category::Spacing]), &classifier, &budget)
            .unwrap_err();
        assert!(matches!(err, FileError::Timeout { budget_ms: 1, .. }));
        assert_eq!(err.reason(), "timeout");
    }

    #[test]
    fn test_timed_out_file_is_skipped_and_scan_continues() {
        let td = setup();
        let huge = ".h { padding: 13px; margin: 7px; }\n".repeat(300_000);
        fs::write(td.path().join("app/huge.css"), huge).unwrap();
        // compile the lazily built patterns outside the budget
        let reg = Registry::from_tokens(vec![crate::models::token::Token::new(
            "space-4",
            Category::Spacing,
            "16px",
        )])
        .unwrap();
        let warm = SourceFile::new("w.css", SourceKind::Stylesheet, ".w { padding: 1px; color: #fff; }");
        scan_source(&warm, &reg, &Policy::default(), &[Category::Color, Category::Spacing]);

        let mut opts = options(td.path(), vec![Category::Color, Category::Spacing]);
        opts.budget_ms = 25;
        let report = run_scan(&opts).unwrap().report;
        assert_eq!(report.files_skipped, 1);
        assert_eq!(report.skipped[0].file, "app/huge.css");
        assert_eq!(report.skipped[0].reason, "timeout");
        assert_eq!(report.total_files_scanned, 2);
        assert!(report.violations_by_file.contains_key("app/Card.module.css"));
    }
}
