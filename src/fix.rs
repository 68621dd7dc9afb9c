//! Automatic rewrites for violations with an unambiguous token.
//!
//! Only edits whose span still holds the reported literal are applied, so
//! running the fixer twice is a no-op.

use crate::models::report::{FileOutcome, FileStatus};
use serde::Serialize;
use std::fs;
use std::ops::Range;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub span: Range<usize>,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AppliedFix {
    pub file: String,
    pub line: usize,
    pub from: String,
    pub to: String,
}

/// Apply edits to `text`. Edits whose span no longer matches `from`, or that
/// overlap an earlier edit, are dropped. Returns the new text and the edits used.
pub fn apply_edits(text: &str, edits: &[Edit]) -> (String, Vec<Edit>) {
    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by_key(|e| e.span.start);
    let mut out = String::with_capacity(text.len());
    let mut used = Vec::new();
    let mut cursor = 0;
    for e in sorted {
        if e.span.start < cursor || text.get(e.span.clone()) != Some(e.from.as_str()) {
            continue;
        }
        out.push_str(&text[cursor..e.span.start]);
        out.push_str(&e.to);
        cursor = e.span.end;
        used.push(e.clone());
    }
    out.push_str(&text[cursor..]);
    (out, used)
}

/// Rewrite every file that has fixable violations. With `write = false`
/// the files are left untouched and the would-be fixes are returned.
pub fn apply_fixes(outcomes: &[FileOutcome], write: bool) -> Vec<AppliedFix> {
    let mut applied = Vec::new();
    for outcome in outcomes {
        let FileStatus::Scanned(results) = &outcome.status else {
            continue;
        };
        let edits: Vec<(usize, Edit)> = results
            .iter()
            .filter_map(|(d, r)| {
                let to = r.fix.clone()?;
                Some((
                    d.line,
                    Edit {
                        span: d.span.clone(),
                        from: d.raw_value.clone(),
                        to,
                    },
                ))
            })
            .collect();
        if edits.is_empty() {
            continue;
        }
        let text = match fs::read_to_string(&outcome.path) {
            Ok(t) => t,
            Err(e) => {
                warn!(file = %outcome.file, "cannot re-read for fixing: {}", e);
                continue;
            }
        };
        let plain: Vec<Edit> = edits.iter().map(|(_, e)| e.clone()).collect();
        let (new_text, used) = apply_edits(&text, &plain);
        if used.is_empty() {
            continue;
        }
        if write {
            if let Err(e) = fs::write(&outcome.path, &new_text) {
                warn!(file = %outcome.file, "cannot write fixes: {}", e);
                continue;
            }
        }
        debug!(file = %outcome.file, count = used.len(), write, "fixes");
        for u in used {
            let line = edits
                .iter()
                .find(|(_, e)| e.span == u.span)
                .map(|(l, _)| *l)
                .unwrap_or_default();
            applied.push(AppliedFix {
                file: outcome.file.clone(),
                line,
                from: u.from,
                to: u.to,
            });
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(text: &str, from: &str, to: &str) -> Edit {
        let start = text.find(from).unwrap();
        Edit {
            span: start..start + from.len(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    #[test]
    fn test_apply_edits_replaces_in_order() {
        let text = ".a { padding: 12px; margin: 150ms; }";
        let edits = vec![
            edit(text, "150ms", "var(--duration-fast)"),
            edit(text, "12px", "var(--space-3)"),
        ];
        let (out, used) = apply_edits(text, &edits);
        assert_eq!(out, ".a { padding: var(--space-3); margin: var(--duration-fast); }");
        assert_eq!(used.len(), 2);
    }

    #[test]
    fn test_stale_edits_are_skipped() {
        let text = ".a { padding: 12px; }";
        let e = edit(text, "12px", "var(--space-3)");
        let (once, _) = apply_edits(text, &[e.clone()]);
        let (twice, used) = apply_edits(&once, &[e]);
        assert_eq!(once, twice);
        assert!(used.is_empty());
    }
}
