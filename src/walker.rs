//! Source discovery under the configured roots.
//!
//! Yields files lazily so extraction can start before the walk finishes.
//! Dependency/build directories are pruned, test files are always excluded,
//! and symlinks are never followed.

use crate::error::{ConfigError, FileError};
use crate::models::{SourceFile, SourceKind};
use glob::Pattern;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into.
const PRUNED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".next",
    ".turbo",
    ".vercel",
    "dist",
    "build",
    "out",
    "coverage",
    "target",
];

/// Test-file conventions excluded regardless of configuration.
const TEST_PATTERNS: &[&str] = &["**/*.test.*", "**/*.spec.*", "**/__tests__/**", "**/__mocks__/**"];

pub struct Walker {
    repo_root: PathBuf,
    roots: Vec<PathBuf>,
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    component: Vec<Pattern>,
    skip: Option<PathBuf>,
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| ConfigError::BadGlob {
                pattern: p.clone(),
                message: e.msg.to_string(),
            })
        })
        .collect()
}

impl Walker {
    /// Roots are resolved against `repo_root`; a missing root is a
    /// configuration error.
    pub fn new(
        repo_root: &Path,
        roots: &[String],
        include: &[String],
        exclude: &[String],
        component: &[String],
    ) -> Result<Walker, ConfigError> {
        let mut abs_roots = Vec::with_capacity(roots.len());
        for r in roots {
            let p = repo_root.join(r);
            if !p.exists() {
                return Err(ConfigError::RootMissing(p));
            }
            abs_roots.push(p);
        }
        let tests: Vec<String> = TEST_PATTERNS.iter().map(|s| s.to_string()).collect();
        let mut exclude = compile(exclude)?;
        exclude.extend(compile(&tests)?);
        Ok(Walker {
            repo_root: repo_root.to_path_buf(),
            roots: abs_roots,
            include: compile(include)?,
            exclude,
            component: compile(component)?,
            skip: None,
        })
    }

    /// Never yield this file (the token registry itself).
    pub fn skip_file(mut self, path: Option<&Path>) -> Self {
        self.skip = path.map(|p| fs::canonicalize(p).unwrap_or_else(|_| p.to_path_buf()));
        self
    }

    fn display(&self, path: &Path) -> String {
        let rel = pathdiff::diff_paths(path, &self.repo_root).unwrap_or_else(|| path.to_path_buf());
        let s = rel.to_string_lossy().replace('\\', "/");
        s.strip_prefix("./").map(str::to_string).unwrap_or(s)
    }

    fn selected(&self, rel: &str) -> bool {
        self.include.iter().any(|p| p.matches(rel)) && !self.exclude.iter().any(|p| p.matches(rel))
    }

    fn is_skipped(&self, path: &Path) -> bool {
        let Some(skip) = &self.skip else { return false };
        if path.file_name() != skip.file_name() {
            return false;
        }
        fs::canonicalize(path).map(|p| &p == skip).unwrap_or(false)
    }

    /// Lazily walk all roots. Each item is a readable source file or the
    /// reason it had to be skipped.
    pub fn walk(&self) -> impl Iterator<Item = Result<SourceFile, FileError>> + Send + '_ {
        let mut seen: HashSet<PathBuf> = HashSet::new();
        self.roots
            .iter()
            .flat_map(|root| {
                WalkDir::new(root)
                    .follow_links(false)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_entry(|e| !is_pruned(e))
            })
            .filter_map(move |entry| match entry {
                Ok(e) => {
                    if e.file_type().is_dir() || !seen.insert(e.path().to_path_buf()) {
                        return None;
                    }
                    self.visit(&e)
                }
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| self.display(p))
                        .unwrap_or_else(|| "<unknown>".to_string());
                    warn!(%path, "walk error: {}", err);
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                    Some(Err(FileError::Read { path, source }))
                }
            })
    }

    fn visit(&self, entry: &DirEntry) -> Option<Result<SourceFile, FileError>> {
        let path = entry.path();
        let shown = self.display(path);
        if !self.selected(&shown) || self.is_skipped(path) {
            return None;
        }
        if entry.path_is_symlink() {
            warn!(path = %shown, "symlink not followed");
            return Some(Err(FileError::Symlink { path: shown }));
        }
        let kind = SourceKind::from_path(path)?;
        Some(self.read(path, shown, kind))
    }

    fn read(&self, path: &Path, shown: String, kind: SourceKind) -> Result<SourceFile, FileError> {
        let bytes = fs::read(path).map_err(|source| {
            warn!(path = %shown, "read failed: {}", source);
            FileError::Read {
                path: shown.clone(),
                source,
            }
        })?;
        let text = String::from_utf8(bytes).map_err(|_| {
            warn!(path = %shown, "not valid UTF-8; skipped");
            FileError::NotUtf8 {
                path: shown.clone(),
            }
        })?;
        let scoped = self.component.iter().any(|p| p.matches(&shown));
        debug!(path = %shown, ?kind, scoped, "discovered");
        Ok(SourceFile {
            path: path.to_path_buf(),
            display: shown,
            kind,
            text,
            component_scoped: scoped,
        })
    }
}

fn is_pruned(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|n| PRUNED_DIRS.contains(&n))
}
