//! Shared data models: scan inputs, located declarations, and their classification.

pub mod report;
pub mod token;

use serde::Serialize;
use std::ops::Range;
use std::path::{Path, PathBuf};
use token::{Category, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
/// Kind of source file, decided by extension.
pub enum SourceKind {
    Stylesheet,
    ComponentMarkup,
    Script,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<SourceKind> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "css" | "scss" | "pcss" => Some(SourceKind::Stylesheet),
            "tsx" | "jsx" => Some(SourceKind::ComponentMarkup),
            "ts" | "js" | "mjs" | "cjs" => Some(SourceKind::Script),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
/// A unit of scan input.
pub struct SourceFile {
    pub path: PathBuf,
    /// Repository-relative path with `/` separators, used in reports.
    pub display: String,
    pub kind: SourceKind,
    pub text: String,
    /// Matched one of the component patterns (e.g. `*.module.css`).
    pub component_scoped: bool,
}

impl SourceFile {
    pub fn new(display: impl Into<String>, kind: SourceKind, text: impl Into<String>) -> Self {
        let display = display.into();
        SourceFile {
            path: PathBuf::from(&display),
            display,
            kind,
            text: text.into(),
            component_scoped: false,
        }
    }

    pub fn component_scoped(mut self, scoped: bool) -> Self {
        self.component_scoped = scoped;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
/// Syntactic surface a declaration was found on.
pub enum SyntaxKind {
    CssDeclaration,
    InlineStyleObject,
    UtilityClassLiteral,
    MediaQuery,
}

#[derive(Debug, Clone, Serialize)]
/// A located property assignment found during extraction.
pub struct CandidateDeclaration {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub property: String,
    pub raw_value: String,
    pub context: String,
    pub syntax_kind: SyntaxKind,
    pub category: Category,
    pub source_kind: SourceKind,
    pub component_scoped: bool,
    /// Byte range of `raw_value` in the file text; used by the fix pass.
    #[serde(skip)]
    pub span: Range<usize>,
}

impl CandidateDeclaration {
    /// Minimal declaration for programmatic classification (no location).
    pub fn detached(
        category: Category,
        property: impl Into<String>,
        raw_value: impl Into<String>,
        syntax_kind: SyntaxKind,
        source_kind: SourceKind,
    ) -> Self {
        let raw_value = raw_value.into();
        CandidateDeclaration {
            file: String::new(),
            line: 0,
            column: 0,
            property: property.into(),
            span: 0..raw_value.len(),
            raw_value,
            context: String::new(),
            syntax_kind,
            category,
            source_kind,
            component_scoped: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    TokenReference,
    AcceptableLiteral,
    Violation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// Violation severity. Ordering puts `Critical` first.
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
/// Why a declaration is a violation.
pub enum ViolationReason {
    /// Literal value where a token is expected.
    HardcodedValue,
    /// `var(--x)` where `x` is not registered.
    DanglingReference,
    /// `var(--x)` where `x` belongs to a category the property cannot use.
    CategoryMismatch,
    /// Value could not be parsed; needs manual attention.
    Unparsable,
    /// Border colour alpha below the configured minimum.
    LowOpacity,
}

impl ViolationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationReason::HardcodedValue => "hardcoded-value",
            ViolationReason::DanglingReference => "dangling-reference",
            ViolationReason::CategoryMismatch => "category-mismatch",
            ViolationReason::Unparsable => "unparsable",
            ViolationReason::LowOpacity => "low-opacity",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
/// Outcome of evaluating one `CandidateDeclaration`.
pub struct ClassificationResult {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_token: Option<Token>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_token: Option<Token>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ViolationReason>,
    /// Replacement text for an unambiguous automatic fix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
    /// Alpha of the resolved colour when the border opacity rule evaluated it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
}

impl ClassificationResult {
    pub fn acceptable() -> Self {
        ClassificationResult {
            status: Status::AcceptableLiteral,
            matched_token: None,
            suggested_token: None,
            severity: None,
            reason: None,
            fix: None,
            alpha: None,
        }
    }

    pub fn token_reference(token: Token) -> Self {
        ClassificationResult {
            status: Status::TokenReference,
            matched_token: Some(token),
            ..Self::acceptable()
        }
    }

    pub fn violation(reason: ViolationReason, severity: Severity, suggested: Option<Token>) -> Self {
        ClassificationResult {
            status: Status::Violation,
            suggested_token: suggested,
            severity: Some(severity),
            reason: Some(reason),
            ..Self::acceptable()
        }
    }

    pub fn is_violation(&self) -> bool {
        self.status == Status::Violation
    }
}
