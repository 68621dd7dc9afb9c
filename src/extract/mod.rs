//! Per-category pattern extractors.
//!
//! A file is scanned once into raw declarations (`surface`); each category
//! extractor then claims the properties it owns and splits values into
//! atoms. Atoms become `CandidateDeclaration`s with 1-based positions.

pub mod border;
pub mod breakpoint;
pub mod color;
pub mod effect;
pub mod spacing;
pub mod surface;
pub mod transition;
pub mod typography;

use crate::error::FileError;
use crate::models::token::Category;
use crate::models::{CandidateDeclaration, SourceFile};
use regex::Regex;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
pub use surface::{RawDeclaration, Surface};

/// Per-file wall-clock budget for extraction.
pub struct Budget {
    started: Instant,
    limit: Option<Duration>,
}

impl Budget {
    pub fn new(limit_ms: u64) -> Self {
        Budget {
            started: Instant::now(),
            limit: (limit_ms > 0).then(|| Duration::from_millis(limit_ms)),
        }
    }

    pub fn unlimited() -> Self {
        Budget {
            started: Instant::now(),
            limit: None,
        }
    }

    pub fn check(&self, path: &str) -> Result<(), FileError> {
        match self.limit {
            Some(limit) if self.started.elapsed() > limit => Err(FileError::Timeout {
                path: path.to_string(),
                budget_ms: limit.as_millis() as u64,
            }),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One value fragment to classify, with its offset inside the declaration value.
pub struct Atom {
    pub text: String,
    pub offset: usize,
}

impl Atom {
    fn new(text: &str, offset: usize) -> Self {
        Atom {
            text: text.to_string(),
            offset,
        }
    }
}

pub trait PatternExtractor: Send + Sync {
    fn category(&self) -> Category;

    /// Whether this extractor owns the raw declaration.
    fn wants(&self, decl: &RawDeclaration) -> bool;

    /// Split a claimed value into classifiable atoms.
    fn atoms(&self, decl: &RawDeclaration) -> Vec<Atom>;

    fn extract_from(&self, surface: &Surface, file: &SourceFile) -> Vec<CandidateDeclaration> {
        let mut out = Vec::new();
        for decl in surface.decls.iter().filter(|d| self.wants(d)) {
            for atom in self.atoms(decl) {
                let start = decl.value_start + atom.offset;
                let (line, column) = surface.lines.position(start);
                out.push(CandidateDeclaration {
                    file: file.display.clone(),
                    line,
                    column,
                    property: decl.property.clone(),
                    span: start..start + atom.text.len(),
                    raw_value: atom.text,
                    context: surface.lines.line_text(&file.text, start).to_string(),
                    syntax_kind: decl.syntax,
                    category: self.category(),
                    source_kind: file.kind,
                    component_scoped: file.component_scoped,
                });
            }
        }
        out
    }

    /// Scan a file and extract this category's declarations.
    fn extract(&self, file: &SourceFile, budget: &Budget) -> Result<Vec<CandidateDeclaration>, FileError> {
        let surface = Surface::scan(file, budget)?;
        Ok(self.extract_from(&surface, file))
    }
}

/// Extractor for one category; `None` for categories that are registry-only.
pub fn for_category(category: Category) -> Option<Box<dyn PatternExtractor>> {
    let ex: Box<dyn PatternExtractor> = match category {
        Category::Color => Box::new(color::ColorExtractor),
        Category::Spacing => Box::new(spacing::SpacingExtractor),
        Category::Typography => Box::new(typography::TypographyExtractor),
        Category::Effect => Box::new(effect::EffectExtractor),
        Category::Border => Box::new(border::BorderExtractor),
        Category::Breakpoint => Box::new(breakpoint::BreakpointExtractor),
        Category::Transition => Box::new(transition::TransitionExtractor),
        Category::ZIndex => return None,
    };
    Some(ex)
}

/// Categories that have an extractor, in report order.
pub fn scannable_categories() -> Vec<Category> {
    Category::ALL
        .into_iter()
        .filter(|c| for_category(*c).is_some())
        .collect()
}

pub fn extractors_for(categories: &[Category]) -> Vec<Box<dyn PatternExtractor>> {
    categories.iter().filter_map(|c| for_category(*c)).collect()
}

const VAR_REF: &str = r"var\(\s*--[A-Za-z0-9_-]+(?:[^()]|\([^()]*\))*\)";

static COLOR_ATOM: LazyLock<Regex> = LazyLock::new(|| {
    let words: Vec<&str> = crate::values::named_colors().collect();
    let pattern = format!(
        r"(?i){VAR_REF}|#[0-9a-f]{{3,8}}\b|(?:rgba?|hsla?)\((?:[^()]|\([^()]*\))*\)|\b(?:transparent|currentcolor|inherit|initial|unset|{})\b",
        words.join("|")
    );
    Regex::new(&pattern).expect("colour atom regex")
});

static URL_FN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)url\([^)]*\)?").expect("url regex"));

static FN_INNER_ATOM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{VAR_REF}|-?(?:\d+\.?\d*|\.\d+)[A-Za-z%]+")).expect("fn atom regex")
});

static TIME_ATOM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?P<var>{VAR_REF})|(?:^|[\s,(])(?P<time>[+-]?(?:\d+\.?\d*|\.\d+)m?s)\b"
    ))
    .expect("time atom regex")
});

/// Value with a trailing `!important` removed.
pub fn strip_important(value: &str) -> &str {
    let v = value.trim_end();
    match v.to_ascii_lowercase().rfind("!important") {
        Some(i) if v[i..].eq_ignore_ascii_case("!important") => v[..i].trim_end(),
        _ => v,
    }
}

/// Whole value (minus `!important`) as a single atom.
pub fn whole_atom(value: &str) -> Vec<Atom> {
    let v = strip_important(value);
    let lead = v.len() - v.trim_start().len();
    let t = v.trim();
    if t.is_empty() {
        return Vec::new();
    }
    vec![Atom::new(t, lead)]
}

/// Split on whitespace and commas outside parentheses.
pub fn split_top_level(value: &str) -> Vec<Atom> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start: Option<usize> = None;
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        let sep = depth == 0 && (c.is_whitespace() || c == ',');
        match (sep, start) {
            (true, Some(s)) => {
                out.push(Atom::new(&value[s..i], s));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push(Atom::new(&value[s..], s));
    }
    out
}

/// Split on commas outside parentheses (shadow layers, transition lists).
pub fn split_layers(value: &str) -> Vec<Atom> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let push = |out: &mut Vec<Atom>, s: usize, e: usize| {
        let part = &value[s..e];
        let lead = part.len() - part.trim_start().len();
        if !part.trim().is_empty() {
            out.push(Atom::new(part.trim(), s + lead));
        }
    };
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                push(&mut out, start, i);
                start = i + 1;
            }
            _ => {}
        }
    }
    push(&mut out, start, value.len());
    out
}

/// Colour-bearing fragments of a value. `url(...)` contents are ignored.
pub fn color_atoms(value: &str) -> Vec<Atom> {
    let v = strip_important(value);
    let mut masked = v.to_string();
    for m in URL_FN.find_iter(v) {
        masked.replace_range(m.range(), &" ".repeat(m.len()));
    }
    COLOR_ATOM
        .find_iter(&masked)
        .map(|m| Atom::new(&v[m.range()], m.start()))
        .collect()
}

/// Length fragments: top-level words, with `calc()`/`min()`/`max()`/`clamp()`
/// opened up to their `var()` references and unit-bearing literals.
pub fn length_atoms(value: &str) -> Vec<Atom> {
    let v = strip_important(value);
    let mut out = Vec::new();
    for part in split_top_level(v) {
        let lower = part.text.to_ascii_lowercase();
        if lower.starts_with("var(") || !part.text.contains('(') {
            out.push(part);
            continue;
        }
        for m in FN_INNER_ATOM.find_iter(&part.text) {
            out.push(Atom::new(m.as_str(), part.offset + m.start()));
        }
    }
    out
}

/// Time literals and `var()` references in a transition/animation value.
pub fn time_atoms(value: &str) -> Vec<Atom> {
    let v = strip_important(value);
    TIME_ATOM
        .captures_iter(v)
        .filter_map(|caps| caps.name("var").or_else(|| caps.name("time")))
        .map(|m| Atom::new(m.as_str(), m.start()))
        .collect()
}
