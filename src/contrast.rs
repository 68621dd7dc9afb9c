//! WCAG 2.1 relative luminance and contrast ratio.
//!
//! Thresholds are policy and live in configuration (`[contrast]`); this
//! module only computes.

use crate::error::ConfigError;
use crate::registry::Registry;
use crate::values::{parse_color, Rgba};
use serde::{Deserialize, Serialize};

fn channel(c: u8) -> f64 {
    let c = c as f64 / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance of an opaque colour (alpha is ignored).
pub fn relative_luminance(color: Rgba) -> f64 {
    0.2126 * channel(color.r) + 0.7152 * channel(color.g) + 0.0722 * channel(color.b)
}

/// Contrast ratio in [1, 21]; symmetric in its arguments.
pub fn contrast_ratio(a: Rgba, b: Rgba) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (hi, lo) = if la >= lb { (la, lb) } else { (lb, la) };
    (hi + 0.05) / (lo + 0.05)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
/// Which threshold a pair is judged against.
pub enum PairKind {
    /// Body text.
    #[default]
    Text,
    /// Large elements, borders, card-vs-page surfaces.
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub text: f64,
    pub large: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            text: 4.5,
            large: 3.0,
        }
    }
}

impl Thresholds {
    pub fn for_kind(&self, kind: PairKind) -> f64 {
        match kind {
            PairKind::Text => self.text,
            PairKind::Large => self.large,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
/// Evaluated foreground/background pair.
pub struct ContrastPair {
    pub foreground: String,
    pub background: String,
    pub kind: PairKind,
    pub ratio: f64,
    pub required: f64,
    pub passes_aa: bool,
}

impl ContrastPair {
    /// Evaluate two colours. A translucent foreground is composited over the
    /// background first; a translucent background is composited over black.
    pub fn evaluate(
        fg_label: impl Into<String>,
        fg: Rgba,
        bg_label: impl Into<String>,
        bg: Rgba,
        kind: PairKind,
        thresholds: &Thresholds,
    ) -> Self {
        let bg = if bg.a < 1.0 { bg.over(Rgba::BLACK) } else { bg };
        let fg = if fg.a < 1.0 { fg.over(bg) } else { fg };
        let ratio = contrast_ratio(fg, bg);
        let required = thresholds.for_kind(kind);
        ContrastPair {
            foreground: fg_label.into(),
            background: bg_label.into(),
            kind,
            ratio,
            required,
            passes_aa: ratio >= required,
        }
    }
}

/// Resolve a CLI/config operand: a token name (with or without `--`), a
/// `var(--x)` reference, or a literal colour.
pub fn resolve_operand(registry: &Registry, operand: &str) -> Result<Rgba, ConfigError> {
    let s = operand.trim();
    let name = s
        .strip_prefix("var(")
        .and_then(|r| r.strip_suffix(')'))
        .unwrap_or(s)
        .trim_start_matches("--");
    if let Some(c) = registry.resolve_color(name) {
        return Ok(c);
    }
    parse_color(s).ok_or_else(|| ConfigError::UnknownColor(operand.to_string()))
}
