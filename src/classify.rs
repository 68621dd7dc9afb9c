//! Decide whether a candidate declaration honours the token system.
//!
//! Order of checks: acceptable literal, `var()` reference (resolved against
//! the registry), breakpoint value match, then violation with a suggestion.
//! `Classifier::evaluate` layers the border-opacity rule and fix planning on
//! top of the base classification.

use crate::extract::strip_important;
use crate::models::token::{Category, Token};
use crate::models::{
    CandidateDeclaration, ClassificationResult, Severity, SourceKind, Status, SyntaxKind,
    ViolationReason,
};
use crate::registry::Registry;
use crate::values::{
    parse_blur_px, parse_color, parse_duration_ms, parse_font_weight, parse_length_px, split_number,
};
use regex::Regex;
use std::sync::LazyLock;

static VAR_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^var\(\s*--([A-Za-z0-9_-]+)\s*(?:,.*)?\)$").expect("var name regex")
});

/// `rgb(var(--x) / 0.5)`, `hsl(var(--x))`: channel tokens inside a colour function.
static CHANNEL_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:rgba?|hsla?)\(\s*var\(\s*--([A-Za-z0-9_-]+)\s*(?:,[^()]*)?\)")
        .expect("channel var regex")
});

static BLUR_ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)blur\(\s*([^)\s]+)\s*\)").expect("blur regex"));

const ALWAYS_ACCEPTABLE: &[&str] = &[
    "0",
    "transparent",
    "currentcolor",
    "inherit",
    "initial",
    "unset",
    "auto",
    "revert",
    "revert-layer",
];

/// Tunables for classification, filled from configuration.
#[derive(Debug, Clone)]
pub struct Policy {
    pub rem_base: f64,
    /// Border colours below this alpha are `LowOpacity` violations.
    pub min_border_opacity: f64,
    /// Largest colour distance still offered as a suggestion.
    pub max_color_delta_e: f64,
    /// `var(--<prefix>...)` references to third-party variables are accepted.
    pub ignore_var_prefixes: Vec<String>,
}

impl Default for Policy {
    fn default() -> Self {
        Policy {
            rem_base: 16.0,
            min_border_opacity: 0.12,
            max_color_delta_e: 12.0,
            ignore_var_prefixes: vec!["tw-".to_string()],
        }
    }
}

/// Classify with the default policy.
pub fn classify(decl: &CandidateDeclaration, registry: &Registry) -> ClassificationResult {
    let policy = Policy::default();
    Classifier::new(registry, &policy).classify(decl)
}

/// Literals that never need a token: keywords, percentages, zero lengths and
/// a few category-specific keywords.
pub fn is_acceptable_literal(raw: &str, category: Category) -> bool {
    let v = raw.trim().to_ascii_lowercase();
    if ALWAYS_ACCEPTABLE.contains(&v.as_str()) {
        return true;
    }
    if let Some((n, unit)) = split_number(&v) {
        if unit == "%" || n == 0.0 {
            return true;
        }
    }
    match category {
        Category::Typography => v == "normal",
        Category::Effect | Category::Transition => v == "none",
        _ => false,
    }
}

/// Name referenced by a `var(--name)` / `var(--name, fallback)` value.
pub fn var_name(raw: &str) -> Option<&str> {
    VAR_NAME.captures(raw.trim()).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Token categories a reference may resolve to for a usage category.
pub fn accepted_categories(category: Category) -> &'static [Category] {
    match category {
        Category::Color => &[Category::Color],
        Category::Spacing => &[Category::Spacing],
        Category::Typography => &[Category::Typography],
        Category::Effect => &[Category::Effect],
        Category::Border => &[Category::Border, Category::Color],
        Category::Breakpoint => &[Category::Breakpoint],
        Category::Transition => &[Category::Transition],
        Category::ZIndex => &[Category::ZIndex],
    }
}

/// Severity from the surface and scope of a declaration.
pub fn severity_for(decl: &CandidateDeclaration) -> Severity {
    match (decl.syntax_kind, decl.source_kind) {
        (SyntaxKind::InlineStyleObject, SourceKind::ComponentMarkup) => Severity::Critical,
        (_, SourceKind::Stylesheet) if decl.component_scoped => Severity::High,
        (_, SourceKind::Stylesheet) => Severity::Medium,
        _ => Severity::High,
    }
}

pub struct Classifier<'a> {
    registry: &'a Registry,
    policy: &'a Policy,
}

impl<'a> Classifier<'a> {
    pub fn new(registry: &'a Registry, policy: &'a Policy) -> Self {
        Classifier { registry, policy }
    }

    /// Base classification. Pure: same inputs, same result.
    pub fn classify(&self, decl: &CandidateDeclaration) -> ClassificationResult {
        let raw = strip_important(decl.raw_value.trim());
        if is_acceptable_literal(raw, decl.category) {
            return ClassificationResult::acceptable();
        }
        if let Some(name) = var_name(raw) {
            return self.classify_reference(decl, name);
        }
        if matches!(decl.category, Category::Color | Category::Border) {
            if let Some(caps) = CHANNEL_VAR.captures(raw) {
                return self.classify_reference(decl, &caps[1]);
            }
        }
        if decl.category == Category::Breakpoint {
            if let Some(token) = self.breakpoint_match(decl, raw) {
                return ClassificationResult::token_reference(token.clone());
            }
        }
        let (reason, suggestion) = self.suggest(decl, raw);
        ClassificationResult::violation(reason, severity_for(decl), suggestion.cloned())
    }

    /// Base classification plus the border-opacity rule and an automatic fix
    /// when one is unambiguous.
    pub fn evaluate(&self, decl: &CandidateDeclaration) -> ClassificationResult {
        let mut result = self.classify(decl);
        if decl.category == Category::Border && result.status != Status::AcceptableLiteral {
            result = self.check_border_opacity(decl, result);
        }
        if result.is_violation() {
            result.fix = self.plan_fix(decl, &result);
        }
        result
    }

    fn classify_reference(&self, decl: &CandidateDeclaration, name: &str) -> ClassificationResult {
        if self
            .policy
            .ignore_var_prefixes
            .iter()
            .any(|p| !p.is_empty() && name.starts_with(p.as_str()))
        {
            return ClassificationResult::acceptable();
        }
        match self.registry.lookup(name) {
            Some(t) if accepted_categories(decl.category).contains(&t.category) => {
                ClassificationResult::token_reference(t.clone())
            }
            Some(_) => ClassificationResult::violation(
                ViolationReason::CategoryMismatch,
                severity_for(decl),
                None,
            ),
            None => ClassificationResult::violation(
                ViolationReason::DanglingReference,
                severity_for(decl),
                None,
            ),
        }
    }

    /// A media-query literal equal to a breakpoint token (or, for
    /// `max-width`, up to 1px below one) counts as using that token.
    fn breakpoint_match(&self, decl: &CandidateDeclaration, raw: &str) -> Option<&'a Token> {
        let px = parse_length_px(raw, self.policy.rem_base, false)?;
        let max = decl.property == "max-width";
        self.registry
            .all_of_category(Category::Breakpoint)
            .find(|t| match t.numeric_value {
                Some(bp) if max => (bp - px) >= -1e-6 && (bp - px) <= 1.0 + 1e-6,
                Some(bp) => (bp - px).abs() < 1e-6,
                None => false,
            })
    }

    fn suggest(&self, decl: &CandidateDeclaration, raw: &str) -> (ViolationReason, Option<&'a Token>) {
        use ViolationReason::{HardcodedValue, Unparsable};
        let reg = self.registry;
        let rem = self.policy.rem_base;
        let inline = decl.syntax_kind == SyntaxKind::InlineStyleObject;
        let any = |_: &Token| true;
        match decl.category {
            Category::Spacing => match parse_length_px(raw, rem, inline) {
                Some(px) => (HardcodedValue, reg.nearest_numeric(Category::Spacing, px.abs(), any)),
                None => (Unparsable, None),
            },
            Category::Breakpoint => match parse_length_px(raw, rem, false) {
                Some(px) => (HardcodedValue, reg.nearest_numeric(Category::Breakpoint, px, any)),
                None => (Unparsable, None),
            },
            Category::Transition => match parse_duration_ms(raw) {
                Some(ms) => (HardcodedValue, reg.nearest_numeric(Category::Transition, ms, any)),
                None => (Unparsable, None),
            },
            Category::Typography => self.suggest_typography(decl, raw),
            Category::Color | Category::Border => match parse_color(raw) {
                Some(c) => {
                    let min_alpha = if decl.category == Category::Border {
                        self.policy.min_border_opacity
                    } else {
                        0.0
                    };
                    let cats = accepted_categories(decl.category);
                    (
                        HardcodedValue,
                        reg.nearest_color(cats, c, self.policy.max_color_delta_e, min_alpha),
                    )
                }
                None => (Unparsable, None),
            },
            Category::Effect => (HardcodedValue, self.suggest_effect(decl, raw)),
            Category::ZIndex => (HardcodedValue, None),
        }
    }

    fn suggest_typography(
        &self,
        decl: &CandidateDeclaration,
        raw: &str,
    ) -> (ViolationReason, Option<&'a Token>) {
        use ViolationReason::{HardcodedValue, Unparsable};
        let reg = self.registry;
        let rem = self.policy.rem_base;
        let inline = decl.syntax_kind == SyntaxKind::InlineStyleObject;
        let (value, facets): (Option<f64>, &[&str]) = match decl.property.as_str() {
            "font-family" => {
                let first = first_family(raw);
                let hit = reg
                    .all_of_category(Category::Typography)
                    .find(|t| first_family(&t.raw_value) == first);
                return (HardcodedValue, hit);
            }
            "font-weight" => (parse_font_weight(raw), &["weight"]),
            "line-height" => {
                // Unitless multipliers and lengths are separate scales.
                let unitless = split_number(raw).is_some_and(|(_, u)| u.is_empty());
                let value = if unitless {
                    split_number(raw).map(|(n, _)| n)
                } else {
                    parse_length_px(raw, rem, false)
                };
                let Some(v) = value else {
                    return (Unparsable, None);
                };
                let hit = reg.nearest_numeric(Category::Typography, v, |t| {
                    ["leading", "line-height"].iter().any(|f| t.name.contains(f))
                        && split_number(&t.raw_value).is_some_and(|(_, u)| u.is_empty()) == unitless
                });
                return (HardcodedValue, hit);
            }
            "letter-spacing" => (parse_length_px(raw, rem, inline), &["tracking", "letter-spacing"]),
            _ => (parse_length_px(raw, rem, inline), &["size", "text-", "font-size"]),
        };
        match value {
            Some(v) => (
                HardcodedValue,
                reg.nearest_numeric(Category::Typography, v, |t| {
                    facets.iter().any(|f| t.name.contains(f))
                }),
            ),
            None => (Unparsable, None),
        }
    }

    fn suggest_effect(&self, decl: &CandidateDeclaration, raw: &str) -> Option<&'a Token> {
        let norm = normalize(raw);
        let reg = self.registry;
        if let Some(t) = reg
            .all_of_category(Category::Effect)
            .find(|t| normalize(&t.raw_value) == norm)
        {
            return Some(t);
        }
        let blur = BLUR_ARG
            .captures(raw)
            .and_then(|c| parse_length_px(&c[1], self.policy.rem_base, false))
            .or_else(|| {
                (decl.property.contains("filter"))
                    .then(|| parse_blur_px(raw, self.policy.rem_base))
                    .flatten()
            })?;
        reg.nearest_numeric(Category::Effect, blur, |t| {
            t.name.contains("blur") || t.raw_value.to_ascii_lowercase().contains("blur")
        })
    }

    fn check_border_opacity(
        &self,
        decl: &CandidateDeclaration,
        result: ClassificationResult,
    ) -> ClassificationResult {
        let color = match result.status {
            Status::TokenReference => result
                .matched_token
                .as_ref()
                .and_then(|t| self.registry.resolve_color(&t.name)),
            _ => parse_color(strip_important(decl.raw_value.trim())),
        };
        let Some(color) = color else {
            return result;
        };
        let min = self.policy.min_border_opacity;
        if color.a + 1e-9 >= min {
            return ClassificationResult {
                alpha: Some(color.a),
                ..result
            };
        }
        let suggestion = self.registry.nearest_color(
            accepted_categories(Category::Border),
            color,
            self.policy.max_color_delta_e,
            min,
        );
        ClassificationResult {
            alpha: Some(color.a),
            ..ClassificationResult::violation(
                ViolationReason::LowOpacity,
                severity_for(decl),
                suggestion.cloned(),
            )
        }
    }

    /// Replacement text when exactly one token carries the literal's value.
    fn plan_fix(&self, decl: &CandidateDeclaration, result: &ClassificationResult) -> Option<String> {
        if result.reason != Some(ViolationReason::HardcodedValue)
            || decl.syntax_kind == SyntaxKind::MediaQuery
        {
            return None;
        }
        let token = result.suggested_token.as_ref()?;
        let raw = decl.raw_value.trim();
        if raw.starts_with('-') {
            return None;
        }
        let inline = decl.syntax_kind == SyntaxKind::InlineStyleObject;
        let value = match decl.category {
            Category::Spacing => parse_length_px(raw, self.policy.rem_base, inline)?,
            Category::Transition => parse_duration_ms(raw)?,
            _ => return None,
        };
        let exact = token.numeric_value.is_some_and(|n| (n - value).abs() < 1e-6);
        if !exact || self.registry.count_with_value(decl.category, value) != 1 {
            return None;
        }
        let bare_number = inline && split_number(raw).is_some_and(|(_, u)| u.is_empty());
        Some(if bare_number {
            format!("'{}'", token.var_ref())
        } else {
            token.var_ref()
        })
    }
}

fn first_family(raw: &str) -> String {
    raw.split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_ascii_lowercase()
}

fn normalize(raw: &str) -> String {
    raw.to_ascii_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(", ", ",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{parse_registry, RegistryOptions};

    const TOKENS: &str = r#"
:root {
  /* Colors */
  --bg-primary: #09090b;
  --bg-card: #18181b;
  --text-primary: #ffffff;
  --accent: #6366f1;
  /* Borders */
  --border-subtle: rgba(255, 255, 255, 0.12);
  --border-strong: rgba(255, 255, 255, 0.24);
  /* Spacing */
  --space-2: 8px;
  --space-3: 12px;
  --space-4: 16px;
  --space-gutter: 16px;
  --space-6: 24px;
  /* Typography */
  --font-sans: Inter, system-ui, sans-serif;
  --text-sm: 14px;
  --text-base: 16px;
  --weight-semibold: 600;
  /* Effects */
  --shadow-sm: 0 1px 2px rgba(0, 0, 0, 0.3);
  --blur-md: blur(12px);
  /* Breakpoints */
  --bp-md: 768px;
  --bp-lg: 1024px;
  /* Motion */
  --duration-fast: 150ms;
  --duration-base: 250ms;
}
"#;

    fn registry() -> Registry {
        parse_registry(TOKENS, &RegistryOptions::default()).unwrap()
    }

    fn decl(category: Category, property: &str, raw: &str, syntax: SyntaxKind, kind: SourceKind) -> CandidateDeclaration {
        CandidateDeclaration::detached(category, property, raw, syntax, kind)
    }

    fn css(category: Category, property: &str, raw: &str) -> CandidateDeclaration {
        decl(category, property, raw, SyntaxKind::CssDeclaration, SourceKind::Stylesheet)
    }

    #[test]
    fn test_acceptable_literals() {
        let reg = registry();
        for raw in ["0", "0px", "auto", "inherit", "transparent", "50%", "revert-layer"] {
            let r = classify(&css(Category::Spacing, "padding", raw), &reg);
            assert_eq!(r.status, Status::AcceptableLiteral, "{}", raw);
        }
        assert_eq!(
            classify(&css(Category::Typography, "line-height", "normal"), &reg).status,
            Status::AcceptableLiteral
        );
        assert_eq!(
            classify(&css(Category::Effect, "box-shadow", "none"), &reg).status,
            Status::AcceptableLiteral
        );
    }

    #[test]
    fn test_token_reference() {
        let reg = registry();
        let r = classify(&css(Category::Color, "color", "var(--text-primary)"), &reg);
        assert_eq!(r.status, Status::TokenReference);
        assert_eq!(r.matched_token.unwrap().name, "text-primary");
        let r = classify(&css(Category::Spacing, "gap", "var(--space-4, 16px)"), &reg);
        assert_eq!(r.status, Status::TokenReference);
    }

    #[test]
    fn test_dangling_and_mismatch() {
        let reg = registry();
        let r = classify(&css(Category::Color, "color", "var(--text-muted)"), &reg);
        assert_eq!(r.reason, Some(ViolationReason::DanglingReference));
        let r = classify(&css(Category::Spacing, "padding", "var(--accent)"), &reg);
        assert_eq!(r.reason, Some(ViolationReason::CategoryMismatch));
        // border usages may reference colour tokens
        let r = classify(&css(Category::Border, "border-color", "var(--accent)"), &reg);
        assert_eq!(r.status, Status::TokenReference);
    }

    #[test]
    fn test_ignored_prefix_is_acceptable() {
        let reg = registry();
        let r = classify(&css(Category::Spacing, "margin", "var(--tw-space-x-reverse)"), &reg);
        assert_eq!(r.status, Status::AcceptableLiteral);
    }

    #[test]
    fn test_inline_hex_is_critical_with_suggestion() {
        let reg = registry();
        let d = decl(
            Category::Color,
            "background-color",
            "#ffffff",
            SyntaxKind::InlineStyleObject,
            SourceKind::ComponentMarkup,
        );
        let r = classify(&d, &reg);
        assert_eq!(r.status, Status::Violation);
        assert_eq!(r.severity, Some(Severity::Critical));
        assert_eq!(r.reason, Some(ViolationReason::HardcodedValue));
        assert_eq!(r.suggested_token.unwrap().name, "text-primary");
    }

    #[test]
    fn test_spacing_suggestion_and_severity_by_scope() {
        let reg = registry();
        let mut d = css(Category::Spacing, "padding", "13px");
        let r = classify(&d, &reg);
        assert_eq!(r.severity, Some(Severity::Medium));
        assert_eq!(r.suggested_token.unwrap().name, "space-3");
        d.component_scoped = true;
        assert_eq!(classify(&d, &reg).severity, Some(Severity::High));
    }

    #[test]
    fn test_unparsable_values() {
        let reg = registry();
        let r = classify(&css(Category::Color, "color", "#fffff"), &reg);
        assert_eq!(r.reason, Some(ViolationReason::Unparsable));
        let r = classify(&css(Category::Spacing, "padding", "12parsecs"), &reg);
        assert_eq!(r.reason, Some(ViolationReason::Unparsable));
    }

    #[test]
    fn test_breakpoint_value_match() {
        let reg = registry();
        let media = |prop: &str, raw: &str| {
            decl(Category::Breakpoint, prop, raw, SyntaxKind::MediaQuery, SourceKind::Stylesheet)
        };
        let r = classify(&media("min-width", "768px"), &reg);
        assert_eq!(r.status, Status::TokenReference);
        let r = classify(&media("max-width", "767px"), &reg);
        assert_eq!(r.matched_token.unwrap().name, "bp-md");
        let r = classify(&media("min-width", "769px"), &reg);
        assert_eq!(r.status, Status::Violation);
        assert_eq!(r.severity, Some(Severity::Medium));
        assert_eq!(r.suggested_token.unwrap().name, "bp-md");
        assert!(r.fix.is_none());
    }

    #[test]
    fn test_typography_facets() {
        let reg = registry();
        let r = classify(&css(Category::Typography, "font-size", "15px"), &reg);
        assert_eq!(r.suggested_token.unwrap().name, "text-sm");
        let r = classify(&css(Category::Typography, "font-weight", "600"), &reg);
        assert_eq!(r.suggested_token.unwrap().name, "weight-semibold");
        let r = classify(&css(Category::Typography, "font-family", "'Inter', sans-serif"), &reg);
        assert_eq!(r.suggested_token.unwrap().name, "font-sans");
    }

    #[test]
    fn test_effect_suggestions() {
        let reg = registry();
        let r = classify(&css(Category::Effect, "box-shadow", "0 1px 2px rgba(0,0,0,0.3)"), &reg);
        assert_eq!(r.suggested_token.unwrap().name, "shadow-sm");
        let r = classify(&css(Category::Effect, "backdrop-filter", "blur(10px)"), &reg);
        assert_eq!(r.suggested_token.unwrap().name, "blur-md");
    }

    #[test]
    fn test_border_opacity_layer() {
        let reg = registry();
        let policy = Policy::default();
        let c = Classifier::new(&reg, &policy);
        let d = css(Category::Border, "border", "rgba(255, 255, 255, 0.08)");
        let r = c.evaluate(&d);
        assert_eq!(r.reason, Some(ViolationReason::LowOpacity));
        assert_eq!(r.suggested_token.unwrap().name, "border-subtle");
        assert!((r.alpha.unwrap() - 0.08).abs() < 1e-9);

        let r = c.evaluate(&css(Category::Border, "border", "var(--border-subtle)"));
        assert_eq!(r.status, Status::TokenReference);
        assert!((r.alpha.unwrap() - 0.12).abs() < 1e-9);
    }

    #[test]
    fn test_fix_only_for_unique_exact_values() {
        let reg = registry();
        let policy = Policy::default();
        let c = Classifier::new(&reg, &policy);
        let r = c.evaluate(&css(Category::Spacing, "padding", "12px"));
        assert_eq!(r.fix.as_deref(), Some("var(--space-3)"));
        // two tokens carry 16px
        assert!(c.evaluate(&css(Category::Spacing, "padding", "16px")).fix.is_none());
        assert!(c.evaluate(&css(Category::Spacing, "padding", "13px")).fix.is_none());
        let r = c.evaluate(&css(Category::Transition, "transition", "150ms"));
        assert_eq!(r.fix.as_deref(), Some("var(--duration-fast)"));
        let inline = decl(
            Category::Spacing,
            "padding",
            "24",
            SyntaxKind::InlineStyleObject,
            SourceKind::ComponentMarkup,
        );
        assert_eq!(c.evaluate(&inline).fix.as_deref(), Some("'var(--space-6)'"));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let reg = registry();
        let d = css(Category::Color, "color", "#6466f0");
        let a = classify(&d, &reg);
        let b = classify(&d, &reg);
        assert_eq!(a.status, b.status);
        assert_eq!(a.suggested_token, b.suggested_token);
        assert_eq!(a.suggested_token.unwrap().name, "accent");
    }

    #[test]
    fn test_channel_tokens_inside_color_functions() {
        let reg = registry();
        let r = classify(&css(Category::Color, "color", "rgb(var(--accent) / 0.5)"), &reg);
        assert_eq!(r.status, Status::TokenReference);
        assert_eq!(r.matched_token.unwrap().name, "accent");
        let r = classify(&css(Category::Color, "background", "hsl(var(--bg-primary))"), &reg);
        assert_eq!(r.status, Status::TokenReference);
        let r = classify(&css(Category::Color, "color", "hsl(var(--nope) / 0.4)"), &reg);
        assert_eq!(r.reason, Some(ViolationReason::DanglingReference));
    }

    #[test]
    fn test_line_height_lengths_and_multipliers() {
        let reg = Registry::from_tokens(vec![
            Token::new("bg", Category::Color, "#000"),
            Token::new("leading-tight", Category::Typography, "1.25"),
            Token::new("leading-normal", Category::Typography, "24px"),
        ])
        .unwrap();
        let r = classify(&css(Category::Typography, "line-height", "24px"), &reg);
        assert_eq!(r.reason, Some(ViolationReason::HardcodedValue));
        assert_eq!(r.suggested_token.unwrap().name, "leading-normal");
        let r = classify(&css(Category::Typography, "line-height", "1.5rem"), &reg);
        assert_eq!(r.suggested_token.unwrap().name, "leading-normal");
        let r = classify(&css(Category::Typography, "line-height", "1.3"), &reg);
        assert_eq!(r.suggested_token.unwrap().name, "leading-tight");
        let r = classify(&css(Category::Typography, "line-height", "12vw"), &reg);
        assert_eq!(r.reason, Some(ViolationReason::Unparsable));
    }
}
