//! Token registry: the approved design values, loaded once and read-only.
//!
//! The source is a CSS custom-property file. A token's category comes from
//! the nearest preceding section comment (`/* Colors */`), falling back to
//! the name prefix and then the value shape. Alias tokens
//! (`--a: var(--b)`) resolve transitively for numeric and colour lookups.

use crate::error::ConfigError;
use crate::models::token::{Category, Token};
use crate::values::{
    parse_blur_px, parse_color, parse_duration_ms, parse_font_weight, parse_length_px,
    split_number, Rgba,
};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)/\*(?P<comment>.*?)\*/|--(?P<name>[A-Za-z0-9_-]+)\s*:(?P<value>[^;{}]*)(?P<end>[;{}]|\z)",
    )
    .expect("registry regex")
});

static VAR_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^var\(\s*--([A-Za-z0-9_-]+)\s*(?:,.*)?\)$").expect("alias regex")
});

const MAX_ALIAS_DEPTH: usize = 8;

#[derive(Debug, Clone)]
/// Options that shape how a registry source is interpreted.
pub struct RegistryOptions {
    pub rem_base: f64,
    pub required: Vec<Category>,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        RegistryOptions {
            rem_base: 16.0,
            required: vec![Category::Color, Category::Spacing],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    tokens: Vec<Token>,
    index: HashMap<String, usize>,
    colors: Vec<Option<Rgba>>,
    source: Option<PathBuf>,
}

/// Load and validate the registry file at `path`.
pub fn load_registry(path: &Path, opts: &RegistryOptions) -> Result<Registry, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::RegistryMissing(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|source| ConfigError::RegistryRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reg = parse_registry(&text, opts)?;
    reg.source = Some(path.to_path_buf());
    debug!(tokens = reg.len(), path = %path.display(), "loaded token registry");
    Ok(reg)
}

/// Parse registry text. Fails on unterminated declarations, empty values,
/// tokens that fit no category, and absent required categories.
pub fn parse_registry(text: &str, opts: &RegistryOptions) -> Result<Registry, ConfigError> {
    let mut section: Option<Category> = None;
    let mut tokens: Vec<Token> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for caps in ENTRY.captures_iter(text) {
        if let Some(comment) = caps.name("comment") {
            let body = comment
                .as_str()
                .trim_matches(|c: char| c.is_whitespace() || matches!(c, '=' | '-' | '*' | '#'));
            // Short comments are section headers; prose ends the current section.
            section = if body.chars().count() <= 60 {
                header_category(body)
            } else {
                None
            };
            continue;
        }
        let (Some(name), Some(value), Some(end)) =
            (caps.name("name"), caps.name("value"), caps.name("end"))
        else {
            continue;
        };
        let line = text[..name.start()].matches('\n').count() + 1;
        let raw = value.as_str().trim();
        if raw.is_empty() {
            return Err(ConfigError::RegistryMalformed {
                line,
                message: format!("token '--{}' has an empty value", name.as_str()),
            });
        }
        if end.as_str() == "{" || end.as_str().is_empty() {
            return Err(ConfigError::RegistryMalformed {
                line,
                message: format!("token '--{}' is not terminated with ';'", name.as_str()),
            });
        }
        let name = name.as_str().to_string();
        if let Some(first) = seen.get(&name) {
            warn!(token = %name, line, first_line = *first, "token redefined; keeping first definition");
            continue;
        }
        let category = section
            .or_else(|| name_category(&name))
            .or_else(|| value_category(raw))
            .ok_or_else(|| ConfigError::RegistryMalformed {
                line,
                message: format!("cannot determine a category for token '--{}'", name),
            })?;
        seen.insert(name.clone(), line);
        tokens.push(Token::new(name, category, raw));
    }

    let reg = Registry::build(tokens, opts.rem_base)?;
    for cat in &opts.required {
        if reg.all_of_category(*cat).next().is_none() {
            return Err(ConfigError::MissingCategory(*cat));
        }
    }
    if reg.is_empty() {
        return Err(ConfigError::RegistryMalformed {
            line: 1,
            message: "no custom-property tokens found".into(),
        });
    }
    Ok(reg)
}

fn header_category(body: &str) -> Option<Category> {
    let h = body.to_ascii_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| h.contains(w));
    if has(&["z-index", "z index", "layer", "stacking"]) {
        Some(Category::ZIndex)
    } else if has(&["breakpoint", "media", "screen"]) {
        Some(Category::Breakpoint)
    } else if has(&["transition", "animation", "motion", "duration", "easing", "timing"]) {
        Some(Category::Transition)
    } else if has(&["typography", "font", "type scale"]) {
        Some(Category::Typography)
    } else if has(&["shadow", "effect", "blur", "glass", "elevation"]) {
        Some(Category::Effect)
    } else if has(&["border", "radius", "radii"]) {
        Some(Category::Border)
    } else if has(&["spacing", "space", "gap"]) {
        Some(Category::Spacing)
    } else if has(&["color", "colour", "palette", "surface", "background"]) {
        Some(Category::Color)
    } else {
        None
    }
}

fn name_category(name: &str) -> Option<Category> {
    let n = name.to_ascii_lowercase();
    for (prefix, cat) in [
        ("z-index", Category::ZIndex),
        ("line-height", Category::Typography),
        ("letter-spacing", Category::Typography),
        ("font-", Category::Typography),
    ] {
        if n.starts_with(prefix) {
            return Some(cat);
        }
    }
    let head = n.split('-').next().unwrap_or_default();
    match head {
        "color" | "bg" | "surface" | "accent" | "brand" | "primary" | "secondary" | "success"
        | "warning" | "error" | "danger" | "info" | "muted" | "foreground" | "fg" => {
            Some(Category::Color)
        }
        "space" | "spacing" | "gap" | "gutter" => Some(Category::Spacing),
        "font" | "leading" | "tracking" | "weight" => Some(Category::Typography),
        "shadow" | "blur" | "glass" | "elevation" | "backdrop" => Some(Category::Effect),
        "border" | "radius" | "outline" | "ring" => Some(Category::Border),
        "breakpoint" | "bp" | "screen" => Some(Category::Breakpoint),
        "duration" | "transition" | "ease" | "easing" | "animation" | "motion" | "delay" => {
            Some(Category::Transition)
        }
        "z" | "layer" => Some(Category::ZIndex),
        _ => None,
    }
}

fn value_category(raw: &str) -> Option<Category> {
    if parse_color(raw).is_some() {
        Some(Category::Color)
    } else if parse_duration_ms(raw).is_some() || raw.starts_with("cubic-bezier(") {
        Some(Category::Transition)
    } else if parse_length_px(raw, 16.0, false).is_some() {
        Some(Category::Spacing)
    } else if raw.contains("px") && (raw.contains("rgb") || raw.contains('#')) {
        Some(Category::Effect)
    } else {
        None
    }
}

/// Numeric value of a literal in the given category, if it has one.
fn literal_numeric(category: Category, raw: &str, rem_base: f64) -> Option<f64> {
    match category {
        Category::Color => None,
        Category::Transition => parse_duration_ms(raw),
        Category::ZIndex => split_number(raw).filter(|(_, u)| u.is_empty()).map(|(n, _)| n),
        Category::Effect => parse_blur_px(raw, rem_base),
        Category::Typography => parse_length_px(raw, rem_base, false)
            .or_else(|| parse_font_weight(raw)),
        Category::Spacing | Category::Breakpoint | Category::Border => {
            parse_length_px(raw, rem_base, false)
        }
    }
}

impl Registry {
    /// Build a registry from explicit tokens (rem base 16). Missing numeric
    /// values are derived from the raw value.
    pub fn from_tokens(tokens: Vec<Token>) -> Result<Registry, ConfigError> {
        Registry::build(tokens, 16.0)
    }

    fn build(mut tokens: Vec<Token>, rem_base: f64) -> Result<Registry, ConfigError> {
        let mut index = HashMap::with_capacity(tokens.len());
        for (i, t) in tokens.iter().enumerate() {
            if index.insert(t.name.clone(), i).is_some() {
                return Err(ConfigError::RegistryMalformed {
                    line: 0,
                    message: format!("duplicate token '--{}'", t.name),
                });
            }
        }
        let resolved: Vec<String> = (0..tokens.len())
            .map(|i| resolve_raw(&tokens, &index, i).to_string())
            .collect();
        for (t, raw) in tokens.iter_mut().zip(resolved.iter()) {
            if t.numeric_value.is_none() {
                t.numeric_value = literal_numeric(t.category, raw, rem_base);
            }
        }
        let colors = resolved.iter().map(|raw| parse_color(raw)).collect();
        Ok(Registry {
            tokens,
            index,
            colors,
            source: None,
        })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// File the registry was loaded from; the walker never scans it.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn lookup(&self, name: &str) -> Option<&Token> {
        self.index.get(name).map(|&i| &self.tokens[i])
    }

    pub fn all_of_category(&self, category: Category) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(move |t| t.category == category)
    }

    /// Colour a token resolves to, following aliases.
    pub fn resolve_color(&self, name: &str) -> Option<Rgba> {
        self.index.get(name).and_then(|&i| self.colors[i])
    }

    /// Token in `category` whose numeric value is closest to `value`.
    /// Ties keep the earlier token in source order.
    pub fn nearest_numeric<F>(&self, category: Category, value: f64, filter: F) -> Option<&Token>
    where
        F: Fn(&Token) -> bool,
    {
        let mut best: Option<(&Token, f64)> = None;
        for t in self.all_of_category(category).filter(|t| filter(t)) {
            let Some(n) = t.numeric_value else { continue };
            let d = (n - value).abs();
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((t, d));
            }
        }
        best.map(|(t, _)| t)
    }

    /// Number of tokens in `category` with exactly this numeric value.
    pub fn count_with_value(&self, category: Category, value: f64) -> usize {
        self.all_of_category(category)
            .filter(|t| t.numeric_value.is_some_and(|n| (n - value).abs() < 1e-6))
            .count()
    }

    /// Closest colour token among `categories` by CIE76 ΔE with an alpha
    /// penalty (100 per unit of alpha difference). `None` when the best
    /// distance exceeds `max_delta_e`.
    pub fn nearest_color(
        &self,
        categories: &[Category],
        color: Rgba,
        max_delta_e: f64,
        min_alpha: f64,
    ) -> Option<&Token> {
        let mut best: Option<(&Token, f64)> = None;
        for (i, t) in self.tokens.iter().enumerate() {
            if !categories.contains(&t.category) {
                continue;
            }
            let Some(c) = self.colors[i] else { continue };
            if c.a < min_alpha {
                continue;
            }
            let d = color.delta_e(c) + (color.a - c.a).abs() * 100.0;
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((t, d));
            }
        }
        best.filter(|(_, d)| *d <= max_delta_e).map(|(t, _)| t)
    }
}

fn resolve_raw<'a>(tokens: &'a [Token], index: &HashMap<String, usize>, start: usize) -> &'a str {
    let mut cur = start;
    for _ in 0..MAX_ALIAS_DEPTH {
        let raw = tokens[cur].raw_value.as_str();
        let Some(caps) = VAR_ALIAS.captures(raw) else {
            return raw;
        };
        match index.get(&caps[1]) {
            Some(&next) => cur = next,
            None => return raw,
        }
    }
    tokens[cur].raw_value.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
:root {
  /* ===== Colors ===== */
  --bg-primary: #09090b;
  --bg-card: #18181b;
  --border-subtle: rgba(255, 255, 255, 0.12);
  --text-primary: var(--white);
  --white: #ffffff;

  /* Spacing */
  --space-1: 4px;
  --space-2: 0.5rem;
  --space-4: 1rem;

  /* Typography */
  --font-size-sm: 14px;
  --font-weight-bold: 700;

  /* Motion */
  --duration-fast: 150ms;
  --ease-out: cubic-bezier(0.16, 1, 0.3, 1);

  /* Breakpoints */
  --breakpoint-md: 768px;

  /* This long comment explains the layering approach and is not a section header at all */
  --z-modal: 50;
}

[data-theme="light"] {
  --bg-primary: #ffffff;
}
"#;

    #[test]
    fn test_parse_sections_and_numeric_values() {
        let reg = parse_registry(SAMPLE, &RegistryOptions::default()).unwrap();
        assert_eq!(reg.lookup("bg-primary").unwrap().category, Category::Color);
        assert_eq!(reg.lookup("bg-primary").unwrap().raw_value, "#09090b");
        assert_eq!(reg.lookup("space-2").unwrap().numeric_value, Some(8.0));
        assert_eq!(reg.lookup("space-4").unwrap().numeric_value, Some(16.0));
        assert_eq!(reg.lookup("font-weight-bold").unwrap().category, Category::Typography);
        assert_eq!(reg.lookup("font-weight-bold").unwrap().numeric_value, Some(700.0));
        assert_eq!(reg.lookup("duration-fast").unwrap().numeric_value, Some(150.0));
        assert_eq!(reg.lookup("ease-out").unwrap().numeric_value, None);
        assert_eq!(reg.lookup("breakpoint-md").unwrap().category, Category::Breakpoint);
        // prose comment closes the Breakpoints section, so the name prefix decides
        let modal = reg.lookup("z-modal").unwrap();
        assert_eq!(modal.category, Category::ZIndex);
        assert_eq!(modal.numeric_value, Some(50.0));
        assert_eq!(reg.all_of_category(Category::Breakpoint).count(), 1);
        assert_eq!(reg.all_of_category(Category::Spacing).count(), 3);
    }

    #[test]
    fn test_alias_resolves_color() {
        let reg = parse_registry(SAMPLE, &RegistryOptions::default()).unwrap();
        assert_eq!(reg.resolve_color("text-primary"), Some(Rgba::WHITE));
        let subtle = reg.resolve_color("border-subtle").unwrap();
        assert!((subtle.a - 0.12).abs() < 1e-9);
    }

    #[test]
    fn test_name_prefix_used_without_section() {
        let reg = parse_registry(
            ":root { --space-3: 12px; --bg-app: #000; --z-index-toast: 90; }",
            &RegistryOptions::default(),
        )
        .unwrap();
        assert_eq!(reg.lookup("space-3").unwrap().category, Category::Spacing);
        assert_eq!(reg.lookup("z-index-toast").unwrap().category, Category::ZIndex);
    }

    #[test]
    fn test_malformed_and_missing_category_are_fatal() {
        let err = parse_registry(":root { --space-1: 4px; --bg: #000 {", &RegistryOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::RegistryMalformed { .. }));

        let err = parse_registry(":root { --space-1: ; }", &RegistryOptions::default()).unwrap_err();
        assert!(matches!(err, ConfigError::RegistryMalformed { line: 1, .. }));

        let err = parse_registry(":root { --space-1: 4px; }", &RegistryOptions::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCategory(Category::Color)));

        let err = parse_registry("", &RegistryOptions { required: vec![], ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, ConfigError::RegistryMalformed { .. }));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = load_registry(Path::new("/definitely/not/here.css"), &RegistryOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::RegistryMissing(_)));
    }

    #[test]
    fn test_from_tokens_rejects_duplicates() {
        let err = Registry::from_tokens(vec![
            Token::new("a", Category::Color, "#000"),
            Token::new("a", Category::Color, "#fff"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::RegistryMalformed { .. }));
    }

    #[test]
    fn test_nearest_color_respects_threshold() {
        let reg = parse_registry(SAMPLE, &RegistryOptions::default()).unwrap();
        let near_white = parse_color("#fefefe").unwrap();
        let hit = reg.nearest_color(&[Category::Color], near_white, 12.0, 0.0).unwrap();
        assert!(hit.name == "white" || hit.name == "text-primary");
        let magenta = parse_color("#ff00ff").unwrap();
        assert!(reg.nearest_color(&[Category::Color], magenta, 12.0, 0.0).is_none());
    }
}
