//! Syntactic surfaces: finds raw property/value pairs in a source file.
//!
//! Four surfaces are recognised:
//! - CSS declarations (`prop: value;`) in stylesheets.
//! - Inline style objects (`style={{ ... }}`, `CSSProperties = { ... }`).
//! - Utility-class literals with arbitrary values (`p-[13px]`, `[color:#fff]`),
//!   in markup/scripts and inside `@apply` rules.
//! - Media queries (`@media (min-width: ...)`, `matchMedia('(...)')`).
//!
//! Comments are blanked out before matching so their content is never
//! reported. Blanking keeps byte offsets stable.

use super::Budget;
use crate::error::FileError;
use crate::models::{SourceFile, SourceKind, SyntaxKind};
use regex::Regex;
use std::sync::LazyLock;

static CSS_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<prop>-{0,2}[A-Za-z][A-Za-z0-9-]*)\s*:\s*(?P<value>[^;{}]*[^;{}\s])\s*(?P<end>[;{}]|\z)",
    )
    .expect("css declaration regex")
});

static INLINE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"style\s*=\s*\{\s*\{|CSSProperties\s*=\s*\{").expect("inline open regex")
});

static INLINE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?P<prop>[A-Za-z][A-Za-z0-9]*|'[A-Za-z-]+'|"[A-Za-z-]+")\s*:\s*(?:'(?P<sq>[^'\n]*)'|"(?P<dq>[^"\n]*)"|`(?P<bt>[^`]*)`|(?P<num>-?(?:\d+(?:\.\d+)?|\.\d+))\b)"#,
    )
    .expect("inline pair regex")
});

static UTILITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:^|[\s"'`{(,:!])-?(?P<prefix>bg|text|border(?:-[trblxy])?|ring|outline|fill|stroke|from|via|to|divide|decoration|caret|accent|p[xytrbl]?|m[xytrbl]?|gap(?:-[xy])?|space-[xy]|inset(?:-[xy])?|top|right|bottom|left|shadow|drop-shadow|backdrop-blur|blur|duration|delay|font|leading|tracking|min|max)-\[(?P<value>[^\]\s"'`]+)\]"#,
    )
    .expect("utility regex")
});

static ARBITRARY_PROP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[\s"'`{(,:!])\[(?P<prop>[a-z-]+):(?P<value>[^\]\s"'`]+)\]"#)
        .expect("arbitrary property regex")
});

static APPLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@apply\s[^;{}]*").expect("apply regex"));

static MEDIA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@media[^{;]*").expect("media regex"));

static MATCH_MEDIA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:matchMedia|useMediaQuery)\(\s*['"`](?P<query>[^'"`]+)['"`]"#)
        .expect("matchMedia regex")
});

static MEDIA_FEATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\(\s*(?:(?P<prop>min-width|max-width)\s*:\s*(?P<value>[^)\s]+)|width\s*(?P<op>>=|<=|>|<)\s*(?P<rvalue>[^)\s]+))\s*\)",
    )
    .expect("media feature regex")
});

#[derive(Debug, Clone, PartialEq)]
/// A property/value pair as found on one surface, before category filtering.
pub struct RawDeclaration {
    pub property: String,
    pub value: String,
    /// Byte offset of `value` in the file text.
    pub value_start: usize,
    pub syntax: SyntaxKind,
}

/// Maps byte offsets to 1-based line/column.
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        LineIndex { starts }
    }

    pub fn position(&self, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&s| s <= offset).max(1);
        (line, offset - self.starts[line - 1] + 1)
    }

    /// Trimmed text of the line containing `offset`, capped at 160 chars.
    pub fn line_text<'a>(&self, text: &'a str, offset: usize) -> &'a str {
        let (line, _) = self.position(offset);
        let start = self.starts[line - 1];
        let end = self.starts.get(line).map(|e| e - 1).unwrap_or(text.len());
        let s = text.get(start..end).unwrap_or_default().trim();
        match s.char_indices().nth(160) {
            Some((i, _)) => &s[..i],
            None => s,
        }
    }
}

/// All raw declarations of one file plus its line index.
pub struct Surface {
    pub decls: Vec<RawDeclaration>,
    pub lines: LineIndex,
}

impl Surface {
    pub fn scan(file: &SourceFile, budget: &Budget) -> Result<Surface, FileError> {
        let masked = mask_comments(&file.text, file.kind);
        let mut decls = Vec::new();
        match file.kind {
            SourceKind::Stylesheet => {
                scan_css_declarations(&masked, &mut decls, budget, &file.display)?;
                scan_media_queries(&masked, &mut decls, budget, &file.display)?;
                for m in APPLY.find_iter(&masked) {
                    budget.check(&file.display)?;
                    scan_utilities(m.as_str(), m.start(), &mut decls);
                }
            }
            SourceKind::ComponentMarkup | SourceKind::Script => {
                scan_inline_styles(&masked, &mut decls, budget, &file.display)?;
                budget.check(&file.display)?;
                scan_utilities(&masked, 0, &mut decls);
                scan_match_media(&masked, &mut decls);
            }
        }
        decls.sort_by_key(|d| d.value_start);
        Ok(Surface {
            decls,
            lines: LineIndex::new(&file.text),
        })
    }
}

/// Replace comment bytes with spaces (newlines kept). Strings are skipped
/// so `//` inside a URL literal is not a comment.
pub fn mask_comments(text: &str, kind: SourceKind) -> String {
    let bytes = text.as_bytes();
    let mut out = bytes.to_vec();
    let line_comments = kind != SourceKind::Stylesheet;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = text[i + 2..]
                    .find("*/")
                    .map(|p| i + 2 + p + 2)
                    .unwrap_or(bytes.len());
                blank(&mut out, i, end);
                i = end;
            }
            b'/' if line_comments && bytes.get(i + 1) == Some(&b'/') => {
                let end = text[i..].find('\n').map(|p| i + p).unwrap_or(bytes.len());
                blank(&mut out, i, end);
                i = end;
            }
            b'"' | b'\'' | b'`' => {
                let mut j = i + 1;
                while j < bytes.len() && bytes[j] != b {
                    if bytes[j] == b'\\' {
                        j += 1;
                    } else if bytes[j] == b'\n' && b != b'`' {
                        break;
                    }
                    j += 1;
                }
                i = j + 1;
            }
            _ => i += 1,
        }
    }
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

fn blank(out: &mut [u8], start: usize, end: usize) {
    for b in &mut out[start..end] {
        if *b != b'\n' {
            *b = b' ';
        }
    }
}

fn scan_css_declarations(
    text: &str,
    decls: &mut Vec<RawDeclaration>,
    budget: &Budget,
    path: &str,
) -> Result<(), FileError> {
    for caps in CSS_DECL.captures_iter(text) {
        budget.check(path)?;
        let (Some(prop), Some(value), Some(end)) = (caps.name("prop"), caps.name("value"), caps.name("end"))
        else {
            continue;
        };
        // Selectors (`a:hover {`) and local custom-property definitions are not usages.
        if end.as_str() == "{" || prop.as_str().starts_with("--") {
            continue;
        }
        decls.push(RawDeclaration {
            property: prop.as_str().to_ascii_lowercase(),
            value: value.as_str().to_string(),
            value_start: value.start(),
            syntax: SyntaxKind::CssDeclaration,
        });
    }
    Ok(())
}

fn scan_media_queries(
    text: &str,
    decls: &mut Vec<RawDeclaration>,
    budget: &Budget,
    path: &str,
) -> Result<(), FileError> {
    for m in MEDIA.find_iter(text) {
        budget.check(path)?;
        push_media_features(m.as_str(), m.start(), decls);
    }
    Ok(())
}

fn push_media_features(query: &str, base: usize, decls: &mut Vec<RawDeclaration>) {
    for caps in MEDIA_FEATURE.captures_iter(query) {
        let (property, value) = match (caps.name("prop"), caps.name("value")) {
            (Some(p), Some(v)) => (p.as_str().to_string(), v),
            _ => {
                let (Some(op), Some(v)) = (caps.name("op"), caps.name("rvalue")) else {
                    continue;
                };
                let prop = if op.as_str().starts_with('>') { "min-width" } else { "max-width" };
                (prop.to_string(), v)
            }
        };
        decls.push(RawDeclaration {
            property,
            value: value.as_str().to_string(),
            value_start: base + value.start(),
            syntax: SyntaxKind::MediaQuery,
        });
    }
}

fn scan_match_media(text: &str, decls: &mut Vec<RawDeclaration>) {
    for caps in MATCH_MEDIA.captures_iter(text) {
        if let Some(q) = caps.name("query") {
            push_media_features(q.as_str(), q.start(), decls);
        }
    }
}

fn scan_inline_styles(
    text: &str,
    decls: &mut Vec<RawDeclaration>,
    budget: &Budget,
    path: &str,
) -> Result<(), FileError> {
    for open in INLINE_OPEN.find_iter(text) {
        budget.check(path)?;
        let body_start = open.end();
        let Some(body_end) = matching_brace(text, body_start) else {
            continue;
        };
        let body = &text[body_start..body_end];
        for caps in INLINE_PAIR.captures_iter(body) {
            let Some(prop) = caps.name("prop") else { continue };
            let value = ["sq", "dq", "bt", "num"]
                .iter()
                .find_map(|g| caps.name(g));
            let Some(value) = value else { continue };
            if value.as_str().contains("${") || value.as_str().trim().is_empty() {
                continue;
            }
            let name = prop.as_str().trim_matches(|c| c == '\'' || c == '"');
            decls.push(RawDeclaration {
                property: camel_to_kebab(name),
                value: value.as_str().to_string(),
                value_start: body_start + value.start(),
                syntax: SyntaxKind::InlineStyleObject,
            });
        }
    }
    Ok(())
}

/// Offset of the `}` closing an object whose body starts at `start`.
fn matching_brace(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            q @ (b'"' | b'\'' | b'`') => {
                i += 1;
                while i < bytes.len() && bytes[i] != q {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// `backgroundColor` -> `background-color`, `WebkitBackdropFilter` -> `-webkit-backdrop-filter`.
pub fn camel_to_kebab(name: &str) -> String {
    if name.contains('-') {
        return name.to_ascii_lowercase();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn scan_utilities(text: &str, base: usize, decls: &mut Vec<RawDeclaration>) {
    for caps in UTILITY.captures_iter(text) {
        let (Some(prefix), Some(value)) = (caps.name("prefix"), caps.name("value")) else {
            continue;
        };
        let (hint, raw, offset) = split_type_hint(value.as_str());
        let raw = raw.replace('_', " ");
        let Some(property) = utility_property(prefix.as_str(), hint, &raw) else {
            continue;
        };
        decls.push(RawDeclaration {
            property: property.to_string(),
            value: raw,
            value_start: base + value.start() + offset,
            syntax: SyntaxKind::UtilityClassLiteral,
        });
    }
    for caps in ARBITRARY_PROP.captures_iter(text) {
        let (Some(prop), Some(value)) = (caps.name("prop"), caps.name("value")) else {
            continue;
        };
        decls.push(RawDeclaration {
            property: prop.as_str().to_string(),
            value: value.as_str().replace('_', " "),
            value_start: base + value.start(),
            syntax: SyntaxKind::UtilityClassLiteral,
        });
    }
}

/// Strip a Tailwind type hint (`length:`, `color:`) from an arbitrary value.
fn split_type_hint(value: &str) -> (Option<&str>, &str, usize) {
    for hint in ["length:", "color:", "number:", "percentage:"] {
        if let Some(rest) = value.strip_prefix(hint) {
            return (Some(&hint[..hint.len() - 1]), rest, hint.len());
        }
    }
    (None, value, 0)
}

fn looks_like_color(v: &str) -> bool {
    let l = v.to_ascii_lowercase();
    l.starts_with('#')
        || l.starts_with("rgb")
        || l.starts_with("hsl")
        || l == "transparent"
        || l == "currentcolor"
        || crate::values::named_colors().any(|n| n == l)
}

fn looks_like_length(v: &str) -> bool {
    crate::values::split_number(v).is_some() || v.starts_with("calc(") || v.starts_with("clamp(")
}

/// Map a utility prefix (and the shape of its value) to the CSS property it sets.
fn utility_property(prefix: &str, hint: Option<&str>, value: &str) -> Option<&'static str> {
    let is_var = value.starts_with("var(");
    let colorish = hint == Some("color") || (hint.is_none() && (looks_like_color(value) || is_var));
    let lengthish = hint == Some("length") || (hint.is_none() && looks_like_length(value));
    let prop = match prefix {
        "bg" if colorish => "background-color",
        "bg" if value.contains("gradient(") => "background-image",
        "text" if hint == Some("length") => "font-size",
        "text" if is_var && hint.is_none() => {
            let v = value.to_ascii_lowercase();
            if v.contains("size") || v.contains("font") || v.contains("leading") {
                "font-size"
            } else {
                "color"
            }
        }
        "text" if colorish => "color",
        "text" if lengthish => "font-size",
        "border" | "border-t" | "border-r" | "border-b" | "border-l" | "border-x" | "border-y"
        | "divide"
            if colorish =>
        {
            "border-color"
        }
        "ring" | "outline" if colorish => "outline-color",
        "fill" if colorish => "fill",
        "stroke" if colorish => "stroke",
        "from" | "via" | "to" if colorish => "background-image",
        "decoration" if colorish => "text-decoration-color",
        "caret" if colorish => "caret-color",
        "accent" if colorish => "accent-color",
        "p" => "padding",
        "px" => "padding-inline",
        "py" => "padding-block",
        "pt" => "padding-top",
        "pr" => "padding-right",
        "pb" => "padding-bottom",
        "pl" => "padding-left",
        "m" => "margin",
        "mx" => "margin-inline",
        "my" => "margin-block",
        "mt" => "margin-top",
        "mr" => "margin-right",
        "mb" => "margin-bottom",
        "ml" => "margin-left",
        "gap" => "gap",
        "gap-x" => "column-gap",
        "gap-y" => "row-gap",
        "space-x" => "margin-left",
        "space-y" => "margin-top",
        "inset" | "inset-x" | "inset-y" => "inset",
        "top" => "top",
        "right" => "right",
        "bottom" => "bottom",
        "left" => "left",
        "shadow" if !colorish || is_var => "box-shadow",
        "drop-shadow" | "blur" => "filter",
        "backdrop-blur" => "backdrop-filter",
        "duration" => "transition-duration",
        "delay" => "transition-delay",
        "font" if crate::values::parse_font_weight(value).is_some() => "font-weight",
        "font" => "font-family",
        "leading" => "line-height",
        "tracking" => "letter-spacing",
        "min" => "min-width",
        "max" => "max-width",
        _ => return None,
    };
    Some(prop)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(kind: SourceKind, text: &str) -> Vec<RawDeclaration> {
        let file = SourceFile::new("t", kind, text);
        Surface::scan(&file, &Budget::unlimited()).unwrap().decls
    }

    #[test]
    fn test_mask_comments_keeps_offsets_and_strings() {
        let src = "a { color: red; /* color: blue; */ }\nconst u = 'http://x'; // gone";
        let css = mask_comments(src, SourceKind::Stylesheet);
        assert_eq!(css.len(), src.len());
        assert!(!css.contains("blue"));
        let ts = mask_comments(src, SourceKind::Script);
        assert!(ts.contains("'http://x'"));
        assert!(!ts.contains("gone"));
    }

    #[test]
    fn test_css_declarations_skip_selectors_and_definitions() {
        let src = ".card:hover{color:#fff;padding: 8px 16px}\n:root { --local: #000; }\n.a { margin: 0 }";
        let decls = scan(SourceKind::Stylesheet, src);
        let props: Vec<_> = decls.iter().map(|d| d.property.as_str()).collect();
        assert_eq!(props, vec!["color", "padding", "margin"]);
        let pad = &decls[1];
        assert_eq!(pad.value, "8px 16px");
        assert_eq!(&src[pad.value_start..pad.value_start + pad.value.len()], "8px 16px");
    }

    #[test]
    fn test_commented_declarations_are_ignored() {
        let decls = scan(SourceKind::Stylesheet, "/* .x { color: #fff; } */ .y { color: #000; }");
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].value, "#000");
    }

    #[test]
    fn test_inline_style_object() {
        let src = "<div style={{ backgroundColor: '#ffffff', padding: 16, WebkitBackdropFilter: \"blur(8px)\" }} />";
        let decls = scan(SourceKind::ComponentMarkup, src);
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[0].property, "background-color");
        assert_eq!(decls[0].value, "#ffffff");
        assert_eq!(decls[0].syntax, SyntaxKind::InlineStyleObject);
        assert_eq!(decls[1].property, "padding");
        assert_eq!(decls[1].value, "16");
        assert_eq!(decls[2].property, "-webkit-backdrop-filter");
    }

    #[test]
    fn test_css_properties_object_counts_as_inline() {
        let src = "const s: React.CSSProperties = { marginTop: '12px' };";
        let decls = scan(SourceKind::Script, src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].property, "margin-top");
    }

    #[test]
    fn test_utility_literals() {
        let src = r#"<p className="hover:bg-[#fafafa] p-[13px] text-[14px] text-[var(--text-primary)] border-[rgba(255,255,255,0.08)] border-[2px] shadow-[0_0_4px_rgba(0,0,0,0.2)] min-[769px]:flex [color:#fff]" />"#;
        let decls = scan(SourceKind::ComponentMarkup, src);
        let pairs: Vec<_> = decls
            .iter()
            .map(|d| (d.property.as_str(), d.value.as_str()))
            .collect();
        assert!(pairs.contains(&("background-color", "#fafafa")));
        assert!(pairs.contains(&("padding", "13px")));
        assert!(pairs.contains(&("font-size", "14px")));
        assert!(pairs.contains(&("color", "var(--text-primary)")));
        assert!(pairs.contains(&("border-color", "rgba(255,255,255,0.08)")));
        assert!(pairs.contains(&("box-shadow", "0 0 4px rgba(0,0,0,0.2)")));
        assert!(pairs.contains(&("min-width", "769px")));
        assert!(pairs.contains(&("color", "#fff")));
        assert!(!pairs.iter().any(|(_, v)| *v == "2px"));
    }

    #[test]
    fn test_media_queries_and_range_syntax() {
        let src = "@media (min-width: 769px) and (max-width: 1023px) { .a { color: red } }\n@media (width >= 640px) {}";
        let decls = scan(SourceKind::Stylesheet, src);
        let media: Vec<_> = decls
            .iter()
            .filter(|d| d.syntax == SyntaxKind::MediaQuery)
            .map(|d| (d.property.as_str(), d.value.as_str()))
            .collect();
        assert_eq!(
            media,
            vec![("min-width", "769px"), ("max-width", "1023px"), ("min-width", "640px")]
        );
        // min-width inside @media is never reported as a plain declaration
        assert!(!decls
            .iter()
            .any(|d| d.syntax == SyntaxKind::CssDeclaration && d.property == "min-width"));
    }

    #[test]
    fn test_match_media_in_scripts() {
        let decls = scan(SourceKind::Script, "const m = window.matchMedia('(max-width: 767px)');");
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].property, "max-width");
        assert_eq!(decls[0].value, "767px");
    }

    #[test]
    fn test_apply_rules_in_stylesheets() {
        let decls = scan(SourceKind::Stylesheet, ".btn { @apply px-[18px] rounded; }");
        assert!(decls
            .iter()
            .any(|d| d.property == "padding-inline" && d.value == "18px"));
    }

    #[test]
    fn test_line_index_positions() {
        let text = "a\nbc\n  def";
        let idx = LineIndex::new(text);
        assert_eq!(idx.position(0), (1, 1));
        assert_eq!(idx.position(3), (2, 2));
        assert_eq!(idx.position(7), (3, 3));
        assert_eq!(idx.line_text(text, 8), "def");
    }

    #[test]
    fn test_camel_to_kebab() {
        assert_eq!(camel_to_kebab("borderTopColor"), "border-top-color");
        assert_eq!(camel_to_kebab("WebkitBackdropFilter"), "-webkit-backdrop-filter");
        assert_eq!(camel_to_kebab("font-size"), "font-size");
    }
}
