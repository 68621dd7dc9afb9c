//! Value parsing for colours, lengths, and durations.
//!
//! Parsers return `None` when the text is not a value of the requested kind;
//! callers decide whether that means "unparsable" or "not applicable".

use std::sync::LazyLock;

use regex::Regex;

static NUMBER_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?(?:\d+(?:\.\d*)?|\.\d+))([A-Za-z%]*)$").expect("number regex")
});

#[derive(Debug, Clone, Copy, PartialEq)]
/// sRGB colour with straight alpha in [0, 1].
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 1.0 }
    }

    /// Composite this colour over an opaque `backdrop` (source-over).
    pub fn over(self, backdrop: Rgba) -> Rgba {
        let mix = |fg: u8, bg: u8| -> u8 {
            (fg as f64 * self.a + bg as f64 * (1.0 - self.a)).round().clamp(0.0, 255.0) as u8
        };
        Rgba::opaque(
            mix(self.r, backdrop.r),
            mix(self.g, backdrop.g),
            mix(self.b, backdrop.b),
        )
    }

    /// CIELAB (D65) coordinates.
    pub fn to_lab(self) -> (f64, f64, f64) {
        fn lin(c: u8) -> f64 {
            let c = c as f64 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        let (r, g, b) = (lin(self.r), lin(self.g), lin(self.b));
        let x = (0.4124 * r + 0.3576 * g + 0.1805 * b) / 0.95047;
        let y = 0.2126 * r + 0.7152 * g + 0.0722 * b;
        let z = (0.0193 * r + 0.1192 * g + 0.9505 * b) / 1.08883;
        let f = |t: f64| {
            if t > 0.008856 {
                t.cbrt()
            } else {
                7.787 * t + 16.0 / 116.0
            }
        };
        let (fx, fy, fz) = (f(x), f(y), f(z));
        (116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
    }

    /// CIE76 colour difference.
    pub fn delta_e(self, other: Rgba) -> f64 {
        let (l1, a1, b1) = self.to_lab();
        let (l2, a2, b2) = other.to_lab();
        ((l1 - l2).powi(2) + (a1 - a2).powi(2) + (b1 - b2).powi(2)).sqrt()
    }
}

const NAMED_COLORS: &[(&str, Rgba)] = &[
    ("black", Rgba::opaque(0, 0, 0)),
    ("white", Rgba::opaque(255, 255, 255)),
    ("red", Rgba::opaque(255, 0, 0)),
    ("green", Rgba::opaque(0, 128, 0)),
    ("blue", Rgba::opaque(0, 0, 255)),
    ("yellow", Rgba::opaque(255, 255, 0)),
    ("orange", Rgba::opaque(255, 165, 0)),
    ("purple", Rgba::opaque(128, 0, 128)),
    ("pink", Rgba::opaque(255, 192, 203)),
    ("gray", Rgba::opaque(128, 128, 128)),
    ("grey", Rgba::opaque(128, 128, 128)),
    ("silver", Rgba::opaque(192, 192, 192)),
];

/// Names recognised by `parse_color` besides hex and functional notation.
pub fn named_colors() -> impl Iterator<Item = &'static str> {
    NAMED_COLORS.iter().map(|(n, _)| *n)
}

/// Parse a CSS colour literal: hex, `rgb[a]()`, `hsl[a]()`, or a common name.
pub fn parse_color(raw: &str) -> Option<Rgba> {
    let s = raw.trim().to_ascii_lowercase();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if s == "transparent" {
        return Some(Rgba { r: 0, g: 0, b: 0, a: 0.0 });
    }
    if let Some((_, c)) = NAMED_COLORS.iter().find(|(n, _)| *n == s) {
        return Some(*c);
    }
    let open = s.find('(')?;
    let func = &s[..open];
    let inner = s[open + 1..].strip_suffix(')')?;
    let parts: Vec<&str> = inner
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let alpha = match parts.get(3) {
        Some(a) => parse_alpha(a)?,
        None => 1.0,
    };
    match func {
        "rgb" | "rgba" => Some(Rgba {
            r: parse_channel(parts[0])?,
            g: parse_channel(parts[1])?,
            b: parse_channel(parts[2])?,
            a: alpha,
        }),
        "hsl" | "hsla" => {
            let h = parts[0].trim_end_matches("deg").parse::<f64>().ok()?;
            let sat = parse_percent(parts[1])?;
            let light = parse_percent(parts[2])?;
            let (r, g, b) = hsl_to_rgb(h, sat, light);
            Some(Rgba { r, g, b, a: alpha })
        }
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expand = |c: &str| u8::from_str_radix(&c.repeat(2), 16).ok();
    let pair = |c: &str| u8::from_str_radix(c, 16).ok();
    match hex.len() {
        3 | 4 => {
            let r = expand(&hex[0..1])?;
            let g = expand(&hex[1..2])?;
            let b = expand(&hex[2..3])?;
            let a = if hex.len() == 4 { expand(&hex[3..4])? as f64 / 255.0 } else { 1.0 };
            Some(Rgba { r, g, b, a })
        }
        6 | 8 => {
            let r = pair(&hex[0..2])?;
            let g = pair(&hex[2..4])?;
            let b = pair(&hex[4..6])?;
            let a = if hex.len() == 8 { pair(&hex[6..8])? as f64 / 255.0 } else { 1.0 };
            Some(Rgba { r, g, b, a })
        }
        _ => None,
    }
}

fn parse_channel(s: &str) -> Option<u8> {
    let v = match s.strip_suffix('%') {
        Some(p) => p.parse::<f64>().ok()? / 100.0 * 255.0,
        None => s.parse::<f64>().ok()?,
    };
    Some(v.round().clamp(0.0, 255.0) as u8)
}

fn parse_alpha(s: &str) -> Option<f64> {
    let v = match s.strip_suffix('%') {
        Some(p) => p.parse::<f64>().ok()? / 100.0,
        None => s.parse::<f64>().ok()?,
    };
    Some(v.clamp(0.0, 1.0))
}

fn parse_percent(s: &str) -> Option<f64> {
    Some(s.strip_suffix('%').unwrap_or(s).parse::<f64>().ok()? / 100.0)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let h = h.rem_euclid(360.0) / 360.0;
    let (s, l) = (s.clamp(0.0, 1.0), l.clamp(0.0, 1.0));
    if s == 0.0 {
        let v = (l * 255.0).round() as u8;
        return (v, v, v);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let hue = |mut t: f64| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    let to_u8 = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    (
        to_u8(hue(h + 1.0 / 3.0)),
        to_u8(hue(h)),
        to_u8(hue(h - 1.0 / 3.0)),
    )
}

/// Split `12.5px` into (12.5, "px").
pub fn split_number(raw: &str) -> Option<(f64, String)> {
    let caps = NUMBER_UNIT.captures(raw.trim())?;
    let n = caps[1].parse::<f64>().ok()?;
    Some((n, caps[2].to_ascii_lowercase()))
}

/// Parse a length to px. `rem`/`em` use `rem_base`. A unitless number is
/// only accepted when `unitless_px` is set (React inline styles).
pub fn parse_length_px(raw: &str, rem_base: f64, unitless_px: bool) -> Option<f64> {
    let (n, unit) = split_number(raw)?;
    match unit.as_str() {
        "px" => Some(n),
        "rem" | "em" => Some(n * rem_base),
        "" if unitless_px || n == 0.0 => Some(n),
        _ => None,
    }
}

/// Parse a CSS time to milliseconds.
pub fn parse_duration_ms(raw: &str) -> Option<f64> {
    let (n, unit) = split_number(raw)?;
    match unit.as_str() {
        "ms" => Some(n),
        "s" => Some(n * 1000.0),
        _ => None,
    }
}

/// Numeric value of a font-weight literal, mapping the two common keywords.
pub fn parse_font_weight(raw: &str) -> Option<f64> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "bold" => Some(700.0),
        other => {
            let (n, unit) = split_number(other)?;
            unit.is_empty().then_some(n)
        }
    }
}

/// Inner length of `blur(Npx)`, or the length itself.
pub fn parse_blur_px(raw: &str, rem_base: f64) -> Option<f64> {
    let s = raw.trim();
    let inner = s
        .strip_prefix("blur(")
        .and_then(|r| r.strip_suffix(')'))
        .unwrap_or(s);
    parse_length_px(inner, rem_base, false)
}
