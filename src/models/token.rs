//! Token schema: one approved design value and the category it belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Token category. Every token belongs to exactly one.
pub enum Category {
    Color,
    Spacing,
    Typography,
    Effect,
    Border,
    Breakpoint,
    Transition,
    ZIndex,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Color,
        Category::Spacing,
        Category::Typography,
        Category::Effect,
        Category::Border,
        Category::Breakpoint,
        Category::Transition,
        Category::ZIndex,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Color => "color",
            Category::Spacing => "spacing",
            Category::Typography => "typography",
            Category::Effect => "effect",
            Category::Border => "border",
            Category::Breakpoint => "breakpoint",
            Category::Transition => "transition",
            Category::ZIndex => "z-index",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "color" | "colors" | "colour" => Ok(Category::Color),
            "spacing" | "space" => Ok(Category::Spacing),
            "typography" | "font" | "fonts" => Ok(Category::Typography),
            "effect" | "effects" | "shadow" | "shadows" => Ok(Category::Effect),
            "border" | "borders" => Ok(Category::Border),
            "breakpoint" | "breakpoints" => Ok(Category::Breakpoint),
            "transition" | "transitions" | "motion" => Ok(Category::Transition),
            "z-index" | "zindex" | "z" => Ok(Category::ZIndex),
            other => Err(format!("unknown token category '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// A registered design token.
///
/// `numeric_value` is normalized: px for lengths (rem/em at the configured
/// base), ms for durations, the bare number for weights and z-indices.
pub struct Token {
    pub name: String,
    pub category: Category,
    pub raw_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_value: Option<f64>,
}

impl Token {
    pub fn new(name: impl Into<String>, category: Category, raw_value: impl Into<String>) -> Self {
        Token {
            name: name.into(),
            category,
            raw_value: raw_value.into(),
            numeric_value: None,
        }
    }

    /// The `var(--name)` spelling used when suggesting or applying this token.
    pub fn var_ref(&self) -> String {
        format!("var(--{})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_accepts_plurals_and_aliases() {
        assert_eq!("colors".parse::<Category>(), Ok(Category::Color));
        assert_eq!("Breakpoints".parse::<Category>(), Ok(Category::Breakpoint));
        assert_eq!("z-index".parse::<Category>(), Ok(Category::ZIndex));
        assert!("gradient".parse::<Category>().is_err());
    }

    #[test]
    fn test_var_ref_spelling() {
        let t = Token::new("space-4", Category::Spacing, "1rem");
        assert_eq!(t.var_ref(), "var(--space-4)");
        assert_eq!(t.numeric_value, None);
    }
}
