//! Colour usages: text, background, fill/stroke, outline and decoration colours.

use super::{color_atoms, Atom, PatternExtractor, RawDeclaration};
use crate::models::token::Category;
use crate::models::SyntaxKind;

const PROPERTIES: &[&str] = &[
    "color",
    "background",
    "background-color",
    "background-image",
    "fill",
    "stroke",
    "stop-color",
    "outline",
    "outline-color",
    "text-decoration",
    "text-decoration-color",
    "caret-color",
    "accent-color",
    "column-rule",
    "column-rule-color",
];

pub struct ColorExtractor;

impl PatternExtractor for ColorExtractor {
    fn category(&self) -> Category {
        Category::Color
    }

    fn wants(&self, decl: &RawDeclaration) -> bool {
        decl.syntax != SyntaxKind::MediaQuery && PROPERTIES.contains(&decl.property.as_str())
    }

    fn atoms(&self, decl: &RawDeclaration) -> Vec<Atom> {
        color_atoms(&decl.value)
    }
}
