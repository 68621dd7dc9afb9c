//! Spacing usages: padding, margin, gaps and insets.

use super::{length_atoms, Atom, PatternExtractor, RawDeclaration};
use crate::models::token::Category;
use crate::models::SyntaxKind;

pub struct SpacingExtractor;

fn is_spacing_property(p: &str) -> bool {
    p.starts_with("padding")
        || p.starts_with("margin")
        || p.starts_with("inset")
        || p.starts_with("scroll-margin")
        || p.starts_with("scroll-padding")
        || matches!(p, "gap" | "row-gap" | "column-gap" | "top" | "right" | "bottom" | "left")
}

impl PatternExtractor for SpacingExtractor {
    fn category(&self) -> Category {
        Category::Spacing
    }

    fn wants(&self, decl: &RawDeclaration) -> bool {
        decl.syntax != SyntaxKind::MediaQuery && is_spacing_property(&decl.property)
    }

    fn atoms(&self, decl: &RawDeclaration) -> Vec<Atom> {
        length_atoms(&decl.value)
    }
}
