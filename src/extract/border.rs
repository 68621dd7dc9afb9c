//! Border colour usages. Widths, styles and radii are not token-checked.

use super::{color_atoms, Atom, PatternExtractor, RawDeclaration};
use crate::models::token::Category;
use crate::models::SyntaxKind;

pub struct BorderExtractor;

fn is_border_color_property(p: &str) -> bool {
    let Some(rest) = p.strip_prefix("border") else {
        return false;
    };
    if rest.is_empty() || rest == "-color" {
        return true;
    }
    let side = rest.strip_suffix("-color").unwrap_or(rest);
    matches!(
        side,
        "-top" | "-right" | "-bottom" | "-left" | "-inline" | "-block" | "-inline-start"
            | "-inline-end" | "-block-start" | "-block-end"
    )
}

impl PatternExtractor for BorderExtractor {
    fn category(&self) -> Category {
        Category::Border
    }

    fn wants(&self, decl: &RawDeclaration) -> bool {
        decl.syntax != SyntaxKind::MediaQuery && is_border_color_property(&decl.property)
    }

    fn atoms(&self, decl: &RawDeclaration) -> Vec<Atom> {
        color_atoms(&decl.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Budget;
    use crate::models::{SourceFile, SourceKind};

    #[test]
    fn test_property_filter() {
        assert!(is_border_color_property("border"));
        assert!(is_border_color_property("border-top"));
        assert!(is_border_color_property("border-inline-start-color"));
        assert!(!is_border_color_property("border-radius"));
        assert!(!is_border_color_property("border-top-width"));
        assert!(!is_border_color_property("border-collapse"));
    }

    #[test]
    fn test_extracts_shorthand_colour() {
        let file = SourceFile::new(
            "a.module.css",
            SourceKind::Stylesheet,
            ".a { border: 1px solid rgba(255, 255, 255, 0.08); border-radius: 8px; }",
        );
        let found = BorderExtractor.extract(&file, &Budget::unlimited()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw_value, "rgba(255, 255, 255, 0.08)");
        assert_eq!(found[0].category, Category::Border);
    }
}
