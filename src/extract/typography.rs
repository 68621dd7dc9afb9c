//! Typography usages: size, family, weight, line height and letter spacing.

use super::{length_atoms, whole_atom, Atom, PatternExtractor, RawDeclaration};
use crate::models::token::Category;
use crate::models::SyntaxKind;

const PROPERTIES: &[&str] = &[
    "font-size",
    "font-family",
    "font-weight",
    "line-height",
    "letter-spacing",
];

pub struct TypographyExtractor;

impl PatternExtractor for TypographyExtractor {
    fn category(&self) -> Category {
        Category::Typography
    }

    fn wants(&self, decl: &RawDeclaration) -> bool {
        decl.syntax != SyntaxKind::MediaQuery && PROPERTIES.contains(&decl.property.as_str())
    }

    fn atoms(&self, decl: &RawDeclaration) -> Vec<Atom> {
        // A family stack is one value; splitting on commas would lose fallbacks.
        if decl.property == "font-family" {
            whole_atom(&decl.value)
        } else {
            length_atoms(&decl.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Budget;
    use crate::models::{SourceFile, SourceKind};

    #[test]
    fn test_family_stack_is_one_atom() {
        let file = SourceFile::new(
            "a.css",
            SourceKind::Stylesheet,
            ".a { font-family: Inter, system-ui, sans-serif; font-size: 14px; line-height: 1.5; }",
        );
        let found = TypographyExtractor.extract(&file, &Budget::unlimited()).unwrap();
        let values: Vec<_> = found.iter().map(|d| d.raw_value.as_str()).collect();
        assert_eq!(values, vec!["Inter, system-ui, sans-serif", "14px", "1.5"]);
    }
}
