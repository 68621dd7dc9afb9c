//! Breakpoint usages in media queries and `min-[..]`/`max-[..]` variants.

use super::{whole_atom, Atom, PatternExtractor, RawDeclaration};
use crate::models::token::Category;
use crate::models::SyntaxKind;

pub struct BreakpointExtractor;

impl PatternExtractor for BreakpointExtractor {
    fn category(&self) -> Category {
        Category::Breakpoint
    }

    fn wants(&self, decl: &RawDeclaration) -> bool {
        matches!(decl.syntax, SyntaxKind::MediaQuery | SyntaxKind::UtilityClassLiteral)
            && matches!(decl.property.as_str(), "min-width" | "max-width")
    }

    fn atoms(&self, decl: &RawDeclaration) -> Vec<Atom> {
        whole_atom(&decl.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Budget;
    use crate::models::{SourceFile, SourceKind};

    #[test]
    fn test_only_media_widths() {
        let file = SourceFile::new(
            "a.css",
            SourceKind::Stylesheet,
            "@media (min-width: 769px) {\n  .a { max-width: 600px; }\n}",
        );
        let found = BreakpointExtractor.extract(&file, &Budget::unlimited()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw_value, "769px");
        assert_eq!(found[0].line, 1);
        assert_eq!(found[0].syntax_kind, SyntaxKind::MediaQuery);
    }
}
