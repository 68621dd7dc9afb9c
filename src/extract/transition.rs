//! Motion usages: durations and delays of transitions and animations.

use super::{time_atoms, Atom, PatternExtractor, RawDeclaration};
use crate::models::token::Category;
use crate::models::SyntaxKind;

const PROPERTIES: &[&str] = &[
    "transition",
    "transition-duration",
    "transition-delay",
    "animation",
    "animation-duration",
    "animation-delay",
];

pub struct TransitionExtractor;

impl PatternExtractor for TransitionExtractor {
    fn category(&self) -> Category {
        Category::Transition
    }

    fn wants(&self, decl: &RawDeclaration) -> bool {
        decl.syntax != SyntaxKind::MediaQuery && PROPERTIES.contains(&decl.property.as_str())
    }

    fn atoms(&self, decl: &RawDeclaration) -> Vec<Atom> {
        let v = decl.value.trim();
        if v.eq_ignore_ascii_case("none") {
            return vec![Atom {
                text: v.to_string(),
                offset: decl.value.len() - decl.value.trim_start().len(),
            }];
        }
        time_atoms(&decl.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Budget;
    use crate::models::{SourceFile, SourceKind};

    #[test]
    fn test_composite_and_list_values() {
        let file = SourceFile::new(
            "a.css",
            SourceKind::Stylesheet,
            ".a { transition: opacity 150ms ease, transform var(--duration-base); animation-delay: 0.5s, 1s; }",
        );
        let found = TransitionExtractor.extract(&file, &Budget::unlimited()).unwrap();
        let values: Vec<_> = found.iter().map(|d| d.raw_value.as_str()).collect();
        assert_eq!(values, vec!["150ms", "var(--duration-base)", "0.5s", "1s"]);
    }

    #[test]
    fn test_utility_duration() {
        let file = SourceFile::new("b.tsx", SourceKind::ComponentMarkup, r#"<a className="duration-[250ms]" />"#);
        let found = TransitionExtractor.extract(&file, &Budget::unlimited()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw_value, "250ms");
        assert_eq!(found[0].property, "transition-duration");
    }
}
