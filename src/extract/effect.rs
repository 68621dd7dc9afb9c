//! Effect usages: shadows and blur filters.

use super::{split_layers, whole_atom, Atom, PatternExtractor, RawDeclaration};
use crate::models::token::Category;
use crate::models::SyntaxKind;

pub struct EffectExtractor;

impl PatternExtractor for EffectExtractor {
    fn category(&self) -> Category {
        Category::Effect
    }

    fn wants(&self, decl: &RawDeclaration) -> bool {
        if decl.syntax == SyntaxKind::MediaQuery {
            return false;
        }
        match decl.property.as_str() {
            "box-shadow" | "text-shadow" | "backdrop-filter" | "-webkit-backdrop-filter" => true,
            "filter" => {
                decl.syntax == SyntaxKind::UtilityClassLiteral
                    || decl.value.to_ascii_lowercase().contains("blur(")
                    || decl.value.to_ascii_lowercase().contains("drop-shadow(")
            }
            _ => false,
        }
    }

    fn atoms(&self, decl: &RawDeclaration) -> Vec<Atom> {
        if decl.property.ends_with("shadow") {
            let v = super::strip_important(&decl.value);
            split_layers(v)
        } else {
            whole_atom(&decl.value)
        }
    }
}
