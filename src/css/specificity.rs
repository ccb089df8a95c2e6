//! Cascade ordering key.
//!
//! ```text
//! (important, id_count, class_count, type_count, source_order)
//! ```
//!
//! Fields are ordered so that the derived `Ord` (lexicographic) gives the
//! cascade order: `!important` beats normal, then more ids, more
//! classes/pseudo-classes, more type selectors, and finally later source
//! order. Inline styles sit between normal and important rules and are
//! handled by the stylesheet, not by this key.

use crate::css::model::{Selector, SelectorComponent, SelectorPart};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity {
    /// 1 if `!important`, 0 otherwise.
    pub important: u8,
    pub id_count: u16,
    /// Classes and pseudo-classes, including `:nth-of-type(k)`.
    pub class_count: u16,
    /// Type selectors and pseudo-elements.
    pub type_count: u16,
    pub source_order: u32,
}

impl Specificity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute specificity from a parsed selector.
    pub fn from_selector(selector: &Selector, source_order: u32, important: bool) -> Self {
        let mut id_count: u16 = 0;
        let mut class_count: u16 = 0;
        let mut type_count: u16 = 0;

        for part in &selector.parts {
            if let SelectorPart::Compound(compound) = part {
                for component in &compound.components {
                    match component {
                        SelectorComponent::Id(_) => id_count += 1,
                        SelectorComponent::Class(_)
                        | SelectorComponent::PseudoClass(_)
                        | SelectorComponent::NthOfType(_)
                        | SelectorComponent::NthChild(_) => class_count += 1,
                        SelectorComponent::Type(_) | SelectorComponent::PseudoElement(_) => {
                            type_count += 1
                        }
                        SelectorComponent::Universal => {}
                    }
                }
            }
        }

        Self {
            important: u8::from(important),
            id_count,
            class_count,
            type_count,
            source_order,
        }
    }
}
