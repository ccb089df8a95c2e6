//! CSS engine: tokenizer, parser, inline styles, specificity, cascade.

pub mod inline;
pub mod length;
pub mod model;
pub mod parser;
pub mod specificity;
pub mod stylesheet;
pub mod tokenizer;

pub use inline::InlineStyle;
pub use model::{CssItem, Declaration, RuleSet, Selector, StyleSheet};
pub use stylesheet::{CompiledStylesheet, ComputedStyle};
