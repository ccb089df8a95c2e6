//! Markup engine: HTML tokenizer, tree builder, entities, serializer.

pub mod builder;
pub mod entities;
pub mod serialize;
pub mod tokenizer;

pub use builder::{parse_html, HtmlDocument};
pub use serialize::{inner_html, outer_html};
