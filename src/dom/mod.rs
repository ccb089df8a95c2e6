//! DOM arena: slotmap-backed element tree with subtree queries.

pub mod node;
pub mod tree;
pub mod query;

pub use node::{NodeData, NodeId, NodeKind, Outline};
pub use tree::Dom;
