//! # pagecraft
//!
//! A visual editing layer for generated landing pages.
//!
//! A generated HTML document is rendered into a scoped surface inside a
//! retained host DOM. The user selects elements, restyles them through an
//! inspector panel, rewrites their text in place and previews the page at
//! several device widths. Every visual edit is recorded in a per-project
//! ledger keyed by a stable selector, persisted with a debounce, and replayed
//! whenever the page is rendered again.
//!
//! ## Core Systems
//!
//! - **[`markup`]** — Logos-based HTML tokenizer and tree builder, serializer
//! - **[`css`]** — CSS engine: tokenizer, parser, specificity, cascade, media queries
//! - **[`dom`]** — Slotmap-backed DOM arena with tree operations and queries
//! - **[`render`]** — Host tree, document splitting, sanitizing, stylesheet scoping
//! - **[`layout`]** — Taffy-powered layout of the surface and hit testing
//! - **[`selection`]** / **[`selector`]** — Pointer selection and stable selectors
//! - **[`inline_edit`]** — In-place text editing through a surrogate element
//! - **[`inspector`]** — Property sampling, presets, gradient text, the panel
//! - **[`ledger`]** — Edit records, replay, debounced persistence, stores
//! - **[`viewport`]** — Device-class emulation
//! - **[`session`]** — The per-project session tying everything together
//! - **[`project`]** — Generation and snapshot wire contracts

// Foundation
pub mod config;
pub mod geometry;

// Core systems
pub mod css;
pub mod dom;
pub mod layout;
pub mod markup;

// Rendering
pub mod render;
pub mod viewport;

// Editing
pub mod event;
pub mod gradient;
pub mod inline_edit;
pub mod inspector;
pub mod selection;
pub mod selector;

// Persistence
pub mod ledger;
pub mod project;

// Application
pub mod session;
pub mod testing;

pub use config::EditorConfig;
pub use ledger::{EditLedger, StyleEdit};
pub use render::GeneratedDocument;
pub use session::{ProjectSession, SessionError};
