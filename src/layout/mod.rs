//! Layout: taffy integration, computed-style resolution, spatial map.

pub mod engine;
pub mod resolve;
pub mod spatial;

pub use engine::{LayoutEngine, TextMeasure};
pub use spatial::SpatialMap;
