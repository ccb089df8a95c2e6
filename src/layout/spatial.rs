//! Spatial map for hit testing.
//!
//! [`SpatialMap`] keeps node regions in painter's order (depth-first, so a
//! descendant is always in front of its ancestors) and answers point and
//! region queries.

use crate::dom::NodeId;
use crate::geometry::{Point, Region};

#[derive(Debug, Default)]
pub struct SpatialMap {
    /// Ordered back to front.
    entries: Vec<(NodeId, Region)>,
}

impl SpatialMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents. Slice order is z-order: last is frontmost.
    pub fn update_ordered(&mut self, entries: &[(NodeId, Region)]) {
        self.entries.clear();
        self.entries.extend_from_slice(entries);
    }

    /// All nodes containing `point`, frontmost first.
    pub fn hit_test(&self, point: Point) -> Vec<NodeId> {
        self.entries
            .iter()
            .rev()
            .filter(|(_, region)| region.contains(point))
            .map(|(id, _)| *id)
            .collect()
    }

    /// The frontmost node containing `point`.
    pub fn node_at(&self, point: Point) -> Option<NodeId> {
        self.entries
            .iter()
            .rev()
            .find(|(_, region)| region.contains(point))
            .map(|(id, _)| *id)
    }

    /// Nodes overlapping `region`, frontmost first.
    pub fn nodes_in_region(&self, region: &Region) -> Vec<NodeId> {
        self.entries
            .iter()
            .rev()
            .filter(|(_, r)| r.intersects(region))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
