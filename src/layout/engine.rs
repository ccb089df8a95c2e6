//! TaffyTree wrapper for surface layout.
//!
//! [`LayoutEngine`] synchronizes the surface subtree to a taffy layout tree,
//! runs layout at the emulated device width, and provides results as
//! absolute [`Region`]s.

use std::collections::{HashMap, HashSet};

use taffy::prelude::*;

use crate::css::length::{Length, ROOT_FONT_SIZE_PX};
use crate::dom::{Dom, NodeData, NodeId};
use crate::geometry::{Point, Region};
use crate::render::Surface;

use super::resolve::resolve_style;
use super::spatial::SpatialMap;

/// Average glyph advance, in ems.
const CHAR_WIDTH_EM: f32 = 0.5;
const LINE_HEIGHT_EM: f32 = 1.2;

/// Measurement context for a text leaf: glyph counts at a font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMeasure {
    pub chars: usize,
    pub longest_word: usize,
    pub font_size: f32,
}

impl TextMeasure {
    /// Build from raw text content, collapsing whitespace the way CSS does.
    pub fn new(text: &str, font_size: f32) -> Self {
        let words: Vec<&str> = text.split_whitespace().collect();
        let chars = words.iter().map(|w| w.chars().count()).sum::<usize>() + words.len().saturating_sub(1);
        let longest_word = words.iter().map(|w| w.chars().count()).max().unwrap_or(0);
        Self {
            chars,
            longest_word,
            font_size,
        }
    }

    /// Size of the wrapped text for the given constraints.
    pub fn measure(&self, known: Size<Option<f32>>, available: Size<AvailableSpace>) -> Size<f32> {
        if self.chars == 0 {
            return Size::ZERO;
        }
        let advance = self.font_size * CHAR_WIDTH_EM;
        let full = self.chars as f32 * advance;
        let min = self.longest_word as f32 * advance;
        let width = known.width.unwrap_or(match available.width {
            AvailableSpace::Definite(w) => full.min(w.max(min)),
            AvailableSpace::MinContent => min,
            AvailableSpace::MaxContent => full,
        });
        let lines = if width > 0.0 { (full / width).ceil().max(1.0) } else { 1.0 };
        let height = known
            .height
            .unwrap_or(lines * self.font_size * LINE_HEIGHT_EM);
        Size { width, height }
    }
}

/// Wraps a [`TaffyTree`] and maintains a mapping from DOM [`NodeId`]s to
/// taffy node ids, plus the absolute regions of the last computation.
pub struct LayoutEngine {
    /// Text leaves carry a [`TextMeasure`] as context.
    tree: TaffyTree<TextMeasure>,
    node_map: HashMap<NodeId, taffy::prelude::NodeId>,
    root: Option<(NodeId, taffy::prelude::NodeId)>,
    regions: HashMap<NodeId, Region>,
    spatial: SpatialMap,
    viewport: (f32, f32),
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self {
            tree: TaffyTree::new(),
            node_map: HashMap::new(),
            root: None,
            regions: HashMap::new(),
            spatial: SpatialMap::new(),
            viewport: (0.0, 0.0),
        }
    }

    /// Synchronize the taffy tree with the surface subtree.
    ///
    /// Stale taffy nodes (DOM nodes that no longer exist) are removed, live
    /// ones are created or restyled, and parent/child relationships are
    /// rebuilt to mirror the DOM. `viewport` is `(width, height)` of the
    /// emulated device.
    pub fn sync_surface(&mut self, dom: &Dom, surface: &Surface, viewport: (f32, f32)) {
        self.viewport = viewport;
        let surface_root = surface.root();
        if !dom.contains(surface_root) {
            self.clear();
            return;
        }

        let live_nodes = dom.walk_depth_first(surface_root);
        let live_set: HashSet<NodeId> = live_nodes.iter().copied().collect();

        let stale: Vec<NodeId> = self
            .node_map
            .keys()
            .filter(|k| !live_set.contains(k))
            .copied()
            .collect();
        for key in stale {
            if let Some(taffy_id) = self.node_map.remove(&key) {
                let _ = self.tree.remove(taffy_id);
            }
        }

        for &dom_id in &live_nodes {
            let Some(data) = dom.get(dom_id) else {
                continue;
            };
            let (style, context) = match data.text_content() {
                Some(text) => {
                    let font_size = dom
                        .parent(dom_id)
                        .map(|parent| font_size_px(&surface.compute(dom, parent).get("font-size"), viewport))
                        .unwrap_or(ROOT_FONT_SIZE_PX);
                    (taffy::Style::default(), Some(TextMeasure::new(text, font_size)))
                }
                None => (resolve_style(&surface.compute(dom, dom_id), viewport), None),
            };

            match self.node_map.get(&dom_id) {
                Some(&taffy_id) => {
                    let _ = self.tree.set_style(taffy_id, style);
                    let _ = self.tree.set_node_context(taffy_id, context);
                }
                None => {
                    let created = match context {
                        Some(measure) => self.tree.new_leaf_with_context(style, measure),
                        None => self.tree.new_leaf(style),
                    };
                    if let Ok(taffy_id) = created {
                        self.node_map.insert(dom_id, taffy_id);
                    }
                }
            }
        }

        for &dom_id in &live_nodes {
            let children: Vec<taffy::prelude::NodeId> = dom
                .children(dom_id)
                .iter()
                .filter_map(|child| self.node_map.get(child).copied())
                .collect();
            if let Some(&taffy_id) = self.node_map.get(&dom_id) {
                let _ = self.tree.set_children(taffy_id, &children);
            }
        }

        self.root = self.node_map.get(&surface_root).map(|&t| (surface_root, t));
    }

    /// Run layout with the synced viewport width as the available width,
    /// then record absolute regions in depth-first order.
    pub fn compute(&mut self, dom: &Dom) {
        self.regions.clear();
        let Some((dom_root, taffy_root)) = self.root else {
            self.spatial.update_ordered(&[]);
            return;
        };
        let available = Size {
            width: AvailableSpace::Definite(self.viewport.0),
            height: AvailableSpace::MaxContent,
        };
        let _ = self.tree.compute_layout_with_measure(
            taffy_root,
            available,
            |known, available, _node, context, _style| match context {
                Some(measure) => measure.measure(known, available),
                None => Size::ZERO,
            },
        );

        let mut ordered = Vec::new();
        let mut stack = vec![(dom_root, Region::default())];
        while let Some((dom_id, parent)) = stack.pop() {
            let Some(region) = self.relative(dom_id).map(|r| r.offset_by(&parent)) else {
                continue;
            };
            self.regions.insert(dom_id, region);
            if dom.get(dom_id).is_some_and(NodeData::is_element) {
                ordered.push((dom_id, region));
            }
            for &child in dom.children(dom_id).iter().rev() {
                stack.push((child, region));
            }
        }
        self.spatial.update_ordered(&ordered);
    }

    fn relative(&self, node: NodeId) -> Option<Region> {
        let taffy_id = self.node_map.get(&node)?;
        let layout = self.tree.layout(*taffy_id).ok()?;
        Some(Region::new(
            layout.location.x,
            layout.location.y,
            layout.size.width,
            layout.size.height,
        ))
    }

    /// Absolute region of a node after the last [`compute`](Self::compute).
    pub fn region(&self, node: NodeId) -> Option<Region> {
        self.regions.get(&node).copied()
    }

    pub fn regions(&self) -> &HashMap<NodeId, Region> {
        &self.regions
    }

    /// The frontmost surface element under `point`.
    pub fn hit_test(&self, point: Point) -> Option<NodeId> {
        self.spatial.node_at(point)
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    fn clear(&mut self) {
        let keys: Vec<_> = self.node_map.drain().map(|(_, v)| v).collect();
        for taffy_id in keys {
            let _ = self.tree.remove(taffy_id);
        }
        self.root = None;
        self.regions.clear();
        self.spatial.update_ordered(&[]);
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn font_size_px(value: &str, viewport: (f32, f32)) -> f32 {
    Length::parse(value)
        .and_then(|l| l.to_px(viewport))
        .unwrap_or(ROOT_FONT_SIZE_PX)
}
