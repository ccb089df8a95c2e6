//! Host tree: application chrome around the rendering surface.
//!
//! ```text
//! div#pagecraft-app
//! ├── header.pagecraft-header
//! │   ├── h1            "Pagecraft"
//! │   ├── button.pagecraft-refresh
//! │   └── span.pagecraft-status      (generation errors)
//! ├── div.pagecraft-stage
//! │   └── div#<surface-id>      (generated content)
//! └── aside.pagecraft-inspector (property panel)
//! ```

use crate::dom::{Dom, NodeData, NodeId};

/// The retained host DOM. Everything except the surface subtree is chrome.
pub struct HostTree {
    pub dom: Dom,
    pub app: NodeId,
    pub header: NodeId,
    pub refresh_button: NodeId,
    pub status: NodeId,
    pub stage: NodeId,
    pub panel: NodeId,
}

impl HostTree {
    pub fn new() -> Self {
        let mut dom = Dom::new();
        let app = dom.insert(NodeData::element("div").with_id("pagecraft-app"));
        let header = dom.insert_child(app, NodeData::element("header").with_class("pagecraft-header"));
        let title = dom.insert_child(header, NodeData::element("h1"));
        dom.set_text(title, "Pagecraft");
        let refresh_button = dom.insert_child(
            header,
            NodeData::element("button").with_class("pagecraft-refresh"),
        );
        dom.set_text(refresh_button, "Refresh");
        let status = dom.insert_child(header, NodeData::element("span").with_class("pagecraft-status"));
        let stage = dom.insert_child(app, NodeData::element("div").with_class("pagecraft-stage"));
        let panel = dom.insert_child(
            app,
            NodeData::element("aside")
                .with_class("pagecraft-inspector")
                .with_attribute("hidden", ""),
        );
        Self {
            dom,
            app,
            header,
            refresh_button,
            status,
            stage,
            panel,
        }
    }

    /// Whether `node` belongs to the inspector panel.
    pub fn in_panel(&self, node: NodeId) -> bool {
        self.dom.is_inclusive_descendant(node, self.panel)
    }

    /// Whether `node` is the refresh control or inside it.
    pub fn is_refresh(&self, node: NodeId) -> bool {
        self.dom.is_inclusive_descendant(node, self.refresh_button)
    }

    /// Show `message` in the header, or clear it.
    pub fn set_status(&mut self, message: Option<&str>) {
        self.dom.set_text(self.status, message.unwrap_or(""));
    }

    /// Whether `node` belongs to the stage (the surface and its frame).
    pub fn in_stage(&self, node: NodeId) -> bool {
        self.dom.is_inclusive_descendant(node, self.stage)
    }
}

impl Default for HostTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrome_layout() {
        let host = HostTree::new();
        assert_eq!(host.dom.root(), Some(host.app));
        assert_eq!(host.dom.element_children(host.app), vec![host.header, host.stage, host.panel]);
        assert!(host.in_panel(host.panel));
        assert!(!host.in_panel(host.header));
        assert!(!host.in_stage(host.refresh_button));
    }
}
