//! Viewport emulator: constrains the surface to a device-class width and
//! reflows it. Never touches the edit ledger.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::config::DeviceWidths;
use crate::dom::{Dom, NodeId};
use crate::geometry::{Point, Region};
use crate::layout::LayoutEngine;
use crate::render::Surface;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    #[default]
    Wide,
    Medium,
    Narrow,
}

impl DeviceClass {
    pub const ALL: [DeviceClass; 3] = [DeviceClass::Wide, DeviceClass::Medium, DeviceClass::Narrow];

    pub fn name(self) -> &'static str {
        match self {
            DeviceClass::Wide => "wide",
            DeviceClass::Medium => "medium",
            DeviceClass::Narrow => "narrow",
        }
    }

    pub fn width(self, widths: &DeviceWidths) -> f32 {
        match self {
            DeviceClass::Wide => widths.wide,
            DeviceClass::Medium => widths.medium,
            DeviceClass::Narrow => widths.narrow,
        }
    }

    /// Nominal screen height, used for `vh` units.
    pub fn height(self) -> f32 {
        match self {
            DeviceClass::Wide => 800.0,
            DeviceClass::Medium => 1024.0,
            DeviceClass::Narrow => 667.0,
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown device class `{0}` (expected wide, medium or narrow)")]
pub struct UnknownDevice(pub String);

impl FromStr for DeviceClass {
    type Err = UnknownDevice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        DeviceClass::ALL
            .into_iter()
            .find(|d| d.name() == lower)
            .ok_or_else(|| UnknownDevice(s.to_string()))
    }
}

/// Current device class plus the layout computed for it.
pub struct ViewportEmulator {
    device: DeviceClass,
    widths: DeviceWidths,
    layout: LayoutEngine,
}

impl ViewportEmulator {
    pub fn new(widths: DeviceWidths) -> Self {
        Self {
            device: DeviceClass::default(),
            widths,
            layout: LayoutEngine::new(),
        }
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn width(&self) -> f32 {
        self.device.width(&self.widths)
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width(), self.device.height())
    }

    /// Switch device class. Returns whether it changed; the caller reflows.
    pub fn set_device(&mut self, device: DeviceClass) -> bool {
        let changed = self.device != device;
        self.device = device;
        changed
    }

    /// Re-evaluate media queries at the device width and lay the surface out.
    pub fn reflow(&mut self, dom: &Dom, surface: &mut Surface) {
        let size = self.size();
        surface.recompile(size.0);
        self.layout.sync_surface(dom, surface, size);
        self.layout.compute(dom);
        debug!(device = %self.device, width = size.0, nodes = self.layout.regions().len(), "surface reflowed");
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn region(&self, node: NodeId) -> Option<Region> {
        self.layout.region(node)
    }

    pub fn hit_test(&self, point: Point) -> Option<NodeId> {
        self.layout.hit_test(point)
    }
}
