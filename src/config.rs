//! Editor configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EditorConfig
// ---------------------------------------------------------------------------

/// Configuration for a project session.
///
/// Every field has a default, so a host can deserialize a partial JSON
/// object and override only what it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// `id` of the element that stands in for the generated document's body.
    pub surface_id: String,
    /// Quiet period before a recorded edit is written to the store.
    pub debounce_ms: u64,
    /// Text fragments at least this long are never stripped as leaked markup.
    pub fragment_limit: usize,
    /// Pointer travel (in layout pixels) that turns a click into a drag.
    pub drag_threshold: f32,
    /// Fixed surface widths for each device class.
    pub devices: DeviceWidths,
    /// Angle used when encoding a gradient with no direction of its own.
    pub gradient_angle: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            surface_id: "pagecraft-surface".into(),
            debounce_ms: 300,
            fragment_limit: 50,
            drag_threshold: 4.0,
            devices: DeviceWidths::default(),
            gradient_angle: "135deg".into(),
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the surface root id (builder).
    pub fn with_surface_id(mut self, id: impl Into<String>) -> Self {
        self.surface_id = id.into();
        self
    }

    /// Set the persist debounce window (builder).
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the fragment stripping length limit (builder).
    pub fn with_fragment_limit(mut self, limit: usize) -> Self {
        self.fragment_limit = limit;
        self
    }

    /// Set the drag threshold (builder).
    pub fn with_drag_threshold(mut self, threshold: f32) -> Self {
        self.drag_threshold = threshold;
        self
    }

    /// Set the device class widths (builder).
    pub fn with_devices(mut self, devices: DeviceWidths) -> Self {
        self.devices = devices;
        self
    }

    /// Set the default gradient angle (builder).
    pub fn with_gradient_angle(mut self, angle: impl Into<String>) -> Self {
        self.gradient_angle = angle.into();
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Load from a JSON object; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Surface widths in pixels per device class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceWidths {
    pub wide: f32,
    pub medium: f32,
    pub narrow: f32,
}

impl Default for DeviceWidths {
    fn default() -> Self {
        Self {
            wide: 1280.0,
            medium: 768.0,
            narrow: 375.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.surface_id, "pagecraft-surface");
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.fragment_limit, 50);
        assert_eq!(config.devices.narrow, 375.0);
    }

    #[test]
    fn builder() {
        let config = EditorConfig::new()
            .with_surface_id("preview")
            .with_debounce(Duration::from_millis(50))
            .with_gradient_angle("90deg");
        assert_eq!(config.surface_id, "preview");
        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.gradient_angle, "90deg");
    }

    #[test]
    fn partial_json() {
        let config = EditorConfig::from_json(r#"{"debounceMs": 10, "devices": {"narrow": 320}}"#).unwrap();
        assert_eq!(config.debounce_ms, 10);
        assert_eq!(config.devices.narrow, 320.0);
        assert_eq!(config.devices.wide, 1280.0);
        assert_eq!(config.surface_id, "pagecraft-surface");
    }
}
