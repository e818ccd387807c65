//! Portal markers.

use glam::Vec3;

/// A portal: classification, label, and its (possibly empty) geometry.
#[derive(Clone, Debug)]
pub struct PortalData {
    /// Portal classification, e.g. "standard", "heaven", "exit".
    pub kind: String,
    pub label: String,
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl PortalData {
    pub fn new(kind: impl Into<String>, label: impl Into<String>) -> Self {
        Self { kind: kind.into(), label: label.into(), positions: Vec::new(), indices: Vec::new() }
    }
}
