//! Prefab groups and placed instances.

use glam::Mat4;

/// One placed instance of a prefab resource.
#[derive(Clone, Debug)]
pub struct PrefabInstance {
    /// Root-relative resource reference of the placed asset.
    pub resource: String,
    pub visible: bool,
    pub transform: Mat4,
}

/// Named group of instances.
#[derive(Clone, Debug)]
pub struct PrefabGroup {
    pub name: String,
    pub instances: Vec<PrefabInstance>,
}
