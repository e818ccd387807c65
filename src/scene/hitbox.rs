//! Hitbox volumes.

use crate::util::Aabb;

/// An axis-aligned hit volume, optionally bound to a bone. Bone bindings
/// resolve through the skeleton path rule, like hardpoints.
#[derive(Clone, Debug)]
pub struct HitboxData {
    pub name: String,
    /// Shape classification, e.g. "box", "sphere", "capsule".
    pub shape: String,
    pub bone: Option<String>,
    pub bounds: Aabb,
}
