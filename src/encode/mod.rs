//! Per-domain section encoders.
//!
//! Each encoder fills a private [`SectionBuffer`] with one section's payload
//! in the exact field order the engine's loader reads. Field order is part
//! of the compatibility contract; do not reorder writes.
//!
//! Encoders have no say in *which* sections are written or in what order;
//! that is the assembler's job ([`crate::export`]).

mod animation;
mod collision;
mod hitbox;
mod material;
mod mesh;
mod portal;
mod prefab;
mod skeleton;

pub use animation::{encode_animations, encode_cue_track};
pub use collision::{encode_bsp_placeholder, encode_collision, encode_convex_hull_placeholder};
pub use hitbox::{encode_hitboxes, resolve_hitboxes, ResolvedHitbox};
pub use material::encode_materials;
pub use mesh::{encode_mesh, VERTEX_STRIDE};
pub use portal::encode_portals;
pub use prefab::encode_prefabs;
pub use skeleton::{
    encode_hardpoints, encode_skeleton, resolve_hardpoints, ResolvedHardpoint, BONE_RECORD_SIZE,
};

/// Fixed width of name fields.
pub(crate) const NAME_LEN: usize = 128;

/// Fixed width of classification tag fields.
pub(crate) const TAG_LEN: usize = 64;
