//! Hitbox section encoder.

use crate::container::SectionBuffer;
use crate::scene::{HitboxData, SkeletonData};
use crate::util::{Aabb, Error, Result};

use super::{NAME_LEN, TAG_LEN};

/// A hitbox with its optional bone binding resolved.
#[derive(Clone, Debug)]
pub struct ResolvedHitbox {
    pub name: String,
    pub shape: String,
    /// Root-to-bone path; empty when the hitbox is unbound.
    pub bone_path: String,
    pub bounds: Aabb,
}

/// Resolve hitbox bone bindings, reusing the skeleton path rule hardpoints
/// follow. An unknown bone is a configuration error.
pub fn resolve_hitboxes(
    hitboxes: &[HitboxData],
    skeleton: Option<&SkeletonData>,
) -> Result<Vec<ResolvedHitbox>> {
    let mut resolved = Vec::with_capacity(hitboxes.len());
    for hitbox in hitboxes {
        let bone_path = match &hitbox.bone {
            Some(bone) => skeleton.and_then(|s| s.bone_path(bone)).ok_or_else(|| {
                Error::config(format!(
                    "hitbox '{}' is bound to unknown bone '{}'",
                    hitbox.name, bone
                ))
            })?,
            None => String::new(),
        };
        resolved.push(ResolvedHitbox {
            name: hitbox.name.clone(),
            shape: hitbox.shape.clone(),
            bone_path,
            bounds: hitbox.bounds,
        });
    }
    Ok(resolved)
}

/// Encode resolved hitboxes.
///
/// Layout: `count:u32`, then per entry `{name128, shape64, bone_path:path,
/// min:3f32, max:3f32}`.
pub fn encode_hitboxes(hitboxes: &[ResolvedHitbox], buf: &mut SectionBuffer) -> Result<()> {
    buf.write_u32(hitboxes.len() as u32);
    for hitbox in hitboxes {
        buf.write_fixed_str(&hitbox.name, NAME_LEN);
        buf.write_fixed_str(&hitbox.shape, TAG_LEN);
        buf.write_path(&hitbox.bone_path);
        buf.write_vec3(hitbox.bounds.min);
        buf.write_vec3(hitbox.bounds.max);
    }
    Ok(())
}
