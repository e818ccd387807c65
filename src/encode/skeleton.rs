//! Skeleton and hardpoint section encoders.

use glam::Mat4;

use crate::container::SectionBuffer;
use crate::scene::{HardpointBinding, HardpointData, SkeletonData};
use crate::util::{Error, Result};

use super::{NAME_LEN, TAG_LEN};

/// Bytes per encoded bone record: name, parent index, bind and inverse
/// bind matrices.
pub const BONE_RECORD_SIZE: usize = NAME_LEN + 4 + 64 + 64;

/// Encode the bone hierarchy.
///
/// Layout: `bone_count:u32`, then per bone `{name128, parent_index:i32,
/// bind:16f32, inverse_bind:16f32}`, matrices row-major. The skeleton must
/// already be in parent-before-child (depth-first) order; consumers index
/// bones positionally.
pub fn encode_skeleton(skeleton: &SkeletonData, buf: &mut SectionBuffer) -> Result<()> {
    skeleton.validate()?;

    buf.write_u32(skeleton.bone_count() as u32);
    for bone in &skeleton.bones {
        buf.write_fixed_str(&bone.name, NAME_LEN);
        let parent = bone.parent.map(|p| p as i32).unwrap_or(-1);
        buf.write_i32(parent);
        buf.write_mat4(&bone.bind);
        buf.write_mat4(&bone.bind.inverse());
    }
    Ok(())
}

/// A hardpoint with its binding resolved against the encoded skeleton.
#[derive(Clone, Debug)]
pub struct ResolvedHardpoint {
    pub name: String,
    pub kind: String,
    /// Root-to-bone name chain, '/'-joined; empty for transform bindings.
    pub bone_path: String,
    pub transform: Mat4,
}

/// Resolve hardpoint bindings before any bytes are written.
///
/// A bone binding whose bone is absent from the skeleton is a configuration
/// error; a transform binding needs no skeleton at all.
pub fn resolve_hardpoints(
    hardpoints: &[HardpointData],
    skeleton: Option<&SkeletonData>,
) -> Result<Vec<ResolvedHardpoint>> {
    let mut resolved = Vec::with_capacity(hardpoints.len());
    for hardpoint in hardpoints {
        let entry = match &hardpoint.binding {
            HardpointBinding::Bone(bone) => {
                let path = skeleton
                    .and_then(|s| s.bone_path(bone))
                    .ok_or_else(|| {
                        Error::config(format!(
                            "hardpoint '{}' is bound to unknown bone '{}'",
                            hardpoint.name, bone
                        ))
                    })?;
                ResolvedHardpoint {
                    name: hardpoint.name.clone(),
                    kind: hardpoint.kind.clone(),
                    bone_path: path,
                    transform: hardpoint.transform,
                }
            }
            HardpointBinding::Transform(matrix) => ResolvedHardpoint {
                name: hardpoint.name.clone(),
                kind: hardpoint.kind.clone(),
                bone_path: String::new(),
                transform: *matrix,
            },
        };
        resolved.push(entry);
    }
    Ok(resolved)
}

/// Encode resolved hardpoints.
///
/// Layout: `count:u32`, then per entry `{name128, kind64, bone_path:path,
/// transform:16f32}`.
pub fn encode_hardpoints(hardpoints: &[ResolvedHardpoint], buf: &mut SectionBuffer) -> Result<()> {
    buf.write_u32(hardpoints.len() as u32);
    for hardpoint in hardpoints {
        buf.write_fixed_str(&hardpoint.name, NAME_LEN);
        buf.write_fixed_str(&hardpoint.kind, TAG_LEN);
        buf.write_path(&hardpoint.bone_path);
        buf.write_mat4(&hardpoint.transform);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Bone;

    fn skeleton() -> SkeletonData {
        SkeletonData::new(vec![
            Bone::root("Root", Mat4::IDENTITY),
            Bone::child("Spine", 0, Mat4::from_translation(glam::Vec3::Y)),
        ])
    }

    #[test]
    fn test_skeleton_record_size() -> Result<()> {
        let mut buf = SectionBuffer::new();
        encode_skeleton(&skeleton(), &mut buf)?;
        // count + 2 * (name + parent + two matrices)
        assert_eq!(buf.len(), 4 + 2 * (128 + 4 + 64 + 64));
        Ok(())
    }

    #[test]
    fn test_root_parent_is_minus_one() -> Result<()> {
        let mut buf = SectionBuffer::new();
        encode_skeleton(&skeleton(), &mut buf)?;
        let parent = i32::from_le_bytes(buf.as_slice()[4 + 128..4 + 132].try_into().expect("i32"));
        assert_eq!(parent, -1);
        Ok(())
    }

    #[test]
    fn test_resolve_lone_root_bone() -> Result<()> {
        let lone = SkeletonData::new(vec![Bone::root("Root", Mat4::IDENTITY)]);
        let hardpoints = vec![HardpointData {
            name: "HP_mount".into(),
            kind: "weapon".into(),
            binding: HardpointBinding::Bone("Root".into()),
            transform: Mat4::IDENTITY,
        }];
        let resolved = resolve_hardpoints(&hardpoints, Some(&lone))?;
        assert_eq!(resolved[0].bone_path, "Root");
        Ok(())
    }

    #[test]
    fn test_resolve_nested_bone_path() -> Result<()> {
        let hardpoints = vec![HardpointData {
            name: "HP_back".into(),
            kind: "fx".into(),
            binding: HardpointBinding::Bone("Spine".into()),
            transform: Mat4::IDENTITY,
        }];
        let resolved = resolve_hardpoints(&hardpoints, Some(&skeleton()))?;
        assert_eq!(resolved[0].bone_path, "Root/Spine");
        Ok(())
    }

    #[test]
    fn test_unknown_bone_is_configuration_error() {
        let hardpoints = vec![HardpointData {
            name: "HP_bad".into(),
            kind: "weapon".into(),
            binding: HardpointBinding::Bone("Pelvis".into()),
            transform: Mat4::IDENTITY,
        }];
        let result = resolve_hardpoints(&hardpoints, Some(&skeleton()));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_transform_binding_needs_no_skeleton() -> Result<()> {
        let hardpoints = vec![HardpointData {
            name: "HP_free".into(),
            kind: "fx".into(),
            binding: HardpointBinding::Transform(Mat4::IDENTITY),
            transform: Mat4::IDENTITY,
        }];
        let resolved = resolve_hardpoints(&hardpoints, None)?;
        assert_eq!(resolved[0].bone_path, "");
        Ok(())
    }
}
