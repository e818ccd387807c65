//! Prefab section encoder.

use crate::container::SectionBuffer;
use crate::scene::PrefabGroup;
use crate::util::{normalize_resource_path, Result};

use super::NAME_LEN;

/// Encode prefab groups and their placed instances.
///
/// Layout: `group_count:u32`, per group `{name128, instance_count:u32}`,
/// per instance `{resource128, visible:u8, reserved:u8, reserved:u32,
/// transform:16f32}`. Instance resources are normalized like texture
/// references; absolute paths are rejected.
pub fn encode_prefabs(groups: &[PrefabGroup], buf: &mut SectionBuffer) -> Result<()> {
    buf.write_u32(groups.len() as u32);
    for group in groups {
        buf.write_fixed_str(&group.name, NAME_LEN);
        buf.write_u32(group.instances.len() as u32);
        for instance in &group.instances {
            let resource = normalize_resource_path(&instance.resource)?;
            buf.write_fixed_str(&resource, NAME_LEN);
            buf.write_u8(instance.visible as u8);
            buf.write_u8(0);
            buf.write_u32(0);
            buf.write_mat4(&instance.transform);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::PrefabInstance;
    use glam::Mat4;

    #[test]
    fn test_prefab_payload_size() -> Result<()> {
        let group = PrefabGroup {
            name: "props".into(),
            instances: vec![PrefabInstance {
                resource: "Models/Barrel.binsect".into(),
                visible: true,
                transform: Mat4::IDENTITY,
            }],
        };
        let mut buf = SectionBuffer::new();
        encode_prefabs(&[group], &mut buf)?;
        assert_eq!(buf.len(), 4 + 128 + 4 + (128 + 1 + 1 + 4 + 64));
        // Resource path normalized into the fixed field.
        let resource = &buf.as_slice()[4 + 128 + 4..4 + 128 + 4 + 21];
        assert_eq!(resource, b"models/barrel.binsect");
        Ok(())
    }

    #[test]
    fn test_absolute_resource_rejected() {
        let group = PrefabGroup {
            name: "props".into(),
            instances: vec![PrefabInstance {
                resource: "/abs/barrel.binsect".into(),
                visible: true,
                transform: Mat4::IDENTITY,
            }],
        };
        let mut buf = SectionBuffer::new();
        assert!(encode_prefabs(&[group], &mut buf).is_err());
    }
}
