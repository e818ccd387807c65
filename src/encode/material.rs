//! Material section encoder.

use crate::container::SectionBuffer;
use crate::scene::MaterialData;
use crate::util::{normalize_resource_path, Result};

use super::{NAME_LEN, TAG_LEN};

/// Encode the material table, one record per slot in slot order.
///
/// Layout: `count:u32`, then per material `{name128, shader64,
/// base_color:4f32, specular:f32, alpha:f32, texture:path}`. Texture
/// references go to the wire as normalized root-relative paths; an absolute
/// input is rejected here, before anything touches disk.
pub fn encode_materials(materials: &[MaterialData], buf: &mut SectionBuffer) -> Result<()> {
    buf.write_u32(materials.len() as u32);
    for material in materials {
        let texture = match &material.texture {
            Some(path) => normalize_resource_path(path)?,
            None => String::new(),
        };
        buf.write_fixed_str(&material.name, NAME_LEN);
        buf.write_fixed_str(&material.shader, TAG_LEN);
        buf.write_vec4(material.base_color);
        buf.write_f32(material.specular);
        buf.write_f32(material.alpha);
        buf.write_path(&texture);
    }
    Ok(())
}
