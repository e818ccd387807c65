//! Portal section encoder.

use crate::container::SectionBuffer;
use crate::scene::PortalData;
use crate::util::{Error, Result};

/// Encode portal markers.
///
/// Layout: `count:u32`, then per portal `{kind:cstr, label:cstr,
/// vertex_count:u32, positions:3f32*, index_count:u32, indices:u32*}`.
/// Portal geometry is small and always uses 32-bit indices, independent of
/// the mesh index width.
pub fn encode_portals(portals: &[PortalData], buf: &mut SectionBuffer) -> Result<()> {
    buf.write_u32(portals.len() as u32);
    for portal in portals {
        let vertex_count = portal.positions.len();
        for &index in &portal.indices {
            if index as usize >= vertex_count {
                return Err(Error::encoding(format!(
                    "portal '{}' index {index} out of range (vertex count {vertex_count})",
                    portal.label
                )));
            }
        }

        buf.write_cstr(&portal.kind);
        buf.write_cstr(&portal.label);
        buf.write_u32(vertex_count as u32);
        for &position in &portal.positions {
            buf.write_vec3(position);
        }
        buf.write_u32(portal.indices.len() as u32);
        for &index in &portal.indices {
            buf.write_u32(index);
        }
    }
    Ok(())
}
