//! Collision family section encoders.

use crate::container::SectionBuffer;
use crate::export::IndexWidth;
use crate::scene::CollisionData;
use crate::util::Result;

use super::mesh::write_indices;

/// Encode the collision triangle soup.
///
/// Layout: `vertex_count:u32 index_count:u32`, positions as 3f32, indices
/// at the pipeline index width (the same configuration the Mesh section
/// uses).
pub fn encode_collision(
    collision: &CollisionData,
    index_width: IndexWidth,
    buf: &mut SectionBuffer,
) -> Result<()> {
    collision.validate()?;

    buf.write_u32(collision.positions.len() as u32);
    buf.write_u32(collision.indices.len() as u32);
    for &position in &collision.positions {
        buf.write_vec3(position);
    }
    write_indices(&collision.indices, index_width, buf)
}

/// Encode the BSP placeholder.
///
/// The legacy layout is undocumented; the reference writes an empty
/// placeholder and so do we: `{version:u32 = 0, count:u32 = 0}`.
pub fn encode_bsp_placeholder(buf: &mut SectionBuffer) -> Result<()> {
    buf.write_u32(0);
    buf.write_u32(0);
    Ok(())
}

/// Encode the convex hull placeholder. Same situation as the BSP section.
pub fn encode_convex_hull_placeholder(buf: &mut SectionBuffer) -> Result<()> {
    buf.write_u32(0);
    buf.write_u32(0);
    Ok(())
}
