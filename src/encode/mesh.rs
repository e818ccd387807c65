//! Mesh section encoder.

use crate::container::SectionBuffer;
use crate::export::IndexWidth;
use crate::scene::{MeshData, SkinWeights};
use crate::util::{Error, Result};

/// Bytes per encoded vertex record: position, normal, tangent, uv, color,
/// bone indices and weights.
pub const VERTEX_STRIDE: usize = 84;

/// Encode the render mesh.
///
/// Layout: `vertex_count:u32 index_count:u32`, then fixed-stride vertex
/// records `{position, normal, tangent, uv, color, bone_indices, weights}`,
/// then the index buffer at the configured width.
///
/// Normals and tangents are derived when absent, which may split vertices
/// along hard edges; the counts written here are the post-derivation counts.
/// Encoding is deterministic for identical input and configuration.
pub fn encode_mesh(mesh: &MeshData, index_width: IndexWidth, buf: &mut SectionBuffer) -> Result<()> {
    mesh.validate()?;

    let mut mesh = mesh.clone();
    if mesh.normals.is_none() {
        mesh.derive_normals();
    }
    if mesh.tangents.is_none() {
        mesh.derive_tangents();
    }
    // Derivation may have appended split vertices; re-check the invariants
    // on what actually goes to the wire.
    mesh.validate()?;

    let vertex_count = mesh.vertex_count();
    buf.write_u32(vertex_count as u32);
    buf.write_u32(mesh.index_count() as u32);

    let normals = mesh.normals.as_ref().expect("derived above");
    let tangents = mesh.tangents.as_ref().expect("derived above");
    for vertex in 0..vertex_count {
        buf.write_vec3(mesh.positions[vertex]);
        buf.write_vec3(normals[vertex]);
        buf.write_vec4(tangents[vertex]);
        match &mesh.uvs {
            Some(uvs) => buf.write_vec2(uvs[vertex]),
            None => buf.write_vec2(glam::Vec2::ZERO),
        }
        match &mesh.colors {
            Some(colors) => buf.write_vec4(colors[vertex]),
            None => buf.write_vec4(glam::Vec4::ONE),
        }
        let skin = match &mesh.weights {
            Some(weights) => weights[vertex],
            None => SkinWeights::default(),
        };
        buf.write_bytes(&skin.bones);
        for weight in skin.weights {
            buf.write_f32(weight);
        }
    }

    write_indices(&mesh.indices, index_width, buf)
}

/// Shared index-buffer writer for the Mesh and Collision sections: the
/// width is a pipeline-wide choice applied to both.
pub(crate) fn write_indices(
    indices: &[u32],
    index_width: IndexWidth,
    buf: &mut SectionBuffer,
) -> Result<()> {
    match index_width {
        IndexWidth::U16 => {
            for &index in indices {
                let narrow = u16::try_from(index).map_err(|_| {
                    Error::encoding(format!(
                        "index {index} does not fit the configured 16-bit index buffer"
                    ))
                })?;
                buf.write_u16(narrow);
            }
        }
        IndexWidth::U32 => {
            for &index in indices {
                buf.write_u32(index);
            }
        }
    }
    Ok(())
}
