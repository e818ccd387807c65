//! Mesh data: parallel per-vertex streams plus a triangle index stream.

use glam::{Vec2, Vec3, Vec4};
use smallvec::SmallVec;

use crate::util::{face_normal, Error, Result};

/// Hard-edge threshold for derived normals: faces meeting at more than 45
/// degrees do not share a smoothing group.
const SMOOTH_ANGLE_COS: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Per-vertex skin binding: four bone slots, weights summing to one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkinWeights {
    pub bones: [u8; 4],
    pub weights: [f32; 4],
}

impl Default for SkinWeights {
    /// Rigid binding to bone 0.
    fn default() -> Self {
        Self { bones: [0; 4], weights: [1.0, 0.0, 0.0, 0.0] }
    }
}

impl SkinWeights {
    /// Reduce an arbitrary influence list to the four strongest, renormalized.
    /// Influence order breaks weight ties, so the result is deterministic.
    pub fn from_influences(influences: &[(u8, f32)]) -> Self {
        let mut sorted: SmallVec<[(u8, f32); 8]> =
            influences.iter().copied().filter(|(_, w)| *w > 0.0).collect();
        sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        sorted.truncate(4);

        if sorted.is_empty() {
            return Self::default();
        }
        let total: f32 = sorted.iter().map(|(_, w)| w).sum();
        let mut out = Self { bones: [0; 4], weights: [0.0; 4] };
        for (slot, (bone, weight)) in sorted.iter().enumerate() {
            out.bones[slot] = *bone;
            out.weights[slot] = weight / total;
        }
        out
    }
}

/// Triangle mesh with parallel per-vertex streams.
///
/// Invariants (checked by [`MeshData::validate`]): every present stream has
/// exactly `vertex_count` entries, every index is in range, and the index
/// stream describes whole triangles.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub tangents: Option<Vec<Vec4>>,
    pub uvs: Option<Vec<Vec2>>,
    pub colors: Option<Vec<Vec4>>,
    pub weights: Option<Vec<SkinWeights>>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { positions, indices, ..Default::default() }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Check the stream-length and index-range invariants.
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertex_count();
        let check = |len: usize, stream: &str| -> Result<()> {
            if len != vertex_count {
                return Err(Error::encoding(format!(
                    "stream '{stream}' has {len} entries, expected {vertex_count}"
                )));
            }
            Ok(())
        };
        if let Some(s) = &self.normals {
            check(s.len(), "normal")?;
        }
        if let Some(s) = &self.tangents {
            check(s.len(), "tangent")?;
        }
        if let Some(s) = &self.uvs {
            check(s.len(), "uv")?;
        }
        if let Some(s) = &self.colors {
            check(s.len(), "color")?;
        }
        if let Some(s) = &self.weights {
            check(s.len(), "weights")?;
        }

        if self.indices.len() % 3 != 0 {
            return Err(Error::encoding(format!(
                "index count {} is not a whole number of triangles",
                self.indices.len()
            )));
        }
        for (i, &index) in self.indices.iter().enumerate() {
            if index as usize >= vertex_count {
                return Err(Error::encoding(format!(
                    "index {index} at position {i} out of range (vertex count {vertex_count})"
                )));
            }
        }
        Ok(())
    }

    /// Derive vertex normals when the host supplied none.
    ///
    /// Face normals are accumulated per vertex with area weighting (the
    /// un-normalized cross product carries the area). A vertex whose
    /// incident faces disagree by more than 45 degrees is split: each
    /// smoothing group past the first gets a duplicated vertex, all present
    /// streams copied, and the group's triangle corners remapped. The greedy
    /// grouping walks faces in index order, so output is deterministic.
    pub fn derive_normals(&mut self) {
        let face_count = self.indices.len() / 3;
        let mut face_normals = Vec::with_capacity(face_count);
        let mut face_dirs = Vec::with_capacity(face_count);
        for face in 0..face_count {
            let [a, b, c] = self.face_vertices(face);
            let n = face_normal(self.positions[a], self.positions[b], self.positions[c]);
            face_normals.push(n);
            face_dirs.push(n.normalize_or_zero());
        }

        let mut incident: Vec<SmallVec<[u32; 8]>> = vec![SmallVec::new(); self.vertex_count()];
        for face in 0..face_count {
            for corner in self.face_vertices(face) {
                let faces = &mut incident[corner];
                if faces.last() != Some(&(face as u32)) {
                    faces.push(face as u32);
                }
            }
        }

        let mut normals = vec![Vec3::Z; self.vertex_count()];
        for vertex in 0..incident.len() {
            let faces = std::mem::take(&mut incident[vertex]);
            if faces.is_empty() {
                continue;
            }

            // Greedy smoothing groups: a face joins the first group whose
            // accumulated direction it is within the threshold of.
            let mut groups: Vec<(Vec3, SmallVec<[u32; 8]>)> = Vec::new();
            for &face in &faces {
                let dir = face_dirs[face as usize];
                let slot = groups.iter().position(|(accum, _)| {
                    accum.normalize_or_zero().dot(dir) >= SMOOTH_ANGLE_COS
                });
                match slot {
                    Some(i) => {
                        groups[i].0 += face_normals[face as usize];
                        groups[i].1.push(face);
                    }
                    None => groups.push((face_normals[face as usize], SmallVec::from_slice(&[face]))),
                }
            }

            for (group_index, (accum, members)) in groups.iter().enumerate() {
                let normal = accum.normalize_or(Vec3::Z);
                let target = if group_index == 0 {
                    vertex as u32
                } else {
                    let clone = self.clone_vertex(vertex);
                    normals.push(normal);
                    clone
                };
                normals[target as usize] = normal;
                if group_index > 0 {
                    for &face in members {
                        self.remap_face_corner(face as usize, vertex as u32, target);
                    }
                }
            }
        }

        self.normals = Some(normals);
    }

    /// Derive tangents from the UV gradient when the host supplied none.
    ///
    /// Runs over the final (post-split) topology. Meshes without UVs get a
    /// deterministic basis perpendicular to the normal. The `w` component
    /// carries the bitangent handedness.
    pub fn derive_tangents(&mut self) {
        let normals = match &self.normals {
            Some(n) => n.clone(),
            None => return,
        };
        let vertex_count = self.vertex_count();

        let uvs = match &self.uvs {
            Some(uvs) => uvs,
            None => {
                self.tangents = Some(normals.iter().map(|n| fallback_tangent(*n)).collect());
                return;
            }
        };

        let mut tan_accum = vec![Vec3::ZERO; vertex_count];
        let mut bitan_accum = vec![Vec3::ZERO; vertex_count];
        for face in 0..self.indices.len() / 3 {
            let [a, b, c] = self.face_vertices(face);
            let edge1 = self.positions[b] - self.positions[a];
            let edge2 = self.positions[c] - self.positions[a];
            let duv1 = uvs[b] - uvs[a];
            let duv2 = uvs[c] - uvs[a];
            let det = duv1.x * duv2.y - duv1.y * duv2.x;
            if det.abs() < 1e-12 {
                continue;
            }
            let r = 1.0 / det;
            let tangent = (edge1 * duv2.y - edge2 * duv1.y) * r;
            let bitangent = (edge2 * duv1.x - edge1 * duv2.x) * r;
            for corner in [a, b, c] {
                tan_accum[corner] += tangent;
                bitan_accum[corner] += bitangent;
            }
        }

        let mut tangents = Vec::with_capacity(vertex_count);
        for vertex in 0..vertex_count {
            let n = normals[vertex];
            let t = tan_accum[vertex];
            // Gram-Schmidt against the normal.
            let ortho = (t - n * n.dot(t)).normalize_or_zero();
            if ortho == Vec3::ZERO {
                tangents.push(fallback_tangent(n));
                continue;
            }
            let handedness = if n.cross(ortho).dot(bitan_accum[vertex]) < 0.0 { -1.0 } else { 1.0 };
            tangents.push(ortho.extend(handedness));
        }
        self.tangents = Some(tangents);
    }

    #[inline]
    fn face_vertices(&self, face: usize) -> [usize; 3] {
        [
            self.indices[face * 3] as usize,
            self.indices[face * 3 + 1] as usize,
            self.indices[face * 3 + 2] as usize,
        ]
    }

    /// Duplicate a vertex at the end of every present stream and return the
    /// new index.
    fn clone_vertex(&mut self, vertex: usize) -> u32 {
        let new_index = self.positions.len() as u32;
        self.positions.push(self.positions[vertex]);
        if let Some(s) = &mut self.normals {
            s.push(s[vertex]);
        }
        if let Some(s) = &mut self.tangents {
            s.push(s[vertex]);
        }
        if let Some(s) = &mut self.uvs {
            s.push(s[vertex]);
        }
        if let Some(s) = &mut self.colors {
            s.push(s[vertex]);
        }
        if let Some(s) = &mut self.weights {
            s.push(s[vertex]);
        }
        new_index
    }

    fn remap_face_corner(&mut self, face: usize, from: u32, to: u32) {
        for corner in face * 3..face * 3 + 3 {
            if self.indices[corner] == from {
                self.indices[corner] = to;
            }
        }
    }
}

/// Deterministic tangent for a vertex with no UV information.
fn fallback_tangent(normal: Vec3) -> Vec4 {
    let axis = if normal.z.abs() < 0.9 { Vec3::Z } else { Vec3::X };
    normal.cross(axis).normalize_or(Vec3::X).extend(1.0)
}
