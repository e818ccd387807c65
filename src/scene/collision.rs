//! Collision geometry.

use glam::Vec3;

use crate::util::{Error, Result};

/// Triangle soup used by the engine's collision pass. Follows the same
/// length and index-range discipline as the render mesh.
#[derive(Clone, Debug, Default)]
pub struct CollisionData {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl CollisionData {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    pub fn validate(&self) -> Result<()> {
        if self.indices.len() % 3 != 0 {
            return Err(Error::encoding(format!(
                "collision index count {} is not a whole number of triangles",
                self.indices.len()
            )));
        }
        let vertex_count = self.positions.len();
        for &index in &self.indices {
            if index as usize >= vertex_count {
                return Err(Error::encoding(format!(
                    "collision index {index} out of range (vertex count {vertex_count})"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_bad_index() {
        let collision = CollisionData::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 3]);
        assert!(collision.validate().is_err());
    }
}
