//! Skeleton and hardpoint data.

use glam::Mat4;

use crate::util::{Error, Result};

/// One bone of the hierarchy. `parent` indexes into the owning
/// [`SkeletonData`] bone list; the root has none.
#[derive(Clone, Debug)]
pub struct Bone {
    pub name: String,
    pub parent: Option<usize>,
    pub bind: Mat4,
}

impl Bone {
    pub fn root(name: impl Into<String>, bind: Mat4) -> Self {
        Self { name: name.into(), parent: None, bind }
    }

    pub fn child(name: impl Into<String>, parent: usize, bind: Mat4) -> Self {
        Self { name: name.into(), parent: Some(parent), bind }
    }
}

/// Ordered bone list. Consumers index bones positionally, so write order is
/// part of the contract: parent always precedes child.
#[derive(Clone, Debug, Default)]
pub struct SkeletonData {
    pub bones: Vec<Bone>,
}

impl SkeletonData {
    pub fn new(bones: Vec<Bone>) -> Self {
        Self { bones }
    }

    #[inline]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Index of a bone by name.
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// Check hierarchy invariants: exactly one root, valid parent indices,
    /// parent-before-child order (which also rules out cycles).
    pub fn validate(&self) -> Result<()> {
        let mut roots = 0usize;
        for (index, bone) in self.bones.iter().enumerate() {
            match bone.parent {
                None => roots += 1,
                Some(parent) if parent >= index => {
                    return Err(Error::config(format!(
                        "bone '{}' (index {index}) precedes its parent (index {parent})",
                        bone.name
                    )));
                }
                Some(_) => {}
            }
        }
        if !self.bones.is_empty() && roots != 1 {
            return Err(Error::config(format!("skeleton has {roots} roots, expected 1")));
        }
        Ok(())
    }

    /// Reorder bones depth-first from the root, children in declared order.
    ///
    /// The traversal is the one consumers assume when they index bones
    /// positionally; it is held fixed. Parent indices are remapped to the
    /// new order. Fails if the hierarchy is not single-rooted or contains a
    /// cycle.
    pub fn depth_first(&self) -> Result<SkeletonData> {
        if self.bones.is_empty() {
            return Ok(SkeletonData::default());
        }

        let mut roots = self.bones.iter().enumerate().filter(|(_, b)| b.parent.is_none());
        let root = match (roots.next(), roots.next()) {
            (Some((index, _)), None) => index,
            (None, _) => return Err(Error::config("skeleton has no root bone")),
            (Some(_), Some((extra, _))) => {
                return Err(Error::config(format!(
                    "skeleton has more than one root ('{}' is also parentless)",
                    self.bones[extra].name
                )));
            }
        };

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); self.bones.len()];
        for (index, bone) in self.bones.iter().enumerate() {
            if let Some(parent) = bone.parent {
                if parent >= self.bones.len() {
                    return Err(Error::config(format!(
                        "bone '{}' references parent index {parent} out of range",
                        self.bones[index].name
                    )));
                }
                children[parent].push(index);
            }
        }

        let mut order = Vec::with_capacity(self.bones.len());
        let mut remap = vec![usize::MAX; self.bones.len()];
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            remap[index] = order.len();
            order.push(index);
            // Reverse so the first declared child is visited first.
            for &child in children[index].iter().rev() {
                stack.push(child);
            }
        }
        if order.len() != self.bones.len() {
            return Err(Error::config(
                "skeleton contains bones unreachable from the root (cycle or orphan)",
            ));
        }

        let bones = order
            .iter()
            .map(|&old| {
                let bone = &self.bones[old];
                Bone {
                    name: bone.name.clone(),
                    parent: bone.parent.map(|p| remap[p]),
                    bind: bone.bind,
                }
            })
            .collect();
        Ok(SkeletonData { bones })
    }

    /// Root-to-target name chain for a bone, '/'-joined.
    ///
    /// A skeleton containing only "Root" resolves "Root" to "Root".
    pub fn bone_path(&self, name: &str) -> Option<String> {
        let mut index = self.bone_index(name)?;
        let mut chain = vec![self.bones[index].name.as_str()];
        while let Some(parent) = self.bones[index].parent {
            chain.push(self.bones[parent].name.as_str());
            index = parent;
        }
        chain.reverse();
        Some(chain.join("/"))
    }
}

/// What a hardpoint is anchored to.
#[derive(Clone, Debug)]
pub enum HardpointBinding {
    /// Bound to a named bone; resolved to the root-to-bone path at encode
    /// time. An unknown bone name is a configuration error.
    Bone(String),
    /// Bound to an auxiliary transform object; used directly.
    Transform(Mat4),
}

/// A named attachment point.
#[derive(Clone, Debug)]
pub struct HardpointData {
    pub name: String,
    /// Classification tag, e.g. "weapon" or "fx".
    pub kind: String,
    pub binding: HardpointBinding,
    pub transform: Mat4,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> SkeletonData {
        SkeletonData::new(vec![
            Bone::root("Root", Mat4::IDENTITY),
            Bone::child("Spine", 0, Mat4::IDENTITY),
            Bone::child("Head", 1, Mat4::IDENTITY),
            Bone::child("ArmL", 1, Mat4::IDENTITY),
        ])
    }

    #[test]
    fn test_validate_ok() {
        assert!(chain().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_child_before_parent() {
        let skeleton = SkeletonData::new(vec![
            Bone::child("Spine", 1, Mat4::IDENTITY),
            Bone::root("Root", Mat4::IDENTITY),
        ]);
        assert!(matches!(skeleton.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_depth_first_visits_first_child_first() {
        // Declared order interleaves subtrees; DFS untangles them.
        let skeleton = SkeletonData::new(vec![
            Bone::root("Root", Mat4::IDENTITY),
            Bone::child("A", 0, Mat4::IDENTITY),
            Bone::child("B", 0, Mat4::IDENTITY),
            Bone::child("A1", 1, Mat4::IDENTITY),
        ]);
        let ordered = skeleton.depth_first().expect("orderable");
        let names: Vec<&str> = ordered.bones.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Root", "A", "A1", "B"]);
        ordered.validate().expect("dfs output is parent-before-child");
    }

    #[test]
    fn test_depth_first_rejects_two_roots() {
        let skeleton = SkeletonData::new(vec![
            Bone::root("Root", Mat4::IDENTITY),
            Bone::root("Stray", Mat4::IDENTITY),
        ]);
        assert!(skeleton.depth_first().is_err());
    }

    #[test]
    fn test_bone_path() {
        let skeleton = chain();
        assert_eq!(skeleton.bone_path("Head").as_deref(), Some("Root/Spine/Head"));
        assert_eq!(skeleton.bone_path("Root").as_deref(), Some("Root"));
        assert_eq!(skeleton.bone_path("Missing"), None);
    }

    #[test]
    fn test_acyclic_by_construction() {
        // Following parents from any bone reaches the root within bone_count
        // steps once validate() has passed.
        let skeleton = chain();
        skeleton.validate().expect("valid");
        for start in 0..skeleton.bone_count() {
            let mut index = start;
            let mut steps = 0;
            while let Some(parent) = skeleton.bones[index].parent {
                index = parent;
                steps += 1;
                assert!(steps <= skeleton.bone_count());
            }
            assert_eq!(index, 0);
        }
    }
}
