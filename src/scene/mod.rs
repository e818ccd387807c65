//! Canonical in-memory description of one 3D asset.
//!
//! Everything here is plain resolved data handed over by the host pipeline:
//! vertex buffers, bone hierarchies, keyframe tracks, material descriptors.
//! One [`SceneData`] is built per export pass and discarded when the pass
//! ends; nothing persists across runs.

mod animation;
mod collision;
mod hitbox;
mod material;
mod mesh;
mod portal;
mod prefab;
mod skeleton;

pub use animation::{sort_cues, Action, AnimationData, BoneTrack, CueEvent, Keyframe};
pub use collision::CollisionData;
pub use hitbox::HitboxData;
pub use material::MaterialData;
pub use mesh::{MeshData, SkinWeights};
pub use portal::PortalData;
pub use prefab::{PrefabGroup, PrefabInstance};
pub use skeleton::{Bone, HardpointBinding, HardpointData, SkeletonData};

/// All resolved data for one export pass.
#[derive(Debug, Default)]
pub struct SceneData {
    /// Asset name, used for diagnostics only; never encoded.
    pub name: String,
    pub mesh: Option<MeshData>,
    pub materials: Vec<MaterialData>,
    pub skeleton: Option<SkeletonData>,
    pub hardpoints: Vec<HardpointData>,
    pub animations: Vec<AnimationData>,
    pub cues: Vec<CueEvent>,
    pub actions: Vec<Action>,
    pub collision: Option<CollisionData>,
    pub portals: Vec<PortalData>,
    pub prefabs: Vec<PrefabGroup>,
    pub hitboxes: Vec<HitboxData>,
}

impl SceneData {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }
}
