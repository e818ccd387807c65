//! Container format constants and the section registry.

/// Magic tag at the start of a container file.
pub const CONTAINER_MAGIC: u32 = 0x42A1_4E65;

/// Current container format version.
pub const CONTAINER_VERSION: u32 = 1;

/// Size of the file header in bytes: magic, version, section count.
pub const HEADER_SIZE: usize = 12;

/// Size of one section table entry: id, offset, length.
pub const TABLE_ENTRY_SIZE: usize = 12;

/// Uniform payload alignment. Individual sections may only tighten this,
/// never relax it.
pub const SECTION_ALIGNMENT: u32 = 4;

/// Registry-defined section tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum SectionId {
    Mesh = 0x1001,
    Material = 0x2001,
    Skeleton = 0x3001,
    Hardpoint = 0x3002,
    Animation = 0x4001,
    CueTrack = 0x4002,
    Collision = 0x5001,
    Bsp = 0x5002,
    ConvexHull = 0x5003,
    Portal = 0x6001,
    Prefab = 0x7001,
    Hitbox = 0x8001,
}

impl SectionId {
    /// All ids in canonical encode order. Encoders always run in this order;
    /// consumers rely on it when sections are present.
    pub const ORDERED: [SectionId; 12] = [
        SectionId::Mesh,
        SectionId::Material,
        SectionId::Skeleton,
        SectionId::Hardpoint,
        SectionId::Animation,
        SectionId::CueTrack,
        SectionId::Collision,
        SectionId::Bsp,
        SectionId::ConvexHull,
        SectionId::Portal,
        SectionId::Prefab,
        SectionId::Hitbox,
    ];

    /// Resolve a raw tag read from a file.
    pub fn from_u32(raw: u32) -> Option<SectionId> {
        Self::ORDERED.iter().copied().find(|id| *id as u32 == raw)
    }

    /// Human-readable name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            SectionId::Mesh => "Mesh",
            SectionId::Material => "Material",
            SectionId::Skeleton => "Skeleton",
            SectionId::Hardpoint => "Hardpoint",
            SectionId::Animation => "Animation",
            SectionId::CueTrack => "CueTrack",
            SectionId::Collision => "Collision",
            SectionId::Bsp => "Bsp",
            SectionId::ConvexHull => "ConvexHull",
            SectionId::Portal => "Portal",
            SectionId::Prefab => "Prefab",
            SectionId::Hitbox => "Hitbox",
        }
    }

    /// Position in the canonical encode order.
    pub fn order_index(self) -> usize {
        Self::ORDERED.iter().position(|id| *id == self).unwrap_or(usize::MAX)
    }
}

/// Static description of one section kind.
#[derive(Clone, Copy, Debug)]
pub struct SectionSpec {
    pub id: SectionId,
    pub alignment: u32,
    /// Smallest payload a well-formed section of this kind can have
    /// (its fixed count fields).
    pub min_size: u32,
}

/// Immutable registry of known sections, injected into the pipeline and the
/// structural checker at construction.
#[derive(Clone, Debug)]
pub struct SectionRegistry {
    specs: Vec<SectionSpec>,
}

impl SectionRegistry {
    /// The registry the engine's loader expects.
    pub fn engine_default() -> Self {
        let specs = vec![
            SectionSpec { id: SectionId::Mesh, alignment: 4, min_size: 8 },
            SectionSpec { id: SectionId::Material, alignment: 4, min_size: 4 },
            SectionSpec { id: SectionId::Skeleton, alignment: 4, min_size: 4 },
            SectionSpec { id: SectionId::Hardpoint, alignment: 4, min_size: 4 },
            SectionSpec { id: SectionId::Animation, alignment: 4, min_size: 8 },
            SectionSpec { id: SectionId::CueTrack, alignment: 4, min_size: 4 },
            SectionSpec { id: SectionId::Collision, alignment: 4, min_size: 8 },
            SectionSpec { id: SectionId::Bsp, alignment: 4, min_size: 8 },
            SectionSpec { id: SectionId::ConvexHull, alignment: 4, min_size: 8 },
            SectionSpec { id: SectionId::Portal, alignment: 4, min_size: 4 },
            SectionSpec { id: SectionId::Prefab, alignment: 4, min_size: 4 },
            SectionSpec { id: SectionId::Hitbox, alignment: 4, min_size: 4 },
        ];
        Self { specs }
    }

    /// Look up the spec for an id.
    pub fn spec(&self, id: SectionId) -> Option<&SectionSpec> {
        self.specs.iter().find(|s| s.id == id)
    }

    /// Whether a raw tag belongs to the registry.
    pub fn contains(&self, raw: u32) -> bool {
        SectionId::from_u32(raw).map(|id| self.spec(id).is_some()).unwrap_or(false)
    }

    pub fn specs(&self) -> &[SectionSpec] {
        &self.specs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_roundtrip() {
        for id in SectionId::ORDERED {
            assert_eq!(SectionId::from_u32(id as u32), Some(id));
        }
        assert_eq!(SectionId::from_u32(0xdead), None);
    }

    #[test]
    fn test_order_matches_registry() {
        let reg = SectionRegistry::engine_default();
        let ids: Vec<SectionId> = reg.specs().iter().map(|s| s.id).collect();
        assert_eq!(ids, SectionId::ORDERED.to_vec());
    }

    #[test]
    fn test_header_keeps_payloads_aligned() {
        // Any section count keeps the first payload on a 4-byte boundary.
        for count in 0..16usize {
            assert_eq!((HEADER_SIZE + count * TABLE_ENTRY_SIZE) % 4, 0);
        }
    }
}
