//! Structural checker: schema conformance of a finished container.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::container::{Container, SectionId, SectionRegistry, CONTAINER_VERSION};
use crate::encode::{BONE_RECORD_SIZE, VERTEX_STRIDE};
use crate::export::ExportMode;
use crate::util::{Error, Result};

/// One section as seen by the checker.
#[derive(Clone, Debug, Serialize)]
pub struct CheckedSection {
    pub id: u32,
    pub offset: u32,
    pub length: u32,
}

/// Checker result: empty `violations` means pass.
#[derive(Clone, Debug, Serialize)]
pub struct StructuralReport {
    pub file: PathBuf,
    pub sections: Vec<CheckedSection>,
    pub detected_mode: Option<ExportMode>,
    pub violations: Vec<String>,
}

impl StructuralReport {
    pub fn is_pass(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Structural checker bound to a section registry.
pub struct StructuralChecker {
    registry: SectionRegistry,
}

impl StructuralChecker {
    pub fn new(registry: SectionRegistry) -> Self {
        Self { registry }
    }

    /// Check one container file.
    ///
    /// Malformed headers and tables become violations; only I/O failures
    /// surface as `Err`.
    pub fn check(&self, path: impl AsRef<Path>) -> Result<StructuralReport> {
        let path = path.as_ref();
        let mut report = StructuralReport {
            file: path.to_path_buf(),
            sections: Vec::new(),
            detected_mode: None,
            violations: Vec::new(),
        };

        let container = match Container::open(path) {
            Ok(container) => container,
            Err(Error::Io(e)) => return Err(Error::Io(e)),
            Err(Error::FileNotFound(p)) => return Err(Error::FileNotFound(p)),
            Err(e) => {
                report.violations.push(format!("unreadable container: {e}"));
                return Ok(report);
            }
        };

        if container.version() != CONTAINER_VERSION {
            report
                .violations
                .push(format!("unsupported container version {}", container.version()));
        }

        let mut previous_offset: Option<u32> = None;
        let mut previous_order: Option<usize> = None;
        let mut seen: Vec<u32> = Vec::new();
        let mut mesh_index_stride: Option<usize> = None;
        let mut collision_index_stride: Option<usize> = None;

        for record in container.records() {
            report.sections.push(CheckedSection {
                id: record.id,
                offset: record.offset,
                length: record.length,
            });

            if seen.contains(&record.id) {
                report.violations.push(format!("duplicate section id {:#06x}", record.id));
            }
            seen.push(record.id);

            let id = match record.section_id() {
                Some(id) if self.registry.contains(record.id) => id,
                _ => {
                    report
                        .violations
                        .push(format!("section id {:#06x} not in registry", record.id));
                    continue;
                }
            };
            let spec = self.registry.spec(id).expect("id verified against registry");

            if record.offset % spec.alignment != 0 {
                report.violations.push(format!(
                    "section {} at offset {} violates {}-byte alignment",
                    id.name(),
                    record.offset,
                    spec.alignment
                ));
            }
            if let Some(previous) = previous_offset {
                if record.offset <= previous {
                    report.violations.push(format!(
                        "section {} offset {} not strictly increasing",
                        id.name(),
                        record.offset
                    ));
                }
            }
            previous_offset = Some(record.offset);

            if let Some(previous) = previous_order {
                if id.order_index() < previous {
                    report
                        .violations
                        .push(format!("section {} out of registry order", id.name()));
                }
            }
            previous_order = Some(id.order_index());

            if record.length < spec.min_size {
                report.violations.push(format!(
                    "section {} length {} below minimum {}",
                    id.name(),
                    record.length,
                    spec.min_size
                ));
            }

            let payload = match container.payload_of(record) {
                Some(payload) => payload,
                None => {
                    report.violations.push(format!(
                        "section {} payload [{}..{}] exceeds file size {}",
                        id.name(),
                        record.offset,
                        record.offset as u64 + record.length as u64,
                        container.file_len()
                    ));
                    continue;
                }
            };

            match id {
                SectionId::Mesh => {
                    mesh_index_stride = check_indexed_payload(
                        &mut report,
                        id,
                        payload,
                        VERTEX_STRIDE,
                    );
                }
                SectionId::Collision => {
                    collision_index_stride =
                        check_indexed_payload(&mut report, id, payload, 12);
                }
                SectionId::Skeleton => check_skeleton_payload(&mut report, payload),
                _ => {}
            }
        }

        if let (Some(mesh), Some(collision)) = (mesh_index_stride, collision_index_stride) {
            if mesh != collision {
                report.violations.push(format!(
                    "index width differs between Mesh ({}-bit) and Collision ({}-bit)",
                    mesh * 8,
                    collision * 8
                ));
            }
        }

        self.check_mode_scoping(&mut report, &seen);
        Ok(report)
    }

    /// Detect the export mode from the sections present and confirm the
    /// mandatory set for that mode.
    fn check_mode_scoping(&self, report: &mut StructuralReport, seen: &[u32]) {
        let has = |id: SectionId| seen.contains(&(id as u32));

        let mode = if has(SectionId::Animation) || has(SectionId::CueTrack) {
            ExportMode::Character
        } else if has(SectionId::Skeleton) || has(SectionId::Hardpoint) {
            ExportMode::Skinned
        } else {
            ExportMode::Static
        };
        report.detected_mode = Some(mode);

        let mut require = |id: SectionId| {
            if !has(id) {
                report
                    .violations
                    .push(format!("{:?} container is missing its {} section", mode, id.name()));
            }
        };
        require(SectionId::Mesh);
        require(SectionId::Material);
        if mode.has_skeleton() {
            require(SectionId::Skeleton);
            require(SectionId::Hardpoint);
        }
        if mode.has_animation() {
            require(SectionId::Animation);
            require(SectionId::CueTrack);
        }

        let collision_family =
            [SectionId::Collision, SectionId::Bsp, SectionId::ConvexHull].map(has);
        if (collision_family[1] || collision_family[2]) && !collision_family[0] {
            report
                .violations
                .push("Bsp/ConvexHull present without a Collision section".into());
        }
    }
}

/// Validate a `{vertex_count, index_count, records, indices}` payload and
/// infer its index stride. Returns `None` when the length fits neither a
/// 16- nor a 32-bit index buffer.
fn check_indexed_payload(
    report: &mut StructuralReport,
    id: SectionId,
    payload: &[u8],
    record_stride: usize,
) -> Option<usize> {
    if payload.len() < 8 {
        return None; // already reported via min_size
    }
    let vertex_count = read_u32(payload, 0) as usize;
    let index_count = read_u32(payload, 4) as usize;
    let base = 8 + vertex_count * record_stride;
    if index_count == 0 {
        // No index bytes to infer a width from.
        if payload.len() != base {
            report.violations.push(format!(
                "section {} length {} inconsistent with declared counts ({} vertices, 0 indices)",
                id.name(),
                payload.len(),
                vertex_count
            ));
        }
        return None;
    }
    for index_stride in [2usize, 4] {
        if payload.len() == base + index_count * index_stride {
            return Some(index_stride);
        }
    }
    report.violations.push(format!(
        "section {} length {} inconsistent with declared counts ({} vertices, {} indices)",
        id.name(),
        payload.len(),
        vertex_count,
        index_count
    ));
    None
}

fn check_skeleton_payload(report: &mut StructuralReport, payload: &[u8]) {
    if payload.len() < 4 {
        return;
    }
    let bone_count = read_u32(payload, 0) as usize;
    let expected = 4 + bone_count * BONE_RECORD_SIZE;
    if payload.len() != expected {
        report.violations.push(format!(
            "Skeleton length {} inconsistent with {} declared bones (expected {})",
            payload.len(),
            bone_count,
            expected
        ));
    }
}

#[inline]
fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(bytes[at..at + 4].try_into().expect("bounds checked by caller"))
}

/// Check a container against the engine's default registry.
pub fn structural_check(path: impl AsRef<Path>) -> Result<StructuralReport> {
    StructuralChecker::new(SectionRegistry::engine_default()).check(path)
}
