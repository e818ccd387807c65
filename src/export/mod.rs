//! Scene assembly pipeline.
//!
//! Drives one export pass through the fixed state sequence
//! `Idle -> Collecting -> Encoding -> Writing -> Validating -> Done | Failed`.
//! The assembler selects the encoder subset for the export mode, resolves
//! every name-based cross-reference up front, fans the active encoders out
//! into private buffers, and merges them into the container in registry
//! order. Terminal states are not re-entrant: the pipeline value is
//! consumed by [`ScenePipeline::export`].

mod audit;
mod options;
mod report;

pub use audit::{AuditEntry, AuditLog};
pub use options::{ExportMode, ExportOptions, IndexWidth};
pub use report::{ExportReport, SectionSummary, ValidationSummary};

use std::collections::HashSet;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::container::{
    ContainerWriter, SectionBuffer, SectionId, SectionRegistry, CONTAINER_MAGIC, CONTAINER_VERSION,
};
use crate::encode::{
    encode_animations, encode_bsp_placeholder, encode_collision, encode_convex_hull_placeholder,
    encode_cue_track, encode_hardpoints, encode_hitboxes, encode_materials, encode_mesh,
    encode_portals, encode_prefabs, encode_skeleton, resolve_hardpoints, resolve_hitboxes,
    ResolvedHardpoint, ResolvedHitbox,
};
use crate::scene::{Action, SceneData, SkeletonData};
use crate::util::{Error, Result};
use crate::validate::{byte_diff, StructuralChecker};

/// Pipeline states. One pass walks them strictly forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Collecting,
    Encoding,
    Writing,
    Validating,
    Done,
    Failed,
}

/// One export pass. Construct, collect a scene, export, read the report.
pub struct ScenePipeline {
    options: ExportOptions,
    registry: SectionRegistry,
    state: PipelineState,
    scene: Option<SceneData>,
}

impl ScenePipeline {
    /// New pipeline with the engine's default section registry.
    pub fn new(options: ExportOptions) -> Self {
        Self::with_registry(options, SectionRegistry::engine_default())
    }

    /// New pipeline with an explicit registry.
    pub fn with_registry(options: ExportOptions, registry: SectionRegistry) -> Self {
        Self { options, registry, state: PipelineState::Idle, scene: None }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Take ownership of the resolved scene data for this pass.
    pub fn collect(mut self, scene: SceneData) -> Self {
        debug!(scene = %scene.name, "collected scene data");
        self.state = PipelineState::Collecting;
        self.scene = Some(scene);
        self
    }

    /// Run the pass: encode, write, optionally validate.
    ///
    /// Data problems do not abort early; they are aggregated into the
    /// returned report (collect-then-report), and no file is written when
    /// any error was found. `Err` is reserved for misuse (no scene
    /// collected).
    pub fn export(mut self, path: impl AsRef<Path>) -> Result<ExportReport> {
        let scene = self
            .scene
            .take()
            .ok_or_else(|| Error::config("export called before a scene was collected"))?;
        let path = path.as_ref();
        let mode = self.options.mode;
        let mut report = ExportReport::new(scene.name.clone(), mode);
        let mut errors: Vec<String> = Vec::new();

        info!(scene = %scene.name, ?mode, "export pass started");
        self.state = PipelineState::Encoding;

        // -- Cross-reference resolution, before any payload bytes exist. --

        let skeleton = if mode.has_skeleton() {
            match &scene.skeleton {
                Some(authored) => match authored.depth_first() {
                    Ok(ordered) => Some(ordered),
                    Err(e) => {
                        errors.push(e.to_string());
                        None
                    }
                },
                // No armature in a skinned export: empty placeholder section.
                None => Some(SkeletonData::default()),
            }
        } else {
            None
        };

        let mut hardpoints: Vec<ResolvedHardpoint> = Vec::new();
        if mode.has_skeleton() {
            for hardpoint in &scene.hardpoints {
                match resolve_hardpoints(std::slice::from_ref(hardpoint), skeleton.as_ref()) {
                    Ok(resolved) => hardpoints.extend(resolved),
                    Err(e) => errors.push(e.to_string()),
                }
            }
        }

        let mut hitboxes: Vec<ResolvedHitbox> = Vec::new();
        for hitbox in &scene.hitboxes {
            match resolve_hitboxes(std::slice::from_ref(hitbox), skeleton.as_ref()) {
                Ok(resolved) => hitboxes.extend(resolved),
                Err(e) => errors.push(e.to_string()),
            }
        }

        let actions: Vec<Action> = if mode.has_animation() {
            let encoded: HashSet<&str> = scene.animations.iter().map(|a| a.name.as_str()).collect();
            let mut kept = Vec::new();
            for action in &scene.actions {
                if encoded.contains(action.animation.as_str()) {
                    kept.push(action.clone());
                } else {
                    warn!(action = %action.name, animation = %action.animation, "dropping action");
                    report.warn(format!(
                        "action '{}' references missing animation '{}' and was dropped",
                        action.name, action.animation
                    ));
                }
            }
            kept
        } else {
            Vec::new()
        };

        if scene.mesh.is_none() {
            errors.push(Error::config("scene has no mesh data").to_string());
        }

        if self.options.strict {
            for warning in &report.warnings {
                errors.push(format!("strict mode: {warning}"));
            }
        }

        // -- Parallel encode into private buffers. --

        let active = active_sections(&scene, mode);
        let ctx = EncodeContext {
            scene: &scene,
            skeleton: skeleton.as_ref(),
            hardpoints: &hardpoints,
            hitboxes: &hitboxes,
            actions: &actions,
            index_width: self.options.index_width,
        };
        let mut encoded: Vec<(SectionId, SectionBuffer)> = Vec::new();
        let outcomes: Vec<(SectionId, Result<SectionBuffer>)> = active
            .par_iter()
            .map(|id| (*id, encode_section(*id, &ctx)))
            .collect();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(buffer) => encoded.push((id, buffer)),
                Err(e) => errors.push(format!("{}: {e}", id.name())),
            }
        }

        if !errors.is_empty() {
            return self.fail(report, errors);
        }

        // -- Single-threaded merge and atomic write. --

        self.state = PipelineState::Writing;
        let mut writer = ContainerWriter::create(path);
        writer.write_header(CONTAINER_MAGIC, CONTAINER_VERSION);
        for (id, buffer) in encoded {
            if let Err(e) = writer.push_section(id, buffer) {
                errors.push(e.to_string());
            }
        }
        if !errors.is_empty() {
            return self.fail(report, errors);
        }
        let records = match writer.finalize() {
            Ok(records) => records,
            Err(e) => {
                errors.push(e.to_string());
                return self.fail(report, errors);
            }
        };
        report.sections = records.iter().map(SectionSummary::from).collect();
        info!(sections = records.len(), path = %path.display(), "container written");

        // -- Optional validation over the finished file. --

        if self.options.validate {
            self.state = PipelineState::Validating;
            let structural = StructuralChecker::new(self.registry.clone()).check(path)?;
            let byte_mismatches = match &self.options.reference {
                Some(reference) => Some(byte_diff(path, reference)?.total_mismatches),
                None => None,
            };
            report.validation = Some(ValidationSummary {
                structural_violations: structural.violations,
                byte_mismatches,
            });
        }

        self.state = PipelineState::Done;
        report.state = "done".into();
        self.write_audit(&report);
        Ok(report)
    }

    fn fail(mut self, mut report: ExportReport, errors: Vec<String>) -> Result<ExportReport> {
        for error in &errors {
            warn!(%error, "export pass failed");
        }
        self.state = PipelineState::Failed;
        report.state = "failed".into();
        report.errors = errors;
        self.write_audit(&report);
        Ok(report)
    }

    fn write_audit(&self, report: &ExportReport) {
        let Some(audit_path) = &self.options.audit_log else {
            return;
        };
        let mut entries: Vec<AuditEntry> = report
            .sections
            .iter()
            .map(|s| AuditEntry::now(s.id, "ok"))
            .collect();
        entries.push(AuditEntry::now(0, report.state.clone()));
        if let Err(e) = AuditLog::new(audit_path).append(&entries) {
            warn!(error = %e, "audit log write failed");
        }
    }
}

/// The encoder subset for this scene and mode, in registry order.
///
/// Mode gates the mesh/material/skeleton/animation families; the auxiliary
/// sections are presence-driven in every mode.
fn active_sections(scene: &SceneData, mode: ExportMode) -> Vec<SectionId> {
    SectionId::ORDERED
        .iter()
        .copied()
        .filter(|id| match id {
            SectionId::Mesh | SectionId::Material => true,
            SectionId::Skeleton | SectionId::Hardpoint => mode.has_skeleton(),
            SectionId::Animation | SectionId::CueTrack => mode.has_animation(),
            SectionId::Collision | SectionId::Bsp | SectionId::ConvexHull => {
                scene.collision.is_some()
            }
            SectionId::Portal => !scene.portals.is_empty(),
            SectionId::Prefab => !scene.prefabs.is_empty(),
            SectionId::Hitbox => !scene.hitboxes.is_empty(),
        })
        .collect()
}

/// Read-only view shared by the parallel encode jobs.
struct EncodeContext<'a> {
    scene: &'a SceneData,
    skeleton: Option<&'a SkeletonData>,
    hardpoints: &'a [ResolvedHardpoint],
    hitboxes: &'a [ResolvedHitbox],
    actions: &'a [Action],
    index_width: IndexWidth,
}

fn encode_section(id: SectionId, ctx: &EncodeContext<'_>) -> Result<SectionBuffer> {
    let mut buf = SectionBuffer::new();
    match id {
        SectionId::Mesh => {
            let mesh =
                ctx.scene.mesh.as_ref().ok_or_else(|| Error::config("scene has no mesh data"))?;
            encode_mesh(mesh, ctx.index_width, &mut buf)?;
        }
        SectionId::Material => encode_materials(&ctx.scene.materials, &mut buf)?,
        SectionId::Skeleton => {
            let skeleton =
                ctx.skeleton.ok_or_else(|| Error::config("skeleton section with no skeleton"))?;
            encode_skeleton(skeleton, &mut buf)?;
        }
        SectionId::Hardpoint => encode_hardpoints(ctx.hardpoints, &mut buf)?,
        SectionId::Animation => encode_animations(&ctx.scene.animations, ctx.actions, &mut buf)?,
        SectionId::CueTrack => encode_cue_track(&ctx.scene.cues, &mut buf)?,
        SectionId::Collision => {
            let collision = ctx
                .scene
                .collision
                .as_ref()
                .ok_or_else(|| Error::config("collision section with no collision data"))?;
            encode_collision(collision, ctx.index_width, &mut buf)?;
        }
        SectionId::Bsp => encode_bsp_placeholder(&mut buf)?,
        SectionId::ConvexHull => encode_convex_hull_placeholder(&mut buf)?,
        SectionId::Portal => encode_portals(&ctx.scene.portals, &mut buf)?,
        SectionId::Prefab => encode_prefabs(&ctx.scene.prefabs, &mut buf)?,
        SectionId::Hitbox => encode_hitboxes(ctx.hitboxes, &mut buf)?,
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn cube_scene() -> SceneData {
        let mut scene = SceneData::new("cube");
        scene.mesh = Some(crate::scene::MeshData::new(
            vec![
                Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(1.0, -1.0, -1.0),
                Vec3::new(1.0, 1.0, -1.0),
                Vec3::new(-1.0, 1.0, -1.0),
                Vec3::new(-1.0, -1.0, 1.0),
                Vec3::new(1.0, -1.0, 1.0),
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(-1.0, 1.0, 1.0),
            ],
            vec![
                0, 2, 1, 0, 3, 2, // -Z
                4, 5, 6, 4, 6, 7, // +Z
                0, 1, 5, 0, 5, 4, // -Y
                2, 3, 7, 2, 7, 6, // +Y
                1, 2, 6, 1, 6, 5, // +X
                0, 4, 7, 0, 7, 3, // -X
            ],
        ));
        scene.materials.push(crate::scene::MaterialData::new("default"));
        scene
    }

    #[test]
    fn test_static_mode_scopes_out_skeleton() {
        let mut scene = cube_scene();
        scene.skeleton = Some(SkeletonData::new(vec![crate::scene::Bone::root(
            "Root",
            glam::Mat4::IDENTITY,
        )]));
        let active = active_sections(&scene, ExportMode::Static);
        assert_eq!(active, vec![SectionId::Mesh, SectionId::Material]);
    }

    #[test]
    fn test_character_mode_activates_animation_family() {
        let scene = cube_scene();
        let active = active_sections(&scene, ExportMode::Character);
        assert_eq!(
            active,
            vec![
                SectionId::Mesh,
                SectionId::Material,
                SectionId::Skeleton,
                SectionId::Hardpoint,
                SectionId::Animation,
                SectionId::CueTrack,
            ]
        );
    }

    #[test]
    fn test_collision_family_is_presence_driven() {
        let mut scene = cube_scene();
        scene.collision = Some(crate::scene::CollisionData::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2],
        ));
        let active = active_sections(&scene, ExportMode::Static);
        assert_eq!(
            active,
            vec![
                SectionId::Mesh,
                SectionId::Material,
                SectionId::Collision,
                SectionId::Bsp,
                SectionId::ConvexHull,
            ]
        );
    }
}
