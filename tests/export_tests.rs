//! Integration tests for the export pipeline: encode a scene, reopen the
//! container, and verify the written structure.

use binsect::container::{Container, SectionId};
use binsect::export::{ExportMode, ExportOptions, ScenePipeline};
use binsect::scene::{
    Action, AnimationData, Bone, BoneTrack, CueEvent, HardpointBinding, HardpointData, Keyframe,
    MaterialData, MeshData, SceneData, SkeletonData,
};
use binsect::validate::{byte_diff, structural_check};

use glam::{Mat4, Quat, Vec3};
use tempfile::TempDir;

/// The fixed minimal scene: one cube (8 vertices, 12 triangles), one
/// material, no skeleton.
fn cube_scene() -> SceneData {
    let mut scene = SceneData::new("cube");
    scene.mesh = Some(MeshData::new(
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
    scene.materials.push(MaterialData::new("default"));
    scene
}

fn simple_skeleton() -> SkeletonData {
    SkeletonData::new(vec![
        Bone::root("Root", Mat4::IDENTITY),
        Bone::child("Spine", 0, Mat4::from_translation(Vec3::Y)),
    ])
}

fn walk_animation() -> AnimationData {
    AnimationData {
        name: "walk".into(),
        duration: 1.0,
        tracks: vec![BoneTrack {
            bone: "Root".into(),
            keys: vec![
                Keyframe { time: 0.0, position: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE },
                Keyframe { time: 1.0, position: Vec3::X, rotation: Quat::IDENTITY, scale: Vec3::ONE },
            ],
        }],
    }
}

#[test]
fn test_static_cube_table_is_mesh_and_material() {
    let dir = TempDir::new().expect("temp dir");
    let out = dir.path().join("cube.binsect");

    let report = ScenePipeline::new(ExportOptions::default())
        .collect(cube_scene())
        .export(&out)
        .expect("export runs");
    assert!(report.is_success(), "errors: {:?}", report.errors);

    let container = Container::open(&out).expect("container reopens");
    let ids: Vec<u32> = container.records().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![SectionId::Mesh as u32, SectionId::Material as u32]);

    let structural = structural_check(&out).expect("check runs");
    assert!(structural.is_pass(), "violations: {:?}", structural.violations);
    assert_eq!(structural.detected_mode, Some(ExportMode::Static));
}

#[test]
fn test_all_section_offsets_aligned() {
    let dir = TempDir::new().expect("temp dir");
    let out = dir.path().join("char.binsect");

    let mut scene = cube_scene();
    scene.skeleton = Some(simple_skeleton());
    scene.animations.push(walk_animation());
    scene.cues.push(CueEvent { time: 0.5, label: "step".into(), parameter: String::new() });

    let report = ScenePipeline::new(ExportOptions::with_mode(ExportMode::Character))
        .collect(scene)
        .export(&out)
        .expect("export runs");
    assert!(report.is_success(), "errors: {:?}", report.errors);

    let container = Container::open(&out).expect("container reopens");
    assert!(container.records().len() >= 6);
    for record in container.records() {
        assert_eq!(record.offset % 4, 0, "section {:#06x} misaligned", record.id);
    }
}

#[test]
fn test_encoding_is_idempotent_byte_for_byte() {
    let dir = TempDir::new().expect("temp dir");
    let first = dir.path().join("a.binsect");
    let second = dir.path().join("b.binsect");

    ScenePipeline::new(ExportOptions::default())
        .collect(cube_scene())
        .export(&first)
        .expect("first export");
    ScenePipeline::new(ExportOptions::default())
        .collect(cube_scene())
        .export(&second)
        .expect("second export");

    let diff = byte_diff(&first, &second).expect("diff runs");
    assert!(diff.is_pass(), "{}", diff.format_report());
}

#[test]
fn test_reference_equivalence_via_byte_diff_stage() {
    let dir = TempDir::new().expect("temp dir");
    let reference = dir.path().join("reference.binsect");
    let out = dir.path().join("out.binsect");

    // Produce the golden file, then export again with validation against it.
    ScenePipeline::new(ExportOptions::default())
        .collect(cube_scene())
        .export(&reference)
        .expect("reference export");

    let options = ExportOptions {
        validate: true,
        reference: Some(reference.clone()),
        ..Default::default()
    };
    let report = ScenePipeline::new(options)
        .collect(cube_scene())
        .export(&out)
        .expect("export runs");

    let validation = report.validation.as_ref().expect("validation ran");
    assert_eq!(validation.byte_mismatches, Some(0));
    assert!(validation.structural_violations.is_empty());
    assert!(report.is_success());
}

#[test]
fn test_static_mode_ignores_present_skeleton() {
    let dir = TempDir::new().expect("temp dir");
    let out = dir.path().join("static.binsect");

    let mut scene = cube_scene();
    scene.skeleton = Some(simple_skeleton());
    scene.animations.push(walk_animation());

    let report = ScenePipeline::new(ExportOptions::with_mode(ExportMode::Static))
        .collect(scene)
        .export(&out)
        .expect("export runs");
    assert!(report.is_success());

    let container = Container::open(&out).expect("container reopens");
    let ids: Vec<u32> = container.records().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![SectionId::Mesh as u32, SectionId::Material as u32]);
}

#[test]
fn test_action_referencing_missing_animation_is_dropped_with_warning() {
    let dir = TempDir::new().expect("temp dir");
    let out = dir.path().join("actions.binsect");

    let mut scene = cube_scene();
    scene.skeleton = Some(simple_skeleton());
    scene.animations.push(walk_animation());
    scene.actions.push(Action { name: "Walk".into(), animation: "walk".into(), blended: true, track: 0 });
    scene.actions.push(Action { name: "Broken".into(), animation: "missing".into(), blended: false, track: 1 });

    let report = ScenePipeline::new(ExportOptions::with_mode(ExportMode::Character))
        .collect(scene)
        .export(&out)
        .expect("export runs");
    assert!(report.is_success(), "errors: {:?}", report.errors);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("missing"));

    // Exactly one action survived into the Animation payload.
    let container = Container::open(&out).expect("container reopens");
    let payload = container.payload(SectionId::Animation).expect("animation section");
    // animation_count=1, one animation with one 2-key track, then actions.
    let anim_size = 128 + 4 + 4 + (128 + 4) + 2 * 44;
    let action_count_at = 4 + anim_size;
    let action_count = u32::from_le_bytes(
        payload[action_count_at..action_count_at + 4].try_into().expect("u32"),
    );
    assert_eq!(action_count, 1);
    let action_name = &payload[action_count_at + 4..action_count_at + 4 + 4];
    assert_eq!(action_name, b"Walk");
}

#[test]
fn test_strict_mode_escalates_warnings() {
    let dir = TempDir::new().expect("temp dir");
    let out = dir.path().join("strict.binsect");

    let mut scene = cube_scene();
    scene.skeleton = Some(simple_skeleton());
    scene.actions.push(Action { name: "Broken".into(), animation: "missing".into(), blended: false, track: 0 });

    let options = ExportOptions { strict: true, ..ExportOptions::with_mode(ExportMode::Character) };
    let report = ScenePipeline::new(options).collect(scene).export(&out).expect("export runs");

    assert!(!report.is_success());
    assert_eq!(report.state, "failed");
    assert!(!out.exists(), "no partial file on failure");
}

#[test]
fn test_unresolved_hardpoint_aborts_with_no_file() {
    let dir = TempDir::new().expect("temp dir");
    let out = dir.path().join("hp.binsect");

    let mut scene = cube_scene();
    scene.skeleton = Some(simple_skeleton());
    scene.hardpoints.push(HardpointData {
        name: "HP_bad".into(),
        kind: "weapon".into(),
        binding: HardpointBinding::Bone("Pelvis".into()),
        transform: Mat4::IDENTITY,
    });

    let report = ScenePipeline::new(ExportOptions::with_mode(ExportMode::Skinned))
        .collect(scene)
        .export(&out)
        .expect("export runs");

    assert!(!report.is_success());
    assert!(report.errors.iter().any(|e| e.contains("Pelvis")));
    assert!(!out.exists(), "no partial file on failure");
}

#[test]
fn test_error_aggregation_reports_every_problem() {
    let dir = TempDir::new().expect("temp dir");
    let out = dir.path().join("agg.binsect");

    // Two independent problems: a bad hardpoint and a bad texture path.
    let mut scene = cube_scene();
    scene.skeleton = Some(simple_skeleton());
    scene.hardpoints.push(HardpointData {
        name: "HP_bad".into(),
        kind: "weapon".into(),
        binding: HardpointBinding::Bone("Pelvis".into()),
        transform: Mat4::IDENTITY,
    });
    scene.materials[0].texture = Some("/abs/tex.dds".into());

    let report = ScenePipeline::new(ExportOptions::with_mode(ExportMode::Skinned))
        .collect(scene)
        .export(&out)
        .expect("export runs");

    assert_eq!(report.state, "failed");
    assert!(report.errors.len() >= 2, "errors: {:?}", report.errors);
    assert!(report.errors.iter().any(|e| e.contains("Pelvis")));
    assert!(report.errors.iter().any(|e| e.contains("absolute")));
}

#[test]
fn test_audit_log_appends_section_events() {
    let dir = TempDir::new().expect("temp dir");
    let out = dir.path().join("audited.binsect");
    let audit = dir.path().join("audit.log");

    let options = ExportOptions { audit_log: Some(audit.clone()), ..Default::default() };
    ScenePipeline::new(options.clone()).collect(cube_scene()).export(&out).expect("first");
    ScenePipeline::new(options).collect(cube_scene()).export(&out).expect("second");

    let content = std::fs::read_to_string(&audit).expect("audit log exists");
    let lines: Vec<&str> = content.lines().collect();
    // Two passes, each logging Mesh, Material and a pass-level event.
    assert_eq!(lines.len(), 6);
    assert!(lines[0].contains("0x1001"));
    assert!(lines[0].ends_with("ok"));
    assert!(lines[2].ends_with("done"));
}

#[test]
fn test_skinned_export_reopens_with_skeleton_sections() {
    let dir = TempDir::new().expect("temp dir");
    let out = dir.path().join("skinned.binsect");

    let mut scene = cube_scene();
    scene.skeleton = Some(simple_skeleton());
    scene.hardpoints.push(HardpointData {
        name: "HP_mount".into(),
        kind: "weapon".into(),
        binding: HardpointBinding::Bone("Spine".into()),
        transform: Mat4::IDENTITY,
    });

    let report = ScenePipeline::new(ExportOptions::with_mode(ExportMode::Skinned))
        .collect(scene)
        .export(&out)
        .expect("export runs");
    assert!(report.is_success(), "errors: {:?}", report.errors);

    let container = Container::open(&out).expect("container reopens");
    let ids: Vec<u32> = container.records().iter().map(|r| r.id).collect();
    assert_eq!(
        ids,
        vec![
            SectionId::Mesh as u32,
            SectionId::Material as u32,
            SectionId::Skeleton as u32,
            SectionId::Hardpoint as u32,
        ]
    );

    let structural = structural_check(&out).expect("check runs");
    assert!(structural.is_pass(), "violations: {:?}", structural.violations);
    assert_eq!(structural.detected_mode, Some(ExportMode::Skinned));

    // Hardpoint payload carries the resolved bone path.
    let payload = container.payload(SectionId::Hardpoint).expect("hardpoint section");
    let needle = b"Root/Spine";
    assert!(payload.windows(needle.len()).any(|w| w == needle));
}
