//! Integration tests for the validation pipeline against real files.

use binsect::container::{Container, SectionId};
use binsect::export::{ExportOptions, ScenePipeline};
use binsect::scene::{MaterialData, MeshData, PrefabGroup, PrefabInstance, SceneData};
use binsect::validate::{byte_diff, path_validate, structural_check, ByteDiff};

use glam::{Mat4, Vec3};
use tempfile::TempDir;

fn triangle_scene() -> SceneData {
    let mut scene = SceneData::new("tri");
    scene.mesh = Some(MeshData::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2]));
    scene.materials.push(MaterialData::new("default"));
    scene
}

#[test]
fn test_byte_diff_attributes_mismatch_to_section() {
    let dir = TempDir::new().expect("temp dir");
    let reference = dir.path().join("ref.binsect");
    let patched = dir.path().join("patched.binsect");

    ScenePipeline::new(ExportOptions::default())
        .collect(triangle_scene())
        .export(&reference)
        .expect("export");

    // Flip one byte inside the Mesh payload.
    let container = Container::open(&reference).expect("open");
    let mesh_offset = container
        .records()
        .iter()
        .find(|r| r.id == SectionId::Mesh as u32)
        .expect("mesh present")
        .offset as usize;
    drop(container);

    let mut bytes = std::fs::read(&reference).expect("read");
    bytes[mesh_offset + 10] ^= 0xFF;
    std::fs::write(&patched, &bytes).expect("write");

    let report = byte_diff(&patched, &reference).expect("diff");
    assert_eq!(report.total_mismatches, 1);
    assert_eq!(report.mismatches[0].section, Some(SectionId::Mesh as u32));
    assert_eq!(report.mismatches[0].offset, (mesh_offset + 10) as u64);
}

#[test]
fn test_byte_diff_cap_is_configurable() {
    let dir = TempDir::new().expect("temp dir");
    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");
    std::fs::write(&a, vec![0u8; 32]).expect("write");
    std::fs::write(&b, vec![0xAAu8; 32]).expect("write");

    let report = ByteDiff::with_max_records(5).compare(&a, &b).expect("diff");
    assert_eq!(report.total_mismatches, 32);
    assert_eq!(report.mismatches.len(), 5);
}

#[test]
fn test_structural_check_flags_truncated_payload() {
    let dir = TempDir::new().expect("temp dir");
    let out = dir.path().join("t.binsect");

    ScenePipeline::new(ExportOptions::default())
        .collect(triangle_scene())
        .export(&out)
        .expect("export");

    // Chop the file short so the last section runs past EOF.
    let bytes = std::fs::read(&out).expect("read");
    std::fs::write(&out, &bytes[..bytes.len() - 8]).expect("truncate");

    let report = structural_check(&out).expect("check");
    assert!(!report.is_pass());
    assert!(report.violations.iter().any(|v| v.contains("exceeds file size")));
}

#[test]
fn test_path_validate_covers_prefab_resources() {
    let dir = TempDir::new().expect("temp dir");
    let root = dir.path();
    std::fs::create_dir(root.join("models")).expect("mkdir");
    std::fs::write(root.join("models/barrel.binsect"), b"stub").expect("stub");

    let out = root.join("scene.binsect");
    let mut scene = triangle_scene();
    scene.prefabs.push(PrefabGroup {
        name: "props".into(),
        instances: vec![
            PrefabInstance {
                resource: "models/barrel.binsect".into(),
                visible: true,
                transform: Mat4::IDENTITY,
            },
            PrefabInstance {
                resource: "models/gone.binsect".into(),
                visible: true,
                transform: Mat4::IDENTITY,
            },
        ],
    });

    let report = ScenePipeline::new(ExportOptions::default())
        .collect(scene)
        .export(&out)
        .expect("export");
    assert!(report.is_success(), "errors: {:?}", report.errors);

    let paths = path_validate(&out, root, false).expect("validate");
    assert_eq!(paths.checked, 2);
    assert_eq!(paths.issues.len(), 1);
    assert!(paths.issues[0].field.contains("instance[1]"));
    // Prefab resources have no fallback; the issue is reported unfixed.
    assert!(paths.issues[0].fixed.is_none());
}

#[test]
fn test_path_autofix_rewrite_keeps_container_structurally_valid() {
    let dir = TempDir::new().expect("temp dir");
    let root = dir.path();
    std::fs::create_dir(root.join("textures")).expect("mkdir");
    std::fs::write(root.join("textures/default.dds"), b"dds").expect("stub");

    let out = root.join("scene.binsect");
    let mut scene = triangle_scene();
    scene.materials[0].texture = Some("textures/lost.dds".into());

    ScenePipeline::new(ExportOptions::default()).collect(scene).export(&out).expect("export");

    let report = path_validate(&out, root, true).expect("validate");
    assert!(report.rewritten);

    // Offsets were recomputed: the rewritten file still checks clean and
    // now passes path validation.
    let structural = structural_check(&out).expect("check");
    assert!(structural.is_pass(), "violations: {:?}", structural.violations);
    let paths = path_validate(&out, root, false).expect("revalidate");
    assert!(paths.is_pass(), "issues: {:?}", paths.issues);
}
