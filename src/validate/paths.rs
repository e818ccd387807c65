//! Path validator: resource-reference integrity, with optional auto-fix.
//!
//! Scans the recognized path-bearing fields of a finished container
//! (material texture references, prefab instance resources), checks them
//! against the configured asset root, and optionally rewrites the container
//! with corrected paths.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::container::{Container, ContainerWriter, SectionBuffer, SectionId, CONTAINER_MAGIC};
use crate::util::{is_absolute_path, Error, Result};

/// Substitute for a missing texture, as the engine's tooling has always
/// done.
const DEFAULT_TEXTURE: &str = "textures/default.dds";

const MATERIAL_FIXED_PREFIX: usize = 128 + 64 + 16 + 4 + 4;
const PREFAB_RESOURCE_LEN: usize = 128;
const PREFAB_INSTANCE_TAIL: usize = 1 + 1 + 4 + 64;

/// What is wrong with a path field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathProblem {
    /// Absolute where a root-relative reference is required.
    Absolute,
    /// No such file under the configured root.
    Missing,
    /// Exists, but the on-disk entry differs in case.
    CaseMismatch,
}

/// One flagged path field.
#[derive(Clone, Debug, Serialize)]
pub struct PathIssue {
    /// Raw tag of the section the field lives in.
    pub section: u32,
    /// Field designation, e.g. `material[2].texture`.
    pub field: String,
    pub value: String,
    pub problem: PathProblem,
    /// Normalized root-relative, case-correct replacement when one exists.
    pub fixed: Option<String>,
}

/// Validator result: empty `issues` means pass.
#[derive(Clone, Debug, Serialize)]
pub struct PathReport {
    pub file: PathBuf,
    pub root: PathBuf,
    /// Number of non-empty path fields examined.
    pub checked: usize,
    pub issues: Vec<PathIssue>,
    /// True when auto-fix rewrote the container.
    pub rewritten: bool,
}

impl PathReport {
    pub fn is_pass(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Validate every recognized path field of `file` against `root`.
///
/// With `autofix`, fields that have a usable replacement are rewritten:
/// the affected sections are re-encoded and the container rebuilt with
/// recomputed offsets. Every rewrite is reported in the returned issues.
pub fn path_validate(
    file: impl AsRef<Path>,
    root: impl AsRef<Path>,
    autofix: bool,
) -> Result<PathReport> {
    let file = file.as_ref();
    let root = root.as_ref();
    let container = Container::open(file)?;

    let mut report = PathReport {
        file: file.to_path_buf(),
        root: root.to_path_buf(),
        checked: 0,
        issues: Vec::new(),
        rewritten: false,
    };

    let mut material_fixes: BTreeMap<usize, String> = BTreeMap::new();
    if let Some(payload) = container.payload(SectionId::Material) {
        for (slot, texture) in parse_material_textures(payload)? {
            if texture.is_empty() {
                continue;
            }
            report.checked += 1;
            if let Some((problem, fixed)) = check_path(root, &texture, Some(DEFAULT_TEXTURE)) {
                if let Some(fixed) = &fixed {
                    material_fixes.insert(slot, fixed.clone());
                }
                report.issues.push(PathIssue {
                    section: SectionId::Material as u32,
                    field: format!("material[{slot}].texture"),
                    value: texture,
                    problem,
                    fixed,
                });
            }
        }
    }

    let mut prefab_fixes: BTreeMap<usize, String> = BTreeMap::new();
    if let Some(payload) = container.payload(SectionId::Prefab) {
        for resource in parse_prefab_resources(payload)? {
            if resource.value.is_empty() {
                continue;
            }
            report.checked += 1;
            if let Some((problem, fixed)) = check_path(root, &resource.value, None) {
                if let Some(fixed) = &fixed {
                    prefab_fixes.insert(resource.field_offset, fixed.clone());
                }
                report.issues.push(PathIssue {
                    section: SectionId::Prefab as u32,
                    field: format!(
                        "prefab[{}].instance[{}].resource",
                        resource.group, resource.instance
                    ),
                    value: resource.value,
                    problem,
                    fixed,
                });
            }
        }
    }

    if autofix && (!material_fixes.is_empty() || !prefab_fixes.is_empty()) {
        rebuild_with_fixes(file, container, &material_fixes, &prefab_fixes)?;
        report.rewritten = true;
        debug!(file = %file.display(), "container rewritten with fixed paths");
    }

    Ok(report)
}

/// Check one path field. `missing_default` is substituted for unresolvable
/// references where the engine defines a fallback (textures).
fn check_path(
    root: &Path,
    value: &str,
    missing_default: Option<&str>,
) -> Option<(PathProblem, Option<String>)> {
    if is_absolute_path(value) {
        // Relativize when the path actually points under the root.
        let normalized = value.replace('\\', "/");
        let root_str = root.to_string_lossy().replace('\\', "/");
        let fixed = normalized
            .strip_prefix(root_str.trim_end_matches('/'))
            .map(|rest| rest.trim_start_matches('/').to_string())
            .and_then(|rel| resolve_case(root, &rel).map(|(actual, _)| actual));
        return Some((PathProblem::Absolute, fixed));
    }

    let rel = value.replace('\\', "/");
    match resolve_case(root, &rel) {
        Some((actual, false)) if actual == rel => None,
        Some((actual, _)) => Some((PathProblem::CaseMismatch, Some(actual))),
        None => Some((PathProblem::Missing, missing_default.map(str::to_string))),
    }
}

/// Walk `rel` under `root` component by component, falling back to a
/// case-insensitive directory scan. Returns the on-disk relative path and
/// whether it differs from the queried one.
fn resolve_case(root: &Path, rel: &str) -> Option<(String, bool)> {
    let mut current = root.to_path_buf();
    let mut actual = Vec::new();
    let mut differs = false;
    for part in rel.split('/').filter(|p| !p.is_empty()) {
        let exact = current.join(part);
        if exact.exists() {
            actual.push(part.to_string());
            current = exact;
            continue;
        }
        let entry = fs::read_dir(&current)
            .ok()?
            .flatten()
            .find(|e| e.file_name().to_string_lossy().eq_ignore_ascii_case(part))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        differs = true;
        current = current.join(&name);
        actual.push(name);
    }
    Some((actual.join("/"), differs))
}

// -- Payload walking --

struct SliceReader<'a> {
    bytes: &'a [u8],
    at: usize,
}

impl<'a> SliceReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, at: 0 }
    }

    fn u32(&mut self) -> Result<u32> {
        let slice = self
            .bytes
            .get(self.at..self.at + 4)
            .ok_or_else(|| Error::invalid("truncated payload"))?;
        self.at += 4;
        Ok(u32::from_le_bytes(slice.try_into().expect("4-byte slice")))
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let slice = self
            .bytes
            .get(self.at..self.at + len)
            .ok_or_else(|| Error::invalid("truncated payload"))?;
        self.at += len;
        Ok(slice)
    }
}

/// Texture reference per material slot.
fn parse_material_textures(payload: &[u8]) -> Result<Vec<(usize, String)>> {
    let mut reader = SliceReader::new(payload);
    let count = reader.u32()? as usize;
    let mut out = Vec::with_capacity(count);
    for slot in 0..count {
        reader.take(MATERIAL_FIXED_PREFIX)?;
        let len = reader.u32()? as usize;
        let bytes = reader.take(len)?;
        out.push((slot, String::from_utf8(bytes.to_vec())?));
    }
    Ok(out)
}

struct PrefabResource {
    group: usize,
    instance: usize,
    value: String,
    /// Offset of the fixed resource field within the Prefab payload.
    field_offset: usize,
}

fn parse_prefab_resources(payload: &[u8]) -> Result<Vec<PrefabResource>> {
    let mut reader = SliceReader::new(payload);
    let group_count = reader.u32()? as usize;
    let mut out = Vec::new();
    for group in 0..group_count {
        reader.take(128)?; // group name
        let instance_count = reader.u32()? as usize;
        for instance in 0..instance_count {
            let field_offset = reader.at;
            let raw = reader.take(PREFAB_RESOURCE_LEN)?;
            let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
            let value = String::from_utf8(raw[..end].to_vec())?;
            reader.take(PREFAB_INSTANCE_TAIL)?;
            out.push(PrefabResource { group, instance, value, field_offset });
        }
    }
    Ok(out)
}

/// Re-encode the affected sections and rebuild the container in place.
fn rebuild_with_fixes(
    file: &Path,
    container: Container,
    material_fixes: &BTreeMap<usize, String>,
    prefab_fixes: &BTreeMap<usize, String>,
) -> Result<()> {
    let mut sections: Vec<(SectionId, Vec<u8>)> = Vec::with_capacity(container.records().len());
    for record in container.records() {
        let id = record.section_id().ok_or_else(|| {
            Error::invalid(format!(
                "cannot rewrite container with unknown section {:#06x}",
                record.id
            ))
        })?;
        let payload = container
            .payload_of(record)
            .ok_or_else(|| Error::invalid("section payload exceeds file size"))?;
        let payload = match id {
            SectionId::Material if !material_fixes.is_empty() => {
                rewrite_material_payload(payload, material_fixes)?
            }
            SectionId::Prefab if !prefab_fixes.is_empty() => {
                rewrite_prefab_payload(payload, prefab_fixes)
            }
            _ => payload.to_vec(),
        };
        sections.push((id, payload));
    }
    let version = container.version();
    // Release the mapping before truncating the file underneath it.
    drop(container);

    let mut writer = ContainerWriter::create(file);
    writer.write_header(CONTAINER_MAGIC, version);
    for (id, payload) in sections {
        let mut buffer = SectionBuffer::new();
        buffer.write_bytes(&payload);
        writer.push_section(id, buffer)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Rebuild the material payload with replaced texture paths. Path fields
/// are length-prefixed, so the payload is re-assembled rather than patched.
fn rewrite_material_payload(payload: &[u8], fixes: &BTreeMap<usize, String>) -> Result<Vec<u8>> {
    let mut reader = SliceReader::new(payload);
    let mut out = SectionBuffer::new();
    let count = reader.u32()?;
    out.write_u32(count);
    for slot in 0..count as usize {
        out.write_bytes(reader.take(MATERIAL_FIXED_PREFIX)?);
        let len = reader.u32()? as usize;
        let original = reader.take(len)?;
        match fixes.get(&slot) {
            Some(fixed) => out.write_path(fixed),
            None => {
                out.write_u32(len as u32);
                out.write_bytes(original);
            }
        }
    }
    Ok(out.as_slice().to_vec())
}

/// Patch fixed-width prefab resource fields in place.
fn rewrite_prefab_payload(payload: &[u8], fixes: &BTreeMap<usize, String>) -> Vec<u8> {
    let mut out = payload.to_vec();
    for (&offset, fixed) in fixes {
        let mut field = SectionBuffer::new();
        field.write_fixed_str(fixed, PREFAB_RESOURCE_LEN);
        out[offset..offset + PREFAB_RESOURCE_LEN].copy_from_slice(field.as_slice());
    }
    out
}
