//! Export configuration.
//!
//! Options are explicit structs with defaults, validated once when the
//! pipeline is constructed; nothing is looked up dynamically mid-encode.

use std::path::PathBuf;

use serde::Serialize;

/// Which encoder subset an export activates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Mesh + materials only.
    Static,
    /// Adds skeleton and hardpoints.
    Skinned,
    /// Adds animations, cue track and actions.
    Character,
}

impl ExportMode {
    /// Whether this mode writes skeleton-family sections.
    pub fn has_skeleton(self) -> bool {
        matches!(self, ExportMode::Skinned | ExportMode::Character)
    }

    /// Whether this mode writes animation-family sections.
    pub fn has_animation(self) -> bool {
        matches!(self, ExportMode::Character)
    }
}

/// Width of the Mesh and Collision index buffers. A pipeline-wide choice;
/// both sections always use the same width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexWidth {
    U16,
    U32,
}

impl IndexWidth {
    /// Bytes per index.
    pub fn stride(self) -> usize {
        match self {
            IndexWidth::U16 => 2,
            IndexWidth::U32 => 4,
        }
    }
}

/// Configuration for one export pass.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub mode: ExportMode,
    pub index_width: IndexWidth,
    /// Escalate reference warnings (dropped actions, missing textures) to
    /// fatal errors.
    pub strict: bool,
    /// Run the validation stage against the just-written file.
    pub validate: bool,
    /// Known-good file for the byte-diff stage of validation.
    pub reference: Option<PathBuf>,
    /// Append `{timestamp, section, status}` events to this file.
    pub audit_log: Option<PathBuf>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            mode: ExportMode::Static,
            index_width: IndexWidth::U16,
            strict: false,
            validate: false,
            reference: None,
            audit_log: None,
        }
    }
}

impl ExportOptions {
    pub fn with_mode(mode: ExportMode) -> Self {
        Self { mode, ..Default::default() }
    }
}
