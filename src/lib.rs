//! # BinSect
//!
//! Encoder and validation pipeline for the BinSect section-container format,
//! the binary asset container consumed by the engine's model loader.
//!
//! The container format and its payload layouts are owned by a legacy engine
//! codec this crate does not control. This is an independent Rust
//! implementation aiming to match that reference byte-for-byte, plus the
//! tooling to prove it (structural check, byte diff, path integrity).
//!
//! ## Modules
//!
//! - [`util`] - Error types and math helpers
//! - [`container`] - Low-level section container framing (writer + reader)
//! - [`scene`] - Canonical in-memory asset description
//! - [`encode`] - Per-domain section encoders
//! - [`export`] - Scene assembly pipeline (mode selection, cross-refs, audit)
//! - [`validate`] - Structural checker, byte-diff comparator, path validator
//!
//! ## Example
//!
//! ```ignore
//! use binsect::prelude::*;
//!
//! let mut scene = SceneData::new("crate_01");
//! scene.mesh = Some(mesh);
//! scene.materials.push(material);
//!
//! let pipeline = ScenePipeline::new(ExportOptions::default());
//! let report = pipeline.collect(scene)?.export("crate_01.binsect")?;
//! assert!(report.is_success());
//! ```

pub mod util;
pub mod container;
pub mod scene;
pub mod encode;
pub mod export;
pub mod validate;

// Re-export commonly used types
pub use util::{Error, Result};
pub use container::{Container, ContainerWriter, SectionId, SectionRecord};
pub use export::{ExportOptions, ExportReport, ScenePipeline};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result};
    pub use crate::container::{
        Container, ContainerWriter, SectionBuffer, SectionId, SectionRecord, SectionRegistry,
    };
    pub use crate::scene::*;
    pub use crate::export::{ExportMode, ExportOptions, ExportReport, ScenePipeline};
    pub use crate::validate::{byte_diff, path_validate, structural_check};
}
