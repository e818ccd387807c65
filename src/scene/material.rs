//! Material descriptors.

use glam::Vec4;

/// One material slot, in slot order.
#[derive(Clone, Debug)]
pub struct MaterialData {
    pub name: String,
    /// Shader tag understood by the engine, e.g. "std_effect".
    pub shader: String,
    pub base_color: Vec4,
    pub specular: f32,
    pub alpha: f32,
    /// Root-relative texture reference. Absolute inputs are rejected when
    /// the material is encoded.
    pub texture: Option<String>,
}

impl MaterialData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shader: "std_effect".into(),
            base_color: Vec4::ONE,
            specular: 1.0,
            alpha: 1.0,
            texture: None,
        }
    }
}
