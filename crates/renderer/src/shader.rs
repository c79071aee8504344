//! Software shaders: a parsed source plus the object that does the work.

use std::{collections::HashMap, sync::Arc};

use asset::{ShaderSource, TextureData};
use corelib::{CausticError, CausticResult, ShaderType};

use crate::{software_renderer::SoftwareRenderer, uniform::UniformValue};

/// Behaviour behind a software shader. The renderer itself never rasterizes;
/// whatever ends up in the pixel buffer is written by `draw`.
pub trait ShaderImplementation {
    fn set_uniform(&mut self, name: &str, value: &UniformValue);

    fn bind_texture(&mut self, unit: u32, texture: Arc<TextureData>);

    fn uniform_names(&self) -> Vec<String>;

    /// Run this stage against the renderer. Stages that only feed later ones
    /// can keep the default.
    fn draw(&mut self, _target: &mut SoftwareRenderer) -> CausticResult<()> {
        Ok(())
    }
}

/// Implementation that just records what it receives.
#[derive(Clone, Debug, Default)]
pub struct UniformTable {
    uniforms: HashMap<String, UniformValue>,
    textures: HashMap<u32, Arc<TextureData>>,
}

impl UniformTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    pub fn texture(&self, unit: u32) -> Option<&Arc<TextureData>> {
        self.textures.get(&unit)
    }
}

impl ShaderImplementation for UniformTable {
    fn set_uniform(&mut self, name: &str, value: &UniformValue) {
        self.uniforms.insert(name.to_owned(), value.clone());
    }

    fn bind_texture(&mut self, unit: u32, texture: Arc<TextureData>) {
        self.textures.insert(unit, texture);
    }

    fn uniform_names(&self) -> Vec<String> {
        self.uniforms.keys().cloned().collect()
    }
}

pub struct SoftwareShader {
    source: ShaderSource,
    shader_type: ShaderType,
    implementation: Box<dyn ShaderImplementation>,
}

impl SoftwareShader {
    /// The source must be complete (its type known).
    pub fn new(
        source: ShaderSource,
        implementation: impl ShaderImplementation + 'static,
    ) -> CausticResult<Self> {
        let shader_type = source.shader_type().ok_or_else(|| {
            CausticError::InvalidArgument(
                "Shader source is incomplete: no shader type was declared or set".into(),
            )
        })?;
        Ok(Self {
            source,
            shader_type,
            implementation: Box::new(implementation),
        })
    }

    pub fn shader_type(&self) -> ShaderType {
        self.shader_type
    }

    pub fn source(&self) -> &ShaderSource {
        &self.source
    }

    pub fn implementation(&self) -> &dyn ShaderImplementation {
        self.implementation.as_ref()
    }

    pub fn implementation_mut(&mut self) -> &mut dyn ShaderImplementation {
        self.implementation.as_mut()
    }
}

impl std::fmt::Debug for SoftwareShader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareShader")
            .field("shader_type", &self.shader_type)
            .field("attribute_layouts", self.source.attribute_layouts())
            .field("texture_layouts", self.source.texture_layouts())
            .finish_non_exhaustive()
    }
}
