//! Software program: the shaders of one pipeline, bound to a renderer.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::atomic::{AtomicU32, Ordering},
};

use corelib::{CausticError, CausticResult, Creatable, GlVersion, ShaderType};

use crate::{
    shader::SoftwareShader,
    software_renderer::SharedRenderer,
    uniform::UniformValue,
};

const WHAT: &str = "Program";

static NEXT_PROGRAM_ID: AtomicU32 = AtomicU32::new(1);

/// Handle the renderer uses to remember which program is in use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

pub struct SoftwareProgram {
    id: ProgramId,
    state: Creatable,
    renderer: SharedRenderer,
    /// Keyed by stage, so iteration follows the pipeline.
    shaders: BTreeMap<ShaderType, SoftwareShader>,
    attribute_layouts: HashMap<String, u32>,
    texture_layouts: HashMap<u32, String>,
    linked: bool,
}

impl SoftwareProgram {
    pub fn new(renderer: SharedRenderer) -> Self {
        Self {
            id: ProgramId(NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed)),
            state: Creatable::new(),
            renderer,
            shaders: BTreeMap::new(),
            attribute_layouts: HashMap::new(),
            texture_layouts: HashMap::new(),
            linked: false,
        }
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn gl_version(&self) -> GlVersion {
        GlVersion::Software
    }

    pub fn is_created(&self) -> bool {
        self.state.is_created()
    }

    pub fn create(&mut self) -> CausticResult<()> {
        self.state.create(WHAT)?;
        log::debug!("Created software program {:?}", self.id);
        Ok(())
    }

    /// Drops every shader and releases the renderer if this program was in use.
    pub fn destroy(&mut self) -> CausticResult<()> {
        self.state.destroy(WHAT)?;
        self.shaders.clear();
        self.attribute_layouts.clear();
        self.texture_layouts.clear();
        self.linked = false;
        self.release();
        log::debug!("Destroyed software program {:?}", self.id);
        Ok(())
    }

    /// Attach `shader`, replacing (and returning) any shader of the same type.
    /// The shader's layout tokens are merged into the program's layouts.
    pub fn attach_shader(
        &mut self,
        shader: SoftwareShader,
    ) -> CausticResult<Option<SoftwareShader>> {
        self.state.check_created(WHAT)?;
        for (name, &slot) in shader.source().attribute_layouts() {
            self.attribute_layouts.insert(name.clone(), slot);
        }
        for (&unit, sampler) in shader.source().texture_layouts() {
            self.texture_layouts.insert(unit, sampler.clone());
        }
        self.linked = false;
        Ok(self.shaders.insert(shader.shader_type(), shader))
    }

    pub fn detach_shader(
        &mut self,
        shader_type: ShaderType,
    ) -> CausticResult<Option<SoftwareShader>> {
        self.state.check_created(WHAT)?;
        let removed = self.shaders.remove(&shader_type);
        if removed.is_some() {
            self.linked = false;
        }
        Ok(removed)
    }

    pub fn shader(&self, shader_type: ShaderType) -> Option<&SoftwareShader> {
        self.shaders.get(&shader_type)
    }

    pub fn shaders(&self) -> impl Iterator<Item = &SoftwareShader> {
        self.shaders.values()
    }

    /// Nothing is compiled in software. A program without a vertex or
    /// fragment stage still links; the missing stage is only logged.
    pub fn link(&mut self) -> CausticResult<()> {
        self.state.check_created(WHAT)?;
        for required in [ShaderType::Vertex, ShaderType::Fragment] {
            if !self.shaders.contains_key(&required) {
                log::warn!("Program {:?} is linked without a {required} shader", self.id);
            }
        }
        self.linked = true;
        Ok(())
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Make this the renderer's active program.
    pub fn use_program(&self) -> CausticResult<()> {
        self.state.check_created(WHAT)?;
        self.renderer.lock().set_active_program(Some(self.id));
        Ok(())
    }

    /// Release the renderer if this program is the one in use.
    pub fn unbind(&self) -> CausticResult<()> {
        self.state.check_created(WHAT)?;
        self.release();
        Ok(())
    }

    fn release(&self) {
        let mut renderer = self.renderer.lock();
        if renderer.active_program() == Some(self.id) {
            renderer.set_active_program(None);
        }
    }

    /// Hand the texture bound at `unit` to every shader.
    pub fn bind_sampler(&mut self, unit: u32) -> CausticResult<()> {
        self.state.check_created(WHAT)?;
        let texture = self
            .renderer
            .lock()
            .texture(unit)
            .ok_or_else(|| {
                CausticError::InvalidArgument(format!("No texture bound at unit {unit}"))
            })?;
        for shader in self.shaders.values_mut() {
            shader.implementation_mut().bind_texture(unit, texture.clone());
        }
        Ok(())
    }

    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) -> CausticResult<()> {
        self.state.check_created(WHAT)?;
        let value = value.into();
        for shader in self.shaders.values_mut() {
            shader.implementation_mut().set_uniform(name, &value);
        }
        Ok(())
    }

    /// Union of the uniform names every shader knows about.
    pub fn uniform_names(&self) -> HashSet<String> {
        self.shaders
            .values()
            .flat_map(|s| s.implementation().uniform_names())
            .collect()
    }

    pub fn attribute_layout(&self, name: &str) -> Option<u32> {
        self.attribute_layouts.get(name).copied()
    }

    pub fn attribute_layouts(&self) -> &HashMap<String, u32> {
        &self.attribute_layouts
    }

    pub fn set_attribute_layout(&mut self, name: impl Into<String>, slot: u32) {
        self.attribute_layouts.insert(name.into(), slot);
    }

    pub fn remove_attribute_layout(&mut self, name: &str) -> Option<u32> {
        self.attribute_layouts.remove(name)
    }

    pub fn texture_layouts(&self) -> &HashMap<u32, String> {
        &self.texture_layouts
    }

    /// Run every stage, in pipeline order, against the renderer. The program
    /// must be linked and in use.
    pub fn draw(&mut self) -> CausticResult<()> {
        self.state.check_created(WHAT)?;
        if !self.linked {
            return Err(CausticError::IllegalState("Program has not been linked".into()));
        }
        let mut renderer = self.renderer.lock();
        if renderer.active_program() != Some(self.id) {
            return Err(CausticError::IllegalState("Program is not in use".into()));
        }
        for shader in self.shaders.values_mut() {
            shader.implementation_mut().draw(&mut renderer)?;
        }
        Ok(())
    }
}
