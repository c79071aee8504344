//! Material: a program plus the uniform values uploaded to it.

use std::collections::HashMap;

use corelib::{CausticResult, Creatable};

use crate::{program::SoftwareProgram, software_renderer::SharedRenderer, uniform::UniformValue};

const WHAT: &str = "Material";

pub struct Material {
    state: Creatable,
    program: SoftwareProgram,
    uniforms: HashMap<String, UniformValue>,
}

impl Material {
    pub fn new(renderer: SharedRenderer) -> Self {
        Self {
            state: Creatable::new(),
            program: SoftwareProgram::new(renderer),
            uniforms: HashMap::new(),
        }
    }

    pub fn is_created(&self) -> bool {
        self.state.is_created()
    }

    /// Creates the owned program too.
    pub fn create(&mut self) -> CausticResult<()> {
        self.state.check_not_created(WHAT)?;
        self.program.create()?;
        self.state.create(WHAT)
    }

    /// Destroys the program and forgets every uniform value.
    pub fn destroy(&mut self) -> CausticResult<()> {
        self.state.check_created(WHAT)?;
        self.program.destroy()?;
        self.uniforms.clear();
        self.state.destroy(WHAT)
    }

    pub fn bind(&self) -> CausticResult<()> {
        self.state.check_created(WHAT)?;
        self.program.use_program()
    }

    pub fn unbind(&self) -> CausticResult<()> {
        self.state.check_created(WHAT)?;
        self.program.unbind()
    }

    /// Forward every held uniform to the program's shaders.
    pub fn upload_uniforms(&mut self) -> CausticResult<()> {
        self.state.check_created(WHAT)?;
        for (name, value) in &self.uniforms {
            self.program.set_uniform(name, value.clone())?;
        }
        log::trace!("Uploaded {} uniforms to {:?}", self.uniforms.len(), self.program.id());
        Ok(())
    }

    /// Store `value` for the next upload, returning the value it replaced.
    pub fn set_uniform(
        &mut self,
        name: impl Into<String>,
        value: impl Into<UniformValue>,
    ) -> Option<UniformValue> {
        self.uniforms.insert(name.into(), value.into())
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    pub fn remove_uniform(&mut self, name: &str) -> Option<UniformValue> {
        self.uniforms.remove(name)
    }

    pub fn uniforms(&self) -> &HashMap<String, UniformValue> {
        &self.uniforms
    }

    pub fn program(&self) -> &SoftwareProgram {
        &self.program
    }

    pub fn program_mut(&mut self) -> &mut SoftwareProgram {
        &mut self.program
    }
}
