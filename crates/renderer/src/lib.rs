//! Renderer: vertex data, uniforms and the software rendering path.
//! Programs and shaders here need no GPU; pixel work is done by
//! [`shader::ShaderImplementation`] objects writing into a
//! [`software_renderer::SoftwareRenderer`].

pub mod material;
pub mod program;
pub mod shader;
pub mod software_renderer;
pub mod uniform;
pub mod vertex;

pub use material::Material;
pub use program::{ProgramId, SoftwareProgram};
pub use shader::{ShaderImplementation, SoftwareShader, UniformTable};
pub use software_renderer::{RendererConfig, SharedRenderer, SoftwareRenderer};
pub use uniform::UniformValue;
pub use vertex::{DataType, UploadMode, VertexAttribute, VertexData};
