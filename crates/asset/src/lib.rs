//! Asset loading/parsers (meshes, textures, shaders).
//! OBJ geometry is remapped onto a single position-indexed index buffer;
//! shader sources carry `$`-prefixed metadata tokens.

pub mod mesh;
pub mod obj;
pub mod shader_source;
pub mod texture;

pub use mesh::{ComponentSizes, ObjMesh};
pub use obj::{
    ObjAttributes, load_obj_from_path, load_obj_from_reader, load_obj_from_str, load_obj_into,
};
pub use shader_source::ShaderSource;
pub use texture::{TextureData, TextureFormat};
