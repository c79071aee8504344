//! Vertex attributes and the vertex data handed to mesh upload code.

use std::collections::{BTreeMap, HashMap};

use asset::ObjMesh;
use bytemuck::Pod;
use corelib::{CausticError, CausticResult, GlVersion};

/// Attribute slot used for OBJ positions by [`VertexData::from_obj_mesh`].
pub const POSITIONS_SLOT: u32 = 0;
pub const NORMALS_SLOT: u32 = 1;
pub const TEXTURE_COORDS_SLOT: u32 = 2;

/// Component type of an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Float,
    Double,
}

impl DataType {
    /// OpenGL enum value (`GL_BYTE`, `GL_FLOAT`, ...).
    pub fn gl_constant(self) -> u32 {
        match self {
            DataType::Byte => 0x1400,
            DataType::UnsignedByte => 0x1401,
            DataType::Short => 0x1402,
            DataType::UnsignedShort => 0x1403,
            DataType::Int => 0x1404,
            DataType::UnsignedInt => 0x1405,
            DataType::Float => 0x1406,
            DataType::Double => 0x140A,
        }
    }

    pub fn byte_size(self) -> usize {
        match self {
            DataType::Byte | DataType::UnsignedByte => 1,
            DataType::Short | DataType::UnsignedShort => 2,
            DataType::Int | DataType::UnsignedInt | DataType::Float => 4,
            DataType::Double => 8,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, DataType::Float | DataType::Double)
    }
}

/// How integer data reaches the shader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UploadMode {
    #[default]
    ToFloat,
    ToFloatNormalize,
    /// GL 3.0+ only.
    KeepInt,
}

impl UploadMode {
    pub fn normalize(self) -> bool {
        self == UploadMode::ToFloatNormalize
    }

    pub fn is_supported_by(self, version: GlVersion) -> bool {
        self != UploadMode::KeepInt || version.supports_integer_attributes()
    }
}

/// Named attribute stream: data type, component count and raw bytes in
/// native byte order.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexAttribute {
    name: String,
    data_type: DataType,
    size: u32,
    upload_mode: UploadMode,
    buffer: Option<Vec<u8>>,
}

impl VertexAttribute {
    pub fn new(name: impl Into<String>, data_type: DataType, size: u32) -> Self {
        Self {
            name: name.into(),
            data_type,
            size,
            upload_mode: UploadMode::default(),
            buffer: None,
        }
    }

    pub fn with_upload_mode(mut self, upload_mode: UploadMode) -> Self {
        self.upload_mode = upload_mode;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Number of components per vertex.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn upload_mode(&self) -> UploadMode {
        self.upload_mode
    }

    /// The attribute bytes. Fails if no data was ever set.
    pub fn data(&self) -> CausticResult<&[u8]> {
        self.buffer.as_deref().ok_or_else(|| {
            CausticError::IllegalState(format!(
                "Vertex attribute '{}' must have data before it is ready for use",
                self.name
            ))
        })
    }

    /// Replace the data with a copy of `bytes`, whatever the data type.
    pub fn set_data_bytes(&mut self, bytes: &[u8]) {
        self.buffer = Some(bytes.to_vec());
    }

    /// Replace the data with the native-endian bytes of `values`.
    pub fn set_data<T: Pod>(&mut self, values: &[T]) {
        self.set_data_bytes(bytemuck::cast_slice(values));
    }

    pub fn clear_data(&mut self) {
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.clear();
        }
    }

    /// Number of complete vertices in the data.
    pub fn vertex_count(&self) -> usize {
        let stride = self.data_type.byte_size() * self.size as usize;
        match (&self.buffer, stride) {
            (Some(buffer), s) if s > 0 => buffer.len() / s,
            _ => 0,
        }
    }
}

/// Attributes keyed by slot, plus the index buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexData {
    attributes: BTreeMap<u32, VertexAttribute>,
    name_to_index: HashMap<String, u32>,
    indices: Vec<u32>,
}

impl VertexData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Float attributes for positions, then normals and texture coordinates
    /// when the mesh has them.
    pub fn from_obj_mesh(mesh: &ObjMesh) -> Self {
        let mut data = Self::new();
        let streams = [
            (POSITIONS_SLOT, "positions", &mesh.positions, mesh.sizes.position),
            (NORMALS_SLOT, "normals", &mesh.normals, mesh.sizes.normal),
            (
                TEXTURE_COORDS_SLOT,
                "textureCoords",
                &mesh.texture_coords,
                mesh.sizes.texture_coord,
            ),
        ];
        for (slot, name, values, size) in streams {
            if values.is_empty() {
                continue;
            }
            let mut attribute = VertexAttribute::new(name, DataType::Float, size as u32);
            attribute.set_data(values.as_slice());
            data.add_attribute(slot, attribute);
        }
        data.set_indices(mesh.indices.clone());
        data
    }

    /// Insert `attribute` at `index`, returning the one it replaced.
    pub fn add_attribute(
        &mut self,
        index: u32,
        attribute: VertexAttribute,
    ) -> Option<VertexAttribute> {
        let old = self.remove_attribute(index);
        self.name_to_index.insert(attribute.name().to_owned(), index);
        self.attributes.insert(index, attribute);
        old
    }

    pub fn remove_attribute(&mut self, index: u32) -> Option<VertexAttribute> {
        let old = self.attributes.remove(&index)?;
        if self.name_to_index.get(old.name()) == Some(&index) {
            self.name_to_index.remove(old.name());
        }
        Some(old)
    }

    pub fn attribute(&self, index: u32) -> Option<&VertexAttribute> {
        self.attributes.get(&index)
    }

    pub fn attribute_by_name(&self, name: &str) -> Option<&VertexAttribute> {
        self.attribute_index(name).and_then(|i| self.attributes.get(&i))
    }

    pub fn attribute_index(&self, name: &str) -> Option<u32> {
        self.name_to_index.get(name).copied()
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// `(slot, attribute)` pairs in slot order.
    pub fn attributes(&self) -> impl Iterator<Item = (u32, &VertexAttribute)> {
        self.attributes.iter().map(|(&i, a)| (i, a))
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn set_indices(&mut self, indices: Vec<u32>) {
        self.indices = indices;
    }
}
