//! CPU-side mesh representation produced by the OBJ loader.

/// Number of components per vertex for each attribute stream.
/// Zero means the stream was absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ComponentSizes {
    pub position: usize,
    pub normal: usize,
    pub texture_coord: usize,
}

impl ComponentSizes {
    pub fn new(position: usize, normal: usize, texture_coord: usize) -> Self {
        Self {
            position,
            normal,
            texture_coord,
        }
    }

    /// `[position, normal, texture_coord]`.
    pub fn to_array(self) -> [usize; 3] {
        [self.position, self.normal, self.texture_coord]
    }
}

/// Indexed triangle mesh with flat, position-aligned attribute streams.
///
/// `normals` and `texture_coords` are either empty or hold one tuple per
/// position, so a single index buffer addresses all of them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjMesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub texture_coords: Vec<f32>,
    pub indices: Vec<u32>,
    pub sizes: ComponentSizes,
}

impl ObjMesh {
    pub fn vertex_count(&self) -> usize {
        if self.sizes.position == 0 {
            0
        } else {
            self.positions.len() / self.sizes.position
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_texture_coords(&self) -> bool {
        !self.texture_coords.is_empty()
    }

    pub fn position(&self, index: usize) -> Option<&[f32]> {
        tuple(&self.positions, self.sizes.position, index)
    }

    pub fn normal(&self, index: usize) -> Option<&[f32]> {
        tuple(&self.normals, self.sizes.normal, index)
    }

    pub fn texture_coord(&self, index: usize) -> Option<&[f32]> {
        tuple(&self.texture_coords, self.sizes.texture_coord, index)
    }

    /// Returns `true` if the mesh has geometry and every present stream is
    /// aligned with the positions.
    pub fn is_valid(&self) -> bool {
        let vertices = self.vertex_count();
        let aligned = |stream: &[f32], size: usize| {
            stream.is_empty() || stream.len() == vertices * size
        };
        vertices > 0
            && !self.indices.is_empty()
            && aligned(&self.normals, self.sizes.normal)
            && aligned(&self.texture_coords, self.sizes.texture_coord)
            && self.indices.iter().all(|&i| (i as usize) < vertices)
    }
}

fn tuple(stream: &[f32], size: usize, index: usize) -> Option<&[f32]> {
    if size == 0 {
        return None;
    }
    stream.get(index * size..(index + 1) * size)
}
