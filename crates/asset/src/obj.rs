//! Minimal OBJ parser for triangulated meshes: positions, normals and texture
//! coordinates.
//!
//! OBJ faces index each attribute in its own index space. The output here uses
//! a single index buffer over positions, so normals and texture coordinates
//! are scattered into the slot of the position they were paired with. When one
//! position is paired with several different normals (or UVs), the last face
//! that references it wins.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result, anyhow, bail};
use corelib::{CausticError, CausticResult};

use crate::mesh::{ComponentSizes, ObjMesh};

const POSITION_PREFIX: &str = "v ";
const TEXTURE_COORD_PREFIX: &str = "vt ";
const NORMAL_PREFIX: &str = "vn ";
const FACE_PREFIX: &str = "f ";
const INDEX_SEPARATOR: char = '/';

/// Which optional attribute streams to collect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjAttributes {
    pub normals: bool,
    pub texture_coords: bool,
}

impl ObjAttributes {
    pub const ALL: Self = Self {
        normals: true,
        texture_coords: true,
    };
    pub const POSITIONS_ONLY: Self = Self {
        normals: false,
        texture_coords: false,
    };
}

impl Default for ObjAttributes {
    fn default() -> Self {
        Self::ALL
    }
}

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>, attributes: ObjAttributes) -> Result<ObjMesh> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open OBJ file: {}", path.display()))?;
    let mesh = load_obj_from_reader(BufReader::new(file), attributes)
        .with_context(|| format!("Failed to load OBJ file: {}", path.display()))?;
    log::info!(
        "Loaded OBJ {:?}: {} vertices, {} triangles, sizes={:?}",
        path,
        mesh.vertex_count(),
        mesh.triangle_count(),
        mesh.sizes.to_array()
    );
    Ok(mesh)
}

/// Load an OBJ mesh from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(
    reader: R,
    attributes: ObjAttributes,
) -> CausticResult<ObjMesh> {
    let mut mesh = ObjMesh::default();
    mesh.sizes = load_obj_into(
        reader,
        &mut mesh.positions,
        attributes.normals.then_some(&mut mesh.normals),
        attributes.texture_coords.then_some(&mut mesh.texture_coords),
        &mut mesh.indices,
    )?;
    Ok(mesh)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str, attributes: ObjAttributes) -> CausticResult<ObjMesh> {
    load_obj_from_reader(io::Cursor::new(contents), attributes)
}

/// Parse OBJ data into caller-provided buffers.
///
/// Every destination is cleared first. Passing `None` for `normals` or
/// `texture_coords` skips that attribute entirely. Returns the component
/// count of each stream, zero for streams that were absent or skipped.
pub fn load_obj_into<R: BufRead>(
    reader: R,
    positions: &mut Vec<f32>,
    normals: Option<&mut Vec<f32>>,
    texture_coords: Option<&mut Vec<f32>>,
    indices: &mut Vec<u32>,
) -> CausticResult<ComponentSizes> {
    positions.clear();
    indices.clear();

    let mut parser = ObjParser {
        collect_normals: normals.is_some(),
        collect_texture_coords: texture_coords.is_some(),
        ..ObjParser::default()
    };

    for line in reader.lines() {
        let line = line.map_err(|e| CausticError::malformed(None, e))?;
        parser
            .parse_line(&line, positions, indices)
            .map_err(|e| CausticError::malformed(Some(&line), e))?;
    }

    parser
        .reconcile(positions.len(), indices, normals, texture_coords)
        .map_err(|e| CausticError::malformed(None, e))?;

    if parser.non_triangles > 0 {
        log::warn!(
            "OBJ contained {} non-triangular faces; the mesh should be triangulated",
            parser.non_triangles
        );
    }
    log::debug!(
        "Parsed OBJ: {} position components, {} indices, sizes={:?}",
        positions.len(),
        indices.len(),
        parser.sizes.to_array()
    );

    Ok(parser.sizes)
}

/// Per face-vertex references into the raw texture/normal buffers, aligned
/// with the index buffer.
#[derive(Clone, Copy, Debug)]
struct AttributeRefs {
    texture_coord: Option<usize>,
    normal: Option<usize>,
}

#[derive(Default)]
struct ObjParser {
    collect_normals: bool,
    collect_texture_coords: bool,
    sizes: ComponentSizes,
    raw_normals: Vec<f32>,
    raw_texture_coords: Vec<f32>,
    refs: Vec<AttributeRefs>,
    non_triangles: usize,
}

impl ObjParser {
    fn parse_line(
        &mut self,
        line: &str,
        positions: &mut Vec<f32>,
        indices: &mut Vec<u32>,
    ) -> Result<()> {
        if let Some(rest) = line.strip_prefix(POSITION_PREFIX) {
            let n = parse_components(positions, rest)?;
            check_size(&mut self.sizes.position, n)?;
        } else if let Some(rest) = line.strip_prefix(TEXTURE_COORD_PREFIX) {
            if self.collect_texture_coords {
                let n = parse_components(&mut self.raw_texture_coords, rest)?;
                check_size(&mut self.sizes.texture_coord, n)?;
            }
        } else if let Some(rest) = line.strip_prefix(NORMAL_PREFIX) {
            if self.collect_normals {
                let n = parse_components(&mut self.raw_normals, rest)?;
                check_size(&mut self.sizes.normal, n)?;
            }
        } else if let Some(rest) = line.strip_prefix(FACE_PREFIX) {
            let mut count = 0;
            for vertex in rest.split_whitespace() {
                let (position, refs) = parse_face_vertex(vertex)?;
                indices.push(position);
                self.refs.push(refs);
                count += 1;
            }
            if count != 3 {
                self.non_triangles += 1;
            }
        }
        // Other directives (#, o, g, s, usemtl, ...) are ignored.
        Ok(())
    }

    /// Scatter the raw normal/texture tuples into position-aligned outputs.
    fn reconcile(
        &self,
        position_len: usize,
        indices: &[u32],
        normals: Option<&mut Vec<f32>>,
        texture_coords: Option<&mut Vec<f32>>,
    ) -> Result<()> {
        let position_count = match self.sizes.position {
            0 => 0,
            size => position_len / size,
        };

        if let Some(&max) = indices.iter().max() {
            if max as usize >= position_count {
                bail!(
                    "Position index {} out of range ({} positions)",
                    max as usize + 1,
                    position_count
                );
            }
        }

        if let Some(dest) = texture_coords {
            dest.clear();
            scatter(
                dest,
                &self.raw_texture_coords,
                self.sizes.texture_coord,
                position_count,
                indices.iter().zip(&self.refs).map(|(&p, r)| (p, r.texture_coord)),
            )
            .context("Failed to remap texture coordinates")?;
        }
        if let Some(dest) = normals {
            dest.clear();
            scatter(
                dest,
                &self.raw_normals,
                self.sizes.normal,
                position_count,
                indices.iter().zip(&self.refs).map(|(&p, r)| (p, r.normal)),
            )
            .context("Failed to remap normals")?;
        }
        Ok(())
    }
}

/// Fill `dest` with zeros sized for `position_count` tuples, then copy each
/// referenced raw tuple into its position's slot. Leaves `dest` empty when no
/// face referenced the attribute or no raw data exists.
fn scatter(
    dest: &mut Vec<f32>,
    raw: &[f32],
    size: usize,
    position_count: usize,
    refs: impl Iterator<Item = (u32, Option<usize>)> + Clone,
) -> Result<()> {
    let referenced = refs.clone().any(|(_, attr)| attr.is_some());
    if !referenced || raw.is_empty() {
        return Ok(());
    }

    dest.resize(position_count * size, 0.0);
    for (position, attr) in refs {
        let Some(attr) = attr else { continue };
        let src = raw
            .get(attr * size..(attr + 1) * size)
            .ok_or_else(|| anyhow!("Attribute index {} out of range", attr + 1))?;
        let slot = position as usize * size;
        dest[slot..slot + size].copy_from_slice(src);
    }
    Ok(())
}

/// Parse whitespace-separated floats onto `dest`, returning how many were read.
fn parse_components(dest: &mut Vec<f32>, rest: &str) -> Result<usize> {
    let mut n = 0;
    for token in rest.split_whitespace() {
        let value = token
            .parse::<f32>()
            .with_context(|| format!("Invalid component '{token}'"))?;
        dest.push(value);
        n += 1;
    }
    if n == 0 {
        bail!("No components");
    }
    Ok(n)
}

/// The first line of a kind fixes its width; later lines must agree.
fn check_size(size: &mut usize, n: usize) -> Result<()> {
    if *size == 0 {
        *size = n;
    } else if *size != n {
        bail!("Expected {} components, found {}", size, n);
    }
    Ok(())
}

/// `p`, `p/t`, `p//n` or `p/t/n`, 1-based.
fn parse_face_vertex(token: &str) -> Result<(u32, AttributeRefs)> {
    let mut split = token.split(INDEX_SEPARATOR);
    let position = match split.next() {
        Some(value) if !value.is_empty() => resolve_index(value)?,
        _ => bail!("Missing position index in '{token}'"),
    };
    let texture_coord = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(value)? as usize),
        _ => None,
    };
    let normal = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(value)? as usize),
        _ => None,
    };
    if split.next().is_some() {
        bail!("Too many indices in '{token}'");
    }
    Ok((
        position,
        AttributeRefs {
            texture_coord,
            normal,
        },
    ))
}

fn resolve_index(token: &str) -> Result<u32> {
    let raw = token
        .parse::<u32>()
        .with_context(|| format!("Invalid index '{token}'"))?;
    if raw == 0 {
        bail!("OBJ indices are 1-based; found 0");
    }
    Ok(raw - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    #[test]
    fn positions_only_triangle() {
        let mesh = load_obj_from_str(TRIANGLE, ObjAttributes::ALL).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.positions, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert!(mesh.normals.is_empty());
        assert!(mesh.texture_coords.is_empty());
        assert_eq!(mesh.sizes.to_array(), [3, 0, 0]);
        assert!(mesh.is_valid());
    }

    #[test]
    fn texture_coords_follow_position_index() {
        let src = "v 0 0 0\nv 1 0 0\nvt 0.25 0.5\nvt 0.75 1\nf 1/2 2/1 1/2\n";
        let mesh = load_obj_from_str(src, ObjAttributes::ALL).unwrap();
        assert_eq!(mesh.sizes.texture_coord, 2);
        assert_eq!(mesh.texture_coords.len(), mesh.vertex_count() * 2);
        assert_eq!(mesh.texture_coord(0), Some(&[0.75, 1.0][..]));
        assert_eq!(mesh.texture_coord(1), Some(&[0.25, 0.5][..]));
        assert_eq!(mesh.indices, vec![0, 1, 0]);
    }

    #[test]
    fn last_reference_wins_for_shared_position() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
vn 0 1 0
f 1//1 2//1 3//1
f 1//2 3//2 2//2
";
        let mesh = load_obj_from_str(src, ObjAttributes::ALL).unwrap();
        assert_eq!(mesh.sizes.to_array(), [3, 3, 0]);
        assert_eq!(mesh.normals.len(), 9);
        for i in 0..3 {
            assert_eq!(mesh.normal(i), Some(&[0.0, 1.0, 0.0][..]));
        }
        assert!(mesh.texture_coords.is_empty());
    }

    #[test]
    fn unreferenced_positions_get_zeroed_slots() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 5 5 5\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let mesh = load_obj_from_str(src, ObjAttributes::ALL).unwrap();
        assert_eq!(mesh.normals.len(), 12);
        assert_eq!(mesh.normal(3), Some(&[0.0, 0.0, 0.0][..]));
    }

    #[test]
    fn full_vertex_references() {
        let src = "\
# exported
o tri
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
vn 0.0 0.0 1.0
s off
f 1/1/1 2/2/1 3/3/1
";
        let mesh = load_obj_from_str(src, ObjAttributes::default()).unwrap();
        assert_eq!(mesh.sizes, ComponentSizes::new(3, 3, 2));
        assert_eq!(mesh.texture_coords, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(mesh.normals, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert!(mesh.is_valid());
    }

    #[test]
    fn skipped_attributes_are_not_collected() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 2/1/1 3/1/1\n";
        let mesh = load_obj_from_str(src, ObjAttributes::POSITIONS_ONLY).unwrap();
        assert!(mesh.normals.is_empty());
        assert!(mesh.texture_coords.is_empty());
        assert_eq!(mesh.sizes.to_array(), [3, 0, 0]);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn destination_style_entry_point() {
        let src = "v 0 0 0 1\nv 1 0 0 1\nv 0 1 0 1\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let mut positions = vec![42.0];
        let mut normals = Vec::new();
        let mut indices = vec![7];
        let sizes = load_obj_into(
            io::Cursor::new(src),
            &mut positions,
            Some(&mut normals),
            None,
            &mut indices,
        )
        .unwrap();
        assert_eq!(sizes.to_array(), [4, 3, 0]);
        assert_eq!(positions.len(), 12);
        assert_eq!(normals.len(), 9);
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn non_numeric_index_reports_line() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 two 3\n";
        let err = load_obj_from_str(src, ObjAttributes::ALL).unwrap_err();
        assert!(matches!(err, CausticError::MalformedInput { .. }));
        assert_eq!(err.line(), Some("f 1 two 3"));
    }

    #[test]
    fn malformed_float_reports_line() {
        let err = load_obj_from_str("v 0 zero 0\n", ObjAttributes::ALL).unwrap_err();
        assert_eq!(err.line(), Some("v 0 zero 0"));
    }

    #[test]
    fn zero_index_is_malformed() {
        let err = load_obj_from_str("v 0 0 0\nf 0 1 1\n", ObjAttributes::ALL).unwrap_err();
        assert_eq!(err.line(), Some("f 0 1 1"));
    }

    #[test]
    fn mixed_widths_are_rejected() {
        let err = load_obj_from_str("v 0 0 0\nv 1 0\n", ObjAttributes::ALL).unwrap_err();
        assert_eq!(err.line(), Some("v 1 0"));
    }

    #[test]
    fn out_of_range_reference_fails_without_line() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/1 2/1 3/4\n";
        let err = load_obj_from_str(src, ObjAttributes::ALL).unwrap_err();
        assert!(matches!(err, CausticError::MalformedInput { line: None, .. }));

        let err = load_obj_from_str("v 0 0 0\nf 1 2 3\n", ObjAttributes::ALL).unwrap_err();
        assert_eq!(err.line(), None);
    }

    #[test]
    fn texture_refs_without_texture_data_are_ignored() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/1 2/2 3/3\n";
        let mesh = load_obj_from_str(src, ObjAttributes::ALL).unwrap();
        assert!(mesh.texture_coords.is_empty());
        assert_eq!(mesh.sizes.texture_coord, 0);
    }

    #[test]
    fn path_round_trip() {
        let path = std::env::temp_dir().join(format!("caustic-mesh-{}.obj", std::process::id()));
        let src = "# triangle\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        std::fs::write(&path, src).unwrap();
        let mesh = load_obj_from_path(&path, ObjAttributes::ALL).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.normal(2), Some(&[0.0, 0.0, 1.0][..]));
        assert!(!mesh.has_texture_coords());

        let err = load_obj_from_path(&path, ObjAttributes::ALL).unwrap_err();
        assert!(err.to_string().contains("Failed to open OBJ file"));
    }
}
