//! Wavefront OBJ reader for car and track meshes.
//!
//! Positions, normals and texture coordinates; faces are fan-triangulated and
//! identical `v/vt/vn` triples share one output vertex.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};

use crate::error::{AssetError, AssetResult};
use crate::mesh::{MeshData, MeshVertex};

/// Read and parse an OBJ file.
pub fn load_obj(path: impl AsRef<Path>) -> AssetResult<MeshData> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_obj(&path.display().to_string(), &bytes)
}

/// Parse OBJ text held in memory (a file or an archive entry). `name` is used in diagnostics.
pub fn parse_obj(name: &str, bytes: &[u8]) -> AssetResult<MeshData> {
    let to_error = |err: anyhow::Error| AssetError::Parse {
        name: name.to_owned(),
        message: format!("{err:#}"),
    };

    let text = std::str::from_utf8(bytes)
        .context("OBJ is not valid UTF-8")
        .map_err(to_error)?;

    let mut parser = ObjParser::default();
    for (line_no, line) in text.lines().enumerate() {
        parser
            .line(line)
            .with_context(|| format!("line {}", line_no + 1))
            .map_err(to_error)?;
    }

    let mesh = parser.finish();
    if !mesh.is_valid() {
        return Err(AssetError::EmptyMesh(name.to_owned()));
    }
    Ok(mesh)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
struct Corner {
    position: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

#[derive(Default)]
struct ObjParser {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    shared: HashMap<Corner, u32>,
    mesh: MeshData,
}

impl ObjParser {
    fn line(&mut self, line: &str) -> Result<()> {
        let line = line.split('#').next().unwrap_or_default().trim();
        let mut tokens = line.split_whitespace();
        let Some(tag) = tokens.next() else {
            return Ok(());
        };

        match tag {
            "v" => self.positions.push(floats::<3>(&mut tokens)?),
            "vn" => self.normals.push(floats::<3>(&mut tokens)?),
            "vt" => self.uvs.push(floats::<2>(&mut tokens)?),
            "f" => self.face(tokens)?,
            // groups, objects, smoothing and materials carry nothing we keep
            _ => {}
        }
        Ok(())
    }

    fn face<'a>(&mut self, tokens: impl Iterator<Item = &'a str>) -> Result<()> {
        let mut polygon = Vec::new();
        for token in tokens {
            let corner = self.corner(token)?;
            polygon.push(self.vertex(corner)?);
        }
        if polygon.len() < 3 {
            bail!("face with {} corners", polygon.len());
        }
        for i in 1..polygon.len() - 1 {
            self.mesh
                .indices
                .extend_from_slice(&[polygon[0], polygon[i], polygon[i + 1]]);
        }
        Ok(())
    }

    fn corner(&self, token: &str) -> Result<Corner> {
        let mut parts = token.split('/');
        let position = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| anyhow!("face element '{token}' has no position"))?;

        let optional = |part: Option<&str>, len: usize| -> Result<Option<usize>> {
            match part {
                Some(p) if !p.is_empty() => resolve(p, len).map(Some),
                _ => Ok(None),
            }
        };

        Ok(Corner {
            position: resolve(position, self.positions.len())?,
            uv: optional(parts.next(), self.uvs.len())?,
            normal: optional(parts.next(), self.normals.len())?,
        })
    }

    fn vertex(&mut self, corner: Corner) -> Result<u32> {
        if let Some(&index) = self.shared.get(&corner) {
            return Ok(index);
        }

        let index = u32::try_from(self.mesh.vertices.len())
            .map_err(|_| anyhow!("more than {} vertices", u32::MAX))?;
        let uv = corner.uv.map_or([0.0, 0.0], |i| self.uvs[i]);
        let normal = corner.normal.map_or([0.0, 0.0, 1.0], |i| self.normals[i]);
        self.mesh
            .vertices
            .push(MeshVertex::new(self.positions[corner.position], normal, uv));
        self.shared.insert(corner, index);
        Ok(index)
    }

    fn finish(self) -> MeshData {
        self.mesh
    }
}

fn floats<'a, const N: usize>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<[f32; N]> {
    let mut out = [0.0; N];
    for (i, slot) in out.iter_mut().enumerate() {
        let token = tokens
            .next()
            .ok_or_else(|| anyhow!("expected {N} numbers, found {i}"))?;
        *slot = token
            .parse()
            .with_context(|| format!("'{token}' is not a number"))?;
    }
    Ok(out)
}

/// OBJ indices are 1-based; negative values count back from the latest element.
fn resolve(token: &str, len: usize) -> Result<usize> {
    let raw: i64 = token
        .parse()
        .with_context(|| format!("invalid index '{token}'"))?;
    let index = match raw {
        0 => bail!("index 0 (OBJ indices are 1-based)"),
        r if r > 0 => r - 1,
        r => len as i64 + r,
    };
    if index < 0 || index as usize >= len {
        bail!("index {raw} out of bounds ({len} elements)");
    }
    Ok(index as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quad_as_two_triangles() {
        let src = b"
            v 0 0 0
            v 1 0 0
            v 1 1 0
            v 0 1 0
            vt 0 0
            vn 0 0 1
            f 1/1/1 2/1/1 3/1/1 4/1/1 # quad
        ";
        let mesh = parse_obj("quad.obj", src).expect("parse quad");
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn shares_identical_corners_and_resolves_negative_indices() {
        let src = b"v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 3\nf -3 -1 -2\n";
        let mesh = parse_obj("tris.obj", src).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 1, 3, 2]);
    }

    #[test]
    fn bad_index_names_the_line() {
        let err = parse_obj("bad.obj", b"v 0 0 0\nf 1 2 3\n").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("bad.obj") && text.contains("line 2"), "{text}");
    }

    #[test]
    fn empty_file_is_rejected() {
        assert!(matches!(
            parse_obj("empty.obj", b"# nothing\n"),
            Err(AssetError::EmptyMesh(_))
        ));
    }
}
