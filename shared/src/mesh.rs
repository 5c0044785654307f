//! Mesh soups: flat vertex/triangle lists used as collision-geometry input.
//!
//! # Model
//! - [`MeshData`] is what the renderer hands us for one sub-mesh: a vertex position buffer and
//!   an optional index buffer.
//! - [`MeshSoup`] is the normalized form: vertices plus explicit triangle index triples.
//! - [`merge_soups`] concatenates several soups into one index space (hull input only).
//!
//! Soups never deduplicate coincident vertices. The hull builder tolerates duplicates and the
//! contour extractor compares positions, not indices.

use crate::{
    error::GeometryError,
    types::{Point3, Transform, Vec3},
};

/// Raw sub-mesh buffers as exposed by the rendering engine.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions in the mesh's local frame.
    pub positions: Vec<[f32; 3]>,
    /// Triangle index buffer. `None` means consecutive vertex triples form triangles.
    pub indices: Option<Vec<u32>>,
}

impl MeshData {
    pub fn indexed(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices: Some(indices),
        }
    }

    pub fn unindexed(positions: Vec<[f32; 3]>) -> Self {
        Self {
            positions,
            indices: None,
        }
    }
}

/// Ordered vertices plus ordered triangle index triples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshSoup {
    pub vertices: Vec<Point3>,
    pub faces: Vec<[u32; 3]>,
}

impl MeshSoup {
    /// Flatten a mesh's buffers into a soup.
    ///
    /// - Indexed: every complete index triple becomes a face; a trailing partial triple is ignored.
    /// - Unindexed: every complete vertex triple becomes a face.
    ///
    /// Fails if any index points past the vertex buffer.
    pub fn from_mesh(mesh: &MeshData) -> Result<Self, GeometryError> {
        let vertices: Vec<Point3> = mesh
            .positions
            .iter()
            .map(|p| Point3::new(p[0], p[1], p[2]))
            .collect();

        let faces = match &mesh.indices {
            Some(indices) => {
                let mut faces = Vec::with_capacity(indices.len() / 3);
                for tri in indices.chunks_exact(3) {
                    for &index in tri {
                        if index as usize >= vertices.len() {
                            return Err(GeometryError::IndexOutOfRange {
                                index,
                                vertex_count: vertices.len(),
                            });
                        }
                    }
                    faces.push([tri[0], tri[1], tri[2]]);
                }
                faces
            }
            None => (0..vertices.len() / 3)
                .map(|t| {
                    let i = (t * 3) as u32;
                    [i, i + 1, i + 2]
                })
                .collect(),
        };

        Ok(Self { vertices, faces })
    }

    /// Same as [`MeshSoup::from_mesh`], with every vertex moved by `transform`.
    pub fn from_mesh_transformed(
        mesh: &MeshData,
        transform: &Transform,
    ) -> Result<Self, GeometryError> {
        Ok(Self::from_mesh(mesh)?.transformed(transform))
    }

    /// Copy of this soup with every vertex moved by `transform`.
    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|v| transform.transform_point(v))
                .collect(),
            faces: self.faces.clone(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Triangle `i` as three positions, or `None` if the face or any of its indices is out of
    /// range. Fields are public, so a hand-built soup may hold bad faces.
    #[inline]
    pub fn triangle(&self, i: usize) -> Option<[Point3; 3]> {
        let [a, b, c] = *self.faces.get(i)?;
        Some([self.vertex(a)?, self.vertex(b)?, self.vertex(c)?])
    }

    /// Every well-formed face as three positions, in face order.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        (0..self.faces.len()).filter_map(|i| self.triangle(i))
    }

    #[inline]
    fn vertex(&self, index: u32) -> Option<Point3> {
        self.vertices.get(index as usize).copied()
    }

    /// Axis-aligned bounds `(mins, maxs)` of all vertices, or `None` for an empty soup.
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(mins, maxs), v| (mins.inf(v), maxs.sup(v))),
        )
    }

    /// Full size of the bounding box along each axis.
    pub fn extents(&self) -> Option<Vec3> {
        self.bounds().map(|(mins, maxs)| maxs - mins)
    }

    /// Lowest Y coordinate among all vertices.
    pub fn min_y(&self) -> Option<f32> {
        self.bounds().map(|(mins, _)| mins.y)
    }
}

/// Concatenate soups into one index space.
///
/// For each soup in order: append its vertices, append its faces with every index shifted by the
/// number of vertices appended so far, then advance that count. Input order is preserved and
/// coincident vertices are kept.
pub fn merge_soups(soups: &[MeshSoup]) -> MeshSoup {
    let vertex_total: usize = soups.iter().map(|s| s.vertices.len()).sum();
    let face_total: usize = soups.iter().map(|s| s.faces.len()).sum();

    let mut merged = MeshSoup {
        vertices: Vec::with_capacity(vertex_total),
        faces: Vec::with_capacity(face_total),
    };

    let mut offset: u32 = 0;
    for soup in soups {
        merged.vertices.extend_from_slice(&soup.vertices);
        merged
            .faces
            .extend(soup.faces.iter().map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]));
        offset += soup.vertices.len() as u32;
    }

    merged
}
