//! Bottom-contour extraction for land tiles.
//!
//! # Model
//! A land tile is authored with a flat bottom parallel to the ground plane. The bottom is a
//! patch of triangles lying at the mesh's minimum Y. Its outline (the contour) is where the
//! boundary walls go.
//!
//! # Algorithm
//! 1. Keep triangles whose three vertices are within `tolerance` of the minimum Y.
//! 2. Walk every directed edge of every kept triangle in order. If an accumulated edge matches
//!    it in either direction, drop that accumulated edge and do not add the new one (the edge is
//!    shared by two triangles, so it is interior). Otherwise append it.
//! 3. The surviving edges are the boundary, in insertion order, wound like the triangles.
//!
//! Vertices are compared by position (within [`CONTOUR_WELD_EPS`]) because unindexed meshes
//! duplicate every corner.

use crate::{
    constants::{BOTTOM_FACE_TOLERANCE, CONTOUR_WELD_EPS},
    mesh::MeshSoup,
    types::{Point3, Vec3},
};

/// One directed boundary edge of the bottom contour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContourEdge {
    pub start: Point3,
    pub end: Point3,
}

impl ContourEdge {
    #[inline]
    pub fn vector(&self) -> Vec3 {
        self.end - self.start
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.vector().norm()
    }

    #[inline]
    pub fn midpoint(&self) -> Point3 {
        nalgebra::center(&self.start, &self.end)
    }

    /// Same edge traversed either way.
    fn same_segment(&self, start: &Point3, end: &Point3) -> bool {
        (same_point(&self.start, start) && same_point(&self.end, end))
            || (same_point(&self.start, end) && same_point(&self.end, start))
    }
}

#[inline]
fn same_point(a: &Point3, b: &Point3) -> bool {
    (a - b).norm_squared() <= CONTOUR_WELD_EPS * CONTOUR_WELD_EPS
}

/// Triangles of `soup` lying on its bottom plane.
pub fn bottom_triangles(soup: &MeshSoup, tolerance: f32) -> Vec<[Point3; 3]> {
    let Some(bottom_y) = soup.min_y() else {
        return Vec::new();
    };

    soup.triangles()
        .filter(|tri| tri.iter().all(|v| (v.y - bottom_y).abs() <= tolerance))
        .collect()
}

/// Cancel shared edges and return what is left (the boundary), in insertion order.
pub fn boundary_edges(triangles: &[[Point3; 3]]) -> Vec<ContourEdge> {
    let mut edges: Vec<ContourEdge> = Vec::new();

    for tri in triangles {
        for i in 0..3 {
            let a = tri[i];
            let b = tri[(i + 1) % 3];

            match edges.iter().position(|e| e.same_segment(&a, &b)) {
                Some(j) => {
                    edges.remove(j);
                }
                None => edges.push(ContourEdge { start: a, end: b }),
            }
        }
    }

    edges
}

/// Bottom contour of a tile with the default tolerance.
pub fn extract_bottom_contour(soup: &MeshSoup) -> Vec<ContourEdge> {
    extract_bottom_contour_with_tolerance(soup, BOTTOM_FACE_TOLERANCE)
}

pub fn extract_bottom_contour_with_tolerance(soup: &MeshSoup, tolerance: f32) -> Vec<ContourEdge> {
    boundary_edges(&bottom_triangles(soup, tolerance))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::mesh::MeshData;

    /// Unit square slab: bottom quad at y=0 split into 4 triangles around its center, wound so
    /// the bottom faces point down (-Y), plus a top at y=1 that must be ignored.
    pub(crate) fn unit_square_tile() -> MeshSoup {
        let positions = vec![
            // bottom: corners 0..4, center 4
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
            [0.5, 0.0, 0.5],
            // top
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ];
        let indices = vec![
            0, 1, 4, //
            1, 2, 4, //
            2, 3, 4, //
            3, 0, 4, //
            5, 7, 6, //
            5, 8, 7,
        ];
        MeshSoup::from_mesh(&MeshData::indexed(positions, indices)).unwrap()
    }

    #[test]
    fn only_bottom_triangles_are_kept() {
        let tris = bottom_triangles(&unit_square_tile(), BOTTOM_FACE_TOLERANCE);
        assert_eq!(tris.len(), 4);
        assert!(tris.iter().flatten().all(|v| v.y == 0.0));
    }

    #[test]
    fn unit_square_has_four_boundary_edges() {
        let edges = extract_bottom_contour(&unit_square_tile());
        assert_eq!(edges.len(), 4);

        // Interior spokes through the center are gone.
        let center = Point3::new(0.5, 0.0, 0.5);
        assert!(edges.iter().all(|e| e.start != center && e.end != center));

        let perimeter: f32 = edges.iter().map(ContourEdge::length).sum();
        assert!((perimeter - 4.0).abs() < 1.0e-5);

        // Winding follows the triangles: the first surviving edge is 0 -> 1.
        assert_eq!(edges[0].start, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(edges[0].end, Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn unindexed_duplicates_still_cancel() {
        // Two triangles sharing the diagonal, with every corner duplicated.
        let soup = MeshSoup::from_mesh(&MeshData::unindexed(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
        ]))
        .unwrap();

        let edges = extract_bottom_contour(&soup);
        assert_eq!(edges.len(), 4);
    }

    #[test]
    fn tolerance_admits_slightly_uneven_bottoms() {
        let soup = MeshSoup::from_mesh(&MeshData::unindexed(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.005, 0.0],
            [1.0, 0.0, 1.0],
        ]))
        .unwrap();

        assert_eq!(bottom_triangles(&soup, BOTTOM_FACE_TOLERANCE).len(), 1);
        assert!(bottom_triangles(&soup, 0.001).is_empty());
    }

    #[test]
    fn bad_faces_do_not_break_the_contour() {
        let mut soup = unit_square_tile();
        soup.faces.push([0, 1, 42]);

        assert_eq!(bottom_triangles(&soup, BOTTOM_FACE_TOLERANCE).len(), 4);
        assert_eq!(extract_bottom_contour(&soup).len(), 4);
    }

    #[test]
    fn empty_soup_has_no_contour() {
        assert!(extract_bottom_contour(&MeshSoup::default()).is_empty());
    }
}
