/*!
Convex hull builder: vertex soup -> convex polyhedron collision shape.

The hull itself comes from parry's quickhull (re-exported through Rapier). Before calling it we
check the input is a genuine 3D point cloud: quickhull either panics or returns a flat,
zero-volume polytope on fewer than 4 points or coplanar input, and a zero-volume collider
silently breaks mass computation downstream.

Notes
- Only vertex positions matter; soup faces are ignored (the hull re-triangulates).
- The resulting [`ConvexShape`] is not `Clone`. One shape belongs to exactly one body and is
  consumed when that body's collider is built.
*/

use rapier3d::parry::transformation::try_convex_hull;
use rapier3d::prelude::SharedShape;

use crate::{
    constants::HULL_DEGENERACY_EPS,
    error::GeometryError,
    mesh::MeshSoup,
    types::{Point3, Vec3},
};

/// Convex polyhedron derived from a soup: hull vertices, outward triangular faces and volume,
/// plus the engine shape built from them.
pub struct ConvexShape {
    points: Vec<Point3>,
    faces: Vec<[u32; 3]>,
    volume: f32,
    shape: SharedShape,
}

impl std::fmt::Debug for ConvexShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvexShape")
            .field("points", &self.points.len())
            .field("faces", &self.faces.len())
            .field("volume", &self.volume)
            .finish()
    }
}

impl ConvexShape {
    /// Hull all vertices of `soup`.
    pub fn from_soup(soup: &MeshSoup) -> Result<Self, GeometryError> {
        build_convex_hull(&soup.vertices)
    }

    #[inline]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[inline]
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Enclosed volume (m^3).
    #[inline]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Hand the engine shape over to a collider. Consumes the hull.
    #[inline]
    pub fn into_shared_shape(self) -> SharedShape {
        self.shape
    }
}

/// Build a convex polyhedron from a point cloud.
///
/// Errors
/// - [`GeometryError::TooFewPoints`] with fewer than 4 points.
/// - [`GeometryError::Degenerate`] when all points are (nearly) coplanar, colinear or coincident.
/// - [`GeometryError::HullFailed`] if quickhull or the engine rejects the result.
pub fn build_convex_hull(points: &[Point3]) -> Result<ConvexShape, GeometryError> {
    if points.len() < 4 {
        return Err(GeometryError::TooFewPoints {
            count: points.len(),
        });
    }
    if !spans_three_dimensions(points) {
        return Err(GeometryError::Degenerate {
            count: points.len(),
        });
    }

    let (hull_points, hull_faces) =
        try_convex_hull(points).map_err(|e| GeometryError::HullFailed(format!("{e:?}")))?;

    let volume = polyhedron_volume(&hull_points, &hull_faces);
    if volume <= HULL_DEGENERACY_EPS {
        return Err(GeometryError::Degenerate {
            count: points.len(),
        });
    }

    let shape = SharedShape::convex_hull(&hull_points).ok_or_else(|| {
        GeometryError::HullFailed("engine rejected the hull polytope".to_string())
    })?;

    Ok(ConvexShape {
        points: hull_points,
        faces: hull_faces,
        volume,
        shape,
    })
}

/// Volume of a closed triangulated surface via the divergence theorem.
///
/// Sums signed tetrahedra against the vertex centroid, so the result does not depend on where
/// the origin is. Returns the absolute value to be robust to inward-wound input.
pub fn polyhedron_volume(points: &[Point3], faces: &[[u32; 3]]) -> f32 {
    if points.is_empty() {
        return 0.0;
    }
    let centroid = points.iter().fold(Vec3::zeros(), |acc, p| acc + p.coords) / points.len() as f32;

    let six_v: f32 = faces
        .iter()
        .filter_map(|&[a, b, c]| {
            let a = points.get(a as usize)?.coords - centroid;
            let b = points.get(b as usize)?.coords - centroid;
            let c = points.get(c as usize)?.coords - centroid;
            Some(a.dot(&b.cross(&c)))
        })
        .sum();

    (six_v / 6.0).abs()
}

/// True if the cloud contains four affinely independent points, relative to its own size.
fn spans_three_dimensions(points: &[Point3]) -> bool {
    let p0 = points[0];

    // Farthest point from p0.
    let Some((p1, d01)) = farthest(points, |p| (*p - p0).norm()) else {
        return false;
    };
    let scale = d01;
    if scale <= f32::EPSILON {
        return false;
    }
    let axis = (p1 - p0) / d01;

    // Farthest point from the p0-p1 line.
    let Some((p2, d_line)) = farthest(points, |p| {
        let v = *p - p0;
        (v - axis * v.dot(&axis)).norm()
    }) else {
        return false;
    };
    if d_line <= scale * 1.0e-4 {
        return false;
    }

    // Farthest point from the p0-p1-p2 plane.
    let normal = (p1 - p0).cross(&(p2 - p0)).normalize();
    let Some((_, d_plane)) = farthest(points, |p| (*p - p0).dot(&normal).abs()) else {
        return false;
    };
    d_plane > scale * 1.0e-4
}

fn farthest(points: &[Point3], dist: impl Fn(&Point3) -> f32) -> Option<(Point3, f32)> {
    points
        .iter()
        .map(|p| (*p, dist(p)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube_points() -> Vec<Point3> {
        let mut pts = Vec::new();
        for x in [0.0, 1.0] {
            for y in [0.0, 1.0] {
                for z in [0.0, 1.0] {
                    pts.push(Point3::new(x, y, z));
                }
            }
        }
        pts
    }

    #[test]
    fn regular_tetrahedron_hulls_to_four_faces() {
        let pts = [
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(-1.0, -1.0, 1.0),
        ];
        let hull = build_convex_hull(&pts).unwrap();
        assert_eq!(hull.faces().len(), 4);
        assert_eq!(hull.points().len(), 4);

        // Edge length 2*sqrt(2): V = a^3 / (6*sqrt(2)) = 8/3.
        assert!((hull.volume() - 8.0 / 3.0).abs() < 1.0e-4, "{}", hull.volume());
    }

    #[test]
    fn cube_volume_is_one_and_interior_points_are_dropped() {
        let mut pts = unit_cube_points();
        pts.push(Point3::new(0.5, 0.5, 0.5));

        let hull = build_convex_hull(&pts).unwrap();
        assert!((hull.volume() - 1.0).abs() < 1.0e-4);
        assert_eq!(hull.points().len(), 8);
    }

    #[test]
    fn duplicate_vertices_are_tolerated() {
        // Merged soups keep coincident vertices from neighbouring sub-meshes.
        let mut pts = unit_cube_points();
        pts.extend(unit_cube_points());

        let hull = build_convex_hull(&pts).unwrap();
        assert!((hull.volume() - 1.0).abs() < 1.0e-4);
    }

    #[test]
    fn too_few_points_is_an_error() {
        let pts = [Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
        assert_eq!(
            build_convex_hull(&pts).unwrap_err(),
            GeometryError::TooFewPoints { count: 3 }
        );
    }

    #[test]
    fn coplanar_points_are_degenerate() {
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.5, 0.0, 0.5),
        ];
        assert_eq!(
            build_convex_hull(&pts).unwrap_err(),
            GeometryError::Degenerate { count: 5 }
        );
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let pts = [Point3::new(2.0, 2.0, 2.0); 6];
        assert!(matches!(
            build_convex_hull(&pts),
            Err(GeometryError::Degenerate { .. })
        ));
    }

    #[test]
    fn volume_is_translation_invariant() {
        let shifted: Vec<Point3> = unit_cube_points()
            .into_iter()
            .map(|p| p + Vec3::new(100.0, -50.0, 25.0))
            .collect();
        let hull = build_convex_hull(&shifted).unwrap();
        assert!((hull.volume() - 1.0).abs() < 1.0e-3);
    }

    #[test]
    fn faces_pointing_past_the_points_add_no_volume() {
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
        let mut with_bad = faces.clone();
        with_bad.push([0, 1, 9]);

        let volume = polyhedron_volume(&pts, &faces);
        assert!((volume - 1.0 / 6.0).abs() < 1.0e-6, "{volume}");
        assert_eq!(polyhedron_volume(&pts, &with_bad), volume);
    }
}
