//! Boundary-wall placement along a tile's bottom contour.
//!
//! Each contour edge gets one thin upright box:
//! - length along the edge, `height` tall, `thickness` deep;
//! - rotated about +Y so the box's local X runs along the edge;
//! - pushed half a thickness outward and half a height up, so its inner face sits on the
//!   contour and its bottom on the tile's bottom plane.
//!
//! "Outward" is `(dir.z, 0, -dir.x)`, which is the outside of the contour for bottom faces wound
//! with a downward (-Y) normal.

use crate::{
    contour::{ContourEdge, extract_bottom_contour},
    mesh::MeshSoup,
    types::{Point3, Quat, Vec3},
    utils::signed_yaw_from_x,
};

/// Where one wall box goes. `half_extents` are the Rapier cuboid half sizes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallPlacement {
    pub center: Point3,
    pub rotation: Quat,
    pub half_extents: Vec3,
}

impl WallPlacement {
    /// Full box size: `(edge length, height, thickness)`.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.half_extents * 2.0
    }

    /// Yaw about +Y, in radians.
    #[inline]
    pub fn yaw(&self) -> f32 {
        self.rotation.scaled_axis().y
    }
}

/// Place one wall on `edge`.
pub fn wall_for_edge(edge: &ContourEdge, height: f32, thickness: f32, offset: Vec3) -> WallPlacement {
    let dir = edge.vector();
    let planar = Vec3::new(dir.x, 0.0, dir.z);
    let length = planar.norm();
    let unit = if length > f32::EPSILON {
        planar / length
    } else {
        Vec3::x()
    };

    let yaw = signed_yaw_from_x(unit);
    let outward = Vec3::new(unit.z, 0.0, -unit.x) * (thickness * 0.5);
    let lift = Vec3::new(0.0, height * 0.5, 0.0);

    WallPlacement {
        center: edge.midpoint() + outward + lift + offset,
        rotation: Quat::from_axis_angle(&Vec3::y_axis(), yaw),
        half_extents: Vec3::new(length * 0.5, height * 0.5, thickness * 0.5),
    }
}

/// One wall per bottom-contour edge of `soup`, in contour order. `offset` is the tile's world
/// position (the soup is in tile-local space).
pub fn wall_placements(soup: &MeshSoup, height: f32, thickness: f32, offset: Vec3) -> Vec<WallPlacement> {
    extract_bottom_contour(soup)
        .iter()
        .map(|edge| wall_for_edge(edge, height, thickness, offset))
        .collect()
}

/// Remove walls by index.
///
/// Indices are applied from the largest down so earlier removals don't shift later ones.
/// Duplicates collapse to one removal. Returns the out-of-range indices that were ignored.
pub fn apply_exclusions<T>(walls: &mut Vec<T>, excluded: &[usize]) -> Vec<usize> {
    let mut order = excluded.to_vec();
    order.sort_unstable_by(|a, b| b.cmp(a));
    order.dedup();

    let mut ignored = Vec::new();
    for index in order {
        if index < walls.len() {
            walls.remove(index);
        } else {
            ignored.push(index);
        }
    }
    ignored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::tests::unit_square_tile;

    const EPS: f32 = 1.0e-5;

    #[test]
    fn unit_square_gets_four_walls_around_the_perimeter() {
        let walls = wall_placements(&unit_square_tile(), 10.0, 0.1, Vec3::zeros());
        assert_eq!(walls.len(), 4);

        let total_length: f32 = walls.iter().map(|w| w.size().x).sum();
        assert!((total_length - 4.0).abs() < EPS);

        for w in &walls {
            assert!((w.size().y - 10.0).abs() < EPS);
            assert!((w.size().z - 0.1).abs() < EPS);
            assert!((w.center.y - 5.0).abs() < EPS);

            // Every wall sits just outside the square, half a thickness off its edge.
            let dx = (w.center.x - 0.5).abs();
            let dz = (w.center.z - 0.5).abs();
            assert!((dx.max(dz) - 0.55).abs() < EPS, "{:?}", w.center);
        }
    }

    #[test]
    fn wall_box_x_axis_follows_its_edge() {
        let edge = ContourEdge {
            start: Point3::new(0.0, 0.0, 1.0),
            end: Point3::new(0.0, 0.0, 0.0),
        };
        let wall = wall_for_edge(&edge, 2.0, 0.2, Vec3::zeros());

        let local_x = wall.rotation * Vec3::x();
        assert!((local_x - Vec3::new(0.0, 0.0, -1.0)).norm() < EPS);
        // Edge runs along -Z at x = 0: outward is -X.
        assert!((wall.center - Point3::new(-0.1, 1.0, 0.5)).norm() < EPS);
    }

    #[test]
    fn tile_offset_moves_every_wall() {
        let offset = Vec3::new(10.0, -3.0, 4.0);
        let local = wall_placements(&unit_square_tile(), 10.0, 0.1, Vec3::zeros());
        let placed = wall_placements(&unit_square_tile(), 10.0, 0.1, offset);

        for (a, b) in local.iter().zip(&placed) {
            assert!(((b.center - a.center) - offset).norm() < EPS);
            assert_eq!(a.rotation, b.rotation);
        }
    }

    #[test]
    fn excluding_one_index_leaves_three_walls() {
        let mut walls = wall_placements(&unit_square_tile(), 10.0, 0.1, Vec3::zeros());
        let third = walls[2];
        let ignored = apply_exclusions(&mut walls, &[2]);

        assert!(ignored.is_empty());
        assert_eq!(walls.len(), 3);
        assert!(!walls.contains(&third));
    }

    #[test]
    fn exclusions_are_deduped_and_out_of_range_ignored() {
        let mut walls = vec!['a', 'b', 'c', 'd'];
        let ignored = apply_exclusions(&mut walls, &[0, 3, 3, 9]);

        assert_eq!(walls, vec!['b', 'c']);
        assert_eq!(ignored, vec![9]);
    }
}
