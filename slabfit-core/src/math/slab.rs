use super::{Plane3, AABB};
use nalgebra::Vector3;

/// A plane thickened symmetrically by a given thickness. A point is an inlier of the slab iff its
/// perpendicular distance to the plane is at most `thickness / 2`.
///
/// The four `corners` are derived display data: they describe the in-plane bounding rectangle of
/// the inlier set a slab was last fitted to (see [update_corners](Slab::update_corners)) and play
/// no role in classification.
#[derive(Debug, Clone, Copy)]
pub struct Slab {
    plane: Plane3,
    thickness: f64,
    corners: Option<[Vector3<f64>; 4]>,
}

impl Slab {
    /// Creates a slab around `plane` with the given `thickness`. The thickness must be
    /// non-negative; a thickness of zero matches only points exactly on the plane
    pub fn new(plane: Plane3, thickness: f64) -> Self {
        debug_assert!(thickness >= 0.0);
        Self {
            plane,
            thickness,
            corners: None,
        }
    }

    /// The mid-plane of this slab
    pub fn plane(&self) -> &Plane3 {
        &self.plane
    }

    /// The total thickness of this slab
    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    /// The display corners computed by the last call to [update_corners](Slab::update_corners),
    /// if any
    pub fn corners(&self) -> Option<&[Vector3<f64>; 4]> {
        self.corners.as_ref()
    }

    /// Returns true if `point` lies inside this slab, i.e. within `thickness / 2` of the
    /// mid-plane. Points exactly on the boundary count as inside
    pub fn contains(&self, point: &Vector3<f64>) -> bool {
        self.plane.distance(point) <= 0.5 * self.thickness
    }

    /// Conservative intersection test between this slab and an axis-aligned bounding box. Returns
    /// false only if no point of `bounds` can lie inside the slab, which makes this test suitable
    /// for pruning subtrees during a range query
    pub fn intersects_aabb(&self, bounds: &AABB<f64>) -> bool {
        let min = bounds.min();
        let max = bounds.max();
        let center = Vector3::new(
            0.5 * (min.x + max.x),
            0.5 * (min.y + max.y),
            0.5 * (min.z + max.z),
        );
        let half_extent = Vector3::new(
            0.5 * (max.x - min.x),
            0.5 * (max.y - min.y),
            0.5 * (max.z - min.z),
        );
        // Radius of the box projected onto the plane normal
        let normal = self.plane.normal();
        let radius = half_extent.x * normal.x.abs()
            + half_extent.y * normal.y.abs()
            + half_extent.z * normal.z.abs();
        self.plane.distance(&center) <= radius + 0.5 * self.thickness
    }

    /// Recomputes the display corners of this slab from the given points, typically the slab's
    /// inlier set. The points are projected onto the mid-plane and the corners are set to the
    /// in-plane axis-aligned bounding rectangle of the projections. Passing no points clears the
    /// corners. Classification is unaffected
    pub fn update_corners(&mut self, points: &[Vector3<f64>]) {
        if points.is_empty() {
            self.corners = None;
            return;
        }

        let normal = *self.plane.normal();
        let (basis_u, basis_v) = in_plane_basis(&normal);

        let mut min_u = f64::MAX;
        let mut max_u = f64::MIN;
        let mut min_v = f64::MAX;
        let mut max_v = f64::MIN;
        for point in points {
            let u = basis_u.dot(point);
            let v = basis_v.dot(point);
            if u < min_u {
                min_u = u;
            }
            if u > max_u {
                max_u = u;
            }
            if v < min_v {
                min_v = v;
            }
            if v > max_v {
                max_v = v;
            }
        }

        // The point on the plane closest to the origin anchors the in-plane coordinates
        let anchor = -self.plane.offset() * normal;
        self.corners = Some([
            anchor + min_u * basis_u + min_v * basis_v,
            anchor + max_u * basis_u + min_v * basis_v,
            anchor + max_u * basis_u + max_v * basis_v,
            anchor + min_u * basis_u + max_v * basis_v,
        ]);
    }
}

/// Builds an orthonormal basis spanning the plane orthogonal to the given unit `normal`
fn in_plane_basis(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    // Cross with the coordinate axis least aligned with the normal for stability
    let axis = if normal.x.abs() <= normal.y.abs() && normal.x.abs() <= normal.z.abs() {
        Vector3::new(1.0, 0.0, 0.0)
    } else if normal.y.abs() <= normal.z.abs() {
        Vector3::new(0.0, 1.0, 0.0)
    } else {
        Vector3::new(0.0, 0.0, 1.0)
    };
    let basis_u = normal.cross(&axis).normalize();
    let basis_v = normal.cross(&basis_u);
    (basis_u, basis_v)
}
