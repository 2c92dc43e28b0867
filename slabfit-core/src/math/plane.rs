use nalgebra::Vector3;

/// An oriented plane in Hessian normal form `normal · x + d = 0`, where `normal` is a unit vector.
/// The distance of a point to the plane is then simply `|normal · p + d|`, without any
/// renormalization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane3 {
    normal: Vector3<f64>,
    d: f64,
}

impl Plane3 {
    /// Creates a plane from a unit `normal` and a point `origin` on the plane. The caller must
    /// pass a normalized normal
    pub fn from_point_and_unit_normal(origin: &Vector3<f64>, normal: Vector3<f64>) -> Self {
        debug_assert!((normal.norm() - 1.0).abs() < 1e-9);
        Self {
            normal,
            d: -normal.dot(origin),
        }
    }

    /// Computes the plane through the three given points. Returns `None` if the points are
    /// (near-)collinear, i.e. the cross product of the edge vectors vanishes relative to the
    /// edge lengths. Callers are expected to skip such degenerate samples instead of treating
    /// them as an error
    pub fn from_three_points(
        a: &Vector3<f64>,
        b: &Vector3<f64>,
        c: &Vector3<f64>,
    ) -> Option<Plane3> {
        let edge_ab = b - a;
        let edge_ac = c - a;
        let normal = edge_ab.cross(&edge_ac);

        // Scale-relative degeneracy test: |ab × ac| = |ab| * |ac| * sin(angle)
        let edge_lengths = edge_ab.norm() * edge_ac.norm();
        if edge_lengths == 0.0 || normal.norm() <= 1e-10 * edge_lengths {
            return None;
        }

        let unit_normal = normal.normalize();
        Some(Plane3 {
            normal: unit_normal,
            d: -unit_normal.dot(a),
        })
    }

    /// The unit normal of this plane
    pub fn normal(&self) -> &Vector3<f64> {
        &self.normal
    }

    /// The signed offset of this plane from the origin
    pub fn offset(&self) -> f64 {
        self.d
    }

    /// Signed perpendicular distance of `point` to this plane. Positive on the side the normal
    /// points into
    pub fn signed_distance(&self, point: &Vector3<f64>) -> f64 {
        self.normal.dot(point) + self.d
    }

    /// Perpendicular distance of `point` to this plane
    pub fn distance(&self, point: &Vector3<f64>) -> f64 {
        self.signed_distance(point).abs()
    }
}
