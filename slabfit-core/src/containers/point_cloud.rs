use crate::math::AABB;
use anyhow::{bail, Result};
use nalgebra::{Point3, Vector3};

/// A single point sample: a position plus a surface normal. Points without known normals carry the
/// zero vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub position: Vector3<f64>,
    pub normal: Vector3<f64>,
}

impl Point {
    pub fn new(position: Vector3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }

    /// Creates a point with a zero normal
    pub fn from_position(position: Vector3<f64>) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
        }
    }
}

/// An unorganized point cloud.
///
/// The cloud is pure data: points are stored in a fixed order and are addressed by their index,
/// which stays stable for the lifetime of the cloud. Algorithms that borrow the cloud (such as the
/// spatial index in `slabfit-algorithms`) rely on the point list not being structurally mutated
/// while they hold the borrow, which the borrow checker enforces
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    points: Vec<Point>,
    bounds: Option<AABB<f64>>,
}

impl PointCloud {
    /// Creates a point cloud from the given points
    pub fn from_points(points: Vec<Point>) -> Self {
        let bounds = compute_bounds(&points);
        Self { points, bounds }
    }

    /// Creates a point cloud from parallel sequences of positions and normals. Fails if the two
    /// sequences have different lengths
    pub fn from_positions_and_normals(
        positions: Vec<Vector3<f64>>,
        normals: Vec<Vector3<f64>>,
    ) -> Result<Self> {
        if positions.len() != normals.len() {
            bail!(
                "Number of positions ({}) does not match number of normals ({})",
                positions.len(),
                normals.len()
            );
        }
        let points = positions
            .into_iter()
            .zip(normals)
            .map(|(position, normal)| Point::new(position, normal))
            .collect();
        Ok(Self::from_points(points))
    }

    /// The number of points in this cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points of this cloud, in storage order
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The position of the point at `index`. Panics if `index` is out of bounds
    pub fn position(&self, index: usize) -> &Vector3<f64> {
        &self.points[index].position
    }

    /// The axis-aligned bounding box of this cloud, or `None` if the cloud is empty
    pub fn bounds(&self) -> Option<&AABB<f64>> {
        self.bounds.as_ref()
    }
}

fn compute_bounds(points: &[Point]) -> Option<AABB<f64>> {
    let mut bounds: Option<AABB<f64>> = None;
    for point in points {
        let position = Point3::from(point.position);
        bounds = Some(match bounds {
            Some(current) => AABB::extend_with_point(&current, &position),
            None => AABB::from_point(position),
        });
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cloud() {
        let cloud = PointCloud::from_points(vec![]);
        assert_eq!(cloud.len(), 0);
        assert!(cloud.is_empty());
        assert!(cloud.bounds().is_none());
    }

    #[test]
    fn test_bounds_cover_all_points() {
        let cloud = PointCloud::from_points(vec![
            Point::from_position(Vector3::new(1.0, -2.0, 0.0)),
            Point::from_position(Vector3::new(-3.0, 5.0, 2.0)),
            Point::from_position(Vector3::new(0.0, 0.0, -7.0)),
        ]);
        let bounds = cloud.bounds().unwrap();
        assert_eq!(*bounds.min(), Point3::new(-3.0, -2.0, -7.0));
        assert_eq!(*bounds.max(), Point3::new(1.0, 5.0, 2.0));
    }

    #[test]
    fn test_from_positions_and_normals_length_mismatch() {
        let result = PointCloud::from_positions_and_normals(
            vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)],
            vec![Vector3::new(0.0, 0.0, 1.0)],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_positions_and_normals() {
        let cloud = PointCloud::from_positions_and_normals(
            vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)],
            vec![Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 1.0, 0.0)],
        )
        .unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.points()[1].normal, Vector3::new(0.0, 1.0, 0.0));
    }
}
