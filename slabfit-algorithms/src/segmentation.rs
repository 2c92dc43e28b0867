use crate::kd_tree::PointKdTree;
use rand::Rng;
use slabfit_core::{
    containers::PointCloud,
    math::{Plane3, Slab},
};

/// Parameters of one RANSAC slab search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RansacParams {
    /// Number of random triplets to try per search
    pub num_iterations: usize,
    /// Total thickness of the candidate slabs; a point is an inlier if it lies within half this
    /// distance of the candidate plane
    pub thickness: f64,
    /// A candidate is only accepted if it has strictly more inliers than this
    pub min_inliers: usize,
}

/// The result of one accepted RANSAC round: the winning slab (with display corners recomputed
/// from its inlier set) and the indices of its inliers in the searched cloud
#[derive(Debug, Clone)]
pub struct SlabEstimate {
    pub slab: Slab,
    pub inliers: Vec<usize>,
}

impl SlabEstimate {
    pub fn inlier_count(&self) -> usize {
        self.inliers.len()
    }
}

/// Searches for the single best-supported slab among the points of `cloud` whose entry in
/// `enabled` is true, using the given random number generator.
///
/// The search builds a k-d tree over the enabled points once and then tries
/// `params.num_iterations` random triplets, drawn uniformly with replacement from the enabled
/// set. Each non-degenerate triplet defines a candidate plane; the candidate with the most
/// inliers wins, provided its inlier count strictly exceeds `params.min_inliers`. Ties keep the
/// earlier candidate. Degenerate (collinear or repeated-point) triplets are skipped and still
/// consume their iteration.
///
/// Returns `None` if no enabled points exist, if `params.num_iterations` is zero, or if no
/// candidate reached the required support. This is a regular outcome, not an error
pub fn estimate_slab_with_rng<R: Rng>(
    cloud: &PointCloud,
    enabled: &[bool],
    params: &RansacParams,
    rng: &mut R,
) -> Option<SlabEstimate> {
    debug_assert_eq!(enabled.len(), cloud.len());

    let candidates: Vec<usize> = (0..cloud.len()).filter(|&index| enabled[index]).collect();
    if candidates.is_empty() {
        return None;
    }

    // One index per search, shared by all iterations
    let tree = PointKdTree::build(cloud, candidates.clone());

    let mut best: Option<(Slab, Vec<usize>)> = None;
    for _ in 0..params.num_iterations {
        let sample_a = cloud.position(candidates[rng.gen_range(0..candidates.len())]);
        let sample_b = cloud.position(candidates[rng.gen_range(0..candidates.len())]);
        let sample_c = cloud.position(candidates[rng.gen_range(0..candidates.len())]);

        // Sampling with replacement: a repeated point simply yields a degenerate plane and is
        // skipped like any other degenerate triplet
        let plane = match Plane3::from_three_points(sample_a, sample_b, sample_c) {
            Some(plane) => plane,
            None => continue,
        };

        let slab = Slab::new(plane, params.thickness);
        let inliers = tree.range_query(&slab);

        let best_count = best.as_ref().map(|(_, inliers)| inliers.len()).unwrap_or(0);
        if inliers.len() > params.min_inliers && inliers.len() > best_count {
            best = Some((slab, inliers));
        }
    }

    best.map(|(mut slab, inliers)| {
        let inlier_positions: Vec<_> = inliers
            .iter()
            .map(|&index| *cloud.position(index))
            .collect();
        slab.update_corners(&inlier_positions);
        SlabEstimate { slab, inliers }
    })
}

/// Searches for the single best-supported slab among all points of `cloud`, using a
/// non-deterministic random number generator. See
/// [estimate_slab_with_rng](estimate_slab_with_rng) for the search contract
pub fn estimate_slab(cloud: &PointCloud, params: &RansacParams) -> Option<SlabEstimate> {
    let enabled = vec![true; cloud.len()];
    estimate_slab_with_rng(cloud, &enabled, params, &mut rand::thread_rng())
}

/// Greedily extracts up to `num_slabs` slabs from `cloud` using the given random number
/// generator.
///
/// Each round runs one RANSAC search over the points not yet claimed by an earlier slab. An
/// accepted slab permanently removes its inliers from consideration, so the inlier sets of the
/// returned estimates are pairwise disjoint. The extraction stops early once a round finds no
/// slab with sufficient support; returning fewer than `num_slabs` estimates is a regular
/// outcome. Indices in the returned estimates always refer to `cloud`
pub fn extract_slabs_with_rng<R: Rng>(
    cloud: &PointCloud,
    num_slabs: usize,
    params: &RansacParams,
    rng: &mut R,
) -> Vec<SlabEstimate> {
    let mut enabled = vec![true; cloud.len()];
    let mut slabs = Vec::new();
    for _ in 0..num_slabs {
        match estimate_slab_with_rng(cloud, &enabled, params, rng) {
            Some(estimate) => {
                for &index in &estimate.inliers {
                    enabled[index] = false;
                }
                slabs.push(estimate);
            }
            None => break,
        }
    }
    slabs
}

/// Greedily extracts up to `num_slabs` slabs from `cloud`, using a non-deterministic random
/// number generator. See [extract_slabs_with_rng](extract_slabs_with_rng) for the extraction
/// contract.
///
/// # Examples
///
/// ```
/// # use slabfit_core::containers::{Point, PointCloud};
/// # use slabfit_core::nalgebra::Vector3;
/// # use slabfit_algorithms::segmentation::{extract_slabs, RansacParams};
/// let mut points = vec![];
/// // generate some points on the x = 0 plane
/// for i in 0..200 {
///     points.push(Point::from_position(Vector3::new(
///         0.0,
///         f64::from(i),
///         f64::from(i * i),
///     )));
/// }
/// // generate an outlier
/// points.push(Point::from_position(Vector3::new(9.0, 0.0, 0.0)));
/// let cloud = PointCloud::from_points(points);
///
/// let params = RansacParams {
///     num_iterations: 500,
///     thickness: 0.5,
///     min_inliers: 50,
/// };
/// let slabs = extract_slabs(&cloud, 3, &params);
/// // the lone outlier cannot support a second slab
/// assert_eq!(slabs.len(), 1);
/// assert_eq!(slabs[0].inlier_count(), 200);
/// assert!(!slabs[0].inliers.contains(&200));
/// ```
pub fn extract_slabs(cloud: &PointCloud, num_slabs: usize, params: &RansacParams) -> Vec<SlabEstimate> {
    extract_slabs_with_rng(cloud, num_slabs, params, &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{rngs::StdRng, SeedableRng};
    use slabfit_core::{containers::Point, nalgebra::Vector3};
    use std::collections::HashSet;

    fn grid_on_plane(count: usize, height: f64) -> Vec<Point> {
        (0..count)
            .map(|i| {
                Point::from_position(Vector3::new((i % 10) as f64, (i / 10) as f64, height))
            })
            .collect()
    }

    fn scattered_outliers(count: usize) -> Vec<Point> {
        (0..count)
            .map(|i| {
                Point::from_position(Vector3::new(
                    i as f64 * 0.83 + 0.1,
                    ((i * i) % 7) as f64,
                    2.0 + i as f64 * 0.77,
                ))
            })
            .collect()
    }

    #[test]
    fn test_estimate_finds_dominant_plane() {
        let mut points = grid_on_plane(100, 0.0);
        points.extend(scattered_outliers(10));
        let cloud = PointCloud::from_points(points);

        let params = RansacParams {
            num_iterations: 200,
            thickness: 0.01,
            min_inliers: 50,
        };
        let mut rng = StdRng::seed_from_u64(42);
        let estimate = estimate_slab_with_rng(&cloud, &vec![true; cloud.len()], &params, &mut rng)
            .expect("the z = 0 plane has ample support");

        assert_eq!(estimate.inlier_count(), 100);
        assert!(estimate.inliers.iter().all(|&index| index < 100));
        // The winning plane is z = 0, up to sign of the normal
        assert_approx_eq!(estimate.slab.plane().normal().z.abs(), 1.0);
        assert!(estimate.slab.corners().is_some());
    }

    #[test]
    fn test_estimate_with_zero_iterations() {
        let cloud = PointCloud::from_points(grid_on_plane(100, 0.0));
        let params = RansacParams {
            num_iterations: 0,
            thickness: 0.01,
            min_inliers: 0,
        };
        let mut rng = StdRng::seed_from_u64(42);
        assert!(estimate_slab_with_rng(&cloud, &vec![true; cloud.len()], &params, &mut rng).is_none());
    }

    #[test]
    fn test_estimate_with_no_enabled_points() {
        let cloud = PointCloud::from_points(grid_on_plane(50, 0.0));
        let params = RansacParams {
            num_iterations: 100,
            thickness: 0.01,
            min_inliers: 0,
        };
        let mut rng = StdRng::seed_from_u64(42);
        assert!(estimate_slab_with_rng(&cloud, &vec![false; cloud.len()], &params, &mut rng).is_none());
    }

    #[test]
    fn test_estimate_with_too_few_points_for_a_plane() {
        // Every triplet drawn from two points repeats a point and is degenerate
        let cloud = PointCloud::from_points(vec![
            Point::from_position(Vector3::new(0.0, 0.0, 0.0)),
            Point::from_position(Vector3::new(1.0, 0.0, 0.0)),
        ]);
        let params = RansacParams {
            num_iterations: 50,
            thickness: 1.0,
            min_inliers: 0,
        };
        let mut rng = StdRng::seed_from_u64(42);
        assert!(estimate_slab_with_rng(&cloud, &vec![true; cloud.len()], &params, &mut rng).is_none());
    }

    #[test]
    fn test_min_inliers_is_a_strict_threshold() {
        let points = vec![
            Point::from_position(Vector3::new(0.0, 0.0, 0.0)),
            Point::from_position(Vector3::new(1.0, 0.0, 0.0)),
            Point::from_position(Vector3::new(0.0, 1.0, 0.0)),
            Point::from_position(Vector3::new(1.0, 1.0, 0.0)),
            Point::from_position(Vector3::new(2.0, 2.0, 0.0)),
        ];
        let cloud = PointCloud::from_points(points);
        let enabled = vec![true; cloud.len()];

        let mut params = RansacParams {
            num_iterations: 200,
            thickness: 0.01,
            // All 5 points are coplanar, but 5 > 5 does not hold
            min_inliers: 5,
        };
        let mut rng = StdRng::seed_from_u64(42);
        assert!(estimate_slab_with_rng(&cloud, &enabled, &params, &mut rng).is_none());

        params.min_inliers = 4;
        let mut rng = StdRng::seed_from_u64(42);
        let estimate = estimate_slab_with_rng(&cloud, &enabled, &params, &mut rng).unwrap();
        assert_eq!(estimate.inlier_count(), 5);
    }

    #[test]
    fn test_extract_two_orthogonal_planes_largest_first() {
        // 60 points on z = 0, 40 points on the orthogonal plane x = 20
        let mut points = grid_on_plane(60, 0.0);
        points.extend((0..40).map(|j| {
            Point::from_position(Vector3::new(20.0, (j % 5) as f64, 10.0 + (j / 5) as f64))
        }));
        let cloud = PointCloud::from_points(points);

        let params = RansacParams {
            num_iterations: 500,
            thickness: 0.01,
            min_inliers: 20,
        };
        let mut rng = StdRng::seed_from_u64(42);
        let slabs = extract_slabs_with_rng(&cloud, 2, &params, &mut rng);

        assert_eq!(slabs.len(), 2);
        // Greedy removal finds the better-supported plane first
        assert_eq!(slabs[0].inlier_count(), 60);
        assert_eq!(slabs[1].inlier_count(), 40);
        assert_approx_eq!(slabs[0].slab.plane().normal().z.abs(), 1.0);
        assert_approx_eq!(slabs[1].slab.plane().normal().x.abs(), 1.0);
    }

    #[test]
    fn test_extract_inlier_sets_are_disjoint() {
        // Two parallel planes; each slab is too thin to claim both
        let mut points = grid_on_plane(50, 0.0);
        points.extend(grid_on_plane(50, 1.0));
        let cloud = PointCloud::from_points(points);

        let params = RansacParams {
            num_iterations: 400,
            thickness: 0.1,
            min_inliers: 10,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let slabs = extract_slabs_with_rng(&cloud, 5, &params, &mut rng);

        assert_eq!(slabs.len(), 2);
        let mut seen = HashSet::new();
        for estimate in &slabs {
            assert!(estimate.inlier_count() > params.min_inliers);
            for &index in &estimate.inliers {
                assert!(index < cloud.len());
                assert!(seen.insert(index), "point {} claimed twice", index);
            }
        }
        assert_eq!(seen.len(), 100);
    }

    #[test]
    fn test_extract_stops_when_support_runs_out() {
        let mut points = grid_on_plane(60, 0.0);
        points.extend(scattered_outliers(5));
        let cloud = PointCloud::from_points(points);

        let params = RansacParams {
            num_iterations: 300,
            thickness: 0.01,
            min_inliers: 20,
        };
        let mut rng = StdRng::seed_from_u64(42);
        let slabs = extract_slabs_with_rng(&cloud, 3, &params, &mut rng);
        assert_eq!(slabs.len(), 1);
        assert_eq!(slabs[0].inlier_count(), 60);
    }

    #[test]
    fn test_extract_from_empty_cloud() {
        let cloud = PointCloud::from_points(vec![]);
        let params = RansacParams {
            num_iterations: 100,
            thickness: 0.01,
            min_inliers: 0,
        };
        let slabs = extract_slabs(&cloud, 4, &params);
        assert!(slabs.is_empty());
    }
}
