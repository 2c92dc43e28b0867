use float_ord::FloatOrd;
use slabfit_core::{
    containers::PointCloud,
    math::{Slab, AABB},
    nalgebra::Point3,
};

/// Leaves hold at most this many points; below this size a linear scan beats further splitting
const MAX_LEAF_SIZE: usize = 16;

/// A balanced k-d tree over a subset of the points of a [PointCloud], supporting exact range
/// queries against a [Slab].
///
/// The tree stores stable point indices into the borrowed cloud and never copies point data. It is
/// read-only after construction and meant to be rebuilt from scratch whenever the indexed subset
/// changes; there are no incremental updates
pub struct PointKdTree<'a> {
    cloud: &'a PointCloud,
    /// Indexed point indices, reordered during construction so that every node owns a contiguous
    /// range
    indices: Vec<usize>,
    nodes: Vec<KdNode>,
    root: Option<usize>,
}

struct KdNode {
    bounds: AABB<f64>,
    children: KdChildren,
}

enum KdChildren {
    Leaf { start: usize, end: usize },
    Split { left: usize, right: usize },
}

impl<'a> PointKdTree<'a> {
    /// Builds a k-d tree over the points of `cloud` referenced by `indices`. Nodes are split at
    /// the median along the widest axis of their bounding box, yielding a balanced tree. Building
    /// with an empty index list yields an empty, valid tree that matches nothing.
    ///
    /// Panics if any index is out of bounds for `cloud`
    pub fn build(cloud: &'a PointCloud, mut indices: Vec<usize>) -> Self {
        if indices.is_empty() {
            return Self {
                cloud,
                indices,
                nodes: Vec::new(),
                root: None,
            };
        }

        let mut nodes = Vec::new();
        let end = indices.len();
        let root = build_node(cloud, &mut indices, 0, end, &mut nodes);
        Self {
            cloud,
            indices,
            nodes,
            root: Some(root),
        }
    }

    /// The number of points in this tree
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the indices of exactly those indexed points that lie inside `slab`, i.e. within
    /// half the slab's thickness of its mid-plane. Subtrees whose bounding box cannot intersect
    /// the slab are pruned; every surviving candidate is tested individually, so the result is
    /// exact regardless of pruning
    pub fn range_query(&self, slab: &Slab) -> Vec<usize> {
        let mut matches = Vec::new();
        if let Some(root) = self.root {
            self.query_node(root, slab, &mut matches);
        }
        matches
    }

    fn query_node(&self, node_id: usize, slab: &Slab, matches: &mut Vec<usize>) {
        let node = &self.nodes[node_id];
        if !slab.intersects_aabb(&node.bounds) {
            return;
        }
        match node.children {
            KdChildren::Leaf { start, end } => {
                for &index in &self.indices[start..end] {
                    if slab.contains(self.cloud.position(index)) {
                        matches.push(index);
                    }
                }
            }
            KdChildren::Split { left, right } => {
                self.query_node(left, slab, matches);
                self.query_node(right, slab, matches);
            }
        }
    }
}

/// Recursively builds the node over `indices[start..end]` and returns its id in `nodes`. Children
/// are pushed before their parent
fn build_node(
    cloud: &PointCloud,
    indices: &mut Vec<usize>,
    start: usize,
    end: usize,
    nodes: &mut Vec<KdNode>,
) -> usize {
    let bounds = bounds_of(cloud, &indices[start..end]);

    let size = end - start;
    if size <= MAX_LEAF_SIZE {
        nodes.push(KdNode {
            bounds,
            children: KdChildren::Leaf { start, end },
        });
        return nodes.len() - 1;
    }

    let axis = widest_axis(&bounds);
    indices[start..end]
        .select_nth_unstable_by_key(size / 2, |&index| FloatOrd(cloud.position(index)[axis]));
    let mid = start + size / 2;

    let left = build_node(cloud, indices, start, mid, nodes);
    let right = build_node(cloud, indices, mid, end, nodes);
    nodes.push(KdNode {
        bounds,
        children: KdChildren::Split { left, right },
    });
    nodes.len() - 1
}

fn bounds_of(cloud: &PointCloud, indices: &[usize]) -> AABB<f64> {
    let first = Point3::from(*cloud.position(indices[0]));
    indices[1..].iter().fold(AABB::from_point(first), |bounds, &index| {
        AABB::extend_with_point(&bounds, &Point3::from(*cloud.position(index)))
    })
}

fn widest_axis(bounds: &AABB<f64>) -> usize {
    let extent = bounds.extent();
    if extent.x >= extent.y && extent.x >= extent.z {
        0
    } else if extent.y >= extent.z {
        1
    } else {
        2
    }
}
