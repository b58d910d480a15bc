use rayon::prelude::*;

use crate::prelude::*;
use crate::bbox::BBox;
use crate::geometry::BBoxable;
use crate::ray::{COST_INTERSECTION, COST_TRAVERSAL};


// ====================================================================================================
// Bounding Volume Hierarchy
// ====================================================================================================
// Binary tree creation is inspired by:
// https://google.github.io/comprehensive-rust/smart-pointers/exercise.html


#[derive(Debug, Clone, Copy, SmartDefault)]
pub struct BVHSettings {
    #[default = 4]
    pub max_leaf_size: usize,
    /// Subtrees at least this large build their two halves on separate rayon tasks.
    #[default = 1024]
    pub parallel_build_threshold: usize,
}

/// BVH node storing a bounding box, optional children, and the indices of
/// the primitives for leaves.
#[derive(Debug)]
pub struct BVHNode {
    pub bbox: BBox,
    pub left: Option<Arc<BVHNode>>,
    pub right: Option<Arc<BVHNode>>,
    pub objects: Vec<usize>,
}

impl BVHNode {
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// BVHSubtree is a wrapper around an optional root node.
#[derive(Debug, Clone, Default)]
pub struct BVHSubtree(pub Option<Arc<BVHNode>>);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BVHStats {
    pub node_count: usize,
    pub leaf_count: usize,
    pub max_depth: usize,
    pub max_leaf_size: usize,
}

// Primitive index with its world bounds, so bounds are computed once per build
type BuildEntry = (usize, BBox);

impl BVHSubtree {

    /// Build a BVH over `shapes`. Leaves refer to shapes by their index in the slice.
    pub fn build<T>(shapes: &[T], settings: &BVHSettings) -> Self
        where
            T: BBoxable + Sync,
    {
        if shapes.is_empty() {
            return BVHSubtree(None);
        }

        let mut entries: Vec<BuildEntry> = shapes
            .par_iter()
            .enumerate()
            .map(|(i, shape)| (i, shape.get_bbox()))
            .collect();

        let max_leaf_size = settings.max_leaf_size.max(1);
        let root = build_recursive(&mut entries, max_leaf_size, settings.parallel_build_threshold);
        debug!("Built BVH over {} primitives", shapes.len());
        BVHSubtree(Some(Arc::new(root)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn root_bbox(&self) -> Option<&BBox> {
        self.0.as_ref().map(|node| &node.bbox)
    }

    pub fn stats(&self) -> BVHStats {
        let mut stats = BVHStats::default();
        if let Some(root) = &self.0 {
            collect_stats(root, 1, &mut stats);
        }
        stats
    }

    /// Surface area heuristic estimate of the expected cost of tracing a ray
    /// through this tree, using the traversal and intersection costs from ray.rs.
    pub fn sah_cost(&self) -> Float {
        match &self.0 {
            None => 0.0,
            Some(root) => node_cost(root),
        }
    }
}

fn build_recursive(entries: &mut [BuildEntry], max_leaf_size: usize, parallel_threshold: usize) -> BVHNode {

    let bbox = entries
        .iter()
        .fold(BBox::empty(), |acc, (_, b)| BBox::union(&acc, b));

    if entries.len() <= max_leaf_size {
        return make_leaf(bbox, entries);
    }

    // Split along the longest axis of the centroids, not of the node box,
    // big primitives would otherwise dominate the choice
    let centroid_bounds = BBox::from_points(entries.iter().map(|(_, b)| &b.centroid));
    let axis = BBox::maximum_extent(&centroid_bounds);
    let i = axis.index();
    if approx_zero(centroid_bounds.extent()[i]) {
        // All centroids coincide, nothing to split on
        return make_leaf(bbox, entries);
    }

    entries.sort_unstable_by(|(_, a), (_, b)| a.centroid[i].total_cmp(&b.centroid[i]));
    let mid = entries.len() / 2;
    let n = entries.len();
    let (left_entries, right_entries) = entries.split_at_mut(mid);

    let (left, right) = if n >= parallel_threshold {
        rayon::join(
            || build_recursive(left_entries, max_leaf_size, parallel_threshold),
            || build_recursive(right_entries, max_leaf_size, parallel_threshold),
        )
    } else {
        (
            build_recursive(left_entries, max_leaf_size, parallel_threshold),
            build_recursive(right_entries, max_leaf_size, parallel_threshold),
        )
    };

    BVHNode {
        bbox,
        left: Some(Arc::new(left)),
        right: Some(Arc::new(right)),
        objects: Vec::new(),
    }
}

fn make_leaf(bbox: BBox, entries: &[BuildEntry]) -> BVHNode {
    BVHNode {
        bbox,
        left: None,
        right: None,
        objects: entries.iter().map(|(i, _)| *i).collect(),
    }
}

fn collect_stats(node: &BVHNode, depth: usize, stats: &mut BVHStats) {
    stats.node_count += 1;
    stats.max_depth = stats.max_depth.max(depth);
    if node.is_leaf() {
        stats.leaf_count += 1;
        stats.max_leaf_size = stats.max_leaf_size.max(node.objects.len());
        return;
    }
    for child in [&node.left, &node.right].into_iter().flatten() {
        collect_stats(child, depth + 1, stats);
    }
}

fn node_cost(node: &BVHNode) -> Float {
    if node.is_leaf() {
        return COST_INTERSECTION * node.objects.len() as Float;
    }
    let area = node.bbox.surface_area();
    let mut cost = COST_TRAVERSAL;
    for child in [&node.left, &node.right].into_iter().flatten() {
        // Flat nodes have zero area, every ray that reaches them visits both children
        let p = if area > 0.0 { child.bbox.surface_area() / area } else { 1.0 };
        cost += p * node_cost(child);
    }
    cost
}
