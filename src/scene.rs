/*

    Declare Scene consisting of transformations,
    boxes and the rays to shoot at them.

    Loading happens in two steps: serde fills the raw
    JSON records, then setup() resolves transformation
    expressions, validates boxes and builds the BVH.

    @date: 2 Oct, 2025
    @author: Bartu
*/

use rayon::prelude::*;

use crate::acceleration::{BVHSettings, BVHStats, BVHSubtree};
use crate::bbox::BBox;
use crate::error::SceneError;
use crate::geometry::{BBoxable, Intersection};
use crate::json_structs::{BoxesJSON, RaysJSON, Transformations};
use crate::ray::Ray;
use crate::prelude::*;


#[derive(Debug, Deserialize)]
pub struct RootScene {
    #[serde(rename = "Scene")]
    pub scene: Scene,
}

#[derive(Debug, Deserialize, SmartDefault)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Scene {
    #[default = 4]
    #[serde(deserialize_with = "deser_usize")]
    pub max_leaf_size: usize,

    #[default = 1024]
    #[serde(deserialize_with = "deser_usize")]
    pub parallel_build_threshold: usize,

    pub transformations: Transformations,
    pub boxes: BoxesJSON,
    pub rays: RaysJSON,

    // Filled by setup()
    #[serde(skip)]
    pub objects: Vec<SceneBox>,
    #[serde(skip)]
    pub bvh: BVHSubtree,
}

/// A box from the scene file with its transform resolved.
#[derive(Debug, Clone)]
pub struct SceneBox {
    pub id: usize,
    pub bbox: BBox,
}

impl BBoxable for SceneBox {
    fn get_bbox(&self) -> BBox {
        self.bbox.world_bounds()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub ray_id: usize,
    pub box_id: Option<usize>,
    pub intersection: Option<Intersection>,
    pub traversal_cost: Float,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub bvh: BVHStats,
    pub sah_cost: Float,
    pub results: Vec<QueryResult>,
}

impl Scene {

    pub fn bvh_settings(&self) -> BVHSettings {
        BVHSettings {
            max_leaf_size: self.max_leaf_size,
            parallel_build_threshold: self.parallel_build_threshold,
        }
    }

    pub fn setup(&mut self) -> Result<(), SceneError> {

        let mut objects = Vec::with_capacity(self.boxes.boxes.len());
        for raw in self.boxes.boxes.iter() {
            let transform = match &raw.transformations {
                Some(expr) => parse_transform_expression(expr, &self.transformations)?,
                None => Transform::IDENTITY,
            };
            let bbox = BBox::new(raw.min, raw.max).with_transform(transform);
            if !bbox.is_valid() {
                return Err(SceneError::InvalidBox { id: raw.id, min: raw.min, max: raw.max });
            }
            objects.push(SceneBox { id: raw.id, bbox });
        }
        self.objects = objects;

        self.bvh = BVHSubtree::build(&self.objects, &self.bvh_settings());
        let stats = self.bvh.stats();
        info!(
            "BVH over {} boxes: {} nodes, {} leaves, depth {}, SAH cost {:.3}",
            self.objects.len(), stats.node_count, stats.leaf_count, stats.max_depth, self.bvh.sah_cost()
        );
        if self.rays.rays.is_empty() {
            warn!("Scene has no rays, nothing to query");
        }
        Ok(())
    }

    /// Nearest hit over every box, brute force. Ties keep the box listed first.
    pub fn closest_hit(&self, ray: &mut Ray) -> Option<(usize, Intersection)> {
        let mut closest: Option<(usize, Intersection)> = None;
        for object in self.objects.iter() {
            ray.record_intersection_test();
            if let Some(hit) = object.bbox.intersect(ray) {
                if closest.as_ref().map_or(true, |(_, best)| hit.t < best.t) {
                    closest = Some((object.id, hit));
                }
            }
        }
        closest
    }

    pub fn run_queries(&self) -> Vec<QueryResult> {

        if self.objects.len() != self.boxes.boxes.len() {
            warn!("run_queries() called before setup(), no boxes to test against");
        }

        // --- Rayon Multithreading ---
        self.rays.rays
            .as_slice()
            .par_iter()
            .map(|raw| {
                let mut ray = Ray::new(raw.origin, raw.direction);
                let hit = self.closest_hit(&mut ray);
                match &hit {
                    Some((box_id, h)) => debug!("Ray {} hits box {} at t = {}", raw.id, box_id, h.t),
                    None => debug!("Ray {} misses everything", raw.id),
                }
                QueryResult {
                    ray_id: raw.id,
                    box_id: hit.map(|(id, _)| id),
                    intersection: hit.map(|(_, h)| h),
                    traversal_cost: ray.traversal_cost,
                }
            })
            .collect()
        // -----------------------------
    }

    pub fn report(&self) -> QueryReport {
        QueryReport {
            bvh: self.bvh.stats(),
            sah_cost: self.bvh.sah_cost(),
            results: self.run_queries(),
        }
    }
}
