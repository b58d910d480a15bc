use crate::prelude::*;
use crate::transform::Transform;

/// Cost of stepping through one acceleration structure node.
pub const COST_TRAVERSAL: Float = 0.125;
/// Cost of one ray/primitive intersection test.
pub const COST_INTERSECTION: Float = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3, // not necessarily normalized
    pub traversal_cost: Float,
}

impl Ray {

    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self {
            origin,
            direction,
            traversal_cost: 0.0,
        }
    }

    #[inline]
    pub fn at(&self, t: Float) -> Vector3 {
        self.origin + self.direction * t // r(t) = o + dt
    }

    /// Copy of this ray with `matrix` applied, origin as a point and direction
    /// as a vector. The copy starts with zero traversal cost.
    #[inline]
    pub fn transformed_copy(&self, matrix: &Matrix4) -> Ray {
        let origin = transform_point(matrix, &self.origin);
        let direction = transform_dir(matrix, &self.direction);
        // DO NOT NORMALIZE! t has to stay comparable between spaces
        Ray::new(origin, direction)
    }

    /// Move a world space ray into the local space of `transform`.
    #[inline]
    pub fn inverse_transform(&self, transform: &Transform) -> Ray {
        self.transformed_copy(transform.world_to_local())
    }

    #[inline]
    pub fn add_traversal_cost(&mut self, cost: Float) {
        self.traversal_cost += cost;
    }

    #[inline]
    pub fn record_traversal_step(&mut self) {
        self.add_traversal_cost(COST_TRAVERSAL);
    }

    #[inline]
    pub fn record_intersection_test(&mut self) {
        self.add_traversal_cost(COST_INTERSECTION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[test]
    fn default_is_all_zero() {
        let ray = Ray::default();
        assert_eq!(ray.origin, Vector3::ZERO);
        assert_eq!(ray.direction, Vector3::ZERO);
        assert_eq!(ray.traversal_cost, 0.0);
    }

    #[test]
    fn at_is_origin_plus_scaled_direction() {
        let mut rng = StdRng::seed_from_u64(795);
        for _ in 0..100 {
            let o = Vector3::new(rng.random_range(-10.0..10.0), rng.random_range(-10.0..10.0), rng.random_range(-10.0..10.0));
            let d = Vector3::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
            let t: Float = rng.random_range(-50.0..50.0);
            let ray = Ray::new(o, d);
            assert_eq!(ray.at(t), o + d * t);
        }
        // Negative t is fine, lands behind the origin
        let ray = Ray::new(Vector3::ZERO, Vector3::X);
        assert_eq!(ray.at(-2.0), Vector3::new(-2.0, 0.0, 0.0));
    }

    #[test]
    fn identity_copy_resets_cost_only() {
        let mut ray = Ray::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.0, -1.0, 0.5));
        ray.record_traversal_step();
        ray.record_intersection_test();
        assert_eq!(ray.traversal_cost, COST_TRAVERSAL + COST_INTERSECTION);

        let copy = ray.transformed_copy(&Matrix4::IDENTITY);
        assert_eq!(copy.origin, ray.origin);
        assert_eq!(copy.direction, ray.direction);
        assert_eq!(copy.traversal_cost, 0.0);
        // receiver untouched
        assert_eq!(ray.traversal_cost, COST_TRAVERSAL + COST_INTERSECTION);
    }

    #[test]
    fn translation_moves_origin_not_direction() {
        let ray = Ray::new(Vector3::ZERO, Vector3::new(0.0, 0.0, 2.0));
        let moved = ray.transformed_copy(&Matrix4::from_translation(Vector3::new(1.0, 1.0, 1.0)));
        assert_eq!(moved.origin, Vector3::ONE);
        assert_eq!(moved.direction, ray.direction);
    }

    #[test]
    fn local_and_world_points_agree_on_t() {
        let transform = Transform::scaling(Vector3::new(2.0, 0.5, 3.0)).unwrap()
            .then(&Transform::rotation(Vector3::Y, 37.0).unwrap())
            .then(&Transform::translation(Vector3::new(4.0, -1.0, 0.0)));
        let world = Ray::new(Vector3::new(-3.0, 2.0, 1.0), Vector3::new(1.0, 0.2, -0.3));
        let local = world.inverse_transform(&transform);
        for t in [0.0, 0.5, 3.0, 10.0] {
            let back = transform.point_to_world(&local.at(t));
            assert!(back.abs_diff_eq(world.at(t), 1e-9));
        }
    }
}
