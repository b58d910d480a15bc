/*

    Axis Aligned Bounding Box.

    min/max live in the box's local space, `transform`
    places that space in the world. Rays are moved into
    local space for the slab test and hits are reported
    back in world space.

    @author: bartu
    @date: 9 Nov, 2025
*/

use crate::prelude::*;

use crate::geometry::{BBoxable, Intersection};
use crate::interval::Interval;
use crate::ray::Ray;
use crate::transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> Vector3 {
        match self {
            Axis::X => Vector3::X,
            Axis::Y => Vector3::Y,
            Axis::Z => Vector3::Z,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BBox {
    pub min: Vector3,
    pub max: Vector3,
    pub centroid: Vector3, // recompute_centroid() after touching min/max
    pub transform: Transform,
}

impl BBox {

    pub fn new(min: Vector3, max: Vector3) -> Self {
        Self {
            min,
            max,
            centroid: BBox::centroid(&min, &max),
            transform: Transform::IDENTITY,
        }
    }

    pub fn from_intervals(xint: &Interval, yint: &Interval, zint: &Interval) -> Self {
        BBox::new(
            Vector3::new(xint.min, yint.min, zint.min),
            Vector3::new(xint.max, yint.max, zint.max),
        )
    }

    /// Inverted infinite box, unions with it return the other box.
    pub fn empty() -> Self {
        Self {
            min: Vector3::INFINITY,
            max: Vector3::NEG_INFINITY,
            centroid: Vector3::ZERO,
            transform: Transform::IDENTITY,
        }
    }

    /// Tightest box around the points, or `empty()` if there are none.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Vector3>,
    {
        let (mut xint, mut yint, mut zint) = (Interval::EMPTY, Interval::EMPTY, Interval::EMPTY);
        let mut any = false;
        for p in points {
            xint.expand(p.x);
            yint.expand(p.y);
            zint.expand(p.z);
            any = true;
        }
        if !any {
            return BBox::empty();
        }
        BBox::from_intervals(&xint, &yint, &zint)
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn recompute_centroid(&mut self) {
        self.centroid = BBox::centroid(&self.min, &self.max);
    }

    /// Midpoint of `a` and `b`.
    #[inline]
    pub fn centroid(a: &Vector3, b: &Vector3) -> Vector3 {
        (*a + *b) / 2.0
    }

    /// Component-wise min of the mins and max of the maxes.
    ///
    /// Both boxes are read as they are, the result is a world space box with
    /// identity transform. For transformed inputs pass `world_bounds()`.
    pub fn union(a: &BBox, b: &BBox) -> BBox {
        BBox::new(a.min.min(b.min), a.max.max(b.max))
    }

    /// Axis along which the box is longest. Ties go to the earlier axis,
    /// X before Y before Z.
    pub fn maximum_extent(bbox: &BBox) -> Axis {
        let d = bbox.extent();
        if d.x >= d.y && d.x >= d.z {
            Axis::X
        } else if d.y >= d.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    #[inline]
    pub fn extent(&self) -> Vector3 {
        self.max - self.min
    }

    pub fn interval(&self, axis: Axis) -> Interval {
        let i = axis.index();
        Interval::new(self.min[i], self.max[i])
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn surface_area(&self) -> Float {
        if !self.is_valid() {
            return 0.0;
        }
        let d = self.extent();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Local space containment, boundary included.
    pub fn contains_point(&self, p: &Vector3) -> bool {
        Axis::ALL.iter().all(|&axis| self.interval(axis).contains(p[axis.index()]))
    }

    /// True if `other` lies fully inside, both read in the same space.
    pub fn contains(&self, other: &BBox) -> bool {
        self.contains_point(&other.min) && self.contains_point(&other.max)
    }

    pub fn corners(&self) -> [Vector3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vector3::new(lo.x, lo.y, lo.z),
            Vector3::new(hi.x, lo.y, lo.z),
            Vector3::new(lo.x, hi.y, lo.z),
            Vector3::new(hi.x, hi.y, lo.z),
            Vector3::new(lo.x, lo.y, hi.z),
            Vector3::new(hi.x, lo.y, hi.z),
            Vector3::new(lo.x, hi.y, hi.z),
            Vector3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Identity transform box enclosing this box as placed in the world.
    pub fn world_bounds(&self) -> BBox {
        if self.transform.is_identity() {
            return BBox::new(self.min, self.max);
        }
        let corners = self.corners().map(|c| self.transform.point_to_world(&c));
        BBox::from_points(corners.iter())
    }

    /// Slab test. See slides 03, p.5-6
    ///
    /// A zero direction component means the ray runs parallel to that slab:
    /// it misses if the origin is outside the slab, otherwise that axis puts
    /// no limit on t. Handling it up front keeps `0 * inf` NaNs out when the
    /// origin sits exactly on a slab plane.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {

        let local = ray.inverse_transform(&self.transform);

        let mut t_range = Interval::UNIVERSE;
        let mut entry_normal: Option<Vector3> = None;

        for axis in Axis::ALL {
            let i = axis.index();
            let (o, d) = (local.origin[i], local.direction[i]);
            let slab = self.interval(axis);

            if d == 0.0 {
                if !slab.contains(o) {
                    return None;
                }
                continue;
            }

            let inv_d = 1.0 / d;
            let mut t0 = (slab.min - o) * inv_d;
            let mut t1 = (slab.max - o) * inv_d;
            // Entering through the min face unless the ray runs backwards
            let mut face = -axis.unit();
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
                face = axis.unit();
            }

            if t0 > t_range.min {
                entry_normal = Some(face);
            }
            t_range = t_range.intersect(&Interval::new(t0, t1));
            if t_range.is_empty() {
                return None;
            }
        }

        if t_range.max < 0.0 {
            return None; // box is behind the ray
        }

        let t = t_range.min.max(0.0);
        let normal = if t_range.min >= 0.0 {
            entry_normal.map(|n| self.transform.normal_to_world(&n))
        } else {
            None
        };

        Some(Intersection {
            t_near: t_range.min,
            t_far: t_range.max,
            t,
            point: ray.at(t),
            normal,
        })
    }
}

impl BBoxable for BBox {
    fn get_bbox(&self) -> BBox {
        self.world_bounds()
    }
}
