/*

    Types shared between the primitives and whoever
    consumes them (BVH builder, scene queries).

    @date: 9 Oct, 2025
    @author: bartu
*/

use serde::Serializer;

use crate::bbox::BBox;
use crate::prelude::*;

/// Result of a successful ray/box test.
///
/// `t_near` and `t_far` are the final slab interval. They may be negative or
/// infinite; `t` is the first parameter at which the ray is inside the box,
/// so it is `t_near` for rays starting outside and `0` for rays starting inside.
///
/// Infinite bounds are written as `"inf"` / `"-inf"` since JSON has no infinity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Intersection {
    #[serde(serialize_with = "ser_extended_float")]
    pub t_near: Float,
    #[serde(serialize_with = "ser_extended_float")]
    pub t_far: Float,
    pub t: Float,
    pub point: Vector3,
    /// World space normal of the entry face. None if the ray starts inside.
    pub normal: Option<Vector3>,
}

impl Intersection {
    pub fn starts_inside(&self) -> bool {
        self.t_near < 0.0
    }
}

fn ser_extended_float<S>(x: &Float, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if x.is_infinite() {
        serializer.serialize_str(if *x > 0.0 { "inf" } else { "-inf" })
    } else {
        serializer.serialize_f64(*x)
    }
}

/// Anything that can report world space bounds for the BVH builder.
pub trait BBoxable {
    fn get_bbox(&self) -> BBox;
}
