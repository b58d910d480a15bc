/*

    Responsible for creating a struct that represents
    ranges from a to b and functionality to check if
    x is in range [a,b].

    Used by the slab test to narrow the ray parameter
    range one axis at a time, and by BBox to describe
    per-axis extents.

    See also associated constants of Interval class:
    - EMPTY: (inf, -inf)
    - UNIVERSE: (-inf, inf)

    @author: Bartu
    @date: Sept 2025

*/

use crate::numeric::{Float};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: Float,
    pub max: Float,
}

impl Interval {

    pub const EMPTY: Self = Self {
        min: Float::INFINITY,
        max: Float::NEG_INFINITY,
    };

    pub const UNIVERSE: Self = Self {
        min: Float::NEG_INFINITY,
        max: Float::INFINITY,
    };

    pub fn new(min: Float, max: Float) -> Self {
        Self {
            min,
            max,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub fn contains(&self, x: Float) -> bool {
        self.min <= x && x <= self.max
    }

    pub fn expand(&mut self, x: Float) {
        if x < self.min { self.min = x; }
        if x > self.max { self.max = x; }
    }

    /// Overlap of two intervals, may come out empty.
    pub fn intersect(&self, other: &Interval) -> Interval {
        Interval {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

}
