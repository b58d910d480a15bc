/*

    Affine transform stored as a matrix pair so that
    hot intersection loops never invert anything.

    local_to_world moves points from an object's own
    space into the scene, world_to_local is its inverse
    and is what rays get multiplied with before testing.

    @date: Nov, 2025
    @author: Bartu
*/

use crate::error::SceneError;
use crate::numeric::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    local_to_world: Matrix4,
    world_to_local: Matrix4,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {

    pub const IDENTITY: Self = Self {
        local_to_world: Matrix4::IDENTITY,
        world_to_local: Matrix4::IDENTITY,
    };

    /// Fails when the matrix cannot be inverted. Small but nonzero
    /// determinants (e.g. a uniform 0.001 scale) are accepted.
    pub fn from_matrix(local_to_world: Matrix4) -> Result<Self, SceneError> {
        let det = local_to_world.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(SceneError::SingularTransform(format!("{local_to_world}")));
        }
        let world_to_local = local_to_world.inverse();
        if !world_to_local.is_finite() {
            return Err(SceneError::SingularTransform(format!("{local_to_world}")));
        }
        Ok(Self {
            local_to_world,
            world_to_local,
        })
    }

    pub fn translation(offset: Vector3) -> Self {
        // Inverse is known in closed form
        Self {
            local_to_world: Matrix4::from_translation(offset),
            world_to_local: Matrix4::from_translation(-offset),
        }
    }

    pub fn scaling(factors: Vector3) -> Result<Self, SceneError> {
        if approx_zero(factors.x) || approx_zero(factors.y) || approx_zero(factors.z) {
            return Err(SceneError::SingularTransform(format!("scaling {factors}")));
        }
        Ok(Self {
            local_to_world: Matrix4::from_scale(factors),
            world_to_local: Matrix4::from_scale(factors.recip()),
        })
    }

    /// Rotation by `degrees` around `axis` (need not be unit length).
    pub fn rotation(axis: Vector3, degrees: Float) -> Result<Self, SceneError> {
        if approx_zero(axis.length_squared()) {
            return Err(SceneError::SingularTransform(format!("rotation around {axis}")));
        }
        let m = Matrix4::from_axis_angle(axis.normalize(), degrees.to_radians());
        Ok(Self {
            local_to_world: m,
            world_to_local: m.transpose(), // orthonormal
        })
    }

    #[inline]
    pub fn local_to_world(&self) -> &Matrix4 {
        &self.local_to_world
    }

    #[inline]
    pub fn world_to_local(&self) -> &Matrix4 {
        &self.world_to_local
    }

    /// Transform that applies `self` first, then `next`.
    pub fn then(&self, next: &Transform) -> Transform {
        Transform {
            local_to_world: next.local_to_world * self.local_to_world,
            world_to_local: self.world_to_local * next.world_to_local,
        }
    }

    pub fn inverse(&self) -> Transform {
        Transform {
            local_to_world: self.world_to_local,
            world_to_local: self.local_to_world,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.local_to_world == Matrix4::IDENTITY
    }

    #[inline]
    pub fn point_to_world(&self, p: &Vector3) -> Vector3 {
        transform_point(&self.local_to_world, p)
    }

    #[inline]
    pub fn point_to_local(&self, p: &Vector3) -> Vector3 {
        transform_point(&self.world_to_local, p)
    }

    /// Local normal to a unit world normal, uses the cached inverse.
    #[inline]
    pub fn normal_to_world(&self, n: &Vector3) -> Vector3 {
        transform_normal_with_inverse(&self.world_to_local, n)
    }
}
