/*

    Declare numeric types used throughout this repo.

    WARNING: If you like to use f32 instead of f64
    during computations, you need to change both of these:
    pub type Float = f32;
    pub type Vector3 = Vec3;

    @date: 2 Oct, 2025
    @author: Bartu
*/

use bevy_math::{DMat3, DMat4, DVec3, DVec4};
pub type Float = f64; // WARNING: If you want to change it to f32, don't forget to update Vector3 and Matrix types
pub type Vector3 = DVec3;
pub type Matrix3 = DMat3;
pub type Matrix4 = DMat4;
pub type Vector4 = DVec4;

pub fn approx_zero(x: Float) -> bool {
    x.abs() < 1e-8
}

pub fn transform_point(mat: &Matrix4, v: &Vector3) -> Vector3 {
    let v4 = Vector4::new(v.x, v.y, v.z, 1.0);
    let r = *mat * v4;
    Vector3::new(r.x, r.y, r.z)
}

pub fn transform_dir(mat: &Matrix4, v: &Vector3) -> Vector3 {
    // Only difference from transform_point is that last component
    // w = 0
    let v4 = Vector4::new(v.x, v.y, v.z, 0.0);
    let r = *mat * v4;
    Vector3::new(r.x, r.y, r.z)
}

/// Transform a normal given the *inverse* of the matrix that moves points,
/// i.e. n' = (M^-1)^T n.
pub fn transform_normal_with_inverse(inv: &Matrix4, n: &Vector3) -> Vector3 {
    let inv_t = Matrix3::from_mat4(*inv).transpose();
    (inv_t * *n).normalize()
}
