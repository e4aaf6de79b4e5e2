//! Angular velocity of a point about an origin.

use nalgebra::Vector2;

use crate::error::KinematicsError;

/// Angular velocity of a point moving with linear velocity `v` at radius vector `r`.
///
/// Uses the planar cross product over the squared radius: `ω = (r × v) / |r|²`.
///
/// # Errors
///
/// Returns `Err(KinematicsError::InvalidGeometry)` if `r` is the zero vector
/// while `v` is not.
pub fn omega_from_v_r(v: &Vector2<f64>, r: &Vector2<f64>) -> Result<f64, KinematicsError> {
    if v.norm_squared() == 0.0 {
        return Ok(0.0);
    }
    let r_squared = r.norm_squared();
    if r_squared == 0.0 {
        return Err(KinematicsError::InvalidGeometry("radius vector cannot be zero"));
    }
    Ok((r.x * v.y - r.y * v.x) / r_squared)
}
