use crate::constants::MU_EARTH;
use nalgebra as na;

/// Two-body gravitational acceleration `-mu r / |r|^3`. Zero at the
/// origin rather than a panic or NaN, matching the derivative function's
/// "defined for every finite y" contract.
pub fn gravity_acceleration(position: &na::Vector3<f64>) -> na::Vector3<f64> {
    let r = position.magnitude();
    if r == 0.0 {
        return na::Vector3::zeros();
    }
    position * (-MU_EARTH / r.powi(3))
}
