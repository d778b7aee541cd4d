use crate::models::spacecraft::InertiaTensor;
use nalgebra as na;

/// Euler's equations with control torque and reaction-wheel momentum:
/// `omega_dot = J^-1 (L_c - omega x (J*omega + h))`.
pub fn angular_acceleration(
    inertia: &InertiaTensor,
    omega: &na::Vector3<f64>,
    h: &na::Vector3<f64>,
    control_torque: &na::Vector3<f64>,
) -> na::Vector3<f64> {
    let total_momentum = inertia.matrix() * omega + h;
    let gyro = omega.cross(&total_momentum);
    inertia.inverse() * (control_torque - gyro)
}
