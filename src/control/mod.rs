use crate::numerics::quaternion::Quaternion;
use nalgebra as na;

/// Tagged control-law variant, matched in the derivative function rather
/// than dispatched through a trait object: no heap allocation, no
/// virtual call on the integrator's hot path.
#[derive(Debug, Clone, Copy)]
pub enum ControlPolicy {
    ZeroTorque,
    LinearTracking {
        kp: f64,
        kd: f64,
        q_cmd: Quaternion,
    },
    NonlinearTracking {
        kp: f64,
        kd: f64,
        q_cmd: Quaternion,
    },
}

/// Maps the accepted string aliases from the wire configuration onto the
/// three control-law variants. Any unrecognized alias silently falls
/// back to `ZeroTorque`.
pub fn control_type_from_alias(alias: &str, kp: f64, kd: f64, q_cmd: Quaternion) -> ControlPolicy {
    match alias {
        "none" | "zero_torque" => ControlPolicy::ZeroTorque,
        "inertial" | "inertial_linear" | "tracking" => {
            ControlPolicy::LinearTracking { kp, kd, q_cmd }
        }
        "inertial_nonlinear" | "nonlinear_tracking" => {
            ControlPolicy::NonlinearTracking { kp, kd, q_cmd }
        }
        _ => ControlPolicy::ZeroTorque,
    }
}

/// Attitude error quaternion `q_e = inv(q_cmd) ⊗ q`, written `(ex,ey,ez,ew)`.
fn attitude_error(q_cmd: &Quaternion, q: &Quaternion) -> Quaternion {
    q_cmd.inv().mul_cross(q)
}

/// Computes the control torque `L_c` for the current attitude state.
pub fn control_torque(
    policy: &ControlPolicy,
    q: &Quaternion,
    omega: &na::Vector3<f64>,
) -> na::Vector3<f64> {
    match policy {
        ControlPolicy::ZeroTorque => na::Vector3::zeros(),
        ControlPolicy::LinearTracking { kp, kd, q_cmd } => {
            let e = attitude_error(q_cmd, q);
            -*kp * e.vector() - *kd * omega
        }
        ControlPolicy::NonlinearTracking { kp, kd, q_cmd } => {
            let e = attitude_error(q_cmd, q);
            let sign = if e.scalar() < 0.0 { -1.0 } else { 1.0 };
            -*kp * sign * e.vector() - *kd * omega
        }
    }
}
